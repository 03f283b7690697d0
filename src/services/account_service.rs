use crate::domain::auth::AuthSession;
use crate::domain::user::User;
use crate::error::{AppError, Result, is_unique_violation};
use crate::services::auth_service::AuthService;
use crate::storage::DbPool;
use crate::storage::user_repo::UserRepository;
use opentelemetry::{KeyValue, global, metrics::Counter};

const DEFAULT_AVATAR: &str = "https://i.pravatar.cc/150";

#[derive(Clone, Debug)]
struct Metrics {
    registrations_total: Counter<u64>,
    logins_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mingle-server");
        Self {
            registrations_total: meter
                .u64_counter("accounts_registered_total")
                .with_description("Total account registration attempts")
                .build(),
            logins_total: meter
                .u64_counter("accounts_login_total")
                .with_description("Total login attempts")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AccountService {
    pool: DbPool,
    repo: UserRepository,
    auth: AuthService,
    metrics: Metrics,
}

pub struct Registration {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration").field("email", &self.email).finish_non_exhaustive()
    }
}

impl AccountService {
    #[must_use]
    pub fn new(pool: DbPool, repo: UserRepository, auth: AuthService) -> Self {
        Self { pool, repo, auth, metrics: Metrics::new() }
    }

    /// Creates an account.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for missing fields and
    /// `AppError::Conflict` when the email is already registered.
    #[tracing::instrument(err(level = "warn"), skip(self, registration))]
    pub async fn register(&self, registration: Registration) -> Result<User> {
        if registration.name.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
        {
            return Err(AppError::BadRequest("Name, email and password are required".into()));
        }

        let password_hash = self.auth.hash_password(&registration.password).await?;
        let avatar = registration.avatar.as_deref().filter(|a| !a.is_empty()).unwrap_or(DEFAULT_AVATAR);

        let mut conn = self.pool.acquire().await?;
        let result = self
            .repo
            .create(
                &mut conn,
                &registration.name,
                &registration.email,
                registration.age,
                registration.description.as_deref(),
                avatar,
                &password_hash,
            )
            .await;

        match result {
            Ok(user) => {
                self.metrics.registrations_total.add(1, &[KeyValue::new("status", "success")]);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => {
                self.metrics.registrations_total.add(1, &[KeyValue::new("status", "conflict")]);
                Err(AppError::Conflict("This email is already registered".into()))
            }
            Err(e) => {
                self.metrics.registrations_total.add(1, &[KeyValue::new("status", "failure")]);
                Err(e)
            }
        }
    }

    /// Verifies credentials and issues an access token.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` for unknown emails or bad passwords, with
    /// no distinction between the two.
    #[tracing::instrument(skip(self, email, password), fields(user_id = tracing::field::Empty))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let mut conn = self.pool.acquire().await?;
        let Some(user) = self.repo.find_by_email(&mut conn, email).await? else {
            tracing::warn!("Login failed: unknown email");
            self.metrics.logins_total.add(1, &[KeyValue::new("status", "failure")]);
            return Err(AppError::AuthError);
        };

        tracing::Span::current().record("user_id", user.id);

        if !self.auth.verify_password(password, &user.password_hash).await? {
            tracing::warn!("Login failed: invalid password");
            self.metrics.logins_total.add(1, &[KeyValue::new("status", "failure")]);
            return Err(AppError::AuthError);
        }

        let session = self.auth.issue_session(user.id)?;
        self.metrics.logins_total.add(1, &[KeyValue::new("status", "success")]);
        Ok(session)
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        self.repo.find_by_id(&mut conn, id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_all(&mut conn).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        self.repo.email_exists(&mut conn, email).await
    }

    /// Updates profile fields. Only the owner may edit their profile.
    ///
    /// # Errors
    /// Returns `AppError::NotAuthorized` when `actor_id` is not the target.
    #[tracing::instrument(err(level = "warn"), skip(self, name, description, avatar))]
    pub async fn update_profile(
        &self,
        actor_id: i64,
        target_id: i64,
        name: Option<&str>,
        description: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<User> {
        if actor_id != target_id {
            return Err(AppError::NotAuthorized("You can only edit your own profile".into()));
        }

        let mut conn = self.pool.acquire().await?;
        self.repo
            .update_profile(&mut conn, target_id, name, description, avatar)
            .await?
            .ok_or(AppError::NotFound)
    }
}
