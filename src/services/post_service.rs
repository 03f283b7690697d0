use crate::domain::post::{LikeToggle, Post};
use crate::error::{AppError, Result};
use crate::storage::DbPool;
use crate::storage::post_repo::PostRepository;
use opentelemetry::{KeyValue, global, metrics::Counter};

#[derive(Clone, Debug)]
struct Metrics {
    created_total: Counter<u64>,
    like_toggles_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mingle-server");
        Self {
            created_total: meter
                .u64_counter("posts_created_total")
                .with_description("Total posts created")
                .build(),
            like_toggles_total: meter
                .u64_counter("post_like_toggles_total")
                .with_description("Total like toggles, by resulting state")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostService {
    pool: DbPool,
    repo: PostRepository,
    metrics: Metrics,
}

impl PostService {
    #[must_use]
    pub fn new(pool: DbPool, repo: PostRepository) -> Self {
        Self { pool, repo, metrics: Metrics::new() }
    }

    /// # Errors
    /// Returns `AppError::BadRequest` for empty content.
    #[tracing::instrument(err(level = "warn"), skip(self, content))]
    pub async fn create(&self, author_id: i64, content: &str) -> Result<Post> {
        if content.trim().is_empty() {
            return Err(AppError::BadRequest("Post content cannot be empty".into()));
        }

        let mut conn = self.pool.acquire().await?;
        let post = self.repo.create(&mut conn, author_id, content).await?;
        self.metrics.created_total.add(1, &[]);
        Ok(post)
    }

    /// Flips the (post, user) like pair: present becomes absent and vice
    /// versa. The pair's primary key makes concurrent toggles race
    /// deterministically.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` for an unknown post.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<LikeToggle> {
        let mut conn = self.pool.acquire().await?;

        if !self.repo.exists(&mut conn, post_id).await? {
            return Err(AppError::NotFound);
        }

        let toggle = if self.repo.like_exists(&mut conn, post_id, user_id).await? {
            self.repo.delete_like(&mut conn, post_id, user_id).await?;
            LikeToggle::Unliked
        } else {
            self.repo.insert_like(&mut conn, post_id, user_id).await?;
            LikeToggle::Liked
        };

        let label = match toggle {
            LikeToggle::Liked => "liked",
            LikeToggle::Unliked => "unliked",
        };
        self.metrics.like_toggles_total.add(1, &[KeyValue::new("state", label)]);

        Ok(toggle)
    }
}
