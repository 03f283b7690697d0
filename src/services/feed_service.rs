use crate::domain::post::AnnotatedPost;
use crate::error::Result;
use crate::storage::DbPool;
use crate::storage::friendship_repo::FriendshipRepository;
use crate::storage::post_repo::PostRepository;
use opentelemetry::{global, metrics::Histogram};

#[derive(Clone, Debug)]
struct Metrics {
    feed_size: Histogram<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mingle-server");
        Self {
            feed_size: meter
                .u64_histogram("feed_posts_returned")
                .with_description("Number of posts returned per feed read")
                .build(),
        }
    }
}

/// Assembles the reading views: a viewer's friend feed and a single author's
/// post list, both annotated with like state.
#[derive(Clone, Debug)]
pub struct FeedService {
    pool: DbPool,
    friendship_repo: FriendshipRepository,
    post_repo: PostRepository,
    metrics: Metrics,
}

impl FeedService {
    #[must_use]
    pub fn new(pool: DbPool, friendship_repo: FriendshipRepository, post_repo: PostRepository) -> Self {
        Self { pool, friendship_repo, post_repo, metrics: Metrics::new() }
    }

    /// Posts authored by the viewer's accepted friends, newest first.
    /// Friendship is the only inclusion rule; no friends means an empty feed.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn feed_for(&self, user_id: i64) -> Result<Vec<AnnotatedPost>> {
        let mut conn = self.pool.acquire().await?;

        let friend_ids = self.friendship_repo.friend_ids(&mut conn, user_id).await?;
        if friend_ids.is_empty() {
            self.metrics.feed_size.record(0, &[]);
            return Ok(Vec::new());
        }

        let posts = self.post_repo.annotated_by_authors(&mut conn, &friend_ids, user_id).await?;
        self.metrics.feed_size.record(posts.len() as u64, &[]);
        Ok(posts)
    }

    /// One author's posts, newest first. The personal like flag is present
    /// only when a viewer identity is known.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn posts_for(&self, author_id: i64, viewer_id: Option<i64>) -> Result<Vec<AnnotatedPost>> {
        let mut conn = self.pool.acquire().await?;
        self.post_repo.annotated_by_author(&mut conn, author_id, viewer_id).await
    }
}
