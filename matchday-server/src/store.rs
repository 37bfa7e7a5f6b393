use async_trait::async_trait;
use chrono::NaiveDate;
use matchday::player::Player;
use matchday::results::MatchResult;
use matchday::team::Assignment;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("error executing DB query {0}")]
    DbQueryError(#[from] tokio_diesel::AsyncError),
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the server reads from or writes to the data store. Writes
/// that touch several rows happen atomically.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    async fn players(&self) -> StoreResult<Vec<Player>>;
    async fn insert_player(&self, name: String) -> StoreResult<Player>;
    /// Returns `None` if there's no such player.
    async fn set_player_active(&self, id: i32, active: bool) -> StoreResult<Option<Player>>;

    async fn assignments(&self) -> StoreResult<Vec<Assignment>>;
    async fn roster(&self, date: NaiveDate) -> StoreResult<Vec<Assignment>>;
    /// Drops any roster already locked for `date` and locks `assignments` in its place.
    async fn replace_roster(&self, date: NaiveDate, assignments: Vec<Assignment>) -> StoreResult<()>;
    async fn clear_roster(&self, date: NaiveDate) -> StoreResult<usize>;

    async fn results(&self) -> StoreResult<Vec<MatchResult>>;
    /// Replaces every result recorded for `date`.
    async fn replace_results(&self, date: NaiveDate, results: Vec<MatchResult>) -> StoreResult<()>;
}

pub type AStore = Arc<dyn Store>;
