use async_trait::async_trait;

use crate::domain::Turn;

/// Holds the transcript of exactly one conversation.
///
/// Operations are total. Whoever owns the store owns the session lifecycle:
/// a store is created empty and simply dropped when the session ends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Add `turn` to the end of the transcript.
    async fn append(&self, turn: Turn);

    /// The whole transcript, oldest turn first.
    async fn all(&self) -> Vec<Turn>;

    async fn len(&self) -> usize;
}
