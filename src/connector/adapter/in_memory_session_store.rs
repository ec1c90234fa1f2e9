use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::SessionStore;
use crate::domain::{Transcript, Turn};

pub struct InMemorySessionStore {
    transcript: Mutex<Transcript>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            transcript: Mutex::new(Transcript::new()),
        }
    }

    /// Snapshot of the transcript as a domain value.
    pub async fn transcript(&self) -> Transcript {
        self.transcript.lock().await.clone()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn append(&self, turn: Turn) {
        let mut transcript = self.transcript.lock().await;
        debug!("Appending {} turn at position {}", turn.role(), transcript.len());
        transcript.append(turn);
    }

    async fn all(&self) -> Vec<Turn> {
        self.transcript.lock().await.turns().to_vec()
    }

    async fn len(&self) -> usize {
        self.transcript.lock().await.len()
    }
}
