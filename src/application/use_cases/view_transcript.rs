use std::sync::Arc;

use crate::application::SessionStore;
use crate::domain::Turn;

pub struct ViewTranscriptUseCase {
    store: Arc<dyn SessionStore>,
}

impl ViewTranscriptUseCase {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Vec<Turn> {
        self.store.all().await
    }
}
