use serde::Serialize;
use uuid::Uuid;

/// Identity of one browser (or terminal) conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSession {
    id: String,
    created_at: i64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: current_timestamp(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Session ids are UUIDs; anything else coming from a client is ignored.
    pub fn is_valid_id(id: &str) -> bool {
        Uuid::parse_str(id).is_ok()
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
