use serde::Serialize;

use super::{Role, Turn};

/// Ordered, append-only record of the turns of one conversation.
///
/// Turns usually alternate user/assistant, but that is not enforced: a failed
/// completion leaves a user turn without a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn count_by_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role() == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_prior_turns() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("Hi"));
        let before = transcript.turns().to_vec();

        transcript.append(Turn::assistant("OK"));
        transcript.append(Turn::user("Again"));

        assert_eq!(&transcript.turns()[..before.len()], before.as_slice());
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_count_by_role_with_unanswered_turn() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("first"));
        transcript.append(Turn::user("second"));
        transcript.append(Turn::assistant("reply"));

        assert_eq!(transcript.count_by_role(Role::User), 2);
        assert_eq!(transcript.count_by_role(Role::Assistant), 1);
        assert_eq!(transcript.last().map(Turn::content), Some("reply"));
    }
}
