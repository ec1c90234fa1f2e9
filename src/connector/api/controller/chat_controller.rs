use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::application::{SessionStore, TurnOutcome};
use crate::connector::adapter::InMemorySessionStore;
use crate::domain::{ChatSession, Turn};

use super::super::Container;

const HISTORY_COMMAND: &str = "/history";
const EXIT_COMMAND: &str = "/exit";

/// Terminal chat: one conversation per process run.
pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chat(&self) -> Result<String> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run(stdin, stdout).await
    }

    /// Drive a conversation from `input` lines, writing the exchange to
    /// `output`. Returns a one-line summary once input ends or `/exit` is read.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let session = ChatSession::new();
        let store: Arc<InMemorySessionStore> = Arc::new(InMemorySessionStore::new());
        let submit = self.container.submit_use_case(store.clone());
        let view = self.container.transcript_use_case(store.clone());
        info!("Terminal session {} started", session.id());

        output
            .write_all(
                format!(
                    "💬 Chatting with {}. {HISTORY_COMMAND} shows the conversation, \
{EXIT_COMMAND} quits.\n",
                    self.container.gateway_name()
                )
                .as_bytes(),
            )
            .await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let prompt = line.trim_end_matches('\r');
            match prompt.trim() {
                "" => continue,
                EXIT_COMMAND => break,
                HISTORY_COMMAND => {
                    let turns = view.execute().await;
                    output.write_all(render_turns(&turns).as_bytes()).await?;
                }
                _ => {
                    let spinner = thinking_spinner();
                    let outcome = submit.execute(prompt).await;
                    spinner.finish_and_clear();

                    let rendered = match outcome? {
                        TurnOutcome::Replied(turn) => render_turn(&turn),
                        TurnOutcome::Failed(e) => format!("Error: {e}\n"),
                    };
                    output.write_all(rendered.as_bytes()).await?;
                }
            }
            output.flush().await?;
        }

        let turns = store.len().await;
        info!("Terminal session {} ended with {} turns", session.id(), turns);
        Ok(format!("Conversation ended after {turns} turns."))
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn render_turn(turn: &Turn) -> String {
    format!("{} {}: {}\n", turn.role().avatar(), turn.role(), turn.content())
}

/// Plain-text rendering of a whole transcript.
pub fn render_turns(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "(no messages yet)\n".to_string();
    }
    turns.iter().map(render_turn).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::adapter::MockGateway;

    async fn run_with(gateway: MockGateway, input: &str) -> (String, String) {
        let container = Container::with_gateway(Arc::new(gateway));
        let controller = ChatController::new(&container);
        let mut output = Vec::new();
        let summary = controller
            .run(input.as_bytes(), &mut output)
            .await
            .unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_each_line_is_one_exchange() {
        let (summary, output) = run_with(MockGateway::fixed("OK"), "Hi\nHello\n").await;

        assert_eq!(summary, "Conversation ended after 4 turns.");
        assert_eq!(output.matches("assistant: OK").count(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_shown_and_chat_continues() {
        let (summary, output) = run_with(MockGateway::failing("quota"), "Hi\n/history\n").await;

        assert!(output.contains("Error: provider returned 503: quota"));
        assert!(output.contains("🧑 user: Hi"));
        assert_eq!(summary, "Conversation ended after 1 turns.");
    }

    #[tokio::test]
    async fn test_exit_stops_reading() {
        let (summary, _) = run_with(MockGateway::echo(), "one\n/exit\ntwo\n").await;
        assert_eq!(summary, "Conversation ended after 2 turns.");
    }

    #[test]
    fn test_render_turns_is_stable() {
        let turns = vec![Turn::user("Hi"), Turn::assistant("OK")];
        assert_eq!(render_turns(&turns), render_turns(&turns));
        assert_eq!(render_turns(&[]), "(no messages yet)\n");
    }
}
