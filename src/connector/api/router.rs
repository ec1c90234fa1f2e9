use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, ChatController};

pub struct Router<'a> {
    ask_controller: AskController<'a>,
    chat_controller: ChatController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            ask_controller: AskController::new(container),
            chat_controller: ChatController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Ask { prompt } => self.ask_controller.ask(prompt).await,
            Commands::Chat => self.chat_controller.chat().await,
            Commands::Serve { .. } => unreachable!("serve command is handled separately in main"),
        }
    }
}
