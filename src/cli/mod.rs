use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the browser chat interface
    Serve {
        #[arg(short, long, default_value = "8501")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,

        /// Page title shown above the conversation
        #[arg(long, default_value = "Asistente Virtual")]
        title: String,

        /// Seconds of inactivity after which a browser session is discarded
        #[arg(long, default_value = "3600")]
        session_ttl: u64,
    },

    /// Chat in the terminal; the conversation lasts until the process exits
    Chat,

    /// Send a single prompt and print the reply
    Ask { prompt: String },
}
