use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blogscribe",
    about = "Blogscribe - Turn video links into blog posts using speech-to-text and LLM generation",
    version,
    long_about = "An HTTP service that resolves a submitted video link, extracts and transcribes \
its audio via AssemblyAI, generates a blog post from the transcript via OpenAI, and stores the \
result per user."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override the configured bind address
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Inspect configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
