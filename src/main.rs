use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogscribe::cli::{Cli, Commands};
use blogscribe::config::{Config, Credentials};
use blogscribe::generate::OpenAiGenerator;
use blogscribe::http::{self, build_router, AppState};
use blogscribe::pipeline::BlogPipeline;
use blogscribe::resolver::YtDlpResolver;
use blogscribe::store::{self, PostRepository};
use blogscribe::transcribe::AssemblyAiTranscriber;
use blogscribe::utils;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogscribe=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().await?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(addr) = bind {
                config.server.bind_addr = addr;
            }

            // Check for required external dependencies (non-fatal in Docker)
            let missing_deps = utils::check_dependencies(&config.media).await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            let credentials = Credentials::from_env()?;

            fs_err::create_dir_all(&config.media.dir)?;

            let pool = store::connect_and_migrate(&config.database).await?;
            let posts = PostRepository::new(pool);

            let pipeline = BlogPipeline::new(
                Arc::new(YtDlpResolver::new(&config.media)),
                Arc::new(AssemblyAiTranscriber::new(credentials.assemblyai_api_key)?),
                Arc::new(OpenAiGenerator::new(credentials.openai_api_key)?),
                Arc::new(posts.clone()),
            );

            let state = AppState {
                pipeline: Arc::new(pipeline),
                posts: Arc::new(posts),
            };

            let app = build_router(state);
            http::server::start_server(&config.server.bind_addr, app).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit the config file to change settings:");
                println!("  (config.yaml in the working directory, or the user config dir)");
                config.display();
            }
        }
    }

    Ok(())
}
