//! douban-feed CLI
//!
//! Local execution entry point: one-shot fetch, HTTP server and slug helpers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use douban_feed::{
    config::load_config,
    error::Result,
    models::FeedSnapshot,
    pipeline::Pipeline,
    utils::{SlugMode, id_to_slug, index_from_slug_id},
};

/// douban-feed - Douban interests feed ingestion
#[derive(Parser, Debug)]
#[command(
    name = "douban-feed",
    version,
    about = "Fetch a Douban interests feed and cache its posters"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline once and write the grouped entries as JSON
    Fetch {
        /// Output file
        #[arg(short, long, default_value = "data/douban.json")]
        output: PathBuf,
    },

    /// Serve the grouped entries over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the slug for an identifier
    Slug {
        id: String,

        /// RAW, HASH or PINYIN (default: slug.mode from the config)
        #[arg(long)]
        mode: Option<String>,
    },

    /// Print the deterministic list index for an identifier
    Index { id: String, len: usize },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.config)?;
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Fetch { output } => {
            config.validate()?;
            let pipeline = Pipeline::from_config(config).await?;
            let snapshot = FeedSnapshot::new(pipeline.run().await?);

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&snapshot)?;
            std::fs::write(&output, json)?;

            log::info!(
                "Wrote {} entries to {}",
                snapshot.count,
                output.display()
            );
        }

        #[cfg(feature = "server")]
        Command::Serve { bind } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            config.validate()?;

            let pipeline = Pipeline::from_config(config).await?;
            douban_feed::handler::serve(pipeline).await?;
        }

        Command::Slug { id, mode } => {
            let slug = match mode {
                Some(mode) => id_to_slug(&id, mode.parse::<SlugMode>()?),
                None => config.slug.slug(&id),
            };
            println!("{}", slug);
        }

        Command::Index { id, len } => {
            println!("{}", index_from_slug_id(&id, len)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (feed {})", config.feed.url());
        }
    }

    Ok(())
}
