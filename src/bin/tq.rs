//! tq — transient-query CLI
//!
//! Runs cached queries against a JSON post fixture. Each run starts with an
//! empty in-memory store, so use `--repeat` to watch a key move from live
//! to cached to throttled.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use transient_query::{PostCollection, QueryConfig, QueryOptions, TransientQuery};

/// transient-query CLI
#[derive(Parser)]
#[command(name = "tq")]
#[command(version = transient_query::PKG_VERSION)]
#[command(about = "Throttled transient cache for post queries")]
struct Args {
    /// JSON file holding an array of post records
    #[arg(short, long, env = "TQ_POSTS")]
    posts: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a query through the cache
    Query {
        /// Query options as a JSON object (or omit to read from stdin)
        options: Option<String>,
        /// Bypass the cache and the request counter
        #[arg(short, long)]
        force: bool,
        /// Expiration in seconds
        #[arg(short, long)]
        expiration: Option<u64>,
        /// Run the same query this many times
        #[arg(short = 'n', long, default_value_t = 1)]
        repeat: u32,
    },

    /// Print the digest and store keys for a set of options
    Keys {
        /// Query options as a JSON object (or omit to read from stdin)
        options: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = QueryConfig::load(args.config.as_deref())?;
    let posts = PostCollection::load(&args.posts).await?;
    info!(
        version = transient_query::version_string(),
        posts = posts.len(),
        "tq starting"
    );

    let accessor = TransientQuery::builder()
        .executor(Arc::new(posts))
        .config(config)
        .build()?;

    match args.command {
        Command::Query {
            options,
            force,
            expiration,
            repeat,
        } => {
            let mut options = parse_options(options)?;
            if force {
                options = options.force(true);
            }
            if let Some(secs) = expiration {
                options = options.expiration(Duration::from_secs(secs));
            }
            for _ in 0..repeat {
                let response = accessor.query(options.clone()).await?;
                println!("{}", serde_json::to_string(&response)?);
            }
        }

        Command::Keys { options } => {
            let keys = accessor.keys_for(&parse_options(options)?)?;
            println!("digest: {}", keys.digest);
            println!("cache:  {}", keys.cache);
            println!("limit:  {}", keys.limit);
        }
    }

    Ok(())
}

/// Options come from the argument, else from piped stdin, else are empty.
fn parse_options(arg: Option<String>) -> Result<QueryOptions, Box<dyn std::error::Error>> {
    let text = match arg {
        Some(text) => text,
        None if !io::stdin().is_terminal() => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
        None => String::new(),
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(QueryOptions::new());
    }
    Ok(QueryOptions::from_value(serde_json::from_str(text)?)?)
}
