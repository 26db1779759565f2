use clap::Parser;
use std::sync::Arc;
use tracing::info;

use cn_analysis::{aggregate, AggregateOptions};
use cn_archive::MemoryArchive;
use cn_core::{Result, Sentiment};
use cn_feeds::FeedClient;
use cn_web::{create_app, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: String,
    },
    /// Fetch the latest articles and print their titles.
    Fetch {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Restrict to DeFi-tagged sources.
        #[arg(long)]
        defi: bool,
    },
    /// Fetch, classify and print the aggregate analysis as JSON.
    Analyze {
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        sentiment: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

const ANALYZE_FETCH_COUNT: usize = 100;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let state = AppState {
                feeds: FeedClient::new(),
                archive: Arc::new(MemoryArchive::new()),
            };
            let app = create_app(state).await;
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("🌐 Listening on {}", bind);
            axum::serve(listener, app).await?;
        }
        Commands::Fetch { limit, defi } => {
            let client = FeedClient::new();
            let articles = if defi {
                client.defi_news(limit).await?
            } else {
                client.latest_news(limit).await?
            };
            info!("📰 Fetched {} articles", articles.len());
            for article in articles {
                println!("{} [{}] {}", article.time_ago, article.source, article.title);
            }
        }
        Commands::Analyze {
            topic,
            sentiment,
            limit,
        } => {
            let sentiment = sentiment
                .as_deref()
                .map(str::parse::<Sentiment>)
                .transpose()?;
            let client = FeedClient::new();
            let articles = client.latest_news(ANALYZE_FETCH_COUNT).await?;
            let result = aggregate(
                articles,
                &AggregateOptions {
                    topic,
                    sentiment,
                    limit: Some(limit),
                },
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
