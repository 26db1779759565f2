use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cn_analysis::SentimentBreakdown;
use cn_core::{Article, ClassifiedArticle, Result, Sentiment};

pub mod memory;

pub use memory::MemoryArchive;

/// A classified article as kept by the archive, with its ingestion time and
/// any ticker symbols spotted in the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedArticle {
    #[serde(flatten)]
    pub article: ClassifiedArticle,
    pub archived_at: DateTime<Utc>,
    pub tickers: Vec<String>,
}

impl ArchivedArticle {
    /// Classifies a raw feed article and stamps it for the archive.
    pub fn from_article(article: Article) -> Self {
        let tickers = extract_tickers(&article.title);
        Self {
            article: cn_analysis::classify_article(article),
            archived_at: Utc::now(),
            tickers,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveQuery {
    /// Case-insensitive substring match against assigned topics.
    pub topic: Option<String>,
    pub sentiment: Option<Sentiment>,
    /// Exact source name.
    pub source: Option<String>,
    /// Recency window; `None` means the whole archive.
    pub hours: Option<u32>,
    pub offset: usize,
    pub limit: usize,
}

/// One page of archive results. `total_count` covers the whole filtered
/// set, not just this page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivePage {
    pub articles: Vec<ArchivedArticle>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStats {
    pub total_articles: usize,
    pub sources: Vec<SourceCount>,
    pub sentiment_breakdown: SentimentBreakdown,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerCount {
    pub ticker: String,
    pub count: usize,
}

/// One hourly bucket of archive activity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPoint {
    pub bucket: DateTime<Utc>,
    pub article_count: usize,
    pub average_sentiment: f64,
}

#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Store one classified article.
    async fn store(&self, article: &ArchivedArticle) -> Result<()>;

    /// Filtered, paginated view over the archive, newest first.
    async fn query(&self, query: &ArchiveQuery) -> Result<ArchivePage>;

    /// Whole-archive summary statistics.
    async fn stats(&self) -> Result<ArchiveStats>;

    /// Most-mentioned tickers within the given recency window.
    async fn trending_tickers(&self, hours: u32, limit: usize) -> Result<Vec<TickerCount>>;

    /// Hourly article-count/sentiment buckets within the window.
    async fn market_history(&self, hours: u32) -> Result<Vec<MarketPoint>>;
}

const KNOWN_TICKERS: &[&str] = &[
    "BTC", "ETH", "SOL", "XRP", "BNB", "ADA", "DOGE", "AVAX", "DOT", "LINK", "MATIC", "SHIB",
    "PEPE", "USDT", "USDC", "TON", "SUI", "APT",
];

/// Known ticker symbols present in `text`, first-seen order, each at most
/// once. Matches uppercase tokens only, with or without a `$` prefix.
pub fn extract_tickers(text: &str) -> Vec<String> {
    let mut tickers = Vec::new();
    for token in text.split(|c: char| !c.is_ascii_alphanumeric() && c != '$') {
        let symbol = token.strip_prefix('$').unwrap_or(token);
        if KNOWN_TICKERS.contains(&symbol) && !tickers.iter().any(|t| t == symbol) {
            tickers.push(symbol.to_string());
        }
    }
    tickers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_article_classifies_and_tags_tickers() {
        let article = Article {
            title: "BTC rally extends as $ETH gains".to_string(),
            description: None,
            link: "https://example.com/btc-eth".to_string(),
            pub_date: Utc::now(),
            source: "CoinDesk".to_string(),
            time_ago: "1h ago".to_string(),
        };
        let archived = ArchivedArticle::from_article(article);
        assert_eq!(archived.tickers, vec!["BTC", "ETH"]);
        assert!(archived.article.topics.contains(&"Bitcoin".to_string()));
        assert_eq!(archived.article.sentiment, Sentiment::Bullish);
    }

    #[test]
    fn extracts_known_tickers_once() {
        let tickers = extract_tickers("BTC and $ETH rally while BTC dominance dips");
        assert_eq!(tickers, vec!["BTC", "ETH"]);
    }

    #[test]
    fn ignores_lowercase_and_unknown_tokens() {
        assert!(extract_tickers("btc is not matched, nor is XYZ").is_empty());
    }
}
