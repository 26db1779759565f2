use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use cn_analysis::SentimentBreakdown;
use cn_core::{Result, Sentiment};

use crate::{
    ArchivePage, ArchiveQuery, ArchiveStats, ArchiveStore, ArchivedArticle, MarketPoint,
    SourceCount, TickerCount,
};

/// In-memory archive backend, used by the server by default and by tests.
pub struct MemoryArchive {
    articles: Arc<RwLock<Vec<ArchivedArticle>>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self {
            articles: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for MemoryArchive {
    fn default() -> Self {
        Self::new()
    }
}

fn window_start(hours: u32) -> DateTime<Utc> {
    Utc::now() - Duration::hours(i64::from(hours))
}

fn matches(article: &ArchivedArticle, query: &ArchiveQuery) -> bool {
    if let Some(topic) = &query.topic {
        let needle = topic.to_lowercase();
        if !article
            .article
            .topics
            .iter()
            .any(|t| t.to_lowercase().contains(&needle))
        {
            return false;
        }
    }
    if let Some(sentiment) = query.sentiment {
        if article.article.sentiment != sentiment {
            return false;
        }
    }
    if let Some(source) = &query.source {
        if article.article.article.source != *source {
            return false;
        }
    }
    if let Some(hours) = query.hours {
        if article.archived_at < window_start(hours) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ArchiveStore for MemoryArchive {
    async fn store(&self, article: &ArchivedArticle) -> Result<()> {
        let mut articles = self.articles.write().await;
        // Re-ingesting the same link replaces the stored copy.
        if let Some(existing) = articles
            .iter_mut()
            .find(|a| a.article.article.link == article.article.article.link)
        {
            *existing = article.clone();
        } else {
            articles.push(article.clone());
        }
        Ok(())
    }

    async fn query(&self, query: &ArchiveQuery) -> Result<ArchivePage> {
        let articles = self.articles.read().await;
        let mut matching: Vec<ArchivedArticle> = articles
            .iter()
            .filter(|a| matches(a, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));

        let total_count = matching.len();
        let page = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        Ok(ArchivePage {
            articles: page,
            total_count,
        })
    }

    async fn stats(&self) -> Result<ArchiveStats> {
        let articles = self.articles.read().await;

        let mut sources: Vec<SourceCount> = Vec::new();
        let mut breakdown = SentimentBreakdown::default();
        for archived in articles.iter() {
            let source = &archived.article.article.source;
            match sources.iter_mut().find(|sc| sc.source == *source) {
                Some(sc) => sc.count += 1,
                None => sources.push(SourceCount {
                    source: source.clone(),
                    count: 1,
                }),
            }
            match archived.article.sentiment {
                Sentiment::Bullish => breakdown.bullish += 1,
                Sentiment::Bearish => breakdown.bearish += 1,
                Sentiment::Neutral => breakdown.neutral += 1,
            }
        }
        sources.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(ArchiveStats {
            total_articles: articles.len(),
            sources,
            sentiment_breakdown: breakdown,
            oldest: articles.iter().map(|a| a.archived_at).min(),
            newest: articles.iter().map(|a| a.archived_at).max(),
        })
    }

    async fn trending_tickers(&self, hours: u32, limit: usize) -> Result<Vec<TickerCount>> {
        let articles = self.articles.read().await;
        let start = window_start(hours);

        let mut counts: Vec<TickerCount> = Vec::new();
        for archived in articles.iter().filter(|a| a.archived_at >= start) {
            for ticker in &archived.tickers {
                match counts.iter_mut().find(|tc| tc.ticker == *ticker) {
                    Some(tc) => tc.count += 1,
                    None => counts.push(TickerCount {
                        ticker: ticker.clone(),
                        count: 1,
                    }),
                }
            }
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(limit);
        Ok(counts)
    }

    async fn market_history(&self, hours: u32) -> Result<Vec<MarketPoint>> {
        let articles = self.articles.read().await;
        let start = window_start(hours);

        let mut buckets: Vec<(DateTime<Utc>, usize, f64)> = Vec::new();
        for archived in articles.iter().filter(|a| a.archived_at >= start) {
            let bucket = archived
                .archived_at
                .duration_trunc(Duration::hours(1))
                .unwrap_or(archived.archived_at);
            match buckets.iter_mut().find(|(b, _, _)| *b == bucket) {
                Some((_, count, score_sum)) => {
                    *count += 1;
                    *score_sum += archived.article.sentiment_score;
                }
                None => buckets.push((bucket, 1, archived.article.sentiment_score)),
            }
        }
        buckets.sort_by_key(|(bucket, _, _)| *bucket);

        Ok(buckets
            .into_iter()
            .map(|(bucket, article_count, score_sum)| MarketPoint {
                bucket,
                article_count,
                average_sentiment: score_sum / article_count as f64,
            })
            .collect())
    }
}
