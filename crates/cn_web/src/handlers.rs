use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tracing::warn;

use cn_analysis::{aggregate, topic_names, AggregateOptions, Aggregated, DEFAULT_LIMIT, MAX_LIMIT};
use cn_archive::{
    ArchivePage, ArchiveQuery, ArchiveStats, ArchiveStore, ArchivedArticle, MarketPoint,
    TickerCount,
};
use cn_core::{Article, Sentiment};
use cn_feeds::FeedSource;

use crate::{ApiError, AppState};

/// How many articles the analysis endpoint pulls from the feeds before
/// filtering; the display slice is bounded separately by `limit`.
const ANALYSIS_FETCH_COUNT: usize = 100;

const DEFAULT_WINDOW_HOURS: u32 = 24;
const DEFAULT_TRENDING_LIMIT: usize = 10;

/// `limit` is typed: malformed values are rejected by the extractor with a
/// 400 instead of being silently coerced. Well-formed values are clamped.
fn clamp_limit(limit: Option<u32>) -> usize {
    limit.map(|l| l as usize).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

/// Every successfully fetched batch feeds the archive, so the archive
/// endpoints accumulate history as the news endpoints are used. A failed
/// store is logged and does not fail the request.
async fn archive_articles(archive: &dyn ArchiveStore, articles: &[Article]) {
    for article in articles {
        let archived = ArchivedArticle::from_article(article.clone());
        if let Err(e) = archive.store(&archived).await {
            warn!("failed to archive {}: {}", archived.article.article.link, e);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub articles: Vec<cn_core::Article>,
    pub total_count: usize,
    pub fetched_at: DateTime<Utc>,
}

pub async fn latest_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsParams>,
) -> Result<Json<NewsResponse>, ApiError> {
    let articles = state.feeds.latest_news(clamp_limit(params.limit)).await?;
    archive_articles(state.archive.as_ref(), &articles).await;
    Ok(Json(NewsResponse {
        total_count: articles.len(),
        articles,
        fetched_at: Utc::now(),
    }))
}

pub async fn defi_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsParams>,
) -> Result<Json<NewsResponse>, ApiError> {
    let articles = state.feeds.defi_news(clamp_limit(params.limit)).await?;
    archive_articles(state.archive.as_ref(), &articles).await;
    Ok(Json(NewsResponse {
        total_count: articles.len(),
        articles,
        fetched_at: Utc::now(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesResponse {
    pub sources: Vec<FeedSource>,
}

pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<SourcesResponse> {
    Json(SourcesResponse {
        sources: state.feeds.sources().to_vec(),
    })
}

#[derive(Debug, Deserialize)]
pub struct AnalysisParams {
    pub limit: Option<u32>,
    pub topic: Option<String>,
    pub sentiment: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub aggregated: Aggregated,
    pub available_topics: Vec<&'static str>,
    pub fetched_at: DateTime<Utc>,
}

pub async fn news_analysis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalysisParams>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let sentiment = parse_sentiment(params.sentiment.as_deref())?;
    let articles = state.feeds.latest_news(ANALYSIS_FETCH_COUNT).await?;
    archive_articles(state.archive.as_ref(), &articles).await;
    let options = AggregateOptions {
        topic: params.topic,
        sentiment,
        limit: Some(clamp_limit(params.limit)),
    };
    Ok(Json(AnalysisResponse {
        aggregated: aggregate(articles, &options),
        available_topics: topic_names(),
        fetched_at: Utc::now(),
    }))
}

fn parse_sentiment(raw: Option<&str>) -> Result<Option<Sentiment>, ApiError> {
    raw.map(str::parse::<Sentiment>)
        .transpose()
        .map_err(ApiError::from)
}

#[derive(Debug, Deserialize)]
pub struct ArchiveParams {
    pub topic: Option<String>,
    pub sentiment: Option<String>,
    pub source: Option<String>,
    pub hours: Option<u32>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn query_archive(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArchiveParams>,
) -> Result<Json<ArchivePage>, ApiError> {
    let query = ArchiveQuery {
        topic: params.topic,
        sentiment: parse_sentiment(params.sentiment.as_deref())?,
        source: params.source,
        hours: params.hours,
        offset: params.offset.unwrap_or(0) as usize,
        limit: clamp_limit(params.limit),
    };
    Ok(Json(state.archive.query(&query).await?))
}

pub async fn archive_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ArchiveStats>, ApiError> {
    Ok(Json(state.archive.stats().await?))
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub hours: Option<u32>,
    pub limit: Option<u32>,
}

fn clamp_trending_limit(limit: Option<u32>) -> usize {
    limit
        .map(|l| l as usize)
        .unwrap_or(DEFAULT_TRENDING_LIMIT)
        .min(MAX_LIMIT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub tickers: Vec<TickerCount>,
}

pub async fn trending_tickers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<TrendingResponse>, ApiError> {
    let hours = params.hours.unwrap_or(DEFAULT_WINDOW_HOURS);
    let limit = clamp_trending_limit(params.limit);
    Ok(Json(TrendingResponse {
        tickers: state.archive.trending_tickers(hours, limit).await?,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MarketParams {
    pub hours: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketResponse {
    pub points: Vec<MarketPoint>,
}

pub async fn market_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MarketParams>,
) -> Result<Json<MarketResponse>, ApiError> {
    let hours = params.hours.unwrap_or(DEFAULT_WINDOW_HOURS);
    Ok(Json(MarketResponse {
        points: state.archive.market_history(hours).await?,
    }))
}
