use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use scraper::Html;
use tracing::{debug, warn};

use cn_core::{Article, Error, Result};

use crate::sources::{defi_sources, FeedSource, FEED_SOURCES};

const FETCH_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "cn-news/0.1";

/// Fetches and parses the curated syndication feeds.
pub struct FeedClient {
    http: reqwest::Client,
    sources: Vec<FeedSource>,
}

impl FeedClient {
    pub fn new() -> Self {
        Self::with_sources(FEED_SOURCES.to_vec())
    }

    pub fn with_sources(sources: Vec<FeedSource>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, sources }
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    /// Latest articles across all configured feeds: fetched concurrently,
    /// deduplicated by normalized title, newest first, truncated to `count`.
    ///
    /// Individual feed failures are logged and skipped; only a total
    /// failure (no feed could be fetched) is an error.
    pub async fn latest_news(&self, count: usize) -> Result<Vec<Article>> {
        self.fetch_from(&self.sources, count).await
    }

    /// Same pipeline over the DeFi-tagged sources only.
    pub async fn defi_news(&self, limit: usize) -> Result<Vec<Article>> {
        let sources = defi_sources();
        self.fetch_from(&sources, limit).await
    }

    async fn fetch_from(&self, sources: &[FeedSource], limit: usize) -> Result<Vec<Article>> {
        let fetches = sources.iter().map(|source| self.fetch_source(source));
        let results = join_all(fetches).await;

        let mut articles = Vec::new();
        let mut ok_feeds = 0usize;
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(mut items) => {
                    debug!("fetched {} items from {}", items.len(), source.name);
                    ok_feeds += 1;
                    articles.append(&mut items);
                }
                Err(e) => warn!("failed to fetch feed {}: {}", source.name, e),
            }
        }
        if ok_feeds == 0 && !sources.is_empty() {
            return Err(Error::Feed("all feeds failed to fetch".to_string()));
        }

        articles.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        dedup_by_title(&mut articles);
        articles.truncate(limit);
        Ok(articles)
    }

    async fn fetch_source(&self, source: &FeedSource) -> Result<Vec<Article>> {
        let response = self.http.get(source.url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Feed(format!(
                "{} returned HTTP {}",
                source.url,
                response.status()
            )));
        }
        let body = response.bytes().await?;

        // RSS first, then Atom; most crypto outlets serve RSS 2.0.
        if let Ok(channel) = rss::Channel::read_from(&body[..]) {
            return Ok(parse_rss(&channel, source));
        }
        if let Ok(feed) = atom_syndication::Feed::read_from(&body[..]) {
            return Ok(parse_atom(&feed, source));
        }
        Err(Error::Feed(format!("unparsable feed: {}", source.url)))
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_rss(channel: &rss::Channel, source: &FeedSource) -> Vec<Article> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim().to_string();
            let link = item.link()?.to_string();
            let pub_date = item
                .pub_date()
                .and_then(parse_feed_date)
                .unwrap_or_else(Utc::now);
            let description = item
                .description()
                .map(strip_html)
                .filter(|d| !d.is_empty());
            Some(build_article(title, description, link, pub_date, source))
        })
        .collect()
}

fn parse_atom(feed: &atom_syndication::Feed, source: &FeedSource) -> Vec<Article> {
    feed.entries()
        .iter()
        .filter_map(|entry| {
            let title = entry.title().trim().to_string();
            let link = entry.links().first()?.href().to_string();
            let pub_date = entry
                .published()
                .copied()
                .unwrap_or_else(|| *entry.updated())
                .with_timezone(&Utc);
            let description = entry
                .summary()
                .map(|s| strip_html(s.as_str()))
                .filter(|d| !d.is_empty());
            Some(build_article(title, description, link, pub_date, source))
        })
        .collect()
}

fn build_article(
    title: String,
    description: Option<String>,
    link: String,
    pub_date: DateTime<Utc>,
    source: &FeedSource,
) -> Article {
    Article {
        title,
        description,
        link,
        time_ago: time_ago(pub_date, Utc::now()),
        pub_date,
        source: source.name.to_string(),
    }
}

fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Human-friendly age of an article relative to `now`.
pub fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now - published;
    if age < Duration::minutes(1) {
        "just now".to_string()
    } else if age < Duration::hours(1) {
        format!("{}m ago", age.num_minutes())
    } else if age < Duration::days(1) {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}d ago", age.num_days())
    }
}

/// Text content of an HTML fragment, entities decoded, whitespace collapsed.
fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops later articles whose normalized title was already seen. The input
/// is sorted newest-first, so the newest copy of a syndicated story wins.
fn dedup_by_title(articles: &mut Vec<Article>) {
    let mut seen = std::collections::HashSet::new();
    articles.retain(|article| seen.insert(normalize_title(&article.title)));
}

fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com</link>
    <description>Test</description>
    <item>
      <title>Bitcoin rallies past resistance</title>
      <link>https://example.com/btc</link>
      <description>&lt;p&gt;Markets &amp;amp; traders react&lt;/p&gt;</description>
      <pubDate>Tue, 25 Aug 2026 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>No link item</title>
    </item>
  </channel>
</rss>"#;

    const ATOM_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Feed</title>
  <id>urn:test</id>
  <updated>2026-08-25T09:00:00Z</updated>
  <entry>
    <title>Ethereum upgrade ships</title>
    <id>urn:test:1</id>
    <link href="https://example.com/eth"/>
    <updated>2026-08-25T08:00:00Z</updated>
    <summary>Validators upgraded</summary>
  </entry>
</feed>"#;

    fn test_source() -> FeedSource {
        FeedSource {
            name: "Test",
            url: "https://example.com/feed",
            categories: &["news"],
        }
    }

    #[test]
    fn parses_rss_items_and_skips_broken_ones() {
        let channel = rss::Channel::read_from(RSS_FIXTURE.as_bytes()).unwrap();
        let articles = parse_rss(&channel, &test_source());
        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.title, "Bitcoin rallies past resistance");
        assert_eq!(article.link, "https://example.com/btc");
        assert_eq!(article.source, "Test");
        assert_eq!(article.description.as_deref(), Some("Markets & traders react"));
    }

    #[test]
    fn parses_atom_entries() {
        let feed = atom_syndication::Feed::read_from(ATOM_FIXTURE.as_bytes()).unwrap();
        let articles = parse_atom(&feed, &test_source());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Ethereum upgrade ships");
        assert_eq!(articles[0].description.as_deref(), Some("Validators upgraded"));
    }

    #[test]
    fn strip_html_flattens_markup() {
        assert_eq!(strip_html("<p>Hello <b>world</b>!</p>"), "Hello world!");
        assert_eq!(strip_html("plain text"), "plain text");
        assert_eq!(strip_html("a &amp; b"), "a & b");
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let channel = rss::Channel::read_from(RSS_FIXTURE.as_bytes()).unwrap();
        let article = parse_rss(&channel, &test_source()).remove(0);
        let mut copy = article.clone();
        copy.title = "Bitcoin Rallies Past Resistance!".to_string();
        copy.link = "https://other.example.com/btc".to_string();
        let mut articles = vec![article, copy];
        dedup_by_title(&mut articles);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "https://example.com/btc");
    }

    #[test]
    fn normalize_title_ignores_case_and_punctuation() {
        assert_eq!(
            normalize_title("Bitcoin, Rallies: Past   Resistance!"),
            normalize_title("bitcoin rallies past resistance")
        );
    }
}
