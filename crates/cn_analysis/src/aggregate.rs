use cn_core::{Article, ClassifiedArticle, Sentiment};
use serde::Serialize;

use crate::sentiment::analyze_sentiment;
use crate::topics::classify_topics;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 50;
const TOP_TOPICS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    /// Case-insensitive substring filter against assigned topics.
    pub topic: Option<String>,
    /// Exact sentiment filter.
    pub sentiment: Option<Sentiment>,
    /// Bounds the returned article slice only; clamped to [`MAX_LIMIT`].
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SentimentBreakdown {
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub top_topics: Vec<TopicCount>,
    pub sentiment_breakdown: SentimentBreakdown,
    pub overall_sentiment: Sentiment,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregated {
    /// Truncated to the requested limit for display.
    pub articles: Vec<ClassifiedArticle>,
    /// Size of the full filtered set, independent of the display slice.
    pub total_count: usize,
    pub analysis: Analysis,
}

/// Attaches topics, sentiment and the 2-decimal rounded score.
pub fn classify_article(article: Article) -> ClassifiedArticle {
    let text = article.combined_text();
    let (sentiment, score) = analyze_sentiment(&text);
    ClassifiedArticle {
        topics: classify_topics(&text).into_iter().map(String::from).collect(),
        sentiment,
        sentiment_score: round2(score),
        article,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classifies, filters and summarizes a batch of articles.
///
/// All aggregate counts describe the full filtered set; only the returned
/// `articles` slice is truncated to the limit. Topic counts keep first-seen
/// order in an ordered accumulator so equal counts rank deterministically
/// under the stable sort.
pub fn aggregate(articles: Vec<Article>, options: &AggregateOptions) -> Aggregated {
    let mut classified: Vec<ClassifiedArticle> =
        articles.into_iter().map(classify_article).collect();

    if let Some(topic) = &options.topic {
        let needle = topic.to_lowercase();
        classified.retain(|a| a.topics.iter().any(|t| t.to_lowercase().contains(&needle)));
    }
    if let Some(sentiment) = options.sentiment {
        classified.retain(|a| a.sentiment == sentiment);
    }

    let mut topic_counts: Vec<TopicCount> = Vec::new();
    let mut breakdown = SentimentBreakdown::default();
    for article in &classified {
        for topic in &article.topics {
            match topic_counts.iter_mut().find(|tc| tc.topic == *topic) {
                Some(tc) => tc.count += 1,
                None => topic_counts.push(TopicCount {
                    topic: topic.clone(),
                    count: 1,
                }),
            }
        }
        match article.sentiment {
            Sentiment::Bullish => breakdown.bullish += 1,
            Sentiment::Bearish => breakdown.bearish += 1,
            Sentiment::Neutral => breakdown.neutral += 1,
        }
    }

    topic_counts.sort_by(|a, b| b.count.cmp(&a.count));
    topic_counts.truncate(TOP_TOPICS);

    // The neutral bucket is ignored here on purpose.
    let overall_sentiment = if breakdown.bullish > breakdown.bearish {
        Sentiment::Bullish
    } else if breakdown.bearish > breakdown.bullish {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    };

    let total_count = classified.len();
    let limit = options.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    classified.truncate(limit);

    Aggregated {
        articles: classified,
        total_count,
        analysis: Analysis {
            top_topics: topic_counts,
            sentiment_breakdown: breakdown,
            overall_sentiment,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(title: &str, description: &str) -> Article {
        Article {
            title: title.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            link: format!("https://example.com/{}", title.len()),
            pub_date: Utc::now(),
            source: "Example".to_string(),
            time_ago: "1h ago".to_string(),
        }
    }

    #[test]
    fn classify_attaches_rounded_score() {
        // surge + rally vs drop: 1/3 rounds to 0.33
        let classified = classify_article(article("Prices surge and rally after the drop", ""));
        assert_eq!(classified.sentiment, Sentiment::Bullish);
        assert_eq!(classified.sentiment_score, 0.33);
    }

    #[test]
    fn every_article_gets_topics() {
        let classified = classify_article(article("Nothing crypto about this", ""));
        assert_eq!(classified.topics, vec!["General"]);
    }

    #[test]
    fn counts_reflect_full_set_under_truncation() {
        let articles: Vec<Article> = (0..30)
            .map(|i| article(&format!("Bitcoin update number {}", i), ""))
            .collect();
        let result = aggregate(
            articles,
            &AggregateOptions {
                limit: Some(5),
                ..Default::default()
            },
        );
        assert_eq!(result.articles.len(), 5);
        assert_eq!(result.total_count, 30);
        let b = result.analysis.sentiment_breakdown;
        assert_eq!(b.bullish + b.bearish + b.neutral, 30);
    }

    #[test]
    fn limit_is_clamped_to_max() {
        let articles: Vec<Article> = (0..60)
            .map(|i| article(&format!("Bitcoin update number {}", i), ""))
            .collect();
        let result = aggregate(
            articles,
            &AggregateOptions {
                limit: Some(200),
                ..Default::default()
            },
        );
        assert_eq!(result.articles.len(), MAX_LIMIT);
        assert_eq!(result.total_count, 60);
    }

    #[test]
    fn topic_filter_is_substring_and_case_insensitive() {
        let articles = vec![
            article("Bitcoin rises", ""),
            article("Solana outage resolved", ""),
        ];
        let result = aggregate(
            articles,
            &AggregateOptions {
                topic: Some("bit".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(result.total_count, 1);
        assert!(result.articles[0].topics.contains(&"Bitcoin".to_string()));
    }

    #[test]
    fn topic_filter_is_idempotent() {
        let articles = vec![
            article("Bitcoin rises", ""),
            article("Solana outage resolved", ""),
            article("Nothing to see here", ""),
        ];
        let options = AggregateOptions {
            topic: Some("bitcoin".to_string()),
            ..Default::default()
        };
        let once = aggregate(articles.clone(), &options);
        let again = aggregate(
            once.articles.iter().map(|c| c.article.clone()).collect(),
            &options,
        );
        assert_eq!(once.total_count, again.total_count);
        assert_eq!(
            once.analysis.sentiment_breakdown.neutral,
            again.analysis.sentiment_breakdown.neutral
        );
    }

    #[test]
    fn sentiment_filter_is_exact() {
        let articles = vec![
            article("Prices surge and rally after the drop", ""),
            article("Exchange faces lawsuit and investigation", ""),
            article("Quiet day for markets", ""),
        ];
        let result = aggregate(
            articles,
            &AggregateOptions {
                sentiment: Some(Sentiment::Bearish),
                ..Default::default()
            },
        );
        assert_eq!(result.total_count, 1);
        assert_eq!(result.articles[0].sentiment, Sentiment::Bearish);
    }

    #[test]
    fn top_topics_bounded_and_sorted() {
        let mut articles = Vec::new();
        // 11 distinct topics via targeted keywords, Bitcoin seen most often
        let keywords = [
            "bitcoin", "ethereum", "defi", "nft", "lawsuit", "binance", "stablecoin", "solana",
            "arbitrum", "metaverse", "mining",
        ];
        for keyword in keywords {
            articles.push(article(&format!("News about {}", keyword), ""));
        }
        articles.push(article("More bitcoin coverage", ""));
        articles.push(article("Even more bitcoin coverage", ""));

        let result = aggregate(articles, &AggregateOptions::default());
        let top = &result.analysis.top_topics;
        assert!(top.len() <= 10);
        assert_eq!(top[0].topic, "Bitcoin");
        for pair in top.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn tie_break_follows_first_seen_order() {
        let articles = vec![
            article("News about solana", ""),
            article("News about dogecoin", ""),
        ];
        let result = aggregate(articles, &AggregateOptions::default());
        let top = &result.analysis.top_topics;
        assert_eq!(top[0].topic, "Layer 1");
        assert_eq!(top[1].topic, "Memecoins");
        assert_eq!(top[0].count, top[1].count);
    }

    #[test]
    fn overall_sentiment_tie_is_neutral() {
        let articles = vec![
            article("Prices surge and rally after the drop", ""),
            article("Exchange faces lawsuit and investigation", ""),
        ];
        let result = aggregate(articles, &AggregateOptions::default());
        let b = result.analysis.sentiment_breakdown;
        assert_eq!(b.bullish, 1);
        assert_eq!(b.bearish, 1);
        assert_eq!(result.analysis.overall_sentiment, Sentiment::Neutral);
    }

    #[test]
    fn aggregate_serializes_to_wire_shape() {
        let result = aggregate(
            vec![article("Prices surge and rally after the drop", "")],
            &AggregateOptions::default(),
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["totalCount"], 1);
        assert_eq!(value["analysis"]["overallSentiment"], "bullish");
        assert_eq!(value["analysis"]["sentimentBreakdown"]["bullish"], 1);
        assert_eq!(value["analysis"]["topTopics"][0]["topic"], "General");
        assert_eq!(value["articles"][0]["sentimentScore"], 0.33);
    }

    #[test]
    fn empty_filter_result_is_not_an_error() {
        let articles = vec![article("Bitcoin rises", "")];
        let result = aggregate(
            articles,
            &AggregateOptions {
                topic: Some("gaming".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(result.total_count, 0);
        assert!(result.articles.is_empty());
        assert!(result.analysis.top_topics.is_empty());
        assert_eq!(result.analysis.overall_sentiment, Sentiment::Neutral);
    }
}
