use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A raw feed article as fetched from an RSS/Atom source. Everything except
/// `title` and `description` is opaque to the classifier and copied through
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub source: String,
    pub time_ago: String,
}

impl Article {
    /// The text the classifier sees: title and description joined by a
    /// single space.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.description.as_deref().unwrap_or(""))
    }
}

/// An article with topic and sentiment labels attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedArticle {
    #[serde(flatten)]
    pub article: Article,
    /// Never empty; falls back to `["General"]` when nothing matched.
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    /// In [-1, 1], rounded to 2 decimal places.
    pub sentiment_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bullish" => Ok(Sentiment::Bullish),
            "bearish" => Ok(Sentiment::Bearish),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(Error::InvalidInput(format!(
                "unknown sentiment: {} (expected bullish, bearish or neutral)",
                other
            ))),
        }
    }
}
