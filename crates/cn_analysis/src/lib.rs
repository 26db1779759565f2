pub mod aggregate;
pub mod sentiment;
pub mod topics;

pub use aggregate::{
    aggregate, classify_article, AggregateOptions, Aggregated, Analysis, SentimentBreakdown,
    TopicCount, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use sentiment::analyze_sentiment;
pub use topics::{classify_topics, topic_names, GENERAL_TOPIC};

pub mod prelude {
    pub use crate::aggregate::{aggregate, AggregateOptions, Aggregated};
    pub use cn_core::{Article, ClassifiedArticle, Sentiment};
}
