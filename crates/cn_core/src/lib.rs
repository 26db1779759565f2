pub mod error;
pub mod types;

pub use error::Error;
pub use types::{Article, ClassifiedArticle, Sentiment};
pub type Result<T> = std::result::Result<T, Error>;
