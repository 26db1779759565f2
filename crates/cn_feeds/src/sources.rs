use serde::Serialize;

/// A curated syndication feed. Categories tag what the feed covers so
/// category-scoped fetches (e.g. DeFi) can select a subset.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSource {
    pub name: &'static str,
    pub url: &'static str,
    pub categories: &'static [&'static str],
}

pub const FEED_SOURCES: &[FeedSource] = &[
    FeedSource {
        name: "CoinDesk",
        url: "https://www.coindesk.com/arc/outboundfeeds/rss/",
        categories: &["news", "markets"],
    },
    FeedSource {
        name: "Cointelegraph",
        url: "https://cointelegraph.com/rss",
        categories: &["news", "altcoins"],
    },
    FeedSource {
        name: "Decrypt",
        url: "https://decrypt.co/feed",
        categories: &["news", "culture"],
    },
    FeedSource {
        name: "The Block",
        url: "https://www.theblock.co/rss.xml",
        categories: &["news", "research"],
    },
    FeedSource {
        name: "Bitcoin Magazine",
        url: "https://bitcoinmagazine.com/feed",
        categories: &["bitcoin"],
    },
    FeedSource {
        name: "The Defiant",
        url: "https://thedefiant.io/api/feed",
        categories: &["defi"],
    },
    FeedSource {
        name: "Bankless",
        url: "https://www.bankless.com/rss/feed",
        categories: &["defi", "ethereum"],
    },
];

/// The subset of sources tagged with the "defi" category.
pub fn defi_sources() -> Vec<FeedSource> {
    FEED_SOURCES
        .iter()
        .filter(|source| source.categories.contains(&"defi"))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curated_list_is_not_empty() {
        assert!(!FEED_SOURCES.is_empty());
        assert!(FEED_SOURCES.iter().any(|f| f.name == "CoinDesk"));
    }

    #[test]
    fn defi_subset_only_has_defi_sources() {
        let defi = defi_sources();
        assert!(!defi.is_empty());
        assert!(defi.iter().all(|f| f.categories.contains(&"defi")));
        assert!(defi.len() < FEED_SOURCES.len());
    }
}
