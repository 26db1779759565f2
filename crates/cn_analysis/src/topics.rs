use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

/// Fallback label for articles matching no topic pattern.
pub const GENERAL_TOPIC: &str = "General";

/// Ordered topic table. Order is significant: it determines the ordering of
/// an article's `topics`, and the first-seen ordering used for aggregate
/// tie-breaks. All matching entries are assigned, not just the first.
///
/// "ordinals" is shared between Bitcoin and NFTs, and "rollup" between
/// Ethereum and Layer 2, so overlapping vocabulary yields multiple topics.
/// Bare "eth" is word-bounded so it never fires inside "ether…".
const TOPIC_PATTERNS: [(&str, &str); 15] = [
    ("Bitcoin", r"bitcoin|\bbtc\b|satoshi|halving|lightning network|ordinals"),
    ("Ethereum", r"ethereum|\beth\b|vitalik|\berc-?20\b|rollup"),
    (
        "DeFi",
        r"\bdefi\b|decentralized finance|liquidity pool|yield farming|staking|\bdex\b|lending protocol|\btvl\b",
    ),
    ("NFTs", r"\bnfts?\b|non-fungible|opensea|digital collectible|ordinals"),
    (
        "Regulation",
        r"regulat|\bsec\b|\bcftc\b|lawsuit|congress|legislation|compliance|crackdown",
    ),
    (
        "Exchange",
        r"exchange|binance|coinbase|kraken|\bokx\b|bybit|listing|delisting",
    ),
    ("Stablecoins", r"stablecoin|\busdt\b|\busdc\b|tether|\bdai\b|depeg|\bpeg\b"),
    (
        "Layer 1",
        r"layer.?1\b|solana|cardano|avalanche|polkadot|cosmos|\bnear\b|\bsui\b|aptos",
    ),
    (
        "Layer 2",
        r"layer.?2\b|rollup|arbitrum|optimism|zksync|starknet|polygon|\bbase\b",
    ),
    (
        "AI & Crypto",
        r"\bai\b|artificial intelligence|machine learning|\bllm\b|chatbot|ai agent",
    ),
    (
        "Gaming",
        r"gaming|play.?to.?earn\b|\bp2e\b|metaverse|game studio|in-game",
    ),
    (
        "Security",
        r"hack|exploit|vulnerability|breach|phishing|drained|stolen funds",
    ),
    ("Mining", r"mining|miner|hashrate|hash rate|proof.?of.?work|\basic\b"),
    (
        "Institutions",
        r"institutional|blackrock|fidelity|grayscale|\betf\b|custody|pension|hedge fund",
    ),
    (
        "Memecoins",
        r"memecoin|meme coin|dogecoin|\bdoge\b|shiba|\bpepe\b|\bbonk\b|\bwif\b",
    ),
];

lazy_static! {
    static ref TOPIC_TABLE: Vec<(&'static str, Regex)> = TOPIC_PATTERNS
        .iter()
        .map(|(name, pattern)| {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("static topic pattern");
            (*name, re)
        })
        .collect();
}

/// Assigns every topic whose pattern matches `text`, in table order.
/// Always returns a non-empty list: `["General"]` when nothing matched.
pub fn classify_topics(text: &str) -> Vec<&'static str> {
    let mut topics: Vec<&'static str> = TOPIC_TABLE
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(name, _)| *name)
        .collect();
    if topics.is_empty() {
        topics.push(GENERAL_TOPIC);
    }
    topics
}

/// All 15 topic names in table order (the `availableTopics` payload).
pub fn topic_names() -> Vec<&'static str> {
    TOPIC_PATTERNS.iter().map(|(name, _)| *name).collect()
}
