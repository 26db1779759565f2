use cn_core::Sentiment;

/// Markers counted toward the bullish side. Presence test is substring
/// containment over the lowercased text, so a marker also fires inside a
/// larger word ("pumping" counts "pump").
const BULLISH_MARKERS: [&str; 17] = [
    "surge",
    "soar",
    "rally",
    "bullish",
    "gains",
    "ath",
    "all-time high",
    "pump",
    "moon",
    "breakthrough",
    "adoption",
    "approval",
    "launch",
    "partnership",
    "growth",
    "record",
    "milestone",
];

/// Markers counted toward the bearish side. "hack" and "exploit" also live
/// in the Security topic pattern; topic and sentiment passes are
/// independent and may both fire.
const BEARISH_MARKERS: [&str; 18] = [
    "crash",
    "plunge",
    "bearish",
    "dump",
    "decline",
    "drop",
    "low",
    "sell-off",
    "fear",
    "hack",
    "exploit",
    "lawsuit",
    "ban",
    "delay",
    "reject",
    "investigation",
    "fraud",
    "collapse",
];

const THRESHOLD: f64 = 0.3;

/// Scores `text` by distinct marker presence. Each distinct marker counts at
/// most once regardless of repetition. Returns the unrounded normalized
/// score in [-1, 1]; rounding to 2 decimals is the aggregator's job.
pub fn analyze_sentiment(text: &str) -> (Sentiment, f64) {
    let lowered = text.to_lowercase();
    let bullish = BULLISH_MARKERS
        .iter()
        .filter(|&&marker| lowered.contains(marker))
        .count();
    let bearish = BEARISH_MARKERS
        .iter()
        .filter(|&&marker| lowered.contains(marker))
        .count();

    if bullish == 0 && bearish == 0 {
        return (Sentiment::Neutral, 0.0);
    }

    let score = (bullish as f64 - bearish as f64) / (bullish as f64 + bearish as f64);
    let sentiment = if score > THRESHOLD {
        Sentiment::Bullish
    } else if score < -THRESHOLD {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    };
    (sentiment, score)
}
