use crate::binance::fetcher::{ResilientFetcher, Transport};
use crate::binance::types::FearGreedResponse;
use crate::model::snapshot::{GlobalSentiment, SentimentClass};

pub const NEUTRAL_FEAR_GREED: f64 = 50.0;

/// Maps the reference asset's 24h change to a 0-100 momentum score.
pub fn momentum_score(reference_change_pct: f64) -> f64 {
    (50.0 + reference_change_pct * 10.0).clamp(0.0, 100.0)
}

/// Thresholds are checked greed-first: ≥75, ≥60, then ≤25, ≤40.
pub fn classify(score: f64) -> SentimentClass {
    if score >= 75.0 {
        SentimentClass::ExtremeGreed
    } else if score >= 60.0 {
        SentimentClass::Greed
    } else if score <= 25.0 {
        SentimentClass::ExtremeFear
    } else if score <= 40.0 {
        SentimentClass::Fear
    } else {
        SentimentClass::Neutral
    }
}

/// Equal-weight blend of the fear/greed index and reference momentum.
pub fn compose(fear_greed: f64, reference_change_pct: f64) -> GlobalSentiment {
    let composite = 0.5 * fear_greed.clamp(0.0, 100.0) + 0.5 * momentum_score(reference_change_pct);
    GlobalSentiment {
        value: composite.round() as u8,
        classification: classify(composite),
    }
}

/// Reads the fear/greed feed once, cache-busted with the current time.
/// Any failure yields the neutral 50.
pub async fn fetch_fear_greed<T: Transport>(fetcher: &ResilientFetcher<T>, feed_url: &str) -> f64 {
    let separator = if feed_url.contains('?') { '&' } else { '?' };
    let url = format!(
        "{}{}t={}",
        feed_url,
        separator,
        chrono::Utc::now().timestamp_millis()
    );

    let body = match fetcher.fetch_once(&url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(
                error = %format!("{:#}", e),
                "Sentiment feed unavailable, using neutral"
            );
            return NEUTRAL_FEAR_GREED;
        }
    };
    match serde_json::from_value::<FearGreedResponse>(body) {
        Ok(resp) => resp
            .data
            .first()
            .map(|entry| entry.value)
            .filter(|v| v.is_finite())
            .unwrap_or(NEUTRAL_FEAR_GREED),
        Err(e) => {
            tracing::warn!(error = %e, "Sentiment feed payload malformed, using neutral");
            NEUTRAL_FEAR_GREED
        }
    }
}
