//! Built-in Feed Definitions
//!
//! The demo feed set served by the binary: the macro indicators with their
//! refresh cadences and TTLs, backed by synthetic sample-data origins.
//! Real network clients are external collaborators and plug in through the
//! same [`OriginFn`] shape.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Utc};
use serde_json::{json, Value};

use crate::cache::FeedParams;
use crate::orchestrator::OriginFn;
use crate::registry::{FeedRegistry, FeedSpec};

/// TTL for slowly-revised statistical series (daily release cycle).
const STATS_TTL: Duration = Duration::from_secs(86_400);

/// TTL for market-derived series (intraday movement).
const MARKET_TTL: Duration = Duration::from_secs(3_600);

/// One feed row: name, upstream series id, observation frequency,
/// default period count, TTL, and a (base, amplitude) pair shaping the
/// synthetic values.
struct FeedRow {
    name: &'static str,
    series_id: &'static str,
    frequency: &'static str,
    default_periods: u32,
    ttl: Duration,
    base: f64,
    amplitude: f64,
}

const FEED_TABLE: &[FeedRow] = &[
    FeedRow { name: "claims", series_id: "ICSA", frequency: "W", default_periods: 52, ttl: STATS_TTL, base: 220_000.0, amplitude: 18_000.0 },
    FeedRow { name: "pce", series_id: "PCE", frequency: "M", default_periods: 24, ttl: STATS_TTL, base: 18_000.0, amplitude: 450.0 },
    FeedRow { name: "core_cpi", series_id: "CPILFESL", frequency: "M", default_periods: 24, ttl: STATS_TTL, base: 310.0, amplitude: 4.0 },
    FeedRow { name: "hours_worked", series_id: "AWHAETP", frequency: "M", default_periods: 24, ttl: STATS_TTL, base: 34.4, amplitude: 0.3 },
    FeedRow { name: "new_orders", series_id: "NEWORDER", frequency: "M", default_periods: 24, ttl: STATS_TTL, base: 74_000.0, amplitude: 2_500.0 },
    FeedRow { name: "yield_curve", series_id: "T10Y2Y", frequency: "D", default_periods: 36, ttl: STATS_TTL, base: -0.4, amplitude: 0.6 },
    FeedRow { name: "pmi", series_id: "PMI_PROXY", frequency: "M", default_periods: 36, ttl: STATS_TTL, base: 50.0, amplitude: 4.5 },
    FeedRow { name: "usd_liquidity", series_id: "USD_LIQUIDITY", frequency: "W", default_periods: 120, ttl: STATS_TTL, base: 6_200.0, amplitude: 280.0 },
    FeedRow { name: "copper_gold_ratio", series_id: "HG_GC_RATIO", frequency: "D", default_periods: 365, ttl: MARKET_TTL, base: 0.19, amplitude: 0.02 },
];

// == Demo Registry ==
/// Builds the registry of built-in feeds with synthetic origins.
pub fn demo_registry(fetch_timeout: Duration) -> FeedRegistry {
    let mut registry = FeedRegistry::new();
    for row in FEED_TABLE {
        let mut default_params = FeedParams::new();
        default_params.insert("periods".to_string(), row.default_periods.to_string());

        registry.register(FeedSpec {
            name: row.name.to_string(),
            ttl: row.ttl,
            timeout: fetch_timeout,
            default_params,
            origin: sample_origin(row),
        });
    }
    registry
}

/// Origin function producing a deterministic synthetic series shaped like
/// the upstream payload.
fn sample_origin(row: &'static FeedRow) -> OriginFn {
    Arc::new(move |params: FeedParams| {
        Box::pin(async move {
            let periods = params
                .get("periods")
                .and_then(|p| p.parse::<u32>().ok())
                .unwrap_or(row.default_periods)
                .clamp(1, 2_000);
            Ok(sample_series(row, periods))
        })
    })
}

fn sample_series(row: &FeedRow, periods: u32) -> Value {
    let step_days: u64 = match row.frequency {
        "D" => 1,
        "W" => 7,
        _ => 30,
    };
    let today = Utc::now().date_naive();

    let observations: Vec<Value> = (0..periods)
        .rev()
        .map(|i| {
            let date = today
                .checked_sub_days(Days::new(u64::from(i) * step_days))
                .unwrap_or(today);
            let phase = f64::from(periods - 1 - i) * 0.35;
            let value = row.base + row.amplitude * phase.sin();
            json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "value": (value * 10_000.0).round() / 10_000.0,
            })
        })
        .collect();

    json!({
        "series_id": row.series_id,
        "frequency": row.frequency,
        "observations": observations,
    })
}
