//! Prometheus metrics for settlement activity.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    pub registry: Registry,
    pub games_created: IntCounter,
    pub games_resolved: IntCounter,
    pub games_refunded: IntCounter,
    pub player_wins: IntCounter,
    pub house_balance: IntGauge,
    pub house_fees: IntGauge,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let games_created = IntCounter::new(
            "dicehouse_games_created_total",
            "Wagers escrowed since startup",
        )
        .expect("valid metric definition");
        let games_resolved = IntCounter::new(
            "dicehouse_games_resolved_total",
            "Wagers settled via VRF resolution",
        )
        .expect("valid metric definition");
        let games_refunded = IntCounter::new(
            "dicehouse_games_refunded_total",
            "Wagers settled via timeout refund",
        )
        .expect("valid metric definition");
        let player_wins = IntCounter::new(
            "dicehouse_player_wins_total",
            "Resolved wagers won by the player",
        )
        .expect("valid metric definition");
        let house_balance = IntGauge::new(
            "dicehouse_house_balance",
            "Available house reserve in smallest units",
        )
        .expect("valid metric definition");
        let house_fees = IntGauge::new(
            "dicehouse_house_fees",
            "Accumulated withdrawable fees in smallest units",
        )
        .expect("valid metric definition");

        for collector in [&games_created, &games_resolved, &games_refunded, &player_wins] {
            registry
                .register(Box::new(collector.clone()))
                .expect("unique metric registration");
        }
        for gauge in [&house_balance, &house_fees] {
            registry
                .register(Box::new(gauge.clone()))
                .expect("unique metric registration");
        }

        Self {
            registry,
            games_created,
            games_resolved,
            games_refunded,
            player_wins,
            house_balance,
            house_fees,
        }
    }

    /// Update the house gauges after a committed transaction.
    pub fn set_house(&self, balance: u64, fees: u64) {
        self.house_balance.set(balance as i64);
        self.house_fees.set(fees as i64);
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn encode_text(&self) -> String {
        let encoder = TextEncoder::new();
        let mut out = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut out) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8(out).unwrap_or_default()
    }
}

static METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Process-wide metrics handle.
pub fn global() -> &'static Metrics {
    &METRICS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_gauges_encode() {
        // Private instance: the global registry is shared across tests.
        let metrics = Metrics::new();
        metrics.games_created.inc();
        metrics.set_house(10_000, 20);

        let text = metrics.encode_text();
        assert!(text.contains("dicehouse_games_created_total"));
        assert!(text.contains("dicehouse_house_balance 10000"));
        assert!(text.contains("dicehouse_house_fees 20"));
    }
}
