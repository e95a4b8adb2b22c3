//! Typed observability events.
//!
//! Events are the off-chain trigger surface: the oracle watches for
//! `game_created` to know which seeds need proofs. Each event is logged as
//! structured JSON and retained in a bounded in-memory feed for the API.

use crate::game::Selection;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::RwLock;
use uuid::Uuid;

const DEFAULT_FEED_CAPACITY: usize = 1_024;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A wager was escrowed; the oracle should produce proofs for `seeds`.
    GameCreated {
        game_id: Uuid,
        player: String,
        /// Combined escrow (player wager + house match).
        stake: u64,
        /// Hex-encoded seeds, in resolution order.
        seeds: [String; 2],
        user_selection: Selection,
        /// Creation time in milliseconds.
        timestamp: u64,
    },
    /// The expected VRF public key changed.
    VrfKeyRotated { public_key: String },
    /// Treasury or wager policy changed.
    HouseConfigUpdated {
        treasury: String,
        fee_bp: u64,
        min_stake: u64,
        max_stake: u64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

/// Bounded, append-only event feed.
pub struct EventFeed {
    buf: RwLock<VecDeque<EventRecord>>,
    capacity: usize,
}

impl EventFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: RwLock::new(VecDeque::with_capacity(capacity.min(64))),
            capacity: capacity.max(1),
        }
    }

    /// Log the event and append it to the feed, evicting the oldest entry
    /// when full.
    pub fn record(&self, event: Event) {
        let record = EventRecord {
            at: Utc::now(),
            event,
        };

        match serde_json::to_string(&record) {
            Ok(json) => tracing::info!(target: "dicehouse::events", %json, "event emitted"),
            Err(e) => tracing::warn!(target: "dicehouse::events", error = %e, "unserializable event"),
        }

        let mut buf = self.buf.write().unwrap();
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(record);
    }

    /// Most recent events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<EventRecord> {
        let buf = self.buf.read().unwrap();
        buf.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buf.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_rotated(tag: u8) -> Event {
        Event::VrfKeyRotated {
            public_key: hex::encode([tag; 32]),
        }
    }

    #[test]
    fn test_feed_returns_newest_first() {
        let feed = EventFeed::new();
        feed.record(key_rotated(1));
        feed.record(key_rotated(2));

        let recent = feed.recent(10);
        assert_eq!(recent.len(), 2);
        match &recent[0].event {
            Event::VrfKeyRotated { public_key } => assert_eq!(public_key, &hex::encode([2u8; 32])),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_feed_evicts_oldest_at_capacity() {
        let feed = EventFeed::with_capacity(2);
        feed.record(key_rotated(1));
        feed.record(key_rotated(2));
        feed.record(key_rotated(3));

        assert_eq!(feed.len(), 2);
        let recent = feed.recent(10);
        match &recent[1].event {
            Event::VrfKeyRotated { public_key } => assert_eq!(public_key, &hex::encode([2u8; 32])),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_game_created_serializes_with_tag() {
        let feed = EventFeed::new();
        feed.record(Event::GameCreated {
            game_id: Uuid::nil(),
            player: "p".to_string(),
            stake: 1_000,
            seeds: ["aa".to_string(), "bb".to_string()],
            user_selection: Selection::Even,
            timestamp: 5,
        });

        let json = serde_json::to_value(&feed.recent(1)[0]).unwrap();
        assert_eq!(json["type"], "game_created");
        assert_eq!(json["user_selection"], "even");
        assert_eq!(json["stake"], 1_000);
    }
}
