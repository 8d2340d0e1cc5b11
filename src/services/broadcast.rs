//! Fan-out of computed strategies to subscribers.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::Result;
use crate::types::BreakoutStrategy;

/// Destination that pushes strategies to live consumers.
pub trait StrategyBroadcaster: Send + Sync {
    /// Publish a strategy; returns the number of receivers reached.
    fn publish(&self, strategy: &BreakoutStrategy) -> Result<usize>;
}

/// Message sent to subscribers.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum HubMessage<'a> {
    Strategy(&'a BreakoutStrategy),
}

/// A subscriber's rooms and channel.
pub struct Subscriber {
    /// Subscribed symbols (upper-case).
    pub symbols: HashSet<String>,
    /// Receives every symbol.
    pub all: bool,
    pub tx: mpsc::UnboundedSender<String>,
}

/// Routes serialized strategies to subscribers of their symbol.
pub struct BroadcastHub {
    next_id: AtomicU64,
    subscribers: DashMap<u64, Subscriber>,
    /// Symbol -> subscriber ids.
    rooms: DashMap<String, HashSet<u64>>,
}

impl BroadcastHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            subscribers: DashMap::new(),
            rooms: DashMap::new(),
        })
    }

    /// Register a subscriber with no rooms.
    pub fn register(&self, tx: mpsc::UnboundedSender<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(
            id,
            Subscriber {
                symbols: HashSet::new(),
                all: false,
                tx,
            },
        );
        id
    }

    /// Register a subscriber receiving every symbol.
    pub fn register_all(&self, tx: mpsc::UnboundedSender<String>) -> u64 {
        let id = self.register(tx);
        if let Some(mut sub) = self.subscribers.get_mut(&id) {
            sub.all = true;
        }
        id
    }

    /// Remove a subscriber from the hub and all rooms.
    pub fn unregister(&self, id: u64) {
        if let Some((_, subscriber)) = self.subscribers.remove(&id) {
            for symbol in subscriber.symbols {
                self.leave_room(&symbol, id);
            }
        }
    }

    /// Remove `id` from a room, dropping the room once it is empty.
    fn leave_room(&self, symbol: &str, id: u64) {
        if let Some(mut room) = self.rooms.get_mut(symbol) {
            room.remove(&id);
        }
        self.rooms.remove_if(symbol, |_, room| room.is_empty());
    }

    /// Join rooms; returns the newly joined symbols.
    pub fn subscribe(&self, id: u64, symbols: &[String]) -> Vec<String> {
        let mut joined = Vec::new();

        if let Some(mut subscriber) = self.subscribers.get_mut(&id) {
            for symbol in symbols {
                let symbol = symbol.to_uppercase();
                if subscriber.symbols.insert(symbol.clone()) {
                    joined.push(symbol.clone());
                    self.rooms.entry(symbol).or_default().insert(id);
                }
            }
        }

        joined
    }

    /// Leave rooms; returns the symbols left.
    pub fn unsubscribe(&self, id: u64, symbols: &[String]) -> Vec<String> {
        let mut left = Vec::new();

        if let Some(mut subscriber) = self.subscribers.get_mut(&id) {
            for symbol in symbols {
                let symbol = symbol.to_uppercase();
                if subscriber.symbols.remove(&symbol) {
                    self.leave_room(&symbol, id);
                    left.push(symbol);
                }
            }
        }

        left
    }

    /// Subscribers that should receive updates for `symbol`.
    fn recipients(&self, symbol: &str) -> Vec<(u64, mpsc::UnboundedSender<String>)> {
        let mut ids: HashSet<u64> = self
            .rooms
            .get(&symbol.to_uppercase())
            .map(|room| room.iter().copied().collect())
            .unwrap_or_default();
        ids.extend(self.subscribers.iter().filter(|s| s.all).map(|s| *s.key()));

        ids.into_iter()
            .filter_map(|id| self.subscribers.get(&id).map(|s| (id, s.tx.clone())))
            .collect()
    }

    /// Send `message` to every subscriber of `symbol`, dropping closed ones.
    pub fn broadcast(&self, symbol: &str, message: &str) -> usize {
        let mut delivered = 0;
        for (id, tx) in self.recipients(symbol) {
            if tx.send(message.to_string()).is_ok() {
                delivered += 1;
            } else {
                debug!(subscriber = id, "dropping closed subscriber");
                self.unregister(id);
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Symbols with at least one subscriber.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl StrategyBroadcaster for BroadcastHub {
    fn publish(&self, strategy: &BreakoutStrategy) -> Result<usize> {
        let message = serde_json::to_string(&HubMessage::Strategy(strategy))?;
        Ok(self.broadcast(&strategy.symbol, &message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::analyze;

    #[test]
    fn test_publish_routes_by_symbol() {
        let hub = BroadcastHub::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let (tx_all, mut rx_all) = mpsc::unbounded_channel();

        let a = hub.register(tx_a);
        let b = hub.register(tx_b);
        hub.register_all(tx_all);
        assert_eq!(hub.subscribe(a, &["aapl".to_string()]), vec!["AAPL".to_string()]);
        hub.subscribe(b, &["MSFT".to_string()]);

        let delivered = hub.publish(&analyze("AAPL", &[], 150.0)).unwrap();
        assert_eq!(delivered, 2);

        let message = rx_a.try_recv().unwrap();
        let value: serde_json::Value = serde_json::from_str(&message).unwrap();
        assert_eq!(value["type"], "strategy");
        assert_eq!(value["data"]["symbol"], "AAPL");
        assert!(rx_all.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_and_closed_subscribers() {
        let hub = BroadcastHub::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = hub.register(tx);
        hub.subscribe(id, &["TSLA".to_string()]);
        assert_eq!(hub.unsubscribe(id, &["tsla".to_string()]), vec!["TSLA".to_string()]);
        assert_eq!(hub.broadcast("TSLA", "x"), 0);

        hub.subscribe(id, &["TSLA".to_string()]);
        drop(rx);
        assert_eq!(hub.broadcast("TSLA", "x"), 0);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.room_count(), 0);
    }

    #[test]
    fn test_empty_rooms_are_dropped() {
        let hub = BroadcastHub::new();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let a = hub.register(tx_a);
        let b = hub.register(tx_b);

        hub.subscribe(a, &["AAPL".to_string(), "MSFT".to_string()]);
        hub.subscribe(b, &["AAPL".to_string()]);
        assert_eq!(hub.room_count(), 2);

        hub.unsubscribe(a, &["MSFT".to_string()]);
        assert_eq!(hub.room_count(), 1);

        hub.unregister(a);
        assert_eq!(hub.room_count(), 1);
        hub.unregister(b);
        assert_eq!(hub.room_count(), 0);
    }
}
