// src/push.rs
//! Real-time push of fresh category summaries to WebSocket subscribers.
//!
//! One `TrendEvent` per analyzed category goes onto a broadcast channel; each
//! socket forwards only the categories it subscribed to.

use axum::extract::ws::{Message, WebSocket};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::broadcast;

use crate::category::Category;
use crate::model::{CategorySummary, TrendSnapshot};

pub const TRENDS_UPDATE: &str = "trends-update";
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendEvent {
    pub event: &'static str,
    pub category: Category,
    pub trends: CategorySummary,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PushHub {
    tx: broadcast::Sender<TrendEvent>,
}

impl Default for PushHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PushHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrendEvent> {
        self.tx.subscribe()
    }

    /// Emit one event per category of `snapshot`. Returns the number of events.
    pub fn publish(&self, snapshot: &TrendSnapshot) -> usize {
        static ONCE: OnceCell<()> = OnceCell::new();
        ONCE.get_or_init(|| {
            describe_counter!("push_events_total", "trends-update events broadcast.");
        });

        let timestamp = Utc::now();
        for (category, summary) in snapshot {
            // no receivers is fine
            let _ = self.tx.send(TrendEvent {
                event: TRENDS_UPDATE,
                category: *category,
                trends: summary.clone(),
                timestamp,
            });
        }
        counter!("push_events_total").increment(snapshot.len() as u64);
        tracing::debug!(
            target: "push",
            events = snapshot.len(),
            listeners = self.tx.receiver_count(),
            "trends pushed"
        );
        snapshot.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Subscribe(String),
    Unsubscribe(String),
}

#[derive(Deserialize)]
struct CommandMsg {
    subscribe: Option<String>,
    unsubscribe: Option<String>,
}

/// `{"subscribe":"crypto"}`, `{"unsubscribe":"crypto"}` or a bare `crypto`.
pub fn parse_command(text: &str) -> Option<ClientCommand> {
    let text = text.trim();
    if text.starts_with('{') {
        let msg: CommandMsg = serde_json::from_str(text).ok()?;
        return match (msg.subscribe, msg.unsubscribe) {
            (Some(c), _) => Some(ClientCommand::Subscribe(c)),
            (None, Some(c)) => Some(ClientCommand::Unsubscribe(c)),
            (None, None) => None,
        };
    }
    let bare = text.trim_matches('"');
    (!bare.is_empty()).then(|| ClientCommand::Subscribe(bare.to_string()))
}

/// Drive one client socket until it closes.
pub async fn serve_socket(mut socket: WebSocket, hub: PushHub) {
    let mut rx = hub.subscribe();
    let mut subscribed: HashSet<Category> = HashSet::new();
    tracing::info!(target: "push", "client connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(Message::Text(t))) => t,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!(target: "push", error = ?e, "socket error");
                        break;
                    }
                };
                let Some(cmd) = parse_command(text.as_str()) else { continue };
                let (name, subscribe) = match &cmd {
                    ClientCommand::Subscribe(n) => (n.as_str(), true),
                    ClientCommand::Unsubscribe(n) => (n.as_str(), false),
                };
                match name.parse::<Category>() {
                    Ok(c) if subscribe => {
                        subscribed.insert(c);
                        tracing::info!(target: "push", category = %c, "client subscribed");
                    }
                    Ok(c) => {
                        subscribed.remove(&c);
                    }
                    Err(e) => {
                        let reply = serde_json::json!({ "error": e.to_string() }).to_string();
                        if socket.send(Message::Text(reply.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
            event = rx.recv() => {
                match event {
                    Ok(ev) if subscribed.contains(&ev.category) => {
                        let Ok(json) = serde_json::to_string(&ev) else { continue };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(target: "push", skipped = n, "slow client, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
    tracing::info!(target: "push", "client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_snapshot;

    #[test]
    fn commands() {
        assert_eq!(
            parse_command(r#"{"subscribe":"crypto"}"#),
            Some(ClientCommand::Subscribe("crypto".into()))
        );
        assert_eq!(
            parse_command(r#" {"unsubscribe":"news"} "#),
            Some(ClientCommand::Unsubscribe("news".into()))
        );
        assert_eq!(parse_command("gaming"), Some(ClientCommand::Subscribe("gaming".into())));
        assert_eq!(parse_command("\"gaming\""), Some(ClientCommand::Subscribe("gaming".into())));
        assert_eq!(parse_command("{not json"), None);
        assert_eq!(parse_command("   "), None);
    }

    #[tokio::test]
    async fn one_event_per_category() {
        let hub = PushHub::new();
        let mut rx = hub.subscribe();
        assert_eq!(hub.publish(&default_snapshot()), 6);

        let mut seen = Vec::new();
        for _ in 0..6 {
            let ev = rx.recv().await.unwrap();
            assert_eq!(ev.event, TRENDS_UPDATE);
            seen.push(ev.category);
        }
        assert_eq!(seen, Category::ALL.to_vec());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publish_without_listeners_is_fine() {
        assert_eq!(PushHub::new().publish(&default_snapshot()), 6);
    }

    #[test]
    fn event_wire_shape() {
        let ev = TrendEvent {
            event: TRENDS_UPDATE,
            category: Category::Crypto,
            trends: CategorySummary::zero(),
            timestamp: Utc::now(),
        };
        let v = serde_json::to_value(ev).unwrap();
        assert_eq!(v["event"], "trends-update");
        assert_eq!(v["category"], "crypto");
        assert_eq!(v["trends"]["sentiment"], "neutral");
    }
}
