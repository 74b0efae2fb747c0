//! Dispatch Host
//!
//! Glue between the transport and the core: receives transport-agnostic
//! envelopes one at a time, refreshes the session, runs the dispatcher, and
//! queues outbound sends on an unbounded channel. The transport drains the
//! queue; the host never waits on delivery.

use crate::config::BotConfig;
use crate::dispatch::{self, Dispatcher};
use crate::session::SharedStore;
use std::time::Instant;
use tokio::sync::mpsc;

/// One inbound message, already reduced to its text-bearing part by the
/// transport adapter. `text` is `None` when the payload had no extractable
/// text.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub sender: String,
    pub from_me: bool,
    pub text: Option<String>,
}

/// One queued reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: String,
    pub text: String,
}

pub struct Host {
    store: SharedStore,
    dispatcher: Dispatcher,
    operator_jid: String,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Host {
    /// Build the host and hand back the receiving end of the outbound queue
    /// for the transport to drain.
    pub fn new(cfg: &BotConfig, store: SharedStore) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let host = Self {
            store,
            dispatcher: Dispatcher::new(cfg.categories.clone(), cfg.web_url.clone()),
            operator_jid: cfg.operator_jid.clone(),
            outbound: tx,
        };
        (host, rx)
    }

    /// Process one inbound envelope. Messages from the bot's own account,
    /// status-broadcast traffic, and text-less payloads are dropped before
    /// any session is touched.
    pub async fn handle(&self, envelope: Envelope) {
        if envelope.from_me || envelope.sender == dispatch::STATUS_BROADCAST {
            return;
        }
        let text = match envelope.text.as_deref().map(dispatch::normalize) {
            Some(t) if !t.is_empty() => t,
            _ => return,
        };

        let preview: String = text.chars().take(20).collect();
        tracing::info!("{}: {}", dispatch::phone_of(&envelope.sender), preview);

        let outcome = {
            let mut store = self.store.lock().await;
            let session = store.get_or_create(&envelope.sender, Instant::now());
            self.dispatcher.dispatch(&envelope.sender, &text, session)
        };

        if let Some(reply) = outcome.reply {
            self.enqueue(&envelope.sender, reply);
        }
        if let Some(alert) = outcome.operator_alert {
            if self.operator_jid.is_empty() {
                tracing::warn!("Handoff requested but no operator_jid configured");
            } else {
                self.enqueue(&self.operator_jid, alert);
            }
        }
    }

    fn enqueue(&self, to: &str, text: String) {
        let queued = self.outbound.send(Outbound {
            to: to.to_string(),
            text,
        });
        if queued.is_err() {
            tracing::warn!("Outbound queue closed; dropping reply to {}", to);
        }
    }
}
