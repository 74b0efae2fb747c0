//! Turibot
//!
//! Scripted WhatsApp auto-responder for Wanderlust Turismo. The core is
//! transport-agnostic: a per-user session store with an idle-eviction sweep,
//! and a menu dispatcher that maps inbound text to scripted replies. The
//! WhatsApp transport itself lives behind the `whatsapp` feature.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod host;
pub mod server;
pub mod session;

#[cfg(feature = "whatsapp")]
pub mod whatsapp;
