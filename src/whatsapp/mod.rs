//! WhatsApp Integration
//!
//! Runs a WhatsApp Web client, feeding inbound messages to the dispatch host
//! and draining the outbound queue back through the client. Connection
//! lifecycle, auth persistence, and reconnects belong to `whatsapp-rust`.

mod agent;
mod handler;

pub use agent::WhatsAppAgent;
