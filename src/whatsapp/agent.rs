//! WhatsApp Agent
//!
//! Bot construction and event wiring. The agent owns nothing conversational:
//! inbound messages go to the dispatch host, queued replies come back out
//! through the client once connected.

use super::handler;
use crate::host::{Host, Outbound};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use wacore::types::events::Event;
use wacore_binary::jid::Jid;
use waproto::whatsapp as wa;
use whatsapp_rust::bot::Bot;
use whatsapp_rust::client::Client;
use whatsapp_rust::store::SqliteStore;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

/// WhatsApp agent bridging the client to the dispatch host.
pub struct WhatsAppAgent {
    host: Host,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    auth_db_path: PathBuf,
}

impl WhatsAppAgent {
    pub fn new(
        host: Host,
        outbound: mpsc::UnboundedReceiver<Outbound>,
        auth_db_path: PathBuf,
    ) -> Self {
        Self {
            host,
            outbound,
            auth_db_path,
        }
    }

    /// Start as a background task. Returns JoinHandle.
    /// If already paired (auth db exists), reconnects silently.
    /// If not paired, the pairing QR is printed to the terminal.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Some(parent) = self.auth_db_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            let backend = match SqliteStore::new(self.auth_db_path.to_string_lossy().as_ref()).await
            {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!("WhatsApp: failed to open auth store: {}", e);
                    return;
                }
            };

            let host = Arc::new(self.host);
            // the drain task starts once connected; until then replies queue up
            let outbound = Arc::new(Mutex::new(Some(self.outbound)));

            let bot_result = Bot::builder()
                .with_backend(backend)
                .with_transport_factory(TokioWebSocketTransportFactory::new())
                .with_http_client(UreqHttpClient::new())
                .on_event(move |event, client| {
                    let host = host.clone();
                    let outbound = outbound.clone();
                    async move {
                        match event {
                            Event::PairingQrCode { ref code, .. } => {
                                print_pairing_qr(code);
                            }
                            Event::Connected(_) => {
                                tracing::info!("WhatsApp: connected");
                                if let Some(rx) = outbound.lock().await.take() {
                                    tokio::spawn(drain_outbound(rx, client.clone()));
                                }
                            }
                            Event::PairSuccess(_) => {
                                tracing::info!("WhatsApp: pairing successful");
                            }
                            Event::Message(msg, info) => {
                                handler::handle_message(*msg, info, &host).await;
                            }
                            Event::LoggedOut(_) => {
                                tracing::warn!("WhatsApp: logged out");
                            }
                            Event::Disconnected(_) => {
                                tracing::warn!("WhatsApp: disconnected (client will reconnect)");
                            }
                            _ => {}
                        }
                    }
                })
                .build()
                .await;

            let mut bot = match bot_result {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("WhatsApp: failed to build bot: {}", e);
                    return;
                }
            };

            match bot.run().await {
                Ok(handle) => {
                    if let Err(e) = handle.await {
                        tracing::error!("WhatsApp agent task error: {:?}", e);
                    }
                }
                Err(e) => {
                    tracing::error!("WhatsApp agent error: {}", e);
                }
            }
        })
    }
}

/// Drain queued replies through the connected client. A failed send is
/// logged and dropped; retry belongs to the transport, not here.
async fn drain_outbound(mut rx: mpsc::UnboundedReceiver<Outbound>, client: Arc<Client>) {
    while let Some(out) = rx.recv().await {
        let jid = match Jid::from_str(&out.to) {
            Ok(jid) => jid,
            Err(e) => {
                tracing::warn!("WhatsApp: bad recipient JID {}: {:?}", out.to, e);
                continue;
            }
        };
        let message = wa::Message {
            conversation: Some(out.text),
            ..Default::default()
        };
        if let Err(e) = client.send_message(jid, message).await {
            tracing::warn!("WhatsApp: send failed: {:?}", e);
        }
    }
}

fn print_pairing_qr(code: &str) {
    match qrcode::QrCode::new(code.as_bytes()) {
        Ok(qr) => {
            let rendered = qr
                .render::<qrcode::render::unicode::Dense1x2>()
                .quiet_zone(true)
                .build();
            println!("\n================ ESCANEA EL QR ================");
            println!("{rendered}");
            println!("===============================================\n");
        }
        Err(e) => {
            tracing::warn!("WhatsApp: could not render pairing QR: {}", e);
            tracing::info!("WhatsApp pairing code: {}", code);
        }
    }
}
