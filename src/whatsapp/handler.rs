//! WhatsApp Message Handler
//!
//! Reduces an inbound payload to its text-bearing part and forwards it to
//! the dispatch host as a transport-agnostic envelope.

use crate::host::{Envelope, Host};
use wacore::types::message::MessageInfo;
use waproto::whatsapp as wa;

/// First present wins: plain text, extended text, image caption.
pub(crate) fn extract_text(message: &wa::Message) -> Option<String> {
    message
        .conversation
        .clone()
        .or_else(|| {
            message
                .extended_text_message
                .as_ref()
                .and_then(|m| m.text.clone())
        })
        .or_else(|| message.image_message.as_ref().and_then(|m| m.caption.clone()))
}

pub(crate) async fn handle_message(message: wa::Message, info: MessageInfo, host: &Host) {
    let envelope = Envelope {
        sender: info.source.chat.to_string(),
        from_me: info.source.is_from_me,
        text: extract_text(&message),
    };
    host.handle(envelope).await;
}
