//! Message formatting utilities for client display.

use notecollab_server::infrastructure::dto::websocket::{
    CursorUpdatePayload, DocPayload, InitPayload, ParticipantDto, UserLeftPayload,
};

use crate::domain::LocalDocument;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    fn participant_label(participant: &ParticipantDto) -> String {
        if participant.name.is_empty() {
            participant.id.clone()
        } else {
            format!("{} ({})", participant.name, participant.id)
        }
    }

    /// Format the `init` snapshot: who is here and the current document
    pub fn format_init(init: &InitPayload) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!(
            "You are {}, color {}\n",
            Self::participant_label(&init.self_),
            init.self_.color
        ));
        output.push_str("Participants:\n");

        for participant in &init.users {
            let me_suffix = if participant.id == init.self_.id {
                " (me)"
            } else {
                ""
            };
            output.push_str(&format!(
                "{}{} - since {}\n",
                Self::participant_label(participant),
                me_suffix,
                participant.created_at
            ));
        }

        output.push_str(&format!("Document (version {}):\n", init.version));
        output.push_str(&Self::document_body(&init.content));
        output.push_str(&format!("{}\n", RULE));
        output
    }

    pub fn format_user_joined(participant: &ParticipantDto) -> String {
        format!("\n+ {} joined\n", Self::participant_label(participant))
    }

    pub fn format_user_updated(participant: &ParticipantDto) -> String {
        format!("\n~ {} updated\n", Self::participant_label(participant))
    }

    pub fn format_user_left(payload: &UserLeftPayload) -> String {
        format!("\n- {} left\n", payload.id)
    }

    pub fn format_cursor(payload: &CursorUpdatePayload) -> String {
        format!(
            "\n@ {} cursor at {} (+{})\n",
            payload.id, payload.cursor.index, payload.cursor.length
        )
    }

    /// Format a `doc_state`; `previous_version` is the local version before applying it
    pub fn format_doc_state(payload: &DocPayload, previous_version: i64) -> String {
        let note = if payload.version == previous_version {
            " (your update was rejected, local copy refreshed)"
        } else {
            ""
        };
        format!(
            "\n\n------------------------------------------------------------\n\
             Document version {}{}:\n\
             {}\
             ------------------------------------------------------------\n",
            payload.version,
            note,
            Self::document_body(&payload.content)
        )
    }

    /// Format the local copy (for `/show`)
    pub fn format_document(document: &LocalDocument) -> String {
        format!(
            "\nLocal document (version {}):\n{}",
            document.version,
            Self::document_body(&document.content)
        )
    }

    pub fn format_pong() -> String {
        "\n← pong\n".to_string()
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    fn document_body(content: &str) -> String {
        if content.is_empty() {
            "(empty)\n".to_string()
        } else {
            format!("{}\n", content)
        }
    }
}
