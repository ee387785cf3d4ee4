//! Negotiation export.
//!
//! A structured snapshot of one negotiation plus renderers for the
//! formats users actually ask for: json for tooling, csv for
//! spreadsheets, txt for pasting, html for sharing.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Currency, DomainError, ErrorCode, NegotiationId, Timestamp};
use crate::domain::negotiation::{
    Message, MessageKind, MessageSender, Negotiation, NegotiationStatus,
};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
    Txt,
    Html,
}

/// One timeline entry in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    pub sender: MessageSender,
    pub kind: MessageKind,
    pub branch: String,
    pub content: String,
    pub offer_amount: Option<f64>,
    pub created_at: Timestamp,
}

/// Pricing summary in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPricing {
    pub initial_offer: f64,
    pub current_offer: f64,
    pub base_price: f64,
    pub currency: Currency,
}

/// Structured dump of one negotiation.
///
/// The seller's floor price is deliberately absent: exports may end up
/// in front of buyers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationSnapshot {
    pub negotiation_id: NegotiationId,
    pub product_title: String,
    pub status: NegotiationStatus,
    pub pricing: SnapshotPricing,
    pub rounds: u32,
    pub max_rounds: u32,
    pub branches: Vec<String>,
    /// Full timeline across all branches, in append order.
    pub messages: Vec<SnapshotMessage>,
    pub created_at: Timestamp,
    pub exported_at: Timestamp,
}

impl NegotiationSnapshot {
    /// Captures a negotiation into an exportable snapshot.
    pub fn capture(negotiation: &Negotiation) -> Self {
        let mut branches: Vec<String> = negotiation
            .branches()
            .keys()
            .map(|b| b.to_string())
            .collect();
        branches.sort();

        let pricing = negotiation.pricing();
        Self {
            negotiation_id: negotiation.id(),
            product_title: negotiation.product_title().to_string(),
            status: negotiation.status(),
            pricing: SnapshotPricing {
                initial_offer: pricing.initial_offer(),
                current_offer: pricing.current_offer(),
                base_price: pricing.base_price(),
                currency: pricing.currency(),
            },
            rounds: negotiation.rounds(),
            max_rounds: negotiation.max_rounds(),
            branches,
            messages: negotiation.messages().iter().map(snapshot_message).collect(),
            created_at: negotiation.created_at(),
            exported_at: Timestamp::now(),
        }
    }

    /// Renders the snapshot in the requested format.
    pub fn render(&self, format: ExportFormat) -> Result<String, DomainError> {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => Ok(self.to_csv()),
            ExportFormat::Txt => Ok(self.to_txt()),
            ExportFormat::Html => Ok(self.to_html()),
        }
    }

    fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("snapshot serialization failed: {}", e),
            )
        })
    }

    fn to_csv(&self) -> String {
        let mut out = String::from("created_at,sender,kind,branch,offer_amount,content\n");
        for m in &self.messages {
            let amount = m
                .offer_amount
                .map(|a| format!("{:.2}", a))
                .unwrap_or_default();
            out.push_str(&format!(
                "{},{:?},{:?},{},{},{}\n",
                m.created_at,
                m.sender,
                m.kind,
                csv_escape(&m.branch),
                amount,
                csv_escape(&m.content),
            ));
        }
        out
    }

    fn to_txt(&self) -> String {
        let mut out = format!(
            "Negotiation for \"{}\" ({:?})\nRounds: {}/{}  Offer: {:.2} {} (list {:.2})\n\n",
            self.product_title,
            self.status,
            self.rounds,
            self.max_rounds,
            self.pricing.current_offer,
            self.pricing.currency.code(),
            self.pricing.base_price,
        );
        for m in &self.messages {
            let offer = m
                .offer_amount
                .map(|a| format!(" ({:.2})", a))
                .unwrap_or_default();
            out.push_str(&format!(
                "[{}] {:?}{}: {}\n",
                m.created_at, m.sender, offer, m.content
            ));
        }
        out
    }

    fn to_html(&self) -> String {
        let mut rows = String::new();
        for m in &self.messages {
            let offer = m
                .offer_amount
                .map(|a| format!("{:.2}", a))
                .unwrap_or_default();
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{:?}</td><td>{}</td><td>{}</td></tr>\n",
                m.created_at,
                m.sender,
                offer,
                html_escape(&m.content),
            ));
        }
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body>\n<h1>{title}</h1>\n\
             <p>Status: {status:?} &middot; Rounds {rounds}/{max_rounds} &middot; \
             Offer {offer:.2} {currency}</p>\n\
             <table>\n<tr><th>Time</th><th>Sender</th><th>Offer</th><th>Message</th></tr>\n\
             {rows}</table>\n</body></html>\n",
            title = html_escape(&self.product_title),
            status = self.status,
            rounds = self.rounds,
            max_rounds = self.max_rounds,
            offer = self.pricing.current_offer,
            currency = self.pricing.currency.code(),
            rows = rows,
        )
    }
}

fn snapshot_message(message: &Message) -> SnapshotMessage {
    SnapshotMessage {
        sender: message.sender(),
        kind: message.kind(),
        branch: message.branch().to_string(),
        content: message.content().to_string(),
        offer_amount: message.offer().map(|o| o.amount),
        created_at: message.created_at(),
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
