//! Wire payloads between the form/portal clients and the relay.
//!
//! Field names stay in Spanish because that is the wire format the frontend
//! and the existing ClickUp data already speak.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::clickup::Task;

/// Tag marking tasks created through the web form; the relay's listing is
/// filtered down to tasks carrying it.
pub const MARKER_TAG: &str = "formulario-web";

/// Fixed priority scale of the form, mapped onto ClickUp's 1-4 ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Urgente,
    Alta,
    Media,
    Baja,
}

impl Priority {
    /// Unknown labels fall back to `Media`, matching what the relay does
    /// with free-form input.
    pub fn from_label(label: &str) -> Self {
        match label {
            "urgente" => Priority::Urgente,
            "alta" => Priority::Alta,
            "baja" => Priority::Baja,
            _ => Priority::Media,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Urgente => "urgente",
            Priority::Alta => "alta",
            Priority::Media => "media",
            Priority::Baja => "baja",
        }
    }

    /// ClickUp rank, 1 is most urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgente => 1,
            Priority::Alta => 2,
            Priority::Media => 3,
            Priority::Baja => 4,
        }
    }
}

/// Snapshot of the submitting client, attached to every ticket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub user_agent: String,
    pub idioma: String,
    pub plataforma: String,
    pub timestamp: i64,
    pub url: String,
    pub referrer: String,
}

/// A ticket as posted to the relay. Immutable once built; ownership moves
/// to the relay on submit.
///
/// Every field is lenient on the inbound side (`default`) so the relay can
/// report missing title/description through its own envelope instead of a
/// deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSubmission {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub prioridad: String,
    #[serde(default)]
    pub etiqueta: String,
    #[serde(rename = "fechaCreacion", default)]
    pub fecha_creacion: Option<DateTime<Utc>>,
    #[serde(rename = "fechaLocal", default)]
    pub fecha_local: Option<String>,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub origen: String,
    #[serde(default)]
    pub cliente: Option<ClientInfo>,
}

impl TicketSubmission {
    /// Structured ClickUp description embedding the ticket id and client
    /// metadata. The portal extracts the id and the client description back
    /// out of this exact shape, so the markers must not drift.
    pub fn formatted_description(&self) -> String {
        let fecha = self
            .fecha_local
            .clone()
            .unwrap_or_else(|| Local::now().format("%d/%m/%Y %H:%M").to_string());

        let (user_agent, plataforma, referrer) = match &self.cliente {
            Some(c) => (
                or_na(truncate(&c.user_agent, 100)).to_string(),
                or_na(&c.plataforma).to_string(),
                if c.referrer.is_empty() {
                    "Directo".to_string()
                } else {
                    c.referrer.clone()
                },
            ),
            None => ("N/A".to_string(), "N/A".to_string(), "Directo".to_string()),
        };

        format!(
            "🎫 **Ticket ID:** {id}\n\
             📅 **Fecha:** {fecha}\n\
             🏷️ **Tipo:** {etiqueta}\n\
             🚨 **Prioridad:** {prioridad}\n\
             \n\
             **📝 Descripción del Cliente:**\n\
             {descripcion}\n\
             \n\
             **🔍 Información Técnica:**\n\
             - 🌐 User Agent: {user_agent}...\n\
             - 🖥️ Plataforma: {plataforma}\n\
             - 📄 Referrer: {referrer}\n\
             \n\
             ---\n\
             *✨ Procesado automáticamente*\n\
             *⏰ Timestamp: {stamp}*",
            id = self.id,
            etiqueta = self.etiqueta,
            prioridad = self.prioridad,
            descripcion = self.descripcion,
            stamp = Local::now().format("%d/%m/%Y %H:%M"),
        )
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

/// Successful `GET` envelope from the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub tickets: Vec<Task>,
    pub count: usize,
    #[serde(rename = "retrievedAt")]
    pub retrieved_at: DateTime<Utc>,
}

/// Reference to the task the relay created in ClickUp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    pub name: String,
}

/// Successful `POST` envelope from the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(rename = "ticketId")]
    pub ticket_id: String,
    #[serde(rename = "clickupTask")]
    pub clickup_task: TaskRef,
    #[serde(rename = "processedAt")]
    pub processed_at: DateTime<Utc>,
}

/// Failure envelope, shared by every relay error path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
