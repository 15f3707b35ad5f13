//! # Ticket panel
//!
//! In-memory view over the relay's ticket listing.
//!
//! - `load` replaces the whole set on success; a failed load keeps what is
//!   already displayed, stale beats empty
//! - Search is a case-insensitive substring filter over name, description
//!   and the ticket id embedded in the description
//! - Auto-refresh is an explicit task with an abort handle, plus one
//!   best-effort reload shortly after a successful submission
//!
//! The ticket id lives inside the free-text description (`**Ticket ID:**`)
//! because that is how the existing ClickUp data is shaped. The extractors
//! here are the read half of that shim; the write half is
//! `TicketSubmission::formatted_description`.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{Local, TimeZone, Utc};
use regex::Regex;
use reqwest::{Client, header::ACCEPT};
use tokio::task::JoinHandle;
use tracing::warn;

use tickets::{
    clickup::{Task, TaskPriority},
    models::{ErrorEnvelope, TicketsEnvelope},
};

use crate::{error::PortalError, session::SessionStore};

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Settle time before the post-submission reload, giving ClickUp a moment
/// to surface the new task.
pub const POST_SUBMIT_DELAY: Duration = Duration::from_secs(2);

struct PanelState {
    all: Vec<Task>,
    filtered: Vec<Task>,
    term: String,
}

#[derive(Clone)]
pub struct Panel {
    http: Client,
    endpoint: String,
    session: SessionStore,
    state: Arc<Mutex<PanelState>>,
}

impl Panel {
    pub fn new(endpoint: impl Into<String>, session: SessionStore) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            session,
            state: Arc::new(Mutex::new(PanelState {
                all: Vec::new(),
                filtered: Vec::new(),
                term: String::new(),
            })),
        }
    }

    /// Fetches the listing and replaces the in-memory set, re-applying the
    /// active search. On any failure the previous list stays displayed.
    /// Returns the number of tickets loaded.
    pub async fn load(&self) -> Result<usize, PortalError> {
        if !self.session.is_valid() {
            return Err(PortalError::NotAuthenticated);
        }

        let response = self
            .http
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error)
                .unwrap_or(body);
            return Err(PortalError::Load(format!("Error {status}: {message}")));
        }

        let envelope: TicketsEnvelope = response.json().await?;
        if !envelope.success {
            return Err(PortalError::Load("Error desconocido".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        state.all = envelope.tickets;
        let filtered = filter_tickets(&state.all, &state.term);
        state.filtered = filtered;

        Ok(state.all.len())
    }

    /// Case-insensitive substring filter; an empty term resets to the full
    /// set.
    pub fn search(&self, term: &str) {
        let mut state = self.state.lock().unwrap();
        state.term = term.to_lowercase();
        let filtered = filter_tickets(&state.all, &state.term);
        state.filtered = filtered;
    }

    /// Current filtered view, empty when nothing matches.
    pub fn tickets(&self) -> Vec<Task> {
        self.state.lock().unwrap().filtered.clone()
    }

    /// Reloads every `interval` while the session is valid. The returned
    /// handle cancels the task; dropping it cancels too.
    pub fn spawn_auto_refresh(&self, interval: Duration) -> RefreshHandle {
        let panel = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if !panel.session.is_valid() {
                    continue;
                }

                if let Err(e) = panel.load().await {
                    warn!("Auto refresh failed: {e}");
                }
            }
        });

        RefreshHandle { handle }
    }

    /// Best-effort reload after a successful submission. ClickUp may not be
    /// consistent yet; a miss here is corrected by the next auto-refresh.
    pub async fn refresh_after_submit(&self) {
        tokio::time::sleep(POST_SUBMIT_DELAY).await;

        if let Err(e) = self.load().await {
            warn!("Post-submit refresh failed: {e}");
        }
    }
}

pub struct RefreshHandle {
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn filter_tickets(all: &[Task], term: &str) -> Vec<Task> {
    if term.is_empty() {
        return all.to_vec();
    }

    all.iter()
        .filter(|task| {
            task.name.to_lowercase().contains(term)
                || task.description.to_lowercase().contains(term)
                || extract_ticket_id(&task.description)
                    .map(|id| id.to_lowercase().contains(term))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Ticket id embedded in the structured description, when present.
pub fn extract_ticket_id(description: &str) -> Option<String> {
    let re = Regex::new(r"Ticket ID:\*\* (TICKET-[^\n\s]+)").unwrap();

    re.captures(description)
        .map(|captures| captures[1].to_string())
}

/// Client-facing part of the structured description, falling back to the
/// raw text for tasks not created through the form.
pub fn extract_client_description(description: &str) -> String {
    let re = Regex::new(r"\*\*📝 Descripción del Cliente:\*\*\s*([^*]+)").unwrap();

    match re.captures(description) {
        Some(captures) => captures[1].trim().to_string(),
        None => description.to_string(),
    }
}

pub fn translate_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "to do" => "Pendiente".to_string(),
        "in progress" => "En Progreso".to_string(),
        "done" => "Completado".to_string(),
        "closed" => "Cerrado".to_string(),
        _ => status.to_string(),
    }
}

pub fn status_class(status: &str) -> &'static str {
    match status.to_lowercase().as_str() {
        "en curso" => "status-progress",
        "promovido" => "status-done",
        _ => "status-todo",
    }
}

/// Spanish display label; absent or unknown priorities read as "Media".
pub fn priority_text(priority: Option<&TaskPriority>) -> &'static str {
    match priority.map(|p| p.priority.as_str()) {
        Some("urgent") => "Urgente",
        Some("high") => "Alta",
        Some("low") => "Baja",
        _ => "Media",
    }
}

/// Numeric rank for styling, lowest urgency when absent.
pub fn priority_rank(priority: Option<&TaskPriority>) -> u8 {
    priority
        .and_then(|p| p.id.as_deref())
        .and_then(|id| id.parse().ok())
        .unwrap_or(4)
}

/// ClickUp ships `date_created` as epoch millis in a string.
pub fn format_date(date_created: &str) -> String {
    date_created
        .parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .map(|instant| {
            instant
                .with_timezone(&Local)
                .format("%d/%m/%Y %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| date_created.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tickets::{
        clickup::{Tag, TaskStatus},
        models::{ClientInfo, TicketSubmission},
    };

    fn task(name: &str, description: &str) -> Task {
        Task {
            id: "86abc".into(),
            name: name.into(),
            description: description.into(),
            status: TaskStatus {
                status: "tickets".into(),
            },
            priority: None,
            tags: vec![Tag {
                name: "formulario-web".into(),
            }],
            assignees: Vec::new(),
            date_created: "1722700000000".into(),
            url: None,
        }
    }

    fn fixture() -> Vec<Task> {
        vec![
            task(
                "Pantalla en blanco",
                "🎫 **Ticket ID:** TICKET-1722700000000-A3F9K\ndetalle",
            ),
            task("Error al pagar", "sin id embebido, caso urgente"),
        ]
    }

    #[test]
    fn search_matches_name_description_and_embedded_id() {
        for (term, expected) in [
            ("pantalla", 1),
            ("urgente", 1),
            ("ticket-1722700000000-a3f9k", 1),
            ("no aparece", 0),
        ] {
            assert_eq!(filter_tickets(&fixture(), term).len(), expected, "term: {term}");
        }
    }

    #[test]
    fn empty_term_resets_to_full_set() {
        assert_eq!(filter_tickets(&fixture(), "").len(), 2);
    }

    #[test]
    fn extractors_round_trip_the_formatted_description() {
        let submission = TicketSubmission {
            id: "TICKET-1722700000000-A3F9K".into(),
            titulo: "Pantalla en blanco".into(),
            descripcion: "Al abrir el panel la pantalla queda en blanco.".into(),
            prioridad: "alta".into(),
            etiqueta: "soporte-tecnico".into(),
            fecha_creacion: None,
            fecha_local: Some("04/08/2026 10:30".into()),
            estado: "nuevo".into(),
            origen: "formulario-web".into(),
            cliente: Some(ClientInfo::default()),
        };

        let description = submission.formatted_description();

        assert_eq!(
            extract_ticket_id(&description).as_deref(),
            Some("TICKET-1722700000000-A3F9K")
        );
        assert_eq!(
            extract_client_description(&description),
            "Al abrir el panel la pantalla queda en blanco."
        );
    }

    #[test]
    fn extract_ticket_id_handles_foreign_descriptions() {
        assert_eq!(extract_ticket_id("creada a mano en ClickUp"), None);
    }

    #[test]
    fn status_translation() {
        assert_eq!(translate_status("to do"), "Pendiente");
        assert_eq!(translate_status("IN PROGRESS"), "En Progreso");
        assert_eq!(translate_status("promovido"), "promovido");
        assert_eq!(status_class("Promovido"), "status-done");
        assert_eq!(status_class("tickets"), "status-todo");
    }

    #[test]
    fn priority_defaults_to_media() {
        assert_eq!(priority_text(None), "Media");
        assert_eq!(priority_rank(None), 4);

        let urgent = TaskPriority {
            id: Some("1".into()),
            priority: "urgent".into(),
        };
        assert_eq!(priority_text(Some(&urgent)), "Urgente");
        assert_eq!(priority_rank(Some(&urgent)), 1);
    }

    #[test]
    fn format_date_parses_epoch_millis() {
        let formatted = format_date("1722700000000");
        assert!(formatted.contains("2024"));

        assert_eq!(format_date("no es fecha"), "no es fecha");
    }

    mod load {
        use super::*;

        use std::sync::{
            Arc,
            atomic::{AtomicU32, Ordering},
        };

        use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
        use serde_json::json;
        use tokio::net::TcpListener;

        use crate::{session::SessionStore, storage::MemoryStorage};

        /// First call answers one ticket, later calls fail.
        async fn degrading_relay() -> String {
            let calls = Arc::new(AtomicU32::new(0));

            let app = Router::new()
                .route(
                    "/tickets",
                    get(|State(calls): State<Arc<AtomicU32>>| async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            (
                                StatusCode::OK,
                                Json(json!({
                                    "success": true,
                                    "tickets": [{
                                        "id": "86abc",
                                        "name": "Pantalla en blanco",
                                        "description": "detalle",
                                        "status": { "status": "tickets" },
                                        "tags": [{ "name": "formulario-web" }],
                                        "date_created": "1722700000000"
                                    }],
                                    "count": 1,
                                    "retrievedAt": "2026-08-04T10:30:00Z"
                                })),
                            )
                        } else {
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(json!({
                                    "success": false,
                                    "error": "Error obteniendo tickets"
                                })),
                            )
                        }
                    }),
                )
                .with_state(calls);

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            format!("http://{addr}/tickets")
        }

        fn session() -> SessionStore {
            let store = SessionStore::new(Arc::new(MemoryStorage::new()));
            store.issue("123456", Duration::from_secs(600)).unwrap();
            store
        }

        #[tokio::test]
        async fn failed_load_keeps_the_stale_list() {
            let panel = Panel::new(degrading_relay().await, session());

            assert_eq!(panel.load().await.unwrap(), 1);
            assert_eq!(panel.tickets().len(), 1);

            let error = panel.load().await.unwrap_err();
            assert!(error.to_string().contains("Error obteniendo tickets"));

            // previous list still displayed
            assert_eq!(panel.tickets().len(), 1);
        }

        #[tokio::test]
        async fn load_requires_a_valid_session() {
            let store = SessionStore::new(Arc::new(MemoryStorage::new()));
            let panel = Panel::new("http://127.0.0.1:9/tickets", store);

            assert!(matches!(
                panel.load().await,
                Err(PortalError::NotAuthenticated)
            ));
        }
    }
}
