//! Submission assembly and the POST to the relay.

use std::time::Duration;

use chrono::{Local, Utc};
use rand::Rng;
use reqwest::Client;
use tracing::info;

use tickets::models::{ClientInfo, CreatedEnvelope, Priority, TicketSubmission};

use crate::{error::PortalError, fetch::fetch_with_retry, validate::FormValues};

pub const MAX_ATTEMPTS: u32 = 3;
pub const BASE_DELAY: Duration = Duration::from_secs(1);

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `TICKET-<epoch millis>-<5 random base36 chars>`, uppercased.
pub fn generate_ticket_id() -> String {
    let millis = Utc::now().timestamp_millis();

    let mut rng = rand::rng();
    let suffix: String = (0..5)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();

    format!("TICKET-{millis}-{suffix}").to_uppercase()
}

/// Snapshot of the submitting client, the closest native equivalent of
/// what a browser reports about itself.
pub fn client_info(url: &str, referrer: Option<&str>) -> ClientInfo {
    ClientInfo {
        user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        idioma: std::env::var("LANG").unwrap_or_else(|_| "es".to_string()),
        plataforma: std::env::consts::OS.to_string(),
        timestamp: Utc::now().timestamp_millis(),
        url: url.to_string(),
        referrer: referrer.unwrap_or("directo").to_string(),
    }
}

/// Builds the immutable submission record: fresh id, trimmed fields,
/// normalized priority label, both timestamps and the client snapshot.
pub fn build_submission(values: &FormValues, cliente: ClientInfo) -> TicketSubmission {
    TicketSubmission {
        id: generate_ticket_id(),
        titulo: values.titulo.trim().to_string(),
        descripcion: values.descripcion.trim().to_string(),
        prioridad: Priority::from_label(values.prioridad.trim())
            .label()
            .to_string(),
        etiqueta: values.etiqueta.trim().to_string(),
        fecha_creacion: Some(Utc::now()),
        fecha_local: Some(Local::now().format("%d/%m/%Y %H:%M").to_string()),
        estado: "nuevo".to_string(),
        origen: "formulario-web".to_string(),
        cliente: Some(cliente),
    }
}

/// POSTs the record to the relay through the retry fetcher. A non-2xx
/// answer after all attempts carries the relay's error body.
pub async fn submit(
    http: &Client,
    endpoint: &str,
    ticket: &TicketSubmission,
) -> Result<CreatedEnvelope, PortalError> {
    submit_with(http, endpoint, ticket, MAX_ATTEMPTS, BASE_DELAY).await
}

pub async fn submit_with(
    http: &Client,
    endpoint: &str,
    ticket: &TicketSubmission,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<CreatedEnvelope, PortalError> {
    info!(id = %ticket.id, "submitting ticket");

    let request = http.post(endpoint).json(ticket);
    let response = fetch_with_retry(request, max_attempts, base_delay).await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(PortalError::Submission { status, body });
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use regex::Regex;

    fn form() -> FormValues {
        FormValues {
            titulo: "  Pantalla en blanco  ".into(),
            descripcion: " Al abrir el panel la pantalla queda en blanco. ".into(),
            prioridad: "urgente".into(),
            etiqueta: "soporte-tecnico".into(),
        }
    }

    #[test]
    fn ticket_ids_match_the_fixed_pattern() {
        let pattern = Regex::new(r"^TICKET-\d{13}-[0-9A-Z]{5}$").unwrap();

        for _ in 0..50 {
            let id = generate_ticket_id();
            assert!(pattern.is_match(&id), "bad id: {id}");
            assert_eq!(id, id.to_uppercase());
        }
    }

    #[test]
    fn build_trims_and_stamps() {
        let submission = build_submission(&form(), client_info("tester://local", None));

        assert_eq!(submission.titulo, "Pantalla en blanco");
        assert_eq!(submission.prioridad, "urgente");
        assert_eq!(submission.estado, "nuevo");
        assert_eq!(submission.origen, "formulario-web");
        assert!(submission.fecha_creacion.is_some());
        assert!(submission.fecha_local.is_some());
        assert_eq!(submission.cliente.unwrap().referrer, "directo");
    }

    #[test]
    fn unknown_priority_defaults_to_media() {
        let mut values = form();
        values.prioridad = "altísima".into();

        let submission = build_submission(&values, ClientInfo::default());

        assert_eq!(submission.prioridad, "media");
    }

    #[tokio::test]
    async fn relay_failure_carries_status_and_body() {
        use axum::{Router, http::StatusCode, routing::post};
        use tokio::net::TcpListener;

        let app = Router::new().route(
            "/tickets",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, r#"{"success":false,"error":"Error procesando ticket"}"#) }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let submission = build_submission(&form(), ClientInfo::default());
        let error = submit_with(
            &Client::new(),
            &format!("http://{addr}/tickets"),
            &submission,
            2,
            Duration::from_millis(1),
        )
        .await
        .unwrap_err();

        match error {
            PortalError::Submission { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("Error procesando ticket"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
