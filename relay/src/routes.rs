use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::Utc;
use tracing::{error, info};

use tickets::{
    MARKER_TAG,
    clickup::{Api, CreateTask},
    models::{CreatedEnvelope, Priority, TaskRef, TicketSubmission, TicketsEnvelope},
};

use crate::{error::AppError, state::AppState};

fn api(state: &AppState) -> Result<&Api, AppError> {
    state.api.as_ref().ok_or(AppError::MissingConfig)
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TicketsEnvelope>, AppError> {
    let tasks = api(&state)?.list_tasks().await.map_err(|e| {
        error!("GET failed: {e}");
        AppError::ListFailed {
            details: e.to_string(),
        }
    })?;

    let tickets: Vec<_> = tasks
        .into_iter()
        .filter(|task| task.tags.iter().any(|tag| tag.name == MARKER_TAG))
        .collect();

    info!("found {} web form tickets", tickets.len());

    Ok(Json(TicketsEnvelope {
        success: true,
        count: tickets.len(),
        tickets,
        retrieved_at: Utc::now(),
    }))
}

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(ticket): Json<TicketSubmission>,
) -> Result<Json<CreatedEnvelope>, AppError> {
    let api = api(&state)?;

    if ticket.titulo.trim().is_empty() || ticket.descripcion.trim().is_empty() {
        return Err(AppError::MissingFields);
    }

    info!(
        id = %ticket.id,
        prioridad = %ticket.prioridad,
        etiqueta = %ticket.etiqueta,
        "ticket received"
    );

    let priority = Priority::from_label(&ticket.prioridad);
    let task = CreateTask {
        name: ticket.titulo.clone(),
        description: ticket.formatted_description(),
        priority: priority.rank(),
        status: "TICKETS".to_string(),
        tags: vec![
            MARKER_TAG.to_string(),
            ticket.etiqueta.clone(),
            format!("prioridad-{}", priority.label()),
        ],
    };

    let created = api.create_task(&task).await.map_err(|e| {
        error!("POST failed: {e}");
        AppError::CreateFailed {
            details: e.to_string(),
        }
    })?;

    info!("created ClickUp task {}", created.id);

    Ok(Json(CreatedEnvelope {
        success: true,
        message: "Ticket creado exitosamente en ClickUp".to_string(),
        ticket_id: ticket.id,
        clickup_task: TaskRef {
            id: created.id,
            url: created.url,
            name: created.name,
        },
        processed_at: Utc::now(),
    }))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
