use std::sync::Arc;

use clap::Parser;
use reqwest::Client;

use portal::{
    panel::Panel,
    session::{RevokeReason, SESSION_LIFETIME, SessionStore},
    storage::MemoryStorage,
    submit,
    validate::{FormValues, validate_all},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Relay endpoint
    #[arg(long, default_value = "http://localhost:1111/tickets")]
    relay_url: String,

    /// Portal PIN
    #[arg(long, default_value = "123456")]
    pin: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let session = SessionStore::new(Arc::new(MemoryStorage::new()));
    session.issue(&args.pin, SESSION_LIFETIME).unwrap();
    println!("Session valid: {}", session.is_valid());
    println!("Remaining: {:?}", session.remaining_time());

    let values = FormValues {
        titulo: "Prueba de extremo a extremo".into(),
        descripcion: "Ticket generado por el tester para validar el flujo completo.".into(),
        prioridad: "alta".into(),
        etiqueta: "soporte-tecnico".into(),
    };
    validate_all(&values).unwrap();

    let cliente = submit::client_info("tester://local", None);
    let ticket = submit::build_submission(&values, cliente);
    println!("\nSubmitting {}", ticket.id);

    let ack = submit::submit(&Client::new(), &args.relay_url, &ticket)
        .await
        .unwrap();
    println!(
        "Created ClickUp task {} ({})",
        ack.clickup_task.id,
        ack.clickup_task.url.unwrap_or_default()
    );

    let panel = Panel::new(args.relay_url.clone(), session.clone());
    panel.refresh_after_submit().await;

    let count = panel.load().await.unwrap();
    println!("\nLoaded {count} tickets");

    panel.search(&ticket.id.to_lowercase());
    println!("Search hits for {}: {}", ticket.id, panel.tickets().len());

    session.revoke(RevokeReason::Logout);
    println!("\nSession valid after logout: {}", session.is_valid());
}
