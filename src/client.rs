//! # Client Specifications
//!
//! Client logic/relevant structures.
//!
//! ## Session
//!
//! - One storage key, `ticketPortalTk`, holding a base64 blob of
//!   `{token, createdAt, expiresAt}`
//! - Valid iff now is before `expiresAt` **and** the token is still in the
//!   PIN allow-list, so rotating the list invalidates old sessions on the
//!   next check
//! - A single deferred expiry task is armed per session; re-issuing aborts
//!   the previous one so logout can never fire twice
//! - Malformed blobs are treated as absent and cleared, forcing re-auth
//!
//! ## Form
//!
//! Field rules, all checked in one pass so every invalid field is shown at
//! once:
//! - titulo: required, at least 5 chars
//! - descripcion: required, at least 20 chars
//! - prioridad: required, one of urgente/alta/media/baja
//! - etiqueta: required
//!
//! ## Submission
//!
//! - Ticket id is `TICKET-<epoch millis>-<5 random base36 chars>` uppercased
//! - Payload carries UTC and localized timestamps plus a client snapshot
//!   (user agent, language, platform, url, referrer)
//! - POSTed to the relay with up to 3 attempts, linear backoff between them
//! - On success the form resets and the portal reloads once after a short
//!   delay to give ClickUp time to surface the new task
//!
//! ## Portal
//!
//! - `GET` on the relay replaces the whole in-memory list; a failed load
//!   keeps whatever was displayed before
//! - Search is a case-insensitive substring filter over name, description
//!   and the ticket id embedded in the description
//! - Auto-reload every 30 seconds while the session is valid
