//! Documentation of a support-ticket intake portal backed by ClickUp.
//!
//!
//!
//! # General Infrastructure
//! - Static frontend serves the ticket form and the viewing portal
//! - A single stateless relay endpoint sits between clients and ClickUp
//! - Relay exposes one URL: `GET` lists tickets, `POST` creates one, `OPTIONS` answers preflight
//! - ClickUp is the system of record, nothing is persisted on our side
//! - CORS is pinned to the one origin the frontend is served from
//!
//!
//!
//! # Why a Relay
//!
//! **Goal**: keep the ClickUp token out of the browser while still letting a
//! public form create tasks.
//!
//! - The browser only ever talks to the relay, never to ClickUp
//! - The relay reads `CLICKUP_API_TOKEN` and `CLICKUP_LIST_ID` from its environment
//! - If either is missing the relay answers 500 per request instead of refusing to boot,
//!   so a misconfigured deploy is visible in responses rather than in a crash loop
//! - Every response is a JSON envelope with a boolean `success` so the frontend
//!   never has to guess between error shapes
//!
//!
//!
//! # Notes
//!
//! ## PIN gate
//! The portal is gated by a short numeric PIN shared out of band. It is an
//! access convenience, not a security boundary. The stored session blob is
//! base64-obscured so it does not read as plain text in storage, nothing more.
//!
//! ## Eventual consistency
//! After a submission the portal refreshes once more after a short delay.
//! ClickUp may not surface the new task immediately. We accept the gap; a
//! stale list is preferable to an empty one, so a failed refresh never
//! clears what is already displayed.
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Run the relay locally.
//! ```sh
//! CLICKUP_API_TOKEN=... CLICKUP_LIST_ID=... cargo run -p relay
//! ```
//!
//! Poke a running relay end to end.
//! ```sh
//! cargo run -p tester -- --relay-url http://localhost:1111/tickets --pin 123456
//! ```

pub mod client;
