//! Client-side logic of the ticket form and viewing portal.
//!
//! Everything the browser-side code does, expressed as a library: the
//! PIN-gated session with its expiry task, field validation, the retry
//! wrapper around relay calls, submission assembly and the portal's ticket
//! list with search and auto-refresh. Holds no server state; all ticket
//! data comes from the relay on every load.

pub mod error;
pub mod fetch;
pub mod panel;
pub mod session;
pub mod storage;
pub mod submit;
pub mod validate;
