//! Terminal chat front-end for a basketball Q&A service.
//!
//! A query is posted as `{"query": ...}`; the reply comes back either as a
//! JSON document or as a chunked text stream with `data:` framing, and is
//! shown as a chat bubble once it is complete.

pub mod app;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod state;
pub mod streaming;
pub mod tui;
pub mod ui;

pub use client::{QueryClient, Reply};
pub use config::Config;
pub use error::QueryError;
pub use events::{QueryEvent, Role, Turn};
pub use state::ChatState;
