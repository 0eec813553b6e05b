//! HTTP server for Lemma Chain.
//!
//! Endpoints:
//! - `POST /ref`: create a node
//! - `GET /*address`: resolve a chain (`depth`, `types` query parameters)
//! - `GET /search/:terms`: search searchable nodes
//! - `POST /accounts`, `GET /accounts/:name`, `GET /verify/:code`: accounts
//! - `GET /v1/health`
//!
//! Login headers are resolved by middleware before any handler runs. Every
//! response is marked `Cache-Control: private`.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;
pub mod tasks;

pub use auth::{Credentials, CurrentActor};
pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use router::build_router;
pub use server::LemmaServer;
pub use state::{AppState, Caches};
