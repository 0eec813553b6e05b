use std::sync::Arc;

use tokio::net::TcpListener;

use lemma_gate::{BotVerifier, RecaptchaVerifier};
use lemma_ledger::{LogMailer, Mailer};
use lemma_store::{GraphStore, InMemoryGraphStore};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;
use crate::tasks::spawn_maintenance;

/// Lemma Chain HTTP server.
pub struct LemmaServer {
    state: AppState,
}

impl LemmaServer {
    /// A server over a fresh in-memory store, verifying bots with reCAPTCHA
    /// and logging activation mail.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let verifier = RecaptchaVerifier::new(config.recaptcha_secret.clone())?;
        if !verifier.is_enabled() {
            tracing::warn!("no recaptcha secret configured; bot check disabled");
        }
        Self::with_parts(
            config,
            Arc::new(InMemoryGraphStore::new()),
            Arc::new(verifier),
            Arc::new(LogMailer),
        )
    }

    pub fn with_parts(
        config: ServerConfig,
        store: Arc<dyn GraphStore>,
        verifier: Arc<dyn BotVerifier>,
        mailer: Arc<dyn Mailer>,
    ) -> ServerResult<Self> {
        Ok(Self {
            state: AppState::new(config, store, verifier, mailer)?,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start the maintenance tasks and serve requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let addr = self.state.config.bind_addr;
        let listener = TcpListener::bind(addr).await?;
        let _maintenance = spawn_maintenance(self.state.clone());
        tracing::info!(%addr, "lemma server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
