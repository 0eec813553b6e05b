use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{LedgerError, LedgerResult};

/// An account activation message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationMail {
    pub to: String,
    pub subject: String,
    pub link: String,
}

impl ActivationMail {
    pub fn new(to: impl Into<String>, server_url: &str, code: &str) -> Self {
        Self {
            to: to.into(),
            subject: "Activate Lemma Chain Account".into(),
            link: format!("{}/verify/{code}", server_url.trim_end_matches('/')),
        }
    }

    pub fn body(&self) -> String {
        format!(
            "Click on the link within 48 hours to activate account: <a href=\"{0}\">{0}</a>",
            self.link
        )
    }
}

/// Outbound mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: ActivationMail) -> LedgerResult<()>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: ActivationMail) -> LedgerResult<()> {
        tracing::info!(to = %mail.to, link = %mail.link, "activation mail");
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<ActivationMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<ActivationMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Activation code of the newest message sent to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|mail| mail.to == to)
            .and_then(|mail| mail.link.rsplit('/').next().map(str::to_string))
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: ActivationMail) -> LedgerResult<()> {
        self.sent
            .lock()
            .map_err(|e| LedgerError::Internal(format!("lock poisoned: {e}")))?
            .push(mail);
        Ok(())
    }
}
