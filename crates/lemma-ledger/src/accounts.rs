use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use lemma_cache::ResponseCache;
use lemma_gate::{BotVerifier, Rejection};
use lemma_store::{AccountRecord, GraphStore, NewAccount, NodeRecord, StoreError, Txn};
use lemma_types::{
    normalize_account_name, normalize_email, validate_account_name, validate_email, Actor, Address,
    TypeError,
};

use crate::error::{LedgerError, LedgerResult};
use crate::mailer::{ActivationMail, Mailer};
use crate::password::{hash_password, login_cache_key, verify_password, MIN_PASSWORD_LEN};

/// How long an account may stay unvalidated before cleanup removes it.
pub const UNVALIDATED_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// Body of a registration request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub recaptcha_code: String,
}

/// Public summary of an account and the nodes it owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub refs: Vec<AccountRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
    pub data: Value,
    pub searchable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_synopsis: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AccountRef {
    fn from_record(owner: &str, record: NodeRecord) -> LedgerResult<Self> {
        let data = serde_json::from_str(&record.data)
            .map_err(|_| LedgerError::CorruptPayload(record.hashid.clone()))?;
        Ok(Self {
            id: Address::owned(owner, record.hashid).to_string(),
            data,
            searchable: record.searchable,
            search_title: record.search_title,
            search_synopsis: record.search_synopsis,
            created_at: record.created_at,
        })
    }
}

/// Single-use activation code.
fn activation_code() -> String {
    format!("{:08x}", crc32fast::hash(Uuid::new_v4().as_bytes()))
}

fn validation(err: TypeError) -> LedgerError {
    match err {
        TypeError::InvalidAccountName(msg) | TypeError::InvalidEmail(msg) => LedgerError::Validation(msg),
        other => LedgerError::Validation(other.to_string()),
    }
}

/// Account registration, activation, login and views.
pub struct AccountService {
    store: Arc<dyn GraphStore>,
    verifier: Arc<dyn BotVerifier>,
    mailer: Arc<dyn Mailer>,
    login_cache: Arc<dyn ResponseCache<Actor>>,
    server_url: String,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn GraphStore>,
        verifier: Arc<dyn BotVerifier>,
        mailer: Arc<dyn Mailer>,
        login_cache: Arc<dyn ResponseCache<Actor>>,
        server_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            verifier,
            mailer,
            login_cache,
            server_url: server_url.into(),
        }
    }

    /// Create an unvalidated account and mail its activation link.
    /// Returns the display name, `@name`.
    pub async fn register(&self, registration: &Registration) -> LedgerResult<String> {
        let name = normalize_account_name(&registration.name);
        validate_account_name(&name).map_err(validation)?;
        let email = normalize_email(&registration.email);
        validate_email(&email).map_err(validation)?;
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(LedgerError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let human = match self.verifier.verify(&registration.recaptcha_code).await {
            Ok(human) => human,
            Err(e) => {
                tracing::warn!(error = %e, "bot verifier unavailable");
                false
            }
        };
        if !human {
            return Err(Rejection::BotCheckFailed.into());
        }

        let password = registration.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| LedgerError::Internal(e.to_string()))??;
        let code = activation_code();

        let mut txn = self.store.begin().await?;
        if let Err(e) = insert_account(txn.as_mut(), &name, &email, password_hash, &code).await {
            txn.discard().await;
            return Err(e);
        }
        txn.commit().await.map_err(|e| match e {
            StoreError::Conflict(_) => LedgerError::Conflict("name or email is already registered".into()),
            other => other.into(),
        })?;
        tracing::info!(%name, "account registered");

        self.mailer
            .send(ActivationMail::new(email, &self.server_url, &code))
            .await?;
        Ok(format!("@{name}"))
    }

    /// Validate the account holding `code` and rotate its code. Returns
    /// `false` when no account holds it.
    pub async fn verify(&self, code: &str) -> LedgerResult<bool> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(false);
        }

        let mut txn = self.store.begin().await?;
        let account = match txn.account_by_code(code).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                txn.discard().await;
                return Ok(false);
            }
            Err(e) => {
                txn.discard().await;
                return Err(e.into());
            }
        };
        if let Err(e) = txn.activate_account(account.id, activation_code()).await {
            txn.discard().await;
            return Err(e.into());
        }
        txn.commit().await?;
        tracing::info!(name = %account.name, "account activated");
        Ok(true)
    }

    /// Resolve login credentials to an actor.
    ///
    /// `account` may be an email or a name, with or without `@`. Email
    /// matches take precedence.
    pub async fn login(&self, account: &str, password: &str) -> LedgerResult<Actor> {
        let account = account.trim();
        let password = password.trim();
        if account.is_empty() || password.is_empty() {
            return Err(LedgerError::AuthenticationFailed);
        }

        let key = login_cache_key(account, password);
        if let Some(actor) = self.login_cache.get(&key) {
            return Ok(actor);
        }

        let mut txn = self.store.begin_read_only().await?;
        let record = lookup_login(txn.as_mut(), account).await;
        txn.discard().await;
        let Some(record) = record? else {
            tracing::warn!(%account, "login for unknown account");
            return Err(LedgerError::AuthenticationFailed);
        };

        let attempt = password.to_string();
        let stored = record.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&attempt, &stored))
            .await
            .map_err(|e| LedgerError::Internal(e.to_string()))??;
        if !matches {
            tracing::warn!(name = %record.name, "login with wrong password");
            return Err(LedgerError::AuthenticationFailed);
        }
        if !record.validated {
            return Err(LedgerError::AccountUnvalidated);
        }

        let actor = Actor {
            id: record.id,
            name: record.name,
            email: record.email,
        };
        self.login_cache.put(key, actor.clone());
        Ok(actor)
    }

    /// Summary of the account `@name`. Email and non-searchable nodes are
    /// shown only to the account itself.
    pub async fn view(&self, raw_name: &str, viewer: Option<&Actor>) -> LedgerResult<AccountView> {
        let name = raw_name
            .strip_prefix('@')
            .ok_or(LedgerError::AccountNotFound)?
            .to_lowercase();

        let mut txn = self.store.begin_read_only().await?;
        let loaded = load_view(txn.as_mut(), &name).await;
        txn.discard().await;
        let (account, nodes) = loaded?.ok_or(LedgerError::AccountNotFound)?;

        let is_self = viewer.is_some_and(|viewer| viewer.id == account.id);
        let refs = nodes
            .into_iter()
            .filter(|node| is_self || node.searchable)
            .map(|node| AccountRef::from_record(&account.name, node))
            .collect::<LedgerResult<Vec<_>>>()?;

        Ok(AccountView {
            name: format!("@{}", account.name),
            email: is_self.then_some(account.email),
            refs,
        })
    }

    /// Delete accounts still unvalidated [`UNVALIDATED_TTL`] after creation.
    pub async fn cleanup(&self, now: DateTime<Utc>) -> LedgerResult<usize> {
        let ttl = chrono::Duration::from_std(UNVALIDATED_TTL)
            .map_err(|e| LedgerError::Internal(e.to_string()))?;
        let mut txn = self.store.begin().await?;
        let removed = match txn.delete_unvalidated_before(now - ttl).await {
            Ok(removed) => removed,
            Err(e) => {
                txn.discard().await;
                return Err(e.into());
            }
        };
        txn.commit().await?;
        if removed > 0 {
            tracing::info!(removed, "unvalidated accounts removed");
        }
        Ok(removed)
    }
}

async fn insert_account(
    txn: &mut dyn Txn,
    name: &str,
    email: &str,
    password_hash: String,
    code: &str,
) -> LedgerResult<()> {
    if txn.account_by_name(name).await?.is_some() {
        return Err(LedgerError::Conflict("name is already taken".into()));
    }
    if txn.account_by_email(email).await?.is_some() {
        return Err(LedgerError::Conflict("email is already registered".into()));
    }
    txn.insert_account(NewAccount {
        name: name.to_string(),
        email: email.to_string(),
        password_hash,
        activation_code: code.to_string(),
    })
    .await?;
    Ok(())
}

async fn lookup_login(txn: &mut dyn Txn, account: &str) -> LedgerResult<Option<AccountRecord>> {
    if let Some(record) = txn.account_by_email(&normalize_email(account)).await? {
        return Ok(Some(record));
    }
    Ok(txn.account_by_name(&normalize_account_name(account)).await?)
}

async fn load_view(
    txn: &mut dyn Txn,
    name: &str,
) -> LedgerResult<Option<(AccountRecord, Vec<NodeRecord>)>> {
    let Some(account) = txn.account_by_name(name).await? else {
        return Ok(None);
    };
    let nodes = txn.owned_nodes(account.id).await?;
    Ok(Some((account, nodes)))
}
