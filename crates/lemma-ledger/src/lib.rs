//! Write-side and account services for Lemma Chain.
//!
//! - [`NodeCreator`]: runs the creation gate, resolves parent references and
//!   commits a node together with its address in one transaction
//! - [`SearchService`]: cached full-text lookup over searchable nodes
//! - [`AccountService`]: registration, activation, login and account views
//!
//! Passwords are hashed with Argon2id ([`password`]). Activation links go
//! out through a [`Mailer`].

pub mod accounts;
pub mod creator;
pub mod error;
pub mod mailer;
pub mod password;
pub mod search;

pub use accounts::{AccountRef, AccountService, AccountView, Registration, UNVALIDATED_TTL};
pub use creator::NodeCreator;
pub use error::{LedgerError, LedgerResult};
pub use mailer::{ActivationMail, LogMailer, Mailer, MemoryMailer};
pub use search::{SearchHit, SearchService};
