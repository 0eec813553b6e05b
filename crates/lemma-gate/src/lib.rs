//! Creation gate for Lemma Chain.
//!
//! Every create-node request passes through a [`CreationGate`] before any
//! store access. The gate is an ordered pipeline of [`GateStage`]s:
//!
//! 1. [`PayloadStage`]: `data` present, a JSON object, within the size bound
//! 2. [`SearchStage`]: searchable flag and title/synopsis constraints
//! 3. [`BotCheckStage`]: external bot verification via a [`BotVerifier`]
//! 4. [`OwnershipStage`]: a claimed owner must be the logged-in actor
//! 5. [`ParentRefStage`]: parent count limit and reference grammar
//!
//! Evaluation is fail-fast. A passing run yields a [`NodeDraft`] ready for
//! the existence checks and commit performed inside the store transaction.

pub mod config;
pub mod error;
pub mod gate;
pub mod request;
pub mod stage;
pub mod stages;
pub mod verifier;

pub use config::GateConfig;
pub use error::{GateError, GateResult};
pub use gate::{CreationGate, GateReport};
pub use request::{CreateNodeRequest, NodeDraft};
pub use stage::{GateContext, GateStage, Rejection, StageDecision, StageResult};
pub use stages::{BotCheckStage, OwnershipStage, ParentRefStage, PayloadStage, SearchStage};
pub use verifier::{BotVerifier, FixedVerifier, RecaptchaVerifier};
