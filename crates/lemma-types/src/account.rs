use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::id::AccountId;

/// Longest permitted account name.
pub const MAX_NAME_LEN: usize = 30;

/// Longest permitted email address.
pub const MAX_EMAIL_LEN: usize = 254;

/// The authenticated account behind one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: AccountId,
    pub name: String,
    pub email: String,
}

impl Actor {
    /// Returns `true` when `claim` names this actor, by account name or email.
    ///
    /// `claim` is expected in normalised form (trimmed, no `@` prefix).
    pub fn answers_to(&self, claim: &str) -> bool {
        let claim = claim.to_lowercase();
        claim == self.name || claim == self.email
    }
}

/// Trim, drop a leading `@` and lowercase.
pub fn normalize_account_name(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Check an already-normalised account name.
pub fn validate_account_name(name: &str) -> TypeResult<()> {
    if name.is_empty() {
        return Err(TypeError::InvalidAccountName("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(TypeError::InvalidAccountName(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-';
    if !name.chars().all(allowed) {
        return Err(TypeError::InvalidAccountName(
            "name may only contain a-z, 0-9, _ and -".into(),
        ));
    }
    Ok(())
}

/// Check an already-normalised email address.
pub fn validate_email(email: &str) -> TypeResult<()> {
    let invalid = || TypeError::InvalidEmail("email is invalid".into());
    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Actor {
        Actor {
            id: AccountId::new(1),
            name: "alice".into(),
            email: "alice@example.com".into(),
        }
    }

    #[test]
    fn actor_answers_to_name_and_email() {
        let actor = alice();
        assert!(actor.answers_to("alice"));
        assert!(actor.answers_to("ALICE"));
        assert!(actor.answers_to("alice@example.com"));
        assert!(!actor.answers_to("bob"));
    }

    #[test]
    fn normalise_name() {
        assert_eq!(normalize_account_name("  @Alice "), "alice");
        assert_eq!(normalize_account_name("bob"), "bob");
        assert_eq!(normalize_account_name("@"), "");
    }

    #[test]
    fn name_rules() {
        assert!(validate_account_name("alice_01-x").is_ok());
        assert!(validate_account_name("").is_err());
        assert!(validate_account_name(&"a".repeat(31)).is_err());
        assert!(validate_account_name(&"a".repeat(30)).is_ok());
        assert!(validate_account_name("al ice").is_err());
        assert!(validate_account_name("Alice").is_err());
        assert!(validate_account_name("a/b").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("nobody").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("a b@c.d").is_err());
        assert_eq!(normalize_email(" A@B.Co "), "a@b.co");
    }
}
