use serde::{Deserialize, Serialize};

/// Lowercase letters and digits without the look-alikes `o` and `0`.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnpqrstuvwxyz123456789";

pub const DEFAULT_SALT: &str = "ffb80dba55db4b7ab49cb83ed96eca29";

pub const DEFAULT_MIN_LENGTH: usize = 6;

/// Parameters fixing the identity ⇄ address mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Characters an address may contain. At least 16 unique, no whitespace.
    pub alphabet: String,
    pub salt: String,
    /// Shorter encodings are padded up to this length.
    pub min_length: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.to_string(),
            salt: DEFAULT_SALT.to_string(),
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl CodecConfig {
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: CodecConfig = toml::from_str(r#"salt = "pepper""#).unwrap();
        assert_eq!(cfg.salt, "pepper");
        assert_eq!(cfg.alphabet, DEFAULT_ALPHABET);
        assert_eq!(cfg.min_length, 6);
    }

    #[test]
    fn default_alphabet_has_no_ambiguous_glyphs() {
        assert!(!DEFAULT_ALPHABET.contains('o'));
        assert!(!DEFAULT_ALPHABET.contains('0'));
    }
}
