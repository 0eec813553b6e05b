use serde::{Deserialize, Serialize};

/// Limits enforced by the creation gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Maximum compacted `data` size, in KiB.
    pub max_payload_kb: usize,
    /// Maximum parent references per node.
    pub max_parents: usize,
    /// Maximum search title length, in characters.
    pub max_title_len: usize,
    /// Maximum search synopsis length, in characters.
    pub max_synopsis_len: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_payload_kb: 12,
            max_parents: 250,
            max_title_len: 100,
            max_synopsis_len: 800,
        }
    }
}

impl GateConfig {
    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_kb * 1024
    }
}
