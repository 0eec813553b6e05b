use std::collections::HashSet;

use harsh::Harsh;

use lemma_types::{Address, NodeId};

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};

const MIN_ALPHABET_LEN: usize = 16;

/// Bidirectional mapping between [`NodeId`]s and their public hashids.
///
/// Built once at startup from a [`CodecConfig`] and shared read-only by
/// every request.
#[derive(Clone, Debug)]
pub struct AddressCodec {
    harsh: Harsh,
    /// Full configured alphabet; anything outside it is rejected on decode.
    charset: HashSet<char>,
    min_length: usize,
    /// Length of the longest canonical encoding, that of `u64::MAX`.
    max_length: usize,
}

impl AddressCodec {
    pub fn new(config: &CodecConfig) -> CodecResult<Self> {
        let mut charset = HashSet::new();
        for c in config.alphabet.chars() {
            if c.is_whitespace() {
                return Err(CodecError::InvalidConfig("alphabet must not contain whitespace".into()));
            }
            if !charset.insert(c) {
                return Err(CodecError::InvalidConfig(format!("duplicate character {c:?} in alphabet")));
            }
        }
        if charset.len() < MIN_ALPHABET_LEN {
            return Err(CodecError::InvalidConfig(format!(
                "alphabet must contain at least {MIN_ALPHABET_LEN} unique characters"
            )));
        }

        let harsh = Harsh::builder()
            .salt(config.salt.as_str())
            .alphabet(config.alphabet.as_str())
            .length(config.min_length)
            .build()
            .map_err(|e| CodecError::InvalidConfig(e.to_string()))?;
        let max_length = harsh.encode(&[u64::MAX]).chars().count();

        Ok(Self {
            harsh,
            charset,
            min_length: config.min_length,
            max_length,
        })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Encode an identity as its hashid.
    pub fn encode(&self, id: NodeId) -> String {
        self.harsh.encode(&[id.get()])
    }

    /// The public address of `id`, scoped to `owner` when there is one.
    pub fn address(&self, id: NodeId, owner: Option<&str>) -> Address {
        Address::new(owner.map(str::to_string), self.encode(id))
    }

    /// Decode a hashid back into the identity it was produced from.
    ///
    /// Only canonical encodings of exactly one identity are accepted.
    pub fn decode(&self, hashid: &str) -> CodecResult<NodeId> {
        let malformed = || CodecError::MalformedAddress(hashid.to_string());

        let len = hashid.chars().count();
        if len == 0
            || len < self.min_length
            || len > self.max_length
            || hashid.chars().any(|c| !self.charset.contains(&c))
        {
            return Err(malformed());
        }

        let numbers = self.harsh.decode(hashid).map_err(|_| malformed())?;
        let [number] = numbers.as_slice() else {
            return Err(malformed());
        };
        if self.harsh.encode(&[*number]) != hashid {
            return Err(malformed());
        }
        Ok(NodeId::new(*number))
    }
}
