//! Checkpoint tokens: the plain-data values every stage captures and restores from.
//!
//! A [`Token`] is a `serde_json::Value`-backed snapshot of a stage's position. Composite stages
//! nest their children's tokens inside their own, so a token for the root of a pipeline is a tree
//! whose shape mirrors the pipeline's DAG. Tokens are cheap to construct, compare by value (no
//! identity), and never alias a stage's live internal state — every constructor here takes
//! ownership of or clones its input, so mutating a stage after calling `getstate` cannot change a
//! token already handed to the caller.
//!
//! How a caller gets a token onto disk or across the wire is deliberately not this crate's
//! business (the distilled contract stops at "plain-data value"); [`TokenCodec`] and its two
//! implementations exist purely as a convenience, mirroring the dual JSON/bincode codecs the
//! teacher crate this workspace is grounded on ships for the same reason.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A checkpoint token: an opaque, equality-comparable, serializable snapshot of a stage's
/// position.
///
/// `setstate(None)` is the reset sentinel; there is deliberately no `Token` value that means
/// "reset" — `Option<Token>` carries that distinction at the type level instead of overloading
/// the token's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token(pub Value);

impl Token {
    /// Build a token from any serializable local state.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Token(serde_json::to_value(value)?))
    }

    /// Recover typed local state from a token.
    pub fn into_value<T: for<'de> Deserialize<'de>>(self) -> Result<T> {
        Ok(serde_json::from_value(self.0)?)
    }

    /// Build a composite token out of named fields (used by multi-child stages to nest an
    /// upstream token alongside their own local state under stable keys).
    pub fn object(fields: Vec<(&str, Token)>) -> Self {
        let map = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.0))
            .collect();
        Token(Value::Object(map))
    }

    /// Build a composite token out of a homogeneous list of child tokens (used by stages with a
    /// variable number of upstreams, e.g. `Multiplex`'s data stages).
    pub fn array(children: Vec<Token>) -> Self {
        Token(Value::Array(children.into_iter().map(|t| t.0).collect()))
    }

    /// Read back a named field written by [`Token::object`].
    pub fn field(&self, key: &str) -> Result<Token> {
        let value = self
            .0
            .get(key)
            .cloned()
            .ok_or_else(|| crate::error::StageError::InvalidArgument(format!(
                "checkpoint token missing field {key:?}"
            )))?;
        Ok(Token(value))
    }

    /// Read back the elements written by [`Token::array`].
    pub fn elements(&self) -> Result<Vec<Token>> {
        match &self.0 {
            Value::Array(items) => Ok(items.iter().cloned().map(Token).collect()),
            _ => Err(crate::error::StageError::InvalidArgument(
                "checkpoint token is not an array".to_string(),
            )),
        }
    }
}

/// Wire-format codec for a [`Token`]. The crate ships two; callers may implement their own.
pub trait TokenCodec {
    fn encode(&self, token: &Token) -> Result<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> Result<Token>;
}

/// Human-readable JSON codec. Good default for debugging and for tokens handed to external
/// storage that is itself JSON-based.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl TokenCodec for JsonCodec {
    fn encode(&self, token: &Token) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&token.0)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Token> {
        Ok(Token(serde_json::from_slice(bytes)?))
    }
}

/// Compact binary codec, useful when tokens are captured at high frequency and shipped over a
/// narrow channel (e.g. alongside every item in `Prefetch`'s internal queue, though that path
/// uses `Token` directly in memory and never pays the encode/decode cost).
#[derive(Debug, Clone, Default)]
pub struct BincodeCodec;

impl TokenCodec for BincodeCodec {
    fn encode(&self, token: &Token) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&token.0)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Token> {
        Ok(Token(bincode::deserialize(&bytes.to_vec())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let token = Token::from_value(&42usize).unwrap();
        let bytes = JsonCodec.encode(&token).unwrap();
        let restored = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(token, restored);
    }

    #[test]
    fn bincode_roundtrip() {
        let token = Token::object(vec![("pos", Token::from_value(&7usize).unwrap())]);
        let bytes = BincodeCodec.encode(&token).unwrap();
        let restored = BincodeCodec.decode(&bytes).unwrap();
        assert_eq!(token, restored);
    }

    #[test]
    fn object_field_roundtrip() {
        let inner = Token::from_value(&"pass-3").unwrap();
        let composite = Token::object(vec![("upstream", inner.clone()), ("pos", Token::from_value(&5usize).unwrap())]);
        assert_eq!(composite.field("upstream").unwrap(), inner);
        assert_eq!(composite.field("pos").unwrap().into_value::<usize>().unwrap(), 5);
    }

    #[test]
    fn array_elements_roundtrip() {
        let children = vec![
            Token::from_value(&1usize).unwrap(),
            Token::from_value(&2usize).unwrap(),
        ];
        let composite = Token::array(children.clone());
        assert_eq!(composite.elements().unwrap(), children);
    }
}
