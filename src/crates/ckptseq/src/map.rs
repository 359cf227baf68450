//! Per-item transforms: a pure [`Map`] and a seed-driven [`SamplingRandomMap`].

use crate::contract::Stage;
use crate::error::Result;
use crate::rng::rng_for;
use crate::token::Token;
use rand_chacha::ChaCha8Rng;

/// Applies a pure `FnMut(Item) -> Out` to every upstream item.
///
/// State is the upstream token alone: a closure with internal mutable state would break
/// determinism under seeding (invariant 3), so the contract requires the closure to be a pure
/// function of its argument; nothing here can enforce that at compile time.
pub struct Map<S, F> {
    upstream: S,
    transform: F,
}

impl<S, F> Map<S, F> {
    pub fn new(upstream: S, transform: F) -> Self {
        Map { upstream, transform }
    }
}

impl<S, F, Out> Stage for Map<S, F>
where
    S: Stage,
    F: FnMut(S::Item) -> Out,
{
    type Item = Out;

    fn next(&mut self) -> Result<Option<Out>> {
        match self.upstream.next()? {
            Some(item) => Ok(Some((self.transform)(item))),
            None => Ok(None),
        }
    }

    fn getstate(&self) -> Token {
        self.upstream.getstate()
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        self.upstream.setstate(token)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SamplingState {
    upstream: crate::token::Token,
    item_index: u64,
}

/// Applies `FnMut(&mut ChaCha8Rng, Item) -> Out`, invoked with a generator freshly seeded per item
/// from `(base_seed, item_index)`. State is the upstream token plus the next item index, never
/// generator internals, so restoration is exact without serializing RNG state.
pub struct SamplingRandomMap<S, F> {
    upstream: S,
    transform: F,
    base_seed: u64,
    item_index: u64,
}

impl<S, F> SamplingRandomMap<S, F> {
    pub fn new(upstream: S, transform: F, seed: u64) -> Self {
        SamplingRandomMap {
            upstream,
            transform,
            base_seed: seed,
            item_index: 0,
        }
    }
}

impl<S, F, Out> Stage for SamplingRandomMap<S, F>
where
    S: Stage,
    F: FnMut(&mut ChaCha8Rng, S::Item) -> Out,
{
    type Item = Out;

    fn next(&mut self) -> Result<Option<Out>> {
        match self.upstream.next()? {
            Some(item) => {
                let mut rng = rng_for(self.base_seed, self.item_index);
                self.item_index += 1;
                Ok(Some((self.transform)(&mut rng, item)))
            }
            None => Ok(None),
        }
    }

    fn getstate(&self) -> Token {
        Token::from_value(&SamplingState {
            upstream: self.upstream.getstate(),
            item_index: self.item_index,
        })
        .expect("SamplingState always serializes")
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        match token {
            None => {
                self.upstream.setstate(None)?;
                self.item_index = 0;
            }
            Some(t) => {
                let state: SamplingState = t.into_value()?;
                self.upstream.setstate(Some(state.upstream))?;
                self.item_index = state.item_index;
            }
        }
        Ok(())
    }
}
