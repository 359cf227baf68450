//! Flatten an upstream of collections into an upstream of their elements.

use crate::contract::Stage;
use crate::error::Result;
use crate::token::Token;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SelectManyState {
    /// Upstream token captured *before* the currently-open collection was pulled.
    upstream_before_current: Token,
    index: usize,
}

/// Upstream yields collections; this stage emits `selector(collection)`'s elements one at a time.
///
/// The currently-open collection is never serialized into the token — only the upstream token
/// from just before it was pulled, plus the index reached within it. On restore, the stage
/// restores upstream to that token, pulls the collection again, re-applies the selector (which
/// must be deterministic), and resumes at the saved index.
pub struct SelectMany<S, F, Out> {
    upstream: S,
    selector: F,
    current: Vec<Out>,
    index: usize,
    upstream_before_current: Token,
}

impl<S: Stage, Out> SelectMany<S, fn(S::Item) -> Vec<Out>, Out>
where
    S::Item: IntoIterator<Item = Out>,
{
    /// Default selector: identity (the collection's own items, in order).
    pub fn new(upstream: S) -> Self {
        fn identity<I: IntoIterator>(c: I) -> Vec<I::Item> {
            c.into_iter().collect()
        }
        SelectMany::with_selector(upstream, identity)
    }
}

impl<S: Stage, F, Out> SelectMany<S, F, Out>
where
    F: FnMut(S::Item) -> Vec<Out>,
{
    pub fn with_selector(upstream: S, selector: F) -> Self {
        let upstream_before_current = upstream.getstate();
        SelectMany {
            upstream,
            selector,
            current: Vec::new(),
            index: 0,
            upstream_before_current,
        }
    }
}

impl<S, F, Out> Stage for SelectMany<S, F, Out>
where
    S: Stage,
    F: FnMut(S::Item) -> Vec<Out>,
{
    type Item = Out;

    fn next(&mut self) -> Result<Option<Out>> {
        loop {
            if self.index < self.current.len() {
                let item = self.current.remove(0);
                self.index += 1;
                return Ok(Some(item));
            }
            self.upstream_before_current = self.upstream.getstate();
            match self.upstream.next()? {
                Some(collection) => {
                    self.current = (self.selector)(collection);
                    self.index = 0;
                }
                None => return Ok(None),
            }
        }
    }

    fn getstate(&self) -> Token {
        Token::from_value(&SelectManyState {
            upstream_before_current: self.upstream_before_current.clone(),
            index: self.index,
        })
        .expect("SelectManyState always serializes")
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        let state = match token {
            None => SelectManyState {
                upstream_before_current: {
                    self.upstream.setstate(None)?;
                    self.upstream.getstate()
                },
                index: 0,
            },
            Some(t) => t.into_value()?,
        };
        self.upstream.setstate(Some(state.upstream_before_current.clone()))?;
        self.upstream_before_current = state.upstream_before_current;
        self.current = match self.upstream.next()? {
            Some(collection) => (self.selector)(collection),
            None => Vec::new(),
        };
        self.index = 0;
        for _ in 0..state.index {
            if self.current.is_empty() {
                break;
            }
            self.current.remove(0);
            self.index += 1;
        }
        Ok(())
    }
}
