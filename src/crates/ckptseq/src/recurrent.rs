//! Stateful fold over an upstream sequence.

use crate::contract::Stage;
use crate::error::Result;
use crate::token::Token;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(serde::Serialize, serde::Deserialize)]
struct RecurrentState<St> {
    upstream: Token,
    carried: St,
}

/// Applies `FnMut(State, Item) -> (State, Output)`, emitting `Output` and retaining the new
/// `State` for the next step. State must be plain-data (`Serialize + DeserializeOwned + Clone`)
/// since it is embedded directly into the checkpoint token.
pub struct Recurrent<S, St, F> {
    upstream: S,
    step: F,
    state: St,
    initial_state: St,
}

impl<S, St: Clone, F> Recurrent<S, St, F> {
    pub fn new(upstream: S, step: F, initial_state: St) -> Self {
        Recurrent {
            upstream,
            step,
            state: initial_state.clone(),
            initial_state,
        }
    }
}

impl<S, St, F, Out> Stage for Recurrent<S, St, F>
where
    S: Stage,
    St: Serialize + DeserializeOwned + Clone,
    F: FnMut(St, S::Item) -> (St, Out),
{
    type Item = Out;

    fn next(&mut self) -> Result<Option<Out>> {
        match self.upstream.next()? {
            Some(item) => {
                let (new_state, output) = (self.step)(self.state.clone(), item);
                self.state = new_state;
                Ok(Some(output))
            }
            None => Ok(None),
        }
    }

    fn getstate(&self) -> Token {
        Token::from_value(&RecurrentState {
            upstream: self.upstream.getstate(),
            carried: self.state.clone(),
        })
        .expect("RecurrentState always serializes")
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        match token {
            None => {
                self.upstream.setstate(None)?;
                self.state = self.initial_state.clone();
                Ok(())
            }
            Some(t) => {
                let state: RecurrentState<St> = t.into_value()?;
                self.upstream.setstate(Some(state.upstream))?;
                self.state = state.carried;
                Ok(())
            }
        }
    }
}
