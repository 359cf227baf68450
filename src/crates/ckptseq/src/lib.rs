//! # ckptseq — checkpointable lazy sequences for data pipelines
//!
//! A [`Stage`] is a lazy, possibly-infinite sequence of items that can report its own position as
//! an opaque [`Token`] and be rewound to any previously-reported token. Composing stages (map,
//! zip, shuffle, batch, prefetch, ...) builds a data pipeline that is resumable end to end: the
//! checkpoint of a composed pipeline is just the nested checkpoints of its stages, so saving and
//! restoring mid-epoch training progress is a matter of calling [`Stage::getstate`] and
//! [`Stage::setstate`] on the outermost stage.
//!
//! ## Core trait
//!
//! [`Stage`] has three methods:
//!
//! - **`next()`** — pull the next item, or `Ok(None)` at end of stream. End-of-stream is never an
//!   error.
//! - **`getstate()`** — capture the current position as a [`Token`], cheap enough to call after
//!   every item.
//! - **`setstate(token)`** — rewind to a token previously returned by `getstate`, or to `None` for
//!   the stage's initial position.
//!
//! ## Module organization
//!
//! ### Sources
//! - [`native`] — [`NativeSource`], wraps an in-memory `Vec`
//! - [`chunked`] — [`ChunkedSource`], deterministic contiguous sharding of a fixed-length dataset
//! - [`permutation`] — [`InfinitePermutationSource`], infinite re-shuffled passes over a dataset
//!
//! ### Transforms
//! - [`map`] — [`Map`], [`SamplingRandomMap`]
//! - [`zip`] — [`Zip2`], [`Zip3`]
//! - [`select_many`] — [`SelectMany`], flatten one item into many
//! - [`fixed_batch`] — [`FixedBatch`], group into fixed-size batches
//! - [`recurrent`] — [`Recurrent`], stateful fold
//! - [`multiplex`] — [`Multiplex`], control-stream routing between data stages
//! - [`blockwise_shuffle`] — [`BlockwiseShuffle`], local shuffle over contiguous blocks
//! - [`prefetch`] — [`Prefetch`], background worker thread overlapping upstream work
//!
//! ### Foundations
//! - [`contract`] — the [`Stage`] trait itself and its invariants
//! - [`token`] — [`Token`] and the [`TokenCodec`] wire-format trait ([`JsonCodec`], [`BincodeCodec`])
//! - [`rng`] — deterministic seed derivation for stages that need reproducible randomness
//! - [`error`] — [`StageError`]
//!
//! ## Example
//!
//! ```rust
//! use ckptseq::{ChunkedSource, Map, Stage};
//!
//! let mut pipeline = Map::new(
//!     ChunkedSource::new((0..10).collect(), 3, 0).unwrap(),
//!     |x: i32| x * 2,
//! );
//!
//! let first_two: Vec<i32> = (0..2).map(|_| pipeline.next().unwrap().unwrap()).collect();
//! let token = pipeline.getstate();
//!
//! let mut rest = Vec::new();
//! while let Some(item) = pipeline.next().unwrap() {
//!     rest.push(item);
//! }
//!
//! pipeline.setstate(Some(token)).unwrap();
//! let mut replayed = Vec::new();
//! while let Some(item) = pipeline.next().unwrap() {
//!     replayed.push(item);
//! }
//! assert_eq!(rest, replayed);
//! ```

pub mod blockwise_shuffle;
pub mod chunked;
pub mod contract;
pub mod error;
pub mod fixed_batch;
pub mod map;
pub mod multiplex;
pub mod native;
pub mod permutation;
pub mod prefetch;
pub mod recurrent;
pub mod rng;
pub mod select_many;
pub mod token;
pub mod zip;

pub use blockwise_shuffle::BlockwiseShuffle;
pub use chunked::ChunkedSource;
pub use contract::Stage;
pub use error::{Result, StageError};
pub use fixed_batch::FixedBatch;
pub use map::{Map, SamplingRandomMap};
pub use multiplex::Multiplex;
pub use native::NativeSource;
pub use permutation::InfinitePermutationSource;
pub use prefetch::Prefetch;
pub use recurrent::Recurrent;
pub use rng::{derive_seed, rng_for};
pub use select_many::SelectMany;
pub use token::{BincodeCodec, JsonCodec, Token, TokenCodec};
pub use zip::{Zip2, Zip3};
