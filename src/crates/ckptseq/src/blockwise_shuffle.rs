//! Local reservoir-style shuffle over contiguous blocks of a finite upstream.

use crate::contract::Stage;
use crate::error::{Result, StageError};
use crate::rng::rng_for;
use crate::token::Token;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlockState {
    upstream_at_block_start: Token,
    block_index: u64,
    pos_in_block: usize,
}

/// Consumes upstream in contiguous blocks of up to `block_size` items; within each block, emits
/// the items in an order drawn from a permutation seeded by `(seed, block_index)`. The final
/// block may be shorter. Across the whole stream the multiset of emitted items equals the
/// upstream multiset.
///
/// State is the upstream token captured at the *start* of the current block, the block index, and
/// the position within the shuffled block — never the shuffled block's contents. On restore, the
/// block is re-pulled from upstream and re-shuffled from the derived seed.
pub struct BlockwiseShuffle<S: Stage> {
    upstream: S,
    block_size: usize,
    seed: u64,
    upstream_at_block_start: Token,
    block_index: u64,
    block: Vec<S::Item>,
    pos_in_block: usize,
}

impl<S: Stage> BlockwiseShuffle<S>
where
    S::Item: Clone,
{
    pub fn new(upstream: S, block_size: usize, seed: u64) -> Result<Self> {
        if block_size == 0 {
            return Err(StageError::InvalidArgument(
                "block_size must be at least 1".to_string(),
            ));
        }
        let upstream_at_block_start = upstream.getstate();
        let mut stage = BlockwiseShuffle {
            upstream,
            block_size,
            seed,
            upstream_at_block_start,
            block_index: 0,
            block: Vec::new(),
            pos_in_block: 0,
        };
        stage.load_block()?;
        Ok(stage)
    }

    fn load_block(&mut self) -> Result<()> {
        self.upstream_at_block_start = self.upstream.getstate();
        let mut block = Vec::with_capacity(self.block_size);
        for _ in 0..self.block_size {
            match self.upstream.next()? {
                Some(item) => block.push(item),
                None => break,
            }
        }
        let mut order: Vec<usize> = (0..block.len()).collect();
        let mut rng = rng_for(self.seed, self.block_index);
        order.shuffle(&mut rng);
        self.block = order.into_iter().map(|i| block[i].clone()).collect();
        self.pos_in_block = 0;
        Ok(())
    }
}

impl<S: Stage> Stage for BlockwiseShuffle<S>
where
    S::Item: Clone,
{
    type Item = S::Item;

    fn next(&mut self) -> Result<Option<S::Item>> {
        if self.pos_in_block >= self.block.len() {
            self.block_index += 1;
            self.load_block()?;
            if self.block.is_empty() {
                return Ok(None);
            }
        }
        let item = self.block[self.pos_in_block].clone();
        self.pos_in_block += 1;
        Ok(Some(item))
    }

    fn getstate(&self) -> Token {
        Token::from_value(&BlockState {
            upstream_at_block_start: self.upstream_at_block_start.clone(),
            block_index: self.block_index,
            pos_in_block: self.pos_in_block,
        })
        .expect("BlockState always serializes")
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        match token {
            None => {
                self.upstream.setstate(None)?;
                self.block_index = 0;
                self.load_block()?;
            }
            Some(t) => {
                let state: BlockState = t.into_value()?;
                self.upstream.setstate(Some(state.upstream_at_block_start.clone()))?;
                self.block_index = state.block_index;
                self.load_block()?;
                self.pos_in_block = state.pos_in_block.min(self.block.len());
            }
        }
        Ok(())
    }
}
