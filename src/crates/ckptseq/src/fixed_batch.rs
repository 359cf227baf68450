//! Group upstream items into fixed-size batches.

use crate::contract::Stage;
use crate::error::{Result, StageError};
use crate::token::Token;

/// Groups upstream items into `Vec<Item>` batches of length `batch_size`. The final batch may be
/// shorter if upstream is finite. State is the upstream token alone — the partial batch is
/// rebuilt on restore by pulling from upstream again.
pub struct FixedBatch<S> {
    upstream: S,
    batch_size: usize,
}

impl<S> FixedBatch<S> {
    pub fn new(upstream: S, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(StageError::InvalidArgument(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(FixedBatch { upstream, batch_size })
    }
}

impl<S: Stage> Stage for FixedBatch<S> {
    type Item = Vec<S::Item>;

    fn next(&mut self) -> Result<Option<Vec<S::Item>>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        for _ in 0..self.batch_size {
            match self.upstream.next()? {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }

    fn getstate(&self) -> Token {
        self.upstream.getstate()
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        self.upstream.setstate(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::drain;
    use crate::native::NativeSource;

    #[test]
    fn groups_with_short_final_batch() {
        let mut stage = FixedBatch::new(NativeSource::new((0..7).collect::<Vec<i32>>()), 3).unwrap();
        assert_eq!(
            drain(&mut stage).unwrap(),
            vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]
        );
    }

    #[test]
    fn checkpoint_after_first_batch() {
        let mut stage = FixedBatch::new(NativeSource::new((0..7).collect::<Vec<i32>>()), 3).unwrap();
        stage.next().unwrap();
        let token = stage.getstate();
        stage.setstate(Some(token)).unwrap();
        assert_eq!(drain(&mut stage).unwrap(), vec![vec![3, 4, 5], vec![6]]);
    }

    #[test]
    fn zero_batch_size_is_invalid_argument() {
        assert!(matches!(
            FixedBatch::new(NativeSource::new(vec![0]), 0),
            Err(StageError::InvalidArgument(_))
        ));
    }
}
