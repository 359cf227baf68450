//! Route items from one of several data stages, selected by a control stage.

use crate::contract::Stage;
use crate::error::{Result, StageError};
use crate::token::Token;

/// Reads one index `i` from `control`, then one item from `data[i]`.
///
/// If `data[i]` is already exhausted when selected, `next()` returns
/// `Err(StageError::Underflow { index: i })` — this is deliberately not folded into end-of-stream,
/// so a control stream that keeps selecting a drained data stream cannot be mistaken for the
/// multiplexer itself having finished.
pub struct Multiplex<C, D> {
    control: C,
    data: Vec<D>,
}

impl<C, D> Multiplex<C, D> {
    pub fn new(control: C, data: Vec<D>) -> Self {
        Multiplex { control, data }
    }
}

impl<C, D> Stage for Multiplex<C, D>
where
    C: Stage<Item = usize>,
    D: Stage,
{
    type Item = D::Item;

    fn next(&mut self) -> Result<Option<D::Item>> {
        let index = match self.control.next()? {
            Some(i) => i,
            None => return Ok(None),
        };
        match self.data[index].next()? {
            Some(item) => Ok(Some(item)),
            None => Err(StageError::Underflow { index }),
        }
    }

    fn getstate(&self) -> Token {
        let mut children = vec![self.control.getstate()];
        children.extend(self.data.iter().map(Stage::getstate));
        Token::array(children)
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        match token {
            None => {
                self.control.setstate(None)?;
                for d in &mut self.data {
                    d.setstate(None)?;
                }
            }
            Some(t) => {
                let children = t.elements()?;
                self.control.setstate(Some(children[0].clone()))?;
                for (d, child) in self.data.iter_mut().zip(children.iter().skip(1)) {
                    d.setstate(Some(child.clone()))?;
                }
            }
        }
        Ok(())
    }
}
