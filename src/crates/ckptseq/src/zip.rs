//! Parallel tuple composition over two or three upstream stages.

use crate::contract::Stage;
use crate::error::Result;
use crate::token::Token;

/// Emits `(a, b)` pairs; ends as soon as either upstream ends.
pub struct Zip2<A, B> {
    a: A,
    b: B,
}

impl<A, B> Zip2<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Zip2 { a, b }
    }
}

impl<A: Stage, B: Stage> Stage for Zip2<A, B> {
    type Item = (A::Item, B::Item);

    fn next(&mut self) -> Result<Option<Self::Item>> {
        match (self.a.next()?, self.b.next()?) {
            (Some(a), Some(b)) => Ok(Some((a, b))),
            _ => Ok(None),
        }
    }

    fn getstate(&self) -> Token {
        Token::array(vec![self.a.getstate(), self.b.getstate()])
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        match token {
            None => {
                self.a.setstate(None)?;
                self.b.setstate(None)?;
            }
            Some(t) => {
                let children = t.elements()?;
                self.a.setstate(Some(children[0].clone()))?;
                self.b.setstate(Some(children[1].clone()))?;
            }
        }
        Ok(())
    }
}

/// Emits `(a, b, c)` triples; ends as soon as any upstream ends.
pub struct Zip3<A, B, C> {
    a: A,
    b: B,
    c: C,
}

impl<A, B, C> Zip3<A, B, C> {
    pub fn new(a: A, b: B, c: C) -> Self {
        Zip3 { a, b, c }
    }
}

impl<A: Stage, B: Stage, C: Stage> Stage for Zip3<A, B, C> {
    type Item = (A::Item, B::Item, C::Item);

    fn next(&mut self) -> Result<Option<Self::Item>> {
        match (self.a.next()?, self.b.next()?, self.c.next()?) {
            (Some(a), Some(b), Some(c)) => Ok(Some((a, b, c))),
            _ => Ok(None),
        }
    }

    fn getstate(&self) -> Token {
        Token::array(vec![self.a.getstate(), self.b.getstate(), self.c.getstate()])
    }

    fn setstate(&mut self, token: Option<Token>) -> Result<()> {
        match token {
            None => {
                self.a.setstate(None)?;
                self.b.setstate(None)?;
                self.c.setstate(None)?;
            }
            Some(t) => {
                let children = t.elements()?;
                self.a.setstate(Some(children[0].clone()))?;
                self.b.setstate(Some(children[1].clone()))?;
                self.c.setstate(Some(children[2].clone()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::drain;
    use crate::native::NativeSource;

    #[test]
    fn pairs() {
        let mut stage = Zip2::new(
            NativeSource::new((0..5).collect::<Vec<i32>>()),
            NativeSource::new((0..5).map(|x| x * x).collect::<Vec<i32>>()),
        );
        assert_eq!(
            drain(&mut stage).unwrap(),
            vec![(0, 0), (1, 1), (2, 4), (3, 9), (4, 16)]
        );
    }

    #[test]
    fn ends_with_shortest() {
        let mut stage = Zip2::new(
            NativeSource::new((0..10).collect::<Vec<i32>>()),
            NativeSource::new((0..4).collect::<Vec<i32>>()),
        );
        assert_eq!(drain(&mut stage).unwrap().len(), 4);
    }

    #[test]
    fn triples_replay() {
        let mut stage = Zip3::new(
            NativeSource::new((0..9).collect::<Vec<i32>>()),
            NativeSource::new((0..9).map(|x| x * x).collect::<Vec<i32>>()),
            NativeSource::new((0..9).map(|x| x * x * x).collect::<Vec<i32>>()),
        );
        for _ in 0..3 {
            stage.next().unwrap();
        }
        let token = stage.getstate();
        let rest = drain(&mut stage).unwrap();
        stage.setstate(Some(token)).unwrap();
        assert_eq!(drain(&mut stage).unwrap(), rest);
    }
}
