//! 指し手リスト

use crate::types::{Move, MAX_MOVES};

/// 指し手とスコアのペア（オーダリング用）
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtMove {
    pub mv: Move,
    pub value: i32,
}

impl ExtMove {
    #[inline]
    pub const fn new(mv: Move, value: i32) -> Self {
        Self { mv, value }
    }
}

impl From<Move> for ExtMove {
    #[inline]
    fn from(mv: Move) -> Self {
        Self { mv, value: 0 }
    }
}

/// 指し手生成バッファ
pub struct MoveList {
    moves: [ExtMove; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[inline]
    pub const fn new() -> Self {
        Self {
            moves: [ExtMove::new(Move::NONE, 0); MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES, "move list overflow");
        if self.len < MAX_MOVES {
            self.moves[self.len] = ExtMove::new(mv, 0);
            self.len += 1;
        }
    }

    #[inline]
    pub fn at(&self, i: usize) -> Move {
        debug_assert!(i < self.len);
        self.moves[i].mv
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.iter().any(|ext| ext.mv == mv)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ExtMove> {
        self.moves[..self.len].iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[ExtMove] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [ExtMove] {
        &mut self.moves[..self.len]
    }

    /// スコアの降順に並べる（同点は生成順を保つ）
    pub fn sort_by_value(&mut self) {
        let moves = self.as_mut_slice();
        for i in 1..moves.len() {
            let tmp = moves[i];
            let mut j = i;
            while j > 0 && moves[j - 1].value < tmp.value {
                moves[j] = moves[j - 1];
                j -= 1;
            }
            moves[j] = tmp;
        }
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a ExtMove;
    type IntoIter = std::slice::Iter<'a, ExtMove>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves[..self.len].iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Piece, Square};

    #[test]
    fn test_movelist_push() {
        let mut list = MoveList::new();
        assert!(list.is_empty());
        let mv = Move::normal(Square::G1, Square::new(5, 2), Piece::W_KNIGHT, Piece::NONE);
        list.push(mv);
        assert_eq!(list.len(), 1);
        assert_eq!(list.at(0), mv);
        assert!(list.contains(mv));
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_sort_by_value_is_stable() {
        let a = Move::normal(Square::A2, Square::new(0, 2), Piece::W_PAWN, Piece::NONE);
        let b = Move::normal(Square::B2, Square::new(1, 2), Piece::W_PAWN, Piece::NONE);
        let c = Move::normal(Square::C2, Square::new(2, 2), Piece::W_PAWN, Piece::NONE);
        let mut list = MoveList::new();
        for (mv, value) in [(a, 5), (b, 10), (c, 5)] {
            list.push(mv);
            let last = list.len() - 1;
            list.as_mut_slice()[last].value = value;
        }
        list.sort_by_value();
        let order: Vec<Move> = list.iter().map(|ext| ext.mv).collect();
        assert_eq!(order, vec![b, a, c]);
    }
}
