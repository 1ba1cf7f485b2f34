//! 駒リスト
//!
//! 色・駒種ごとに、その駒がいる升を昇順で保持する。
//! 盤面配列と常に一致するよう `Position` の put/remove/move からのみ更新する。

use crate::types::Square;

/// 1種類の駒が取りうる最大数（成りで 2 + 8）
pub const MAX_PIECES: usize = 10;

/// 升の整列済みリスト
#[derive(Debug, Clone, Copy)]
pub struct PieceList {
    squares: [Square; MAX_PIECES],
    len: u8,
}

impl PartialEq for PieceList {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for PieceList {}

impl Default for PieceList {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceList {
    pub const fn new() -> Self {
        Self {
            squares: [Square::A1; MAX_PIECES],
            len: 0,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len as usize == MAX_PIECES
    }

    /// 先頭の升（キングの位置取得などに使う）
    #[inline]
    pub fn first(&self) -> Option<Square> {
        self.as_slice().first().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Square] {
        &self.squares[..self.len as usize]
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Square> + '_ {
        self.as_slice().iter().copied()
    }

    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        self.as_slice().contains(&sq)
    }

    /// 整列を保って挿入
    pub fn insert(&mut self, sq: Square) {
        debug_assert!(!self.is_full(), "piece list overflow");
        debug_assert!(!self.contains(sq));
        let len = self.len as usize;
        let mut i = len;
        while i > 0 && self.squares[i - 1] > sq {
            self.squares[i] = self.squares[i - 1];
            i -= 1;
        }
        self.squares[i] = sq;
        self.len += 1;
    }

    pub fn remove(&mut self, sq: Square) {
        let len = self.len as usize;
        let Some(pos) = self.squares[..len].iter().position(|&s| s == sq) else {
            debug_assert!(false, "square {sq} not in piece list");
            return;
        };
        self.squares.copy_within(pos + 1..len, pos);
        self.len -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_list_stays_sorted() {
        let mut list = PieceList::new();
        list.insert(Square::H8);
        list.insert(Square::A1);
        list.insert(Square::E2);
        assert_eq!(list.as_slice(), &[Square::A1, Square::E2, Square::H8]);

        list.remove(Square::E2);
        assert_eq!(list.as_slice(), &[Square::A1, Square::H8]);
        assert_eq!(list.first(), Some(Square::A1));
    }
}
