//! 升（Square）
//!
//! 0x88 表現: 8x8 の盤を 16x8 のアドレス空間に埋め込み、
//! `index & 0x88 != 0` で盤外を判定する。
//! rank = index >> 4, file = index & 7。

use super::Color;

/// 升（0x88 インデックス）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Square(u8);

macro_rules! squares {
    ($($name:ident = $idx:expr),* $(,)?) => {
        $(pub const $name: Square = Square($idx);)*
    };
}

impl Square {
    /// 0x88 配列のスロット数
    pub const NUM: usize = 128;

    squares! {
        A1 = 0x00, B1 = 0x01, C1 = 0x02, D1 = 0x03, E1 = 0x04, F1 = 0x05, G1 = 0x06, H1 = 0x07,
        A2 = 0x10, B2 = 0x11, C2 = 0x12, D2 = 0x13, E2 = 0x14, F2 = 0x15, G2 = 0x16, H2 = 0x17,
        A7 = 0x60, B7 = 0x61, C7 = 0x62, D7 = 0x63, E7 = 0x64, F7 = 0x65, G7 = 0x66, H7 = 0x67,
        A8 = 0x70, B8 = 0x71, C8 = 0x72, D8 = 0x73, E8 = 0x74, F8 = 0x75, G8 = 0x76, H8 = 0x77,
    }

    /// 盤上かどうか（0x88 判定）
    #[inline]
    pub const fn is_on_board(index: i32) -> bool {
        index >= 0 && index < Self::NUM as i32 && (index & 0x88) == 0
    }

    /// 筋と段から生成（0..8）
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Square {
        debug_assert!(file < 8 && rank < 8);
        Square((rank << 4) | file)
    }

    /// 0x88 インデックスから生成（盤外なら None）
    #[inline]
    pub const fn from_index(index: i32) -> Option<Square> {
        if Self::is_on_board(index) {
            Some(Square(index as u8))
        } else {
            None
        }
    }

    /// 差分を加えた升（盤外なら None）
    #[inline]
    pub const fn offset(self, delta: i32) -> Option<Square> {
        Self::from_index(self.0 as i32 + delta)
    }

    /// 生の 0x88 インデックス
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// 配列アクセス用
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 筋（0 = a）
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    /// 段（0 = 1段目）
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 4
    }

    /// 手番から見た段（白の1段目 = 黒の8段目 = 0）
    #[inline]
    pub const fn relative_rank(self, color: Color) -> u8 {
        match color {
            Color::White => self.rank(),
            Color::Black => 7 - self.rank(),
        }
    }

    /// 全ての盤上の升（a1, b1, ..., h8）
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square::new(file, rank)))
    }

    /// "e4" 形式から解析
    pub fn parse(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Square::new(file, rank))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_on_board() {
        assert!(Square::is_on_board(0x00));
        assert!(Square::is_on_board(0x77));
        assert!(!Square::is_on_board(0x08));
        assert!(!Square::is_on_board(0x80));
        assert!(!Square::is_on_board(-1));
        assert!(!Square::is_on_board(0x78));
    }

    #[test]
    fn test_square_offset() {
        assert_eq!(Square::E1.offset(16), Some(Square::new(4, 1)));
        assert_eq!(Square::H1.offset(1), None);
        assert_eq!(Square::A1.offset(-1), None);
        assert_eq!(Square::A8.offset(16), None);
    }

    #[test]
    fn test_square_parse_display() {
        let sq = Square::parse("e4").unwrap();
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.to_string(), "e4");
        assert_eq!(Square::parse("i1"), None);
        assert_eq!(Square::parse("a9"), None);
        assert_eq!(Square::parse("e"), None);
    }

    #[test]
    fn test_square_relative_rank() {
        assert_eq!(Square::E2.relative_rank(Color::White), 1);
        assert_eq!(Square::E2.relative_rank(Color::Black), 6);
        assert_eq!(Square::A8.relative_rank(Color::Black), 0);
    }

    #[test]
    fn test_square_all() {
        let all: Vec<Square> = Square::all().collect();
        assert_eq!(all.len(), 64);
        assert_eq!(all[0], Square::A1);
        assert_eq!(all[63], Square::H8);
        assert!(all.iter().all(|sq| Square::is_on_board(sq.raw() as i32)));
    }
}
