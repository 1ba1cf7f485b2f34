//! キャスリング権（CastlingRights）

use super::{Color, Square};

/// キャスリング権（4bit のビット集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: CastlingRights = CastlingRights(1);
    pub const WHITE_QUEENSIDE: CastlingRights = CastlingRights(2);
    pub const BLACK_KINGSIDE: CastlingRights = CastlingRights(4);
    pub const BLACK_QUEENSIDE: CastlingRights = CastlingRights(8);
    pub const ALL: CastlingRights = CastlingRights(15);

    /// 組み合わせの数（Zobrist テーブルサイズ）
    pub const NUM: usize = 16;

    #[inline]
    pub const fn kingside(color: Color) -> CastlingRights {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    #[inline]
    pub const fn queenside(color: Color) -> CastlingRights {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub const fn contains(self, other: CastlingRights) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn insert(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 | other.0)
    }

    #[inline]
    pub const fn remove(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 & !other.0)
    }

    /// この升に触れた（駒が出た・取られた）時に失われる権利
    #[inline]
    pub const fn lost_by(sq: Square) -> CastlingRights {
        match sq.raw() {
            0x00 => Self::WHITE_QUEENSIDE,
            0x07 => Self::WHITE_KINGSIDE,
            0x04 => CastlingRights(Self::WHITE_KINGSIDE.0 | Self::WHITE_QUEENSIDE.0),
            0x70 => Self::BLACK_QUEENSIDE,
            0x77 => Self::BLACK_KINGSIDE,
            0x74 => CastlingRights(Self::BLACK_KINGSIDE.0 | Self::BLACK_QUEENSIDE.0),
            _ => Self::NONE,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// FEN 表記（"KQkq" / "-"）
    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        for (right, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.contains(right) {
                s.push(c);
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castling_lost_by() {
        let all = CastlingRights::ALL;
        assert_eq!(
            all.remove(CastlingRights::lost_by(Square::E1)),
            CastlingRights::BLACK_KINGSIDE.insert(CastlingRights::BLACK_QUEENSIDE)
        );
        let rights = all.remove(CastlingRights::lost_by(Square::H8));
        assert!(!rights.contains(CastlingRights::BLACK_KINGSIDE));
        assert!(rights.contains(CastlingRights::BLACK_QUEENSIDE));
        assert_eq!(CastlingRights::lost_by(Square::new(3, 3)), CastlingRights::NONE);
    }

    #[test]
    fn test_castling_fen() {
        assert_eq!(CastlingRights::ALL.to_fen(), "KQkq");
        assert_eq!(CastlingRights::NONE.to_fen(), "-");
        assert_eq!(
            CastlingRights::WHITE_QUEENSIDE.insert(CastlingRights::BLACK_KINGSIDE).to_fen(),
            "Qk"
        );
    }
}
