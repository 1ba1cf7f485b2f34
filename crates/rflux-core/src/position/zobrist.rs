//! Zobristハッシュ

use std::sync::LazyLock;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::types::{CastlingRights, Color, Piece, Square};

/// Zobrist乱数テーブル
///
/// 固定シードから生成するので、同じ局面は実行をまたいで同じキーになる。
pub struct Zobrist {
    /// 黒番のときにXORする
    pub side: u64,
    /// [Piece][Square]
    pub psq: [[u64; Square::NUM]; Piece::NUM],
    /// キャスリング権の組み合わせごと（権利なし = 0）
    pub castling: [u64; CastlingRights::NUM],
    /// アンパッサン升の筋ごと
    pub en_passant: [u64; 8],
}

impl Zobrist {
    fn new() -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);

        let side = rng.random::<u64>();

        let mut psq = [[0u64; Square::NUM]; Piece::NUM];
        for table in psq.iter_mut().skip(1) {
            for sq in Square::all() {
                table[sq.index()] = rng.random::<u64>();
            }
        }

        let mut castling = [0u64; CastlingRights::NUM];
        for key in castling.iter_mut().skip(1) {
            *key = rng.random::<u64>();
        }

        let mut en_passant = [0u64; 8];
        for key in en_passant.iter_mut() {
            *key = rng.random::<u64>();
        }

        Zobrist {
            side,
            psq,
            castling,
            en_passant,
        }
    }
}

/// グローバルZobristテーブル
pub static ZOBRIST: LazyLock<Zobrist> = LazyLock::new(Zobrist::new);

/// 駒×升のキー
#[inline]
pub fn zobrist_psq(piece: Piece, sq: Square) -> u64 {
    ZOBRIST.psq[piece.index()][sq.index()]
}

/// 手番のキー（白番なら 0）
#[inline]
pub fn zobrist_side(color: Color) -> u64 {
    match color {
        Color::White => 0,
        Color::Black => ZOBRIST.side,
    }
}

/// キャスリング権のキー
#[inline]
pub fn zobrist_castling(rights: CastlingRights) -> u64 {
    ZOBRIST.castling[rights.index()]
}

/// アンパッサン升のキー（筋で決まる）
#[inline]
pub fn zobrist_en_passant(sq: Square) -> u64 {
    ZOBRIST.en_passant[sq.file() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zobrist_keys_are_distinct() {
        let a = zobrist_psq(Piece::W_PAWN, Square::E2);
        let b = zobrist_psq(Piece::W_PAWN, Square::E7);
        let c = zobrist_psq(Piece::B_PAWN, Square::E2);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(zobrist_side(Color::Black), 0);
        assert_eq!(zobrist_side(Color::White), 0);
        assert_eq!(zobrist_castling(CastlingRights::NONE), 0);
    }

    #[test]
    fn test_zobrist_en_passant_by_file() {
        assert_eq!(zobrist_en_passant(Square::E2), zobrist_en_passant(Square::E7));
        assert_ne!(zobrist_en_passant(Square::D2), zobrist_en_passant(Square::E2));
    }
}
