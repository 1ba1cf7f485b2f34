//! 駒種（PieceType）と駒（Piece）

use super::Color;

/// 駒種
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceType {
    /// 駒種の数（配列サイズ用に 0 を空けて +1）
    pub const NUM: usize = 7;

    /// 全ての駒種
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// 成りで選べる駒種（価値の高い順）
    pub const PROMOTIONS: [PieceType; 4] =
        [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

    /// 駒の価値（センチポーン）
    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 325,
            PieceType::Bishop => 325,
            PieceType::Rook => 500,
            PieceType::Queen => 975,
            PieceType::King => 20000,
        }
    }

    /// 走り駒かどうか
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Rook | PieceType::Queen)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// u8 から変換（0 や範囲外は None）
    #[inline]
    pub const fn from_u8(n: u8) -> Option<PieceType> {
        match n {
            1 => Some(PieceType::Pawn),
            2 => Some(PieceType::Knight),
            3 => Some(PieceType::Bishop),
            4 => Some(PieceType::Rook),
            5 => Some(PieceType::Queen),
            6 => Some(PieceType::King),
            _ => None,
        }
    }

    /// 小文字の駒文字（FEN / 成り指定用）
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    /// 駒文字から変換（大文字小文字を区別しない）
    #[inline]
    pub const fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }
}

/// 駒（手番 + 駒種）
///
/// 4bit: bit0-2 が駒種、bit3 が手番（黒なら1）。0 は空升。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    /// 空升
    pub const NONE: Piece = Piece(0);
    /// 駒の種類数（配列サイズ用、4bit）
    pub const NUM: usize = 16;

    pub const W_PAWN: Piece = Piece::new(Color::White, PieceType::Pawn);
    pub const W_KNIGHT: Piece = Piece::new(Color::White, PieceType::Knight);
    pub const W_BISHOP: Piece = Piece::new(Color::White, PieceType::Bishop);
    pub const W_ROOK: Piece = Piece::new(Color::White, PieceType::Rook);
    pub const W_QUEEN: Piece = Piece::new(Color::White, PieceType::Queen);
    pub const W_KING: Piece = Piece::new(Color::White, PieceType::King);
    pub const B_PAWN: Piece = Piece::new(Color::Black, PieceType::Pawn);
    pub const B_KNIGHT: Piece = Piece::new(Color::Black, PieceType::Knight);
    pub const B_BISHOP: Piece = Piece::new(Color::Black, PieceType::Bishop);
    pub const B_ROOK: Piece = Piece::new(Color::Black, PieceType::Rook);
    pub const B_QUEEN: Piece = Piece::new(Color::Black, PieceType::Queen);
    pub const B_KING: Piece = Piece::new(Color::Black, PieceType::King);

    /// 手番と駒種から生成
    #[inline]
    pub const fn new(color: Color, pt: PieceType) -> Piece {
        Piece(((color as u8) << 3) | pt as u8)
    }

    /// 生の値から生成（4bit、不正な駒種なら NONE）
    #[inline]
    pub const fn from_raw(raw: u8) -> Piece {
        match PieceType::from_u8(raw & 7) {
            Some(_) => Piece(raw & 0x0F),
            None => Piece::NONE,
        }
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    /// 駒種（空升では None）
    #[inline]
    pub const fn piece_type(self) -> Option<PieceType> {
        PieceType::from_u8(self.0 & 7)
    }

    /// 手番（空升に対して呼ぶと White を返す）
    #[inline]
    pub const fn color(self) -> Color {
        if self.0 & 8 != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// 指定の手番・駒種か
    #[inline]
    pub const fn is(self, color: Color, pt: PieceType) -> bool {
        self.0 == Piece::new(color, pt).0
    }

    /// 駒の価値（空升は 0）
    #[inline]
    pub const fn value(self) -> i32 {
        match self.piece_type() {
            Some(pt) => pt.value(),
            None => 0,
        }
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// FEN 文字（白は大文字）
    pub fn to_char(self) -> char {
        match self.piece_type() {
            Some(pt) if self.color() == Color::White => pt.to_char().to_ascii_uppercase(),
            Some(pt) => pt.to_char(),
            None => '.',
        }
    }

    /// FEN 文字から生成
    pub fn from_char(c: char) -> Option<Piece> {
        let pt = PieceType::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, pt))
    }
}
