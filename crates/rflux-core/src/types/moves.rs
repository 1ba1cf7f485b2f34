//! 指し手（Move）

use super::{Piece, PieceType, Square};

/// 指し手の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// 通常の移動（捕獲を含む）
    Normal = 0,
    /// 歩の2升前進
    PawnDouble = 1,
    /// 成り（捕獲を含む）
    Promotion = 2,
    /// アンパッサン
    EnPassant = 3,
    /// キャスリング（キングの移動として表現）
    Castling = 4,
    /// 探索用のパス
    Null = 5,
}

impl MoveKind {
    #[inline]
    const fn from_bits(n: u32) -> MoveKind {
        match n {
            1 => MoveKind::PawnDouble,
            2 => MoveKind::Promotion,
            3 => MoveKind::EnPassant,
            4 => MoveKind::Castling,
            5 => MoveKind::Null,
            _ => MoveKind::Normal,
        }
    }
}

/// 指し手（32bit）
///
/// - bit 0-6:   移動元 (from, 0x88)
/// - bit 7-13:  移動先 (to, 0x88)
/// - bit 14-17: 動かす駒
/// - bit 18-21: 取られる駒（なければ 0）
/// - bit 22-24: 成り先の駒種（なければ 0）
/// - bit 25-27: 種類（MoveKind）
///
/// 生成後は不変。捕獲先を差し替えたい時は `with_target` で別の値を作る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Move(u32);

impl Move {
    /// 無効な指し手
    pub const NONE: Move = Move(0);
    /// 探索用 null move
    pub const NULL: Move = Move((MoveKind::Null as u32) << Self::KIND_SHIFT);

    const SQ_MASK: u32 = 0x7F;
    const TO_SHIFT: u32 = 7;
    const PIECE_SHIFT: u32 = 14;
    const CAPTURED_SHIFT: u32 = 18;
    const PIECE_MASK: u32 = 0x0F;
    const PROMOTION_SHIFT: u32 = 22;
    const PROMOTION_MASK: u32 = 0x07;
    const KIND_SHIFT: u32 = 25;
    const KIND_MASK: u32 = 0x07;

    /// 指し手を生成
    #[inline]
    pub const fn new(
        kind: MoveKind,
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
        promotion: Option<PieceType>,
    ) -> Move {
        let promo = match promotion {
            Some(pt) => pt as u32,
            None => 0,
        };
        Move(
            from.raw() as u32
                | (to.raw() as u32) << Self::TO_SHIFT
                | (piece.raw() as u32) << Self::PIECE_SHIFT
                | (captured.raw() as u32) << Self::CAPTURED_SHIFT
                | promo << Self::PROMOTION_SHIFT
                | (kind as u32) << Self::KIND_SHIFT,
        )
    }

    /// 通常の移動
    #[inline]
    pub const fn normal(from: Square, to: Square, piece: Piece, captured: Piece) -> Move {
        Move::new(MoveKind::Normal, from, to, piece, captured, None)
    }

    /// 移動元
    #[inline]
    pub const fn from(self) -> Square {
        match Square::from_index((self.0 & Self::SQ_MASK) as i32) {
            Some(sq) => sq,
            None => Square::A1,
        }
    }

    /// 移動先
    #[inline]
    pub const fn to(self) -> Square {
        match Square::from_index(((self.0 >> Self::TO_SHIFT) & Self::SQ_MASK) as i32) {
            Some(sq) => sq,
            None => Square::A1,
        }
    }

    /// 動かす駒
    #[inline]
    pub const fn piece(self) -> Piece {
        Piece::from_raw(((self.0 >> Self::PIECE_SHIFT) & Self::PIECE_MASK) as u8)
    }

    /// 動かす駒の駒種
    #[inline]
    pub const fn piece_type(self) -> Option<PieceType> {
        self.piece().piece_type()
    }

    /// 取られる駒（アンパッサンでは取られる歩）
    #[inline]
    pub const fn captured(self) -> Piece {
        Piece::from_raw(((self.0 >> Self::CAPTURED_SHIFT) & Self::PIECE_MASK) as u8)
    }

    /// 成り先の駒種
    #[inline]
    pub const fn promotion(self) -> Option<PieceType> {
        PieceType::from_u8(((self.0 >> Self::PROMOTION_SHIFT) & Self::PROMOTION_MASK) as u8)
    }

    /// 種類
    #[inline]
    pub const fn kind(self) -> MoveKind {
        MoveKind::from_bits((self.0 >> Self::KIND_SHIFT) & Self::KIND_MASK)
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    /// 捕獲手か（アンパッサンを含む）
    #[inline]
    pub const fn is_capture(self) -> bool {
        self.captured().is_some()
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        matches!(self.kind(), MoveKind::Promotion)
    }

    /// 捕獲でも成りでもない手
    #[inline]
    pub const fn is_quiet(self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    /// 移動先と取られる駒を差し替えた指し手
    #[inline]
    pub const fn with_target(self, to: Square, captured: Piece) -> Move {
        Move::new(self.kind(), self.from(), to, self.piece(), captured, self.promotion())
    }

    /// 成り先を差し替えた指し手
    #[inline]
    pub const fn with_promotion(self, pt: PieceType) -> Move {
        Move::new(MoveKind::Promotion, self.from(), self.to(), self.piece(), self.captured(), Some(pt))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Move {
        Move(raw)
    }

    /// 座標形式の文字列（"e2e4", "e7e8q"、null move は "0000"）
    pub fn to_uci(self) -> String {
        if self.is_none() || self.is_null() {
            return "0000".to_string();
        }
        let mut s = format!("{}{}", self.from(), self.to());
        if let Some(pt) = self.promotion() {
            s.push(pt.to_char());
        }
        s
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uci())
    }
}
