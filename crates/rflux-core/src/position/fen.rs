//! FEN形式の解析・出力

use thiserror::Error;

use crate::types::{CastlingRights, Color, Piece, PieceType, Square};

use super::zobrist::{zobrist_castling, zobrist_en_passant, ZOBRIST};
use super::Position;

/// 平手初期局面
pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN解析エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN has {0} fields, expected 4 to 6")]
    FieldCount(usize),
    #[error("invalid board description: {0}")]
    Board(String),
    #[error("invalid piece character '{0}'")]
    PieceChar(char),
    #[error("too many pieces of one kind")]
    TooManyPieces,
    #[error("each side must have exactly one king")]
    KingCount,
    #[error("pawn on the first or last rank")]
    PawnOnBackRank,
    #[error("invalid side to move: {0}")]
    SideToMove(String),
    #[error("invalid castling rights: {0}")]
    Castling(String),
    #[error("invalid en passant square: {0}")]
    EnPassant(String),
    #[error("invalid move counter: {0}")]
    Counter(String),
    #[error("side not to move is in check")]
    OpponentInCheck,
}

impl Position {
    /// 平手初期局面
    pub fn startpos() -> Self {
        match Self::from_fen(STARTPOS_FEN) {
            Ok(pos) => pos,
            Err(e) => unreachable!("start position FEN is valid: {e}"),
        }
    }

    /// FEN文字列から局面を作る
    ///
    /// 手数フィールドは省略可（0, 1 とみなす）。
    /// キング・ルークが初期位置にないキャスリング権は捨てる。
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }

        let mut pos = Position::empty();
        pos.parse_board(fields[0])?;

        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        pos.castling = parse_castling(fields[2])?;
        pos.castling = pos.sanitize_castling(pos.castling);

        pos.ep_square = match fields[3] {
            "-" => None,
            s => {
                let sq = Square::parse(s).ok_or_else(|| FenError::EnPassant(s.to_string()))?;
                let expected_rank = match pos.side_to_move {
                    Color::White => 5,
                    Color::Black => 2,
                };
                if sq.rank() != expected_rank {
                    return Err(FenError::EnPassant(s.to_string()));
                }
                Some(sq)
            }
        };

        pos.half_move_clock = match fields.get(4) {
            Some(s) => s.parse().map_err(|_| FenError::Counter(s.to_string()))?,
            None => 0,
        };
        let full_move: i32 = match fields.get(5) {
            Some(s) => s.parse().map_err(|_| FenError::Counter(s.to_string()))?,
            None => 1,
        };
        if pos.half_move_clock < 0 || full_move < 1 {
            return Err(FenError::Counter(format!("{} {}", pos.half_move_clock, full_move)));
        }
        pos.game_ply = 2 * (full_move - 1) + i32::from(pos.side_to_move == Color::Black);

        // put_piece(update=true) が駒の分を加えているので、局面状態の分を足す
        if pos.side_to_move == Color::Black {
            pos.key ^= ZOBRIST.side;
            pos.pawn_key ^= ZOBRIST.side;
        }
        pos.key ^= zobrist_castling(pos.castling);
        if let Some(ep) = pos.ep_square {
            pos.key ^= zobrist_en_passant(ep);
        }

        let them = !pos.side_to_move;
        if pos.is_attacked(pos.king_square(them), pos.side_to_move) {
            return Err(FenError::OpponentInCheck);
        }
        Ok(pos)
    }

    fn parse_board(&mut self, board: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = board.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Board(board.to_string()));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(n) = c.to_digit(10) {
                    if !(1..=8).contains(&n) {
                        return Err(FenError::Board(board.to_string()));
                    }
                    file += n as u8;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenError::PieceChar(c))?;
                    if file >= 8 {
                        return Err(FenError::Board(board.to_string()));
                    }
                    let pt = piece.piece_type().ok_or(FenError::PieceChar(c))?;
                    if pt == PieceType::Pawn && (rank == 0 || rank == 7) {
                        return Err(FenError::PawnOnBackRank);
                    }
                    if self.pieces(piece.color(), pt).is_full() {
                        return Err(FenError::TooManyPieces);
                    }
                    self.put_piece(Square::new(file, rank), piece, true);
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::Board(board.to_string()));
                }
            }
            if file != 8 {
                return Err(FenError::Board(board.to_string()));
            }
        }
        for color in Color::ALL {
            if self.pieces(color, PieceType::King).len() != 1 {
                return Err(FenError::KingCount);
            }
        }
        Ok(())
    }

    /// 駒の配置と矛盾するキャスリング権を落とす
    fn sanitize_castling(&self, rights: CastlingRights) -> CastlingRights {
        let mut result = rights;
        let checks = [
            (CastlingRights::WHITE_KINGSIDE, Square::E1, Square::H1, Color::White),
            (CastlingRights::WHITE_QUEENSIDE, Square::E1, Square::A1, Color::White),
            (CastlingRights::BLACK_KINGSIDE, Square::E8, Square::H8, Color::Black),
            (CastlingRights::BLACK_QUEENSIDE, Square::E8, Square::A8, Color::Black),
        ];
        for (right, king, rook, color) in checks {
            if rights.contains(right)
                && (self.piece_on(king) != Piece::new(color, PieceType::King)
                    || self.piece_on(rook) != Piece::new(color, PieceType::Rook))
            {
                result = result.remove(right);
            }
        }
        result
    }

    /// FEN文字列に変換
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let piece = self.piece_on(Square::new(file, rank));
                if piece.is_none() {
                    empty += 1;
                } else {
                    if empty > 0 {
                        fen.push(char::from(b'0' + empty));
                        empty = 0;
                    }
                    fen.push(piece.to_char());
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(self.side_to_move.to_char());
        fen.push(' ');
        fen.push_str(&self.castling.to_fen());
        fen.push(' ');
        match self.ep_square {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.half_move_clock, self.full_move_number()));
        fen
    }
}

fn parse_castling(s: &str) -> Result<CastlingRights, FenError> {
    if s == "-" {
        return Ok(CastlingRights::NONE);
    }
    let mut rights = CastlingRights::NONE;
    for c in s.chars() {
        let right = match c {
            'K' => CastlingRights::WHITE_KINGSIDE,
            'Q' => CastlingRights::WHITE_QUEENSIDE,
            'k' => CastlingRights::BLACK_KINGSIDE,
            'q' => CastlingRights::BLACK_QUEENSIDE,
            _ => return Err(FenError::Castling(s.to_string())),
        };
        rights = rights.insert(right);
    }
    Ok(rights)
}
