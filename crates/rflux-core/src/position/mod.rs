//! 局面表現モジュール
//!
//! チェスの局面を表現し、手の実行・巻き戻しを行う。
//!
//! - `Position`: 局面本体（0x88 盤面配列・駒リスト・駒価値集計・手番・キャスリング権）
//! - `StateInfo`: 1手分の巻き戻し情報（ハッシュ、アンパッサン升、50手ルールの手数など）
//! - `Zobrist`: Zobristハッシュ乱数テーブル（駒×升・手番・キャスリング権・アンパッサン筋）
//! - `Attack`: キングへの利き（手数ごとにキャッシュ）
//! - `make_move` / `undo_move`: 手の実行と巻き戻し（`StateInfo` をスタックとして管理）
//! - FEN形式の解析・出力
//! - SEE（静的交換評価）
//!
//! 盤面配列・駒リスト・Zobristキーは `Position` のメソッドを通じて更新されることを前提とし、
//! 常に互いに整合しているように保つ。

mod attack;
mod fen;
mod piece_list;
mod pos;
mod repetition;
mod see;
mod state;
mod zobrist;

pub use attack::{
    attack_delta, can_pseudo_attack, Attack, BISHOP_DELTAS, KNIGHT_DELTAS, MAX_ATTACKERS,
    QUEEN_DELTAS, ROOK_DELTAS,
};
pub use fen::{FenError, STARTPOS_FEN};
pub use piece_list::{PieceList, MAX_PIECES};
pub use pos::{
    GamePhase, Position, GAME_PHASE_ENDGAME_COUNT, GAME_PHASE_ENDGAME_VALUE,
    GAME_PHASE_OPENING_VALUE,
};
pub use repetition::RepetitionTable;
pub use state::StateInfo;
pub use zobrist::{zobrist_castling, zobrist_en_passant, zobrist_psq, zobrist_side, ZOBRIST};
