//! 中国象棋房间共享协议库
//!
//! 包含:
//! - 棋子、棋盘、位置等核心数据结构
//! - 各棋子的走法规则验证
//! - 网关事件与状态快照消息类型
//! - FEN 棋盘格式

mod board;
mod constants;
mod error;
mod fen;
mod message;
mod piece;
pub mod rules;

pub use board::Board;
pub use constants::*;
pub use error::{ChessError, IllegalMove, JoinError, ProtocolError, Rejection, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use message::{
    ClientMessage, GamePhase, GatewayFrame, MatchSnapshot, MoveRequest, RoomId, ServerMessage,
    SessionEvent, SessionId,
};
pub use piece::{Color, Piece, PieceKind, Position};
pub use rules::{MoveRules, RulesConfig};
