//! 错误类型定义

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::piece::{Color, PieceKind};

/// 棋盘数据错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的棋盘编码
    #[error("Invalid board: {reason}")]
    InvalidBoard { reason: String },

    /// 坐标在棋盘外
    #[error("Invalid position: ({x}, {y})")]
    InvalidPosition { x: u8, y: u8 },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },
}

/// 走法不合法的原因（按检查顺序）
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IllegalMove {
    /// 坐标越界
    #[error("Coordinates out of board")]
    OutOfBounds,

    /// 原地不动
    #[error("Source and destination are the same square")]
    NullMove,

    /// 吃己方棋子
    #[error("Cannot capture own piece")]
    SelfCapture,

    /// 不符合棋子走法
    #[error("Move does not fit the {0:?} rule")]
    Geometry(PieceKind),
}

/// 被拒绝的对局事件
///
/// 拒绝不会修改对局状态，是否告知客户端由网关决定。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    /// 当前阶段不接受该事件
    #[error("Event not accepted in the current game phase")]
    WrongPhase,

    /// 发送者不是房间内的玩家
    #[error("Sender is not a player in this room")]
    UnknownSession,

    /// 不是你的回合
    #[error("Not your turn (current turn: {current})")]
    NotYourTurn { current: Color },

    /// 坐标越界
    #[error("Coordinates out of board")]
    OutOfBounds,

    /// 起点没有棋子
    #[error("No piece at the source square")]
    NoPiece,

    /// 起点棋子属于对方
    #[error("Piece at the source square belongs to the opponent")]
    ForeignPiece,

    /// 走法不合法
    #[error("Illegal move: {0}")]
    IllegalMove(IllegalMove),
}

impl From<IllegalMove> for Rejection {
    fn from(reason: IllegalMove) -> Self {
        Rejection::IllegalMove(reason)
    }
}

/// 加入房间失败
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JoinError {
    /// 房间已满
    #[error("Room is full")]
    RoomFull,
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 棋盘数据错误
    #[error("Chess error: {0}")]
    Chess(#[from] ChessError),
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
