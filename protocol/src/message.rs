//! 消息类型定义
//!
//! 网关与房间之间的事件，以及房间下发给客户端的状态快照。
//! 字段名使用 camelCase，与浏览器客户端保持一致。

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{JoinError, Rejection, Result};
use crate::piece::{Color, Position};

/// 会话 ID（由网关分配）
pub type SessionId = String;

/// 房间 ID
pub type RoomId = String;

/// 对局阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// 等待玩家加入
    WaitingForPlayers,
    /// 双方已到齐，等待准备
    WaitingForReady,
    /// 对局进行中
    Playing,
    /// 对局结束
    GameOver,
}

/// 走棋请求（客户端原始坐标，可能越界）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from_x: i32,
    pub from_y: i32,
    pub to_x: i32,
    pub to_y: i32,
}

impl MoveRequest {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from_x: from.x().into(),
            from_y: from.y().into(),
            to_x: to.x().into(),
            to_y: to.y().into(),
        }
    }

    /// 转换为棋盘坐标，任一坐标越界返回 None
    pub fn positions(&self) -> Option<(Position, Position)> {
        let from = Position::from_coords(self.from_x, self.from_y)?;
        let to = Position::from_coords(self.to_x, self.to_y)?;
        Some((from, to))
    }
}

/// 客户端发送给房间的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// 准备
    Ready,
    /// 走棋
    Move(MoveRequest),
    /// 再来一局
    PlayAgain,
}

/// 会话事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    /// 会话加入房间
    Join,
    /// 会话离开房间
    Leave,
    /// 会话发来消息
    Message { message: ClientMessage },
}

/// 网关投递给房间的一帧
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFrame {
    pub room: RoomId,
    pub session: SessionId,
    #[serde(flatten)]
    pub event: SessionEvent,
}

impl GatewayFrame {
    pub fn new(room: impl Into<RoomId>, session: impl Into<SessionId>, event: SessionEvent) -> Self {
        Self {
            room: room.into(),
            session: session.into(),
            event,
        }
    }

    /// 从一行 JSON 解析
    pub fn decode(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

/// 房间状态快照（每次状态变化后整体下发）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub current_turn: Color,
    pub players: BTreeMap<SessionId, Color>,
    pub ready_players: BTreeSet<SessionId>,
    pub game_state: GamePhase,
    pub game_started: bool,
    pub game_over: bool,
    pub winner: Option<Color>,
    /// 90 格整数编码
    pub board: Vec<u8>,
}

impl MatchSnapshot {
    /// 从整数编码还原棋盘
    pub fn decode_board(&self) -> Result<Board> {
        Ok(Board::from_codes(&self.board)?)
    }
}

/// 房间发送给网关的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// 加入成功
    Joined {
        room: RoomId,
        session: SessionId,
        color: Color,
    },
    /// 拒绝加入（网关应断开该连接）
    JoinRefused {
        room: RoomId,
        session: SessionId,
        reason: JoinError,
    },
    /// 事件被拒绝（仅在配置允许时下发）
    Rejected {
        room: RoomId,
        session: SessionId,
        reason: Rejection,
    },
    /// 状态同步
    State {
        room: RoomId,
        snapshot: MatchSnapshot,
    },
}

impl ServerMessage {
    /// 编码为一行 JSON
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
