//! 中国象棋房间服务端
//!
//! 包含:
//! - 房间与对局状态机
//! - 网关事件分发与房间任务
//! - 服务端配置

pub mod config;
pub mod room;
pub mod server;

pub use config::ServerConfig;
pub use room::{MatchState, MoveOutcome, ReadyOutcome, Room};
pub use server::{spawn_room, Dispatch, MessageHandler, RoomHandle, RoomRegistry};
