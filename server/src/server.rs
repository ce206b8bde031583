//! 网关适配层
//!
//! 网关负责连接和传输，这里只把会话事件转换成房间状态机调用。
//! 每个房间由一个独立任务串行处理事件，状态快照通过 watch 通道发布。

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use xiangqi_protocol::{
    ClientMessage, GatewayFrame, MatchSnapshot, RoomId, ServerMessage, SessionEvent,
};

use crate::config::ServerConfig;
use crate::room::{ReadyOutcome, Room};

/// 一个事件处理后的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    /// 需要交给网关的消息（状态快照在最后）
    pub replies: Vec<ServerMessage>,
    /// 房间状态是否改变
    pub mutated: bool,
    /// 房间已空并关闭
    pub closed: bool,
}

/// 消息处理器
pub struct MessageHandler;

impl MessageHandler {
    /// 处理一帧网关事件
    pub fn handle(room: &mut Room, frame: GatewayFrame, report_rejections: bool) -> Dispatch {
        let GatewayFrame { session, event, .. } = frame;
        let mut dispatch = Dispatch::default();

        match event {
            SessionEvent::Join => match room.join(&session) {
                Ok(color) => {
                    // 重复加入（重连）也重新下发完整状态
                    dispatch.mutated = true;
                    dispatch.replies.push(ServerMessage::Joined {
                        room: room.id.clone(),
                        session,
                        color,
                    });
                }
                Err(reason) => {
                    dispatch.replies.push(ServerMessage::JoinRefused {
                        room: room.id.clone(),
                        session,
                        reason,
                    });
                }
            },
            SessionEvent::Leave => {
                dispatch.mutated = room.leave(&session);
            }
            SessionEvent::Message { message } => {
                let result = match message {
                    ClientMessage::Ready => room
                        .ready(&session)
                        .map(|outcome| outcome != ReadyOutcome::AlreadyReady),
                    ClientMessage::Move(request) => room.apply_move(&session, request).map(|_| true),
                    ClientMessage::PlayAgain => room.play_again(&session).map(|_| true),
                };

                match result {
                    Ok(mutated) => dispatch.mutated = mutated,
                    Err(reason) => {
                        info!(room = %room.id, session = %session, %reason, "事件被拒绝");
                        if report_rejections {
                            dispatch.replies.push(ServerMessage::Rejected {
                                room: room.id.clone(),
                                session,
                                reason,
                            });
                        }
                    }
                }
            }
        }

        if dispatch.mutated {
            dispatch.replies.push(ServerMessage::State {
                room: room.id.clone(),
                snapshot: room.snapshot(),
            });
        }

        dispatch
    }
}

/// 房间任务接收的命令
struct RoomCommand {
    frame: GatewayFrame,
    reply: oneshot::Sender<Dispatch>,
}

/// 房间句柄
#[derive(Clone)]
pub struct RoomHandle {
    id: RoomId,
    commands: mpsc::Sender<RoomCommand>,
    snapshots: watch::Receiver<MatchSnapshot>,
}

impl RoomHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 投递事件并等待处理结果
    pub async fn dispatch(&self, frame: GatewayFrame) -> Result<Dispatch> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(RoomCommand { frame, reply })
            .await
            .map_err(|_| anyhow!("房间 {} 已关闭", self.id))?;
        response
            .await
            .map_err(|_| anyhow!("房间 {} 未返回处理结果", self.id))
    }

    /// 订阅状态快照
    pub fn subscribe(&self) -> watch::Receiver<MatchSnapshot> {
        self.snapshots.clone()
    }

    /// 最新状态快照
    pub fn snapshot(&self) -> MatchSnapshot {
        self.snapshots.borrow().clone()
    }

    /// 房间任务是否已结束
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// 创建房间并启动其事件任务
pub fn spawn_room(id: impl Into<RoomId>, config: &ServerConfig) -> RoomHandle {
    let room = Room::new(id, config.rules);
    let id = room.id.clone();
    let (snapshot_tx, snapshots) = watch::channel(room.snapshot());
    let (commands, receiver) = mpsc::channel(config.room_channel_capacity.max(1));

    tokio::spawn(run_room(room, receiver, snapshot_tx, config.report_rejections));

    RoomHandle {
        id,
        commands,
        snapshots,
    }
}

/// 房间事件循环：按到达顺序逐个处理，房间有过玩家且清空后退出
async fn run_room(
    mut room: Room,
    mut receiver: mpsc::Receiver<RoomCommand>,
    snapshot_tx: watch::Sender<MatchSnapshot>,
    report_rejections: bool,
) {
    let mut had_players = false;

    while let Some(RoomCommand { frame, reply }) = receiver.recv().await {
        let mut dispatch = MessageHandler::handle(&mut room, frame, report_rejections);
        if dispatch.mutated {
            snapshot_tx.send_replace(room.snapshot());
        }

        had_players |= !room.is_empty();
        dispatch.closed = had_players && room.is_empty();

        let closed = dispatch.closed;
        if reply.send(dispatch).is_err() {
            debug!(room = %room.id, "调用方已放弃等待处理结果");
        }
        if closed {
            info!(room = %room.id, "房间已空，关闭");
            break;
        }
    }
}

/// 房间注册表
pub struct RoomRegistry {
    config: ServerConfig,
    rooms: HashMap<RoomId, RoomHandle>,
}

impl RoomRegistry {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
        }
    }

    /// 获取房间
    pub fn get(&self, id: &str) -> Option<&RoomHandle> {
        self.rooms.get(id)
    }

    /// 获取房间，不存在或已关闭时创建
    pub fn get_or_create(&mut self, id: &str) -> RoomHandle {
        if let Some(handle) = self.rooms.get(id).filter(|handle| !handle.is_closed()) {
            return handle.clone();
        }

        let handle = spawn_room(id, &self.config);
        self.rooms.insert(id.to_string(), handle.clone());
        handle
    }

    /// 把网关事件路由到对应房间
    ///
    /// 只有加入事件会创建房间；房间清空或房间任务失败后从注册表移除，
    /// 其他房间不受影响。
    pub async fn dispatch(&mut self, frame: GatewayFrame) -> Result<Dispatch> {
        let room_id = frame.room.clone();
        if self.rooms.get(&room_id).is_some_and(RoomHandle::is_closed) {
            warn!(room = %room_id, "房间任务已结束，移出注册表");
            self.rooms.remove(&room_id);
        }

        if frame.event != SessionEvent::Join && !self.rooms.contains_key(&room_id) {
            debug!(room = %room_id, session = %frame.session, "房间不存在，忽略事件");
            return Ok(Dispatch::default());
        }

        let handle = self.get_or_create(&room_id);
        match handle.dispatch(frame).await {
            Ok(dispatch) => {
                if dispatch.closed {
                    self.rooms.remove(&room_id);
                }
                Ok(dispatch)
            }
            Err(e) => {
                self.rooms.remove(&room_id);
                Err(e)
            }
        }
    }

    /// 获取房间数量
    pub fn count(&self) -> usize {
        self.rooms.len()
    }
}
