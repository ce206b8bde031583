//! 房间系统
//!
//! 一个 [`Room`] 独占一份 [`MatchState`]，所有事件按到达顺序同步处理。
//! 被拒绝的事件不修改任何状态。

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};
use xiangqi_protocol::{
    Board, Color, Fen, GamePhase, JoinError, MatchSnapshot, MoveRequest, MoveRules, Piece,
    Position, Rejection, RoomId, RulesConfig, SessionId, MAX_PLAYERS,
};

/// 一步被接受的走棋
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: Position,
    pub to: Position,
    /// 走动的棋子
    pub piece: Piece,
    /// 被吃的棋子
    pub captured: Option<Piece>,
    /// 吃掉将/帅时的胜方
    pub winner: Option<Color>,
}

/// 准备事件的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// 已标记准备
    Marked,
    /// 之前已经准备过（状态不变）
    AlreadyReady,
    /// 双方准备完毕，对局开始
    Started,
}

/// 对局状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    pub board: Board,
    /// 会话 ID -> 阵营
    pub players: BTreeMap<SessionId, Color>,
    /// 已准备的会话
    pub ready: BTreeSet<SessionId>,
    pub phase: GamePhase,
    pub current_turn: Color,
    pub winner: Option<Color>,
    pub started: bool,
    pub over: bool,
}

impl MatchState {
    /// 新房间的初始状态
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            players: BTreeMap::new(),
            ready: BTreeSet::new(),
            phase: GamePhase::WaitingForPlayers,
            current_turn: Color::Red,
            winner: None,
            started: false,
            over: false,
        }
    }

    /// 获取会话的阵营
    pub fn color_of(&self, session: &str) -> Option<Color> {
        self.players.get(session).copied()
    }

    /// 两名玩家都已准备
    fn all_ready(&self) -> bool {
        self.players.len() == MAX_PLAYERS
            && self.players.keys().all(|session| self.ready.contains(session))
    }

    /// 重置对局（保留玩家），阶段由调用方设置
    fn reset_match(&mut self) {
        self.board.initialize();
        self.ready.clear();
        self.current_turn = Color::Red;
        self.winner = None;
        self.started = false;
        self.over = false;
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// 房间
pub struct Room {
    pub id: RoomId,
    rules: MoveRules,
    state: MatchState,
}

impl Room {
    /// 创建新房间
    pub fn new(id: impl Into<RoomId>, rules: RulesConfig) -> Self {
        let id = id.into();
        info!(room = %id, ?rules, "房间创建");
        Self {
            id,
            rules: MoveRules::new(rules),
            state: MatchState::new(),
        }
    }

    /// 当前对局状态（只读）
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// 当前阶段
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// 房间内玩家数量
    pub fn player_count(&self) -> usize {
        self.state.players.len()
    }

    /// 房间是否没有玩家
    pub fn is_empty(&self) -> bool {
        self.state.players.is_empty()
    }

    /// 检查房间是否已满
    pub fn is_full(&self) -> bool {
        self.state.players.len() >= MAX_PLAYERS
    }

    /// 获取玩家的阵营
    pub fn color_of(&self, session: &str) -> Option<Color> {
        self.state.color_of(session)
    }

    /// 生成状态快照
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            current_turn: self.state.current_turn,
            players: self.state.players.clone(),
            ready_players: self.state.ready.clone(),
            game_state: self.state.phase,
            game_started: self.state.started,
            game_over: self.state.over,
            winner: self.state.winner,
            board: self.state.board.to_codes(),
        }
    }

    /// 玩家加入
    ///
    /// 第一个加入者执红；第二个加入者取对方颜色。已在房间中的会话再次加入时
    /// 返回原阵营，不修改状态。
    pub fn join(&mut self, session: &str) -> Result<Color, JoinError> {
        if let Some(color) = self.state.color_of(session) {
            debug!(room = %self.id, session, %color, "会话已在房间中");
            return Ok(color);
        }

        if self.is_full() {
            warn!(room = %self.id, session, "房间已满，拒绝加入");
            return Err(JoinError::RoomFull);
        }

        let color = match self.state.players.values().next().copied() {
            None => {
                self.state.phase = GamePhase::WaitingForPlayers;
                Color::Red
            }
            Some(existing) => {
                // 对手认输离开后残留的终局，新对手加入时重新开始
                if self.state.phase == GamePhase::GameOver {
                    self.state.reset_match();
                }
                self.state.phase = GamePhase::WaitingForReady;
                existing.opponent()
            }
        };

        self.state.players.insert(session.to_string(), color);
        info!(room = %self.id, session, %color, phase = ?self.state.phase, "玩家加入");
        Ok(color)
    }

    /// 玩家准备
    pub fn ready(&mut self, session: &str) -> Result<ReadyOutcome, Rejection> {
        let color = self.state.color_of(session).ok_or(Rejection::UnknownSession)?;

        if !matches!(
            self.state.phase,
            GamePhase::WaitingForPlayers | GamePhase::WaitingForReady
        ) {
            return Err(Rejection::WrongPhase);
        }

        if !self.state.ready.insert(session.to_string()) {
            debug!(room = %self.id, session, "重复准备");
            return Ok(ReadyOutcome::AlreadyReady);
        }
        info!(room = %self.id, session, %color, "玩家准备");

        if self.state.phase == GamePhase::WaitingForReady && self.state.all_ready() {
            self.state.phase = GamePhase::Playing;
            self.state.started = true;
            self.state.current_turn = Color::Red;
            info!(room = %self.id, "双方准备完毕，对局开始");
            return Ok(ReadyOutcome::Started);
        }

        Ok(ReadyOutcome::Marked)
    }

    /// 走棋
    pub fn apply_move(
        &mut self,
        session: &str,
        request: MoveRequest,
    ) -> Result<MoveOutcome, Rejection> {
        if self.state.phase != GamePhase::Playing {
            return Err(Rejection::WrongPhase);
        }

        let color = self.state.color_of(session).ok_or(Rejection::UnknownSession)?;
        if color != self.state.current_turn {
            return Err(Rejection::NotYourTurn {
                current: self.state.current_turn,
            });
        }

        let (from, to) = request.positions().ok_or(Rejection::OutOfBounds)?;
        let piece = self.state.board.get(from).ok_or(Rejection::NoPiece)?;
        if piece.color != color {
            return Err(Rejection::ForeignPiece);
        }

        self.rules.check(&self.state.board, piece, from, to)?;

        let captured = self.state.board.move_piece(from, to);
        debug!(
            room = %self.id,
            %color,
            %from,
            %to,
            board = %Fen::board_to_string(&self.state.board),
            "走棋"
        );

        let winner = if captured.is_some_and(|captured| captured.is_general()) {
            self.state.phase = GamePhase::GameOver;
            self.state.over = true;
            self.state.winner = Some(color);
            info!(room = %self.id, winner = %color, "将/帅被吃，对局结束");
            Some(color)
        } else {
            self.state.current_turn = color.opponent();
            None
        };

        Ok(MoveOutcome {
            from,
            to,
            piece,
            captured,
            winner,
        })
    }

    /// 再来一局：保留玩家和阵营，棋盘恢复开局
    pub fn play_again(&mut self, session: &str) -> Result<(), Rejection> {
        let color = self.state.color_of(session).ok_or(Rejection::UnknownSession)?;

        self.state.reset_match();
        self.state.phase = if self.is_full() {
            GamePhase::WaitingForReady
        } else {
            GamePhase::WaitingForPlayers
        };
        info!(room = %self.id, session, %color, phase = ?self.state.phase, "重新开始");
        Ok(())
    }

    /// 玩家离开，返回状态是否改变
    ///
    /// 对局中离开判负；其他情况下房间回到等待玩家，对局从头开始。
    pub fn leave(&mut self, session: &str) -> bool {
        let Some(color) = self.state.players.remove(session) else {
            debug!(room = %self.id, session, "未入座的会话离开");
            return false;
        };
        self.state.ready.remove(session);
        info!(room = %self.id, session, %color, "玩家离开");

        if self.state.phase == GamePhase::Playing {
            let winner = color.opponent();
            self.state.phase = GamePhase::GameOver;
            self.state.started = false;
            self.state.over = true;
            self.state.winner = Some(winner);
            info!(room = %self.id, %winner, "对局中离开，判负");
        } else {
            self.state.reset_match();
            self.state.phase = GamePhase::WaitingForPlayers;
        }

        true
    }

    /// 走棋提示：玩家自己棋子的所有合法目标
    pub fn legal_targets(&self, session: &str, from: Position) -> Result<Vec<Position>, Rejection> {
        let color = self.state.color_of(session).ok_or(Rejection::UnknownSession)?;
        let piece = self.state.board.get(from).ok_or(Rejection::NoPiece)?;
        if piece.color != color {
            return Err(Rejection::ForeignPiece);
        }
        Ok(self.rules.legal_targets(&self.state.board, from))
    }
}
