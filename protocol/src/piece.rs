//! 棋子定义

use serde::{Deserialize, Serialize};

use crate::constants::{
    BLACK_CODE_OFFSET, BLACK_RIVER_ROW, BOARD_HEIGHT, BOARD_SIZE, BOARD_WIDTH, PALACE_COLS,
    RED_RIVER_ROW,
};
use crate::error::ChessError;

/// 棋子类型
///
/// 判别值即红方编码（1-7），黑方编码再加 10。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PieceKind {
    /// 车/俥
    Chariot = 1,
    /// 马/傌
    Horse = 2,
    /// 象/相
    Elephant = 3,
    /// 士/仕
    Advisor = 4,
    /// 将/帅
    General = 5,
    /// 炮/砲
    Cannon = 6,
    /// 兵/卒
    Soldier = 7,
}

impl PieceKind {
    /// 全部棋子类型
    pub const ALL: [PieceKind; 7] = [
        PieceKind::Chariot,
        PieceKind::Horse,
        PieceKind::Elephant,
        PieceKind::Advisor,
        PieceKind::General,
        PieceKind::Cannon,
        PieceKind::Soldier,
    ];

    /// 类型编码（1-7）
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 从类型编码解析
    pub fn from_code(code: u8) -> Option<PieceKind> {
        PieceKind::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// 获取 FEN 字符（红方大写，黑方小写）
    pub fn to_fen_char(self, color: Color) -> char {
        let c = match self {
            PieceKind::Chariot => 'r',
            PieceKind::Horse => 'n',
            PieceKind::Elephant => 'b',
            PieceKind::Advisor => 'a',
            PieceKind::General => 'k',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
        };
        match color {
            Color::Red => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<(PieceKind, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::Red
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'r' => PieceKind::Chariot,
            'n' => PieceKind::Horse,
            'b' => PieceKind::Elephant,
            'a' => PieceKind::Advisor,
            'k' => PieceKind::General,
            'c' => PieceKind::Cannon,
            'p' => PieceKind::Soldier,
            _ => return None,
        };
        Some((kind, color))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// 红方（先手，底线为第 0 行）
    Red,
    /// 黑方（后手，底线为第 9 行）
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// 朝对方底线推进的行号增量
    pub fn forward(self) -> i8 {
        match self {
            Color::Red => 1,
            Color::Black => -1,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Red => f.write_str("red"),
            Color::Black => f.write_str("black"),
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    /// 创建新棋子
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// 整数编码：红方 1-7，黑方 11-17
    pub fn code(&self) -> u8 {
        match self.color {
            Color::Red => self.kind.code(),
            Color::Black => self.kind.code() + BLACK_CODE_OFFSET,
        }
    }

    /// 从整数编码解析（0 及未知编码返回 None）
    pub fn from_code(code: u8) -> Option<Piece> {
        let color = if code < BLACK_CODE_OFFSET {
            Color::Red
        } else {
            Color::Black
        };
        if code > BLACK_CODE_OFFSET * 2 {
            return None;
        }
        PieceKind::from_code(code % BLACK_CODE_OFFSET).map(|kind| Piece { kind, color })
    }

    /// 是否为将/帅
    pub fn is_general(&self) -> bool {
        self.kind == PieceKind::General
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.kind.to_fen_char(self.color)
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Piece> {
        PieceKind::from_fen_char(c).map(|(kind, color)| Piece { kind, color })
    }
}

/// 棋盘位置
///
/// 只能通过 [`Position::new`] / [`Position::from_coords`] 在棋盘内构造，
/// 反序列化同样检查边界，因此任何 `Position` 的索引都落在 `[0, 89]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    /// 列 (0-8)
    x: u8,
    /// 行 (0-9)
    y: u8,
}

/// 未检查的坐标
#[derive(Deserialize)]
struct RawPosition {
    x: u8,
    y: u8,
}

impl TryFrom<RawPosition> for Position {
    type Error = ChessError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.x, raw.y).ok_or(ChessError::InvalidPosition { x: raw.x, y: raw.y })
    }
}

impl Position {
    /// 创建新位置
    pub fn new(x: u8, y: u8) -> Option<Self> {
        if (x as usize) < BOARD_WIDTH && (y as usize) < BOARD_HEIGHT {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// 列
    pub fn x(&self) -> u8 {
        self.x
    }

    /// 行
    pub fn y(&self) -> u8 {
        self.y
    }

    /// 创建新位置（不检查边界，内部使用）
    pub(crate) const fn new_unchecked(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// 从客户端提交的坐标创建（负数或越界返回 None）
    pub fn from_coords(x: i32, y: i32) -> Option<Self> {
        let x = u8::try_from(x).ok()?;
        let y = u8::try_from(y).ok()?;
        Self::new(x, y)
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.x as usize) < BOARD_WIDTH && (self.y as usize) < BOARD_HEIGHT
    }

    /// 检查位置是否在指定阵营的河界一侧（红方 y<=4，黑方 y>=5）
    pub fn is_own_side(&self, color: Color) -> bool {
        match color {
            Color::Red => self.y <= RED_RIVER_ROW,
            Color::Black => self.y >= BLACK_RIVER_ROW,
        }
    }

    /// 检查位置是否在九宫格内
    pub fn is_in_palace(&self, color: Color) -> bool {
        let in_x = PALACE_COLS.contains(&self.x);
        let in_y = match color {
            Color::Red => (0..=2).contains(&self.y),
            Color::Black => (7..=9).contains(&self.y),
        };
        in_x && in_y
    }

    /// 获取偏移后的位置
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Position> {
        let new_x = self.x as i8 + dx;
        let new_y = self.y as i8 + dy;
        if new_x < 0 || new_y < 0 {
            return None;
        }
        Position::new(new_x as u8, new_y as u8)
    }

    /// 到目标位置的有符号偏移 (dx, dy)
    pub fn delta(&self, to: Position) -> (i8, i8) {
        (to.x as i8 - self.x as i8, to.y as i8 - self.y as i8)
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.y as usize * BOARD_WIDTH + self.x as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_SIZE {
            Some(Position {
                x: (index % BOARD_WIDTH) as u8,
                y: (index / BOARD_WIDTH) as u8,
            })
        } else {
            None
        }
    }

    /// 遍历棋盘上所有位置（按索引顺序）
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).filter_map(Position::from_index)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
