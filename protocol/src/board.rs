//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, BOARD_WIDTH, EMPTY_CODE};
use crate::error::ChessError;
use crate::piece::{Color, Piece, PieceKind, Position};

/// 底线棋子排列：车马相仕帅仕相马车
const BACK_RANK: [PieceKind; BOARD_WIDTH] = [
    PieceKind::Chariot,
    PieceKind::Horse,
    PieceKind::Elephant,
    PieceKind::Advisor,
    PieceKind::General,
    PieceKind::Advisor,
    PieceKind::Elephant,
    PieceKind::Horse,
    PieceKind::Chariot,
];

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 9x10 棋盘，索引为 y * 9 + x，长度恒为 90
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; BOARD_SIZE],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();
        board.initialize();
        board
    }

    /// 清空棋盘并摆放标准开局
    pub fn initialize(&mut self) {
        self.squares.clear();
        self.squares.resize(BOARD_SIZE, None);

        for color in [Color::Red, Color::Black] {
            // 红方底线 y=0，黑方底线 y=9，炮与兵按方向向前推
            let (back, cannon, soldier) = match color {
                Color::Red => (0, 2, 3),
                Color::Black => (9, 7, 6),
            };

            for (x, kind) in BACK_RANK.iter().enumerate() {
                self.place(x as u8, back, *kind, color);
            }

            self.place(1, cannon, PieceKind::Cannon, color);
            self.place(7, cannon, PieceKind::Cannon, color);

            for x in (0..BOARD_WIDTH as u8).step_by(2) {
                self.place(x, soldier, PieceKind::Soldier, color);
            }
        }
    }

    fn place(&mut self, x: u8, y: u8, kind: PieceKind, color: Color) {
        self.set(Position::new_unchecked(x, y), Some(Piece::new(kind, color)));
    }

    /// 获取指定位置的棋子
    pub fn get(&self, pos: Position) -> Option<Piece> {
        debug_assert!(pos.is_valid(), "position out of board: {pos}");
        self.squares.get(pos.to_index()).copied().flatten()
    }

    /// 设置指定位置的棋子
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        debug_assert!(pos.is_valid(), "position out of board: {pos}");
        if let Some(square) = self.squares.get_mut(pos.to_index()) {
            *square = piece;
        }
    }

    /// 检查位置是否有棋子
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    /// 移动棋子（不检查规则），返回被吃的棋子
    pub fn move_piece(&mut self, from: Position, to: Position) -> Option<Piece> {
        let piece = self.get(from);
        let captured = self.get(to);
        self.set(from, None);
        self.set(to, piece);
        captured
    }

    /// 统计两点之间（不含端点）的棋子数
    ///
    /// 两点不在同一行或同一列时返回 None。
    pub fn count_between(&self, from: Position, to: Position) -> Option<usize> {
        if from.x() == to.x() {
            let (min_y, max_y) = (from.y().min(to.y()), from.y().max(to.y()));
            Some(
                ((min_y + 1)..max_y)
                    .filter(|&y| self.is_occupied(Position::new_unchecked(from.x(), y)))
                    .count(),
            )
        } else if from.y() == to.y() {
            let (min_x, max_x) = (from.x().min(to.x()), from.x().max(to.x()));
            Some(
                ((min_x + 1)..max_x)
                    .filter(|&x| self.is_occupied(Position::new_unchecked(x, from.y())))
                    .count(),
            )
        } else {
            None
        }
    }

    /// 两点之间（直线）是否无子
    pub fn is_clear_path(&self, from: Position, to: Position) -> bool {
        self.count_between(from, to) == Some(0)
    }

    /// 查找指定阵营的将/帅位置
    pub fn find_general(&self, color: Color) -> Option<Position> {
        self.pieces(color)
            .into_iter()
            .find(|(_, piece)| piece.is_general())
            .map(|(pos, _)| pos)
    }

    /// 指定阵营在棋盘上的将/帅数量
    pub fn general_count(&self, color: Color) -> usize {
        self.pieces(color)
            .iter()
            .filter(|(_, piece)| piece.is_general())
            .count()
    }

    /// 获取指定阵营的所有棋子位置
    pub fn pieces(&self, color: Color) -> Vec<(Position, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Position, Piece)> {
        Position::all()
            .filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
            .collect()
    }

    /// 导出为整数编码（0 为空，红方 1-7，黑方 11-17）
    pub fn to_codes(&self) -> Vec<u8> {
        self.squares
            .iter()
            .map(|square| square.map_or(EMPTY_CODE, |piece| piece.code()))
            .collect()
    }

    /// 从整数编码构建棋盘
    pub fn from_codes(codes: &[u8]) -> Result<Self, ChessError> {
        if codes.len() != BOARD_SIZE {
            return Err(ChessError::InvalidBoard {
                reason: format!("expected {} cells, got {}", BOARD_SIZE, codes.len()),
            });
        }

        let squares = codes
            .iter()
            .enumerate()
            .map(|(index, &code)| match code {
                EMPTY_CODE => Ok(None),
                _ => Piece::from_code(code).map(Some).ok_or_else(|| ChessError::InvalidBoard {
                    reason: format!("unknown piece code {} at index {}", code, index),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { squares })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}
