//! FEN 棋盘部分解析和生成
//!
//! 只处理 FEN 的棋盘字段（走子方等由房间状态维护），从第 9 行写到第 0 行：
//! `rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR`

use crate::board::Board;
use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::error::ChessError;
use crate::piece::{Piece, Position};

/// 初始局面 FEN（棋盘部分）
pub const INITIAL_FEN: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析棋盘部分（忽略空格后的其他字段）
    pub fn parse_board(fen: &str) -> Result<Board, ChessError> {
        let board_str = fen.split_whitespace().next().ok_or_else(|| ChessError::InvalidFen {
            reason: "Empty FEN string".to_string(),
        })?;

        let rows: Vec<&str> = board_str.split('/').collect();
        if rows.len() != BOARD_HEIGHT {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected {} rows, got {}", BOARD_HEIGHT, rows.len()),
            });
        }

        let mut board = Board::empty();
        for (row_idx, row) in rows.iter().enumerate() {
            let y = (BOARD_HEIGHT - 1 - row_idx) as u8;
            let mut x = 0usize;

            for c in row.chars() {
                if x >= BOARD_WIDTH {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", row_idx),
                    });
                }

                if let Some(empty_count) = c.to_digit(10) {
                    x += empty_count as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.set(Position::new_unchecked(x as u8, y), Some(piece));
                    x += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if x != BOARD_WIDTH {
                return Err(ChessError::InvalidFen {
                    reason: format!("Row {} has {} columns, expected {}", row_idx, x, BOARD_WIDTH),
                });
            }
        }

        Ok(board)
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_HEIGHT);

        for y in (0..BOARD_HEIGHT as u8).rev() {
            let mut row = String::new();
            let mut empty_count = 0;

            for x in 0..BOARD_WIDTH as u8 {
                if let Some(piece) = board.get(Position::new_unchecked(x, y)) {
                    if empty_count > 0 {
                        row.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                row.push_str(&empty_count.to_string());
            }

            rows.push(row);
        }

        rows.join("/")
    }
}
