//! 协议常量定义

/// 棋盘宽度（列数）
pub const BOARD_WIDTH: usize = 9;

/// 棋盘高度（行数）
pub const BOARD_HEIGHT: usize = 10;

/// 棋盘格子总数
pub const BOARD_SIZE: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// 每个房间最多玩家数
pub const MAX_PLAYERS: usize = 2;

/// 红方河界（红方一侧最大行号）
pub const RED_RIVER_ROW: u8 = 4;

/// 黑方河界（黑方一侧最小行号）
pub const BLACK_RIVER_ROW: u8 = 5;

/// 九宫格列范围
pub const PALACE_COLS: std::ops::RangeInclusive<u8> = 3..=5;

/// 空格子编码
pub const EMPTY_CODE: u8 = 0;

/// 黑方棋子编码偏移（红方 1-7，黑方 11-17）
pub const BLACK_CODE_OFFSET: u8 = 10;
