//! 走法规则验证
//!
//! 每种棋子一个纯函数，只依赖坐标、阵营和棋盘占用情况。
//! [`MoveRules::check`] 依次检查坐标范围、原地不动和吃己方棋子，最后检查棋子走法。

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::board::Board;
use crate::error::IllegalMove;
use crate::piece::{Color, Piece, PieceKind, Position};

/// 规则开关
///
/// 默认与房间协议一致：象不检查象眼，马不检查马腿，
/// 红兵向行号减小的方向走，在第 5 行及以上算未过河。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// 象眼（斜线中点）有子时不能走
    pub block_elephant_eye: bool,
    /// 马腿（长边方向相邻格）有子时不能走
    pub block_horse_leg: bool,
    /// 兵从己方底线一侧向对方推进（红兵行号增大，离开 0-4 行才算过河）
    pub soldier_advance_from_home: bool,
}

impl RulesConfig {
    /// 标准象棋规则（象眼、马腿都会被堵，兵按开局站位向前推进）
    pub fn strict() -> Self {
        Self {
            block_elephant_eye: true,
            block_horse_leg: true,
            soldier_advance_from_home: true,
        }
    }
}

/// 走法规则
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveRules {
    config: RulesConfig,
}

impl MoveRules {
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    /// 走法是否合法（不会 panic，不合法即返回 false）
    pub fn is_legal(&self, board: &Board, piece: Piece, from: Position, to: Position) -> bool {
        self.check(board, piece, from, to).is_ok()
    }

    /// 验证走法，返回第一个不满足的条件
    pub fn check(
        &self,
        board: &Board,
        piece: Piece,
        from: Position,
        to: Position,
    ) -> Result<(), IllegalMove> {
        if !from.is_valid() || !to.is_valid() {
            return Err(IllegalMove::OutOfBounds);
        }

        if from == to {
            return Err(IllegalMove::NullMove);
        }

        if let Some(target) = board.get(to) {
            if target.color == piece.color {
                return Err(IllegalMove::SelfCapture);
            }
        }

        let fits = match piece.kind {
            PieceKind::Chariot => chariot_move(board, from, to),
            PieceKind::Horse => horse_move(board, from, to, self.config.block_horse_leg),
            PieceKind::Elephant => {
                elephant_move(board, from, to, piece.color, self.config.block_elephant_eye)
            }
            PieceKind::Advisor => advisor_move(from, to, piece.color),
            PieceKind::General => general_move(from, to, piece.color),
            PieceKind::Cannon => cannon_move(board, from, to),
            PieceKind::Soldier => {
                soldier_move(from, to, piece.color, self.config.soldier_advance_from_home)
            }
        };

        if fits {
            Ok(())
        } else {
            trace!(kind = ?piece.kind, %from, %to, "走法不符合棋子规则");
            Err(IllegalMove::Geometry(piece.kind))
        }
    }

    /// 起点棋子所有合法的目标位置（起点无子时为空）
    pub fn legal_targets(&self, board: &Board, from: Position) -> Vec<Position> {
        let Some(piece) = board.get(from) else {
            return Vec::new();
        };

        Position::all()
            .filter(|&to| self.is_legal(board, piece, from, to))
            .collect()
    }
}

/// 车：同行或同列，中间无子
pub fn chariot_move(board: &Board, from: Position, to: Position) -> bool {
    board.is_clear_path(from, to)
}

/// 马：日字，`block_leg` 时检查马腿
pub fn horse_move(board: &Board, from: Position, to: Position, block_leg: bool) -> bool {
    let (dx, dy) = from.delta(to);
    let shape = matches!((dx.abs(), dy.abs()), (2, 1) | (1, 2));
    if !shape || !block_leg {
        return shape;
    }

    let leg = if dx.abs() == 2 {
        from.offset(dx.signum(), 0)
    } else {
        from.offset(0, dy.signum())
    };
    leg.is_some_and(|leg| !board.is_occupied(leg))
}

/// 象：田字，不能过河，`block_eye` 时检查象眼
pub fn elephant_move(
    board: &Board,
    from: Position,
    to: Position,
    color: Color,
    block_eye: bool,
) -> bool {
    let (dx, dy) = from.delta(to);
    if dx.abs() != 2 || dy.abs() != 2 || !to.is_own_side(color) {
        return false;
    }

    if !block_eye {
        return true;
    }
    from.offset(dx / 2, dy / 2)
        .is_some_and(|eye| !board.is_occupied(eye))
}

/// 士：斜走一步，不出九宫
pub fn advisor_move(from: Position, to: Position, color: Color) -> bool {
    let (dx, dy) = from.delta(to);
    dx.abs() == 1 && dy.abs() == 1 && to.is_in_palace(color)
}

/// 将：直走一步，不出九宫
pub fn general_move(from: Position, to: Position, color: Color) -> bool {
    let (dx, dy) = from.delta(to);
    dx.abs() + dy.abs() == 1 && to.is_in_palace(color)
}

/// 炮：不吃子时同车，吃子时中间恰好一个炮架
pub fn cannon_move(board: &Board, from: Position, to: Position) -> bool {
    match board.count_between(from, to) {
        Some(screens) if board.is_occupied(to) => screens == 1,
        Some(screens) => screens == 0,
        None => false,
    }
}

/// 兵：未过河只能前进一步，过河后可前进或横走一步，永不后退
///
/// `from_home` 关闭时红兵行号减小、黑卒行号增大，红兵在 0-4 行、黑卒在 5-9 行视为已过河；
/// 开启时方向相反，离开己方半场才算过河。
pub fn soldier_move(from: Position, to: Position, color: Color, from_home: bool) -> bool {
    let (dx, dy) = from.delta(to);
    let (step, crossed) = if from_home {
        (color.forward(), !from.is_own_side(color))
    } else {
        (-color.forward(), from.is_own_side(color))
    };
    let forward = dx == 0 && dy == step;

    if crossed {
        forward || (dx.abs() == 1 && dy == 0)
    } else {
        forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;

    fn pos(x: u8, y: u8) -> Position {
        Position::new(x, y).unwrap()
    }

    fn place(board: &mut Board, x: u8, y: u8, kind: PieceKind, color: Color) -> Piece {
        let piece = Piece::new(kind, color);
        board.set(pos(x, y), Some(piece));
        piece
    }

    fn targets(rules: &MoveRules, board: &Board, x: u8, y: u8) -> Vec<Position> {
        rules.legal_targets(board, pos(x, y))
    }

    #[test]
    fn test_initial_position_moves() {
        let rules = MoveRules::default();
        let board = Board::initial();

        // 炮二平五
        let cannon = board.get(pos(7, 2)).unwrap();
        assert!(rules.is_legal(&board, cannon, pos(7, 2), pos(4, 2)));

        // 炮不能隔一子打空格
        assert!(!rules.is_legal(&board, cannon, pos(7, 2), pos(7, 8)));

        // 炮隔黑炮打马
        assert!(rules.is_legal(&board, cannon, pos(7, 2), pos(7, 9)));

        // 开局红兵位于 0-4 行，按房间协议视为已过河：向行号减小方向走或横走
        let soldier = board.get(pos(2, 3)).unwrap();
        assert!(rules.is_legal(&board, soldier, pos(2, 3), pos(2, 2)));
        assert!(rules.is_legal(&board, soldier, pos(2, 3), pos(3, 3)));
        assert!(!rules.is_legal(&board, soldier, pos(2, 3), pos(2, 4)));

        // 标准规则：兵七进一
        let strict = MoveRules::new(RulesConfig::strict());
        assert!(strict.is_legal(&board, soldier, pos(2, 3), pos(2, 4)));
        assert!(!strict.is_legal(&board, soldier, pos(2, 3), pos(3, 3)));
    }

    #[test]
    fn test_self_capture_rejected() {
        let rules = MoveRules::default();
        let board = Board::initial();

        let chariot = board.get(pos(0, 0)).unwrap();
        assert_eq!(
            rules.check(&board, chariot, pos(0, 0), pos(1, 0)),
            Err(IllegalMove::SelfCapture)
        );
        assert_eq!(
            rules.check(&board, chariot, pos(0, 0), pos(0, 0)),
            Err(IllegalMove::NullMove)
        );
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let rules = MoveRules::default();
        let board = Board::empty();
        let chariot = Piece::new(PieceKind::Chariot, Color::Red);

        let outside = Position::new_unchecked(9, 0);
        assert_eq!(
            rules.check(&board, chariot, pos(0, 0), outside),
            Err(IllegalMove::OutOfBounds)
        );
        assert!(!rules.is_legal(&board, chariot, outside, pos(0, 0)));
    }

    #[test]
    fn test_chariot_blocked() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        let chariot = place(&mut board, 0, 0, PieceKind::Chariot, Color::Red);

        assert!(rules.is_legal(&board, chariot, pos(0, 0), pos(0, 5)));

        // 在 (0,3) 放一个阻挡
        place(&mut board, 0, 3, PieceKind::Soldier, Color::Black);
        assert!(!rules.is_legal(&board, chariot, pos(0, 0), pos(0, 5)));
        assert!(rules.is_legal(&board, chariot, pos(0, 0), pos(0, 3)));
        assert!(!rules.is_legal(&board, chariot, pos(0, 0), pos(1, 1)));
    }

    #[test]
    fn test_chariot_moves() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        place(&mut board, 4, 4, PieceKind::Chariot, Color::Red);

        // 车在中间，可以走 9+8 = 17 个位置
        assert_eq!(targets(&rules, &board, 4, 4).len(), 17);

        // 己方棋子挡住向上的路，总共 1+4+4+4 = 13
        place(&mut board, 4, 6, PieceKind::Soldier, Color::Red);
        assert_eq!(targets(&rules, &board, 4, 4).len(), 13);

        // 换成敌方棋子则可以吃
        place(&mut board, 4, 6, PieceKind::Soldier, Color::Black);
        assert!(targets(&rules, &board, 4, 4).contains(&pos(4, 6)));
    }

    #[test]
    fn test_horse_moves() {
        let lenient = MoveRules::default();
        let strict = MoveRules::new(RulesConfig::strict());
        let mut board = Board::empty();
        let horse = place(&mut board, 4, 4, PieceKind::Horse, Color::Red);

        assert_eq!(targets(&lenient, &board, 4, 4).len(), 8);
        assert!(!lenient.is_legal(&board, horse, pos(4, 4), pos(6, 6)));

        // 堵住上方马腿：宽松规则照跳，标准规则少两个走法
        place(&mut board, 4, 5, PieceKind::Soldier, Color::Red);
        assert_eq!(targets(&lenient, &board, 4, 4).len(), 8);
        assert_eq!(targets(&strict, &board, 4, 4).len(), 6);
        assert!(!strict.is_legal(&board, horse, pos(4, 4), pos(3, 6)));
        assert!(strict.is_legal(&board, horse, pos(4, 4), pos(6, 5)));
    }

    #[test]
    fn test_horse_corner() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        place(&mut board, 0, 0, PieceKind::Horse, Color::Black);

        let mut moves = targets(&rules, &board, 0, 0);
        moves.sort_by_key(|p| p.to_index());
        assert_eq!(moves, vec![pos(2, 1), pos(1, 2)]);
    }

    #[test]
    fn test_elephant_moves() {
        let lenient = MoveRules::default();
        let strict = MoveRules::new(RulesConfig::strict());
        let mut board = Board::empty();
        let elephant = place(&mut board, 2, 0, PieceKind::Elephant, Color::Red);

        // 相在 (2, 0) 可以走到 (0, 2) 和 (4, 2)
        assert_eq!(targets(&lenient, &board, 2, 0).len(), 2);
        assert!(!lenient.is_legal(&board, elephant, pos(2, 0), pos(3, 1)));

        // 塞象眼：宽松规则不检查，标准规则被堵
        place(&mut board, 3, 1, PieceKind::Soldier, Color::Black);
        assert!(lenient.is_legal(&board, elephant, pos(2, 0), pos(4, 2)));
        assert!(!strict.is_legal(&board, elephant, pos(2, 0), pos(4, 2)));
        assert_eq!(targets(&strict, &board, 2, 0), vec![pos(0, 2)]);
    }

    #[test]
    fn test_elephant_cannot_cross_river() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        let red = place(&mut board, 2, 4, PieceKind::Elephant, Color::Red);
        let black = place(&mut board, 6, 5, PieceKind::Elephant, Color::Black);

        assert!(!rules.is_legal(&board, red, pos(2, 4), pos(4, 6)));
        assert!(rules.is_legal(&board, red, pos(2, 4), pos(4, 2)));
        assert!(!rules.is_legal(&board, black, pos(6, 5), pos(4, 3)));
        assert!(rules.is_legal(&board, black, pos(6, 5), pos(8, 7)));

        for to in targets(&rules, &board, 2, 4) {
            assert!(to.y() <= 4, "相不能过河: {:?}", to);
        }
    }

    #[test]
    fn test_advisor_moves() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        place(&mut board, 4, 1, PieceKind::Advisor, Color::Red);
        place(&mut board, 3, 9, PieceKind::Advisor, Color::Black);

        // 士在中心有 4 个斜向位置
        assert_eq!(targets(&rules, &board, 4, 1).len(), 4);

        // 角落只能走到中心
        assert_eq!(targets(&rules, &board, 3, 9), vec![pos(4, 8)]);
    }

    #[test]
    fn test_general_moves() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        let general = place(&mut board, 4, 1, PieceKind::General, Color::Red);

        assert_eq!(targets(&rules, &board, 4, 1).len(), 4);
        assert!(!rules.is_legal(&board, general, pos(4, 1), pos(5, 2)));
        assert!(!rules.is_legal(&board, general, pos(4, 1), pos(4, 3)));

        let mut board = Board::empty();
        place(&mut board, 3, 0, PieceKind::General, Color::Red);
        assert_eq!(targets(&rules, &board, 3, 0).len(), 2);

        let mut board = Board::empty();
        let general = place(&mut board, 5, 7, PieceKind::General, Color::Black);
        assert!(!rules.is_legal(&board, general, pos(5, 7), pos(5, 6)));
        assert!(!rules.is_legal(&board, general, pos(5, 7), pos(6, 7)));
        assert!(rules.is_legal(&board, general, pos(5, 7), pos(5, 8)));
    }

    #[test]
    fn test_cannon_screen() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        let cannon = place(&mut board, 1, 2, PieceKind::Cannon, Color::Red);
        place(&mut board, 1, 9, PieceKind::Horse, Color::Black);

        // 没有炮架不能吃
        assert!(!rules.is_legal(&board, cannon, pos(1, 2), pos(1, 9)));

        // 恰好一个炮架
        place(&mut board, 1, 7, PieceKind::Cannon, Color::Black);
        assert!(rules.is_legal(&board, cannon, pos(1, 2), pos(1, 9)));

        // 两个炮架
        place(&mut board, 1, 5, PieceKind::Soldier, Color::Red);
        assert!(!rules.is_legal(&board, cannon, pos(1, 2), pos(1, 9)));
    }

    #[test]
    fn test_cannon_moves_like_chariot() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        let cannon = place(&mut board, 4, 4, PieceKind::Cannon, Color::Red);

        assert_eq!(targets(&rules, &board, 4, 4).len(), 17);

        // 隔子不能走到空格
        place(&mut board, 4, 6, PieceKind::Soldier, Color::Black);
        assert!(!rules.is_legal(&board, cannon, pos(4, 4), pos(4, 8)));
        assert!(!rules.is_legal(&board, cannon, pos(4, 4), pos(4, 6)));
        assert!(rules.is_legal(&board, cannon, pos(4, 4), pos(4, 5)));
    }

    #[test]
    fn test_soldier_before_river() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        let red = place(&mut board, 4, 6, PieceKind::Soldier, Color::Red);
        let black = place(&mut board, 2, 3, PieceKind::Soldier, Color::Black);

        // 红兵在 5 行以上、黑卒在 4 行以下只能直进一步
        assert_eq!(targets(&rules, &board, 4, 6), vec![pos(4, 5)]);
        assert_eq!(targets(&rules, &board, 2, 3), vec![pos(2, 4)]);
        assert!(!rules.is_legal(&board, red, pos(4, 6), pos(4, 7)));
        assert!(!rules.is_legal(&board, red, pos(4, 6), pos(3, 6)));
        assert!(!rules.is_legal(&board, black, pos(2, 3), pos(2, 2)));
    }

    #[test]
    fn test_soldier_after_river() {
        let rules = MoveRules::default();
        let mut board = Board::empty();
        let red = place(&mut board, 4, 4, PieceKind::Soldier, Color::Red);
        let black = place(&mut board, 4, 5, PieceKind::Soldier, Color::Black);

        let mut moves = targets(&rules, &board, 4, 4);
        moves.sort_by_key(|p| p.to_index());
        assert_eq!(moves, vec![pos(4, 3), pos(3, 4), pos(5, 4)]);

        // 不能后退、不能斜走
        assert!(!rules.is_legal(&board, red, pos(4, 4), pos(4, 5)));
        assert!(!rules.is_legal(&board, red, pos(4, 4), pos(3, 3)));

        assert!(rules.is_legal(&board, black, pos(4, 5), pos(4, 6)));
        assert!(rules.is_legal(&board, black, pos(4, 5), pos(5, 5)));
        assert!(!rules.is_legal(&board, black, pos(4, 5), pos(4, 4)));

        // 红兵到第 0 行只能横走
        let mut board = Board::empty();
        place(&mut board, 0, 0, PieceKind::Soldier, Color::Red);
        assert_eq!(targets(&rules, &board, 0, 0), vec![pos(1, 0)]);
    }

    #[test]
    fn test_soldier_advance_from_home() {
        let rules = MoveRules::new(RulesConfig {
            soldier_advance_from_home: true,
            ..RulesConfig::default()
        });
        let mut board = Board::empty();
        place(&mut board, 4, 3, PieceKind::Soldier, Color::Red);
        place(&mut board, 2, 6, PieceKind::Soldier, Color::Black);

        assert_eq!(targets(&rules, &board, 4, 3), vec![pos(4, 4)]);
        assert_eq!(targets(&rules, &board, 2, 6), vec![pos(2, 5)]);

        let mut board = Board::empty();
        let red = place(&mut board, 4, 5, PieceKind::Soldier, Color::Red);
        let black = place(&mut board, 4, 4, PieceKind::Soldier, Color::Black);

        let mut moves = targets(&rules, &board, 4, 5);
        moves.sort_by_key(|p| p.to_index());
        assert_eq!(moves, vec![pos(3, 5), pos(5, 5), pos(4, 6)]);
        assert!(!rules.is_legal(&board, red, pos(4, 5), pos(4, 4)));

        assert!(rules.is_legal(&board, black, pos(4, 4), pos(4, 3)));
        assert!(rules.is_legal(&board, black, pos(4, 4), pos(3, 4)));
        assert!(!rules.is_legal(&board, black, pos(4, 4), pos(4, 5)));

        let mut board = Board::empty();
        place(&mut board, 0, 9, PieceKind::Soldier, Color::Red);
        assert_eq!(targets(&rules, &board, 0, 9), vec![pos(1, 9)]);
    }

    #[test]
    fn test_legal_targets_empty_square() {
        let rules = MoveRules::default();
        let board = Fen::parse_board("4k4/9/9/9/9/9/9/9/9/4K4").unwrap();
        assert!(targets(&rules, &board, 0, 0).is_empty());
        assert_eq!(targets(&rules, &board, 4, 0).len(), 3);
    }
}
