/*
 * 对局模块（Game）
 *
 * - 维护棋盘、当前走棋方和待走的选中格
 * - handle_square_selection 是界面层唯一的有状态入口：第一次点击选子，第二次点击走子
 * - 将军判定：任意对方棋子能走到己方王的格子即为被将军
 * - 将死判定只搜索王的八个邻格能否逃出，不考虑其他棋子挡将或吃掉将军的子
 * - 模拟走子使用 Board::apply_move / undo_move 成对完成，查询之后棋盘原样恢复
 */

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::board::{in_board, Board, Position};
use crate::constant::KING_STEPS;
use crate::error::{Error, Result};
use crate::piece::{Color, Piece};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct GameConfig {
    /// Accept moves that leave the mover's own king attacked.
    /// Off by default; turning it on allows a king to be captured, after
    /// which check queries fail with `Error::KingNotFound`.
    pub allow_self_check: bool,
}

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    turn: Color,                 // 当前走棋方
    selected: Option<Position>, // 当前选中的棋子位置
    config: GameConfig,
}

impl Game {
    pub fn new() -> Self {
        Game::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Game {
            board: Board::init(),
            turn: Color::White,
            selected: None,
            config,
        }
    }

    /// A session starting from an arbitrary position.
    pub fn from_board(board: Board, turn: Color) -> Self {
        Game {
            board,
            turn,
            selected: None,
            config: GameConfig::default(),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, row: i32, col: i32) -> Option<&Piece> {
        self.board.get(Position::new(row, col))
    }

    pub fn current_turn(&self) -> Color {
        self.turn
    }

    pub fn is_piece_selected(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    // 重新开局：标准布局，白方先走，清除选中
    pub fn reset(&mut self) {
        self.board = Board::init();
        self.turn = Color::White;
        self.selected = None;
        info!("game reset");
    }

    /// Moves the piece on `from` to `to` for the side to move and hands the
    /// turn over. `Ok(false)` for any illegal attempt, with nothing changed.
    pub fn attempt_move(&mut self, from: Position, to: Position) -> Result<bool> {
        let Some(piece) = self.board.get(from).copied() else {
            debug!(from = %from, "no piece to move");
            return Ok(false);
        };
        if !piece.belong_to(self.turn) {
            debug!(from = %from, turn = %self.turn, "piece does not belong to side to move");
            return Ok(false);
        }
        if !piece.is_valid_move(to, &self.board) {
            debug!(from = %from, to = %to, kind = %piece.kind(), "move rejected by piece rule");
            return Ok(false);
        }
        if !self.config.allow_self_check && self.would_be_in_check_after_move(self.turn, from, to)? {
            debug!(from = %from, to = %to, "move leaves own king in check");
            return Ok(false);
        }

        let capture = self.board.get(to).map(|p| p.kind());
        if !self.board.move_piece(from, to) {
            return Ok(false);
        }
        debug!(from = %from, to = %to, kind = %piece.kind(), capture = ?capture, "move applied");
        self.turn = self.turn.opponent();
        Ok(true)
    }

    pub fn is_in_check(&self, color: Color) -> Result<bool> {
        let king = self.king_position(color)?;
        let checked = self
            .board
            .pieces()
            .filter(|p| !p.belong_to(color))
            .any(|p| p.is_valid_move(king, &self.board));
        if checked {
            debug!(color = %color, king = %king, "king in check");
        }
        Ok(checked)
    }

    /// Plays `from -> to` on the board without any rule check, asks whether
    /// `color` is in check, then restores the board exactly.
    pub fn would_be_in_check_after_move(
        &mut self,
        color: Color,
        from: Position,
        to: Position,
    ) -> Result<bool> {
        let Some(m) = self.board.record_move(from, to) else {
            return self.is_in_check(color);
        };
        self.board.apply_move(&m);
        let checked = self.is_in_check(color);
        self.board.undo_move(&m);
        checked
    }

    // 被将军且王的八个邻格都无处可逃即为将死
    pub fn is_checkmate(&mut self, color: Color) -> Result<bool> {
        if !self.is_in_check(color)? {
            return Ok(false);
        }

        let king_pos = self.king_position(color)?;
        let king = *self
            .board
            .get(king_pos)
            .ok_or(Error::KingNotFound(color))?;

        for (dr, dc) in KING_STEPS {
            let to = king_pos.offset(dr, dc);
            if in_board(to)
                && king.is_valid_move(to, &self.board)
                && !self.would_be_in_check_after_move(color, king_pos, to)?
            {
                debug!(color = %color, escape = %to, "king can escape");
                return Ok(false);
            }
        }
        debug!(color = %color, "checkmate");
        Ok(true)
    }

    /// One click from the presentation layer. Returns true iff the click
    /// completed a move.
    ///
    /// With nothing selected, clicking a piece of the side to move selects
    /// it; any other square is ignored. With a selection pending, the click
    /// is the destination: the selection is cleared and the move attempted.
    pub fn handle_square_selection(&mut self, row: i32, col: i32) -> Result<bool> {
        let pos = Position::new(row, col);
        match self.selected.take() {
            None => {
                match self.board.get(pos) {
                    Some(piece) if piece.belong_to(self.turn) => {
                        debug!(at = %pos, kind = %piece.kind(), "piece selected");
                        self.selected = Some(pos);
                    }
                    _ => debug!(at = %pos, "nothing to select"),
                }
                Ok(false)
            }
            Some(from) => self.attempt_move(from, pos),
        }
    }

    /// Destination squares to highlight for the piece on `pos`. Moves that
    /// would leave the mover in check are included.
    pub fn legal_moves_for(&self, pos: Position) -> BTreeSet<Position> {
        self.board.generate_moves(pos).into_iter().collect()
    }

    fn king_position(&self, color: Color) -> Result<Position> {
        self.board.king_position(color).ok_or_else(|| {
            warn!(color = %color, "king missing from board");
            Error::KingNotFound(color)
        })
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use crate::constant::START_PLACEMENT;
    use crate::error::Error;
    use crate::game::*;
    use crate::piece::PieceKind;

    fn game(fen: &str, turn: Color) -> Game {
        Game::from_board(Board::from_fen(fen).unwrap(), turn)
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.current_turn(), Color::White);
        assert!(!game.is_piece_selected());
        assert_eq!(game.board().placement(), START_PLACEMENT);
        assert_eq!(game.piece_at(7, 4).map(|p| p.kind()), Some(PieceKind::King));
        assert!(game.piece_at(4, 4).is_none());
        assert!(game.piece_at(9, 9).is_none());
    }

    #[test]
    fn test_attempt_move_turns() {
        let mut game = Game::new();
        // 黑方不能先走
        assert_eq!(game.attempt_move(Position::new(1, 4), Position::new(3, 4)), Ok(false));
        // 空格
        assert_eq!(game.attempt_move(Position::new(4, 4), Position::new(3, 4)), Ok(false));
        // 走法不合法
        assert_eq!(game.attempt_move(Position::new(6, 4), Position::new(3, 4)), Ok(false));
        assert_eq!(game.board().placement(), START_PLACEMENT);
        assert_eq!(game.current_turn(), Color::White);

        assert_eq!(game.attempt_move(Position::new(6, 4), Position::new(4, 4)), Ok(true));
        assert_eq!(game.current_turn(), Color::Black);
        assert_eq!(game.attempt_move(Position::new(6, 3), Position::new(4, 3)), Ok(false));
        assert_eq!(game.attempt_move(Position::new(1, 4), Position::new(3, 4)), Ok(true));
        assert_eq!(game.current_turn(), Color::White);
    }

    #[test]
    fn test_in_check_on_open_file() {
        let mut game = game("4r3/8/8/8/8/8/8/4K3", Color::White);
        assert_eq!(game.is_in_check(Color::White), Ok(true));

        for blocker in ['P', 'p', 'N', 'b'] {
            let fen = format!("4r3/8/8/8/4{}3/8/8/4K3", blocker);
            game = self::game(&fen, Color::White);
            assert_eq!(game.is_in_check(Color::White), Ok(false), "{}", fen);
        }
    }

    #[test]
    fn test_start_position_not_in_check() {
        let mut game = Game::new();
        assert_eq!(game.is_in_check(Color::White), Ok(false));
        assert_eq!(game.is_in_check(Color::Black), Ok(false));
        assert_eq!(game.is_checkmate(Color::White), Ok(false));
        assert_eq!(game.is_checkmate(Color::Black), Ok(false));
    }

    #[test]
    fn test_missing_king_is_an_error() {
        let mut game = game("4r3/8/8/8/8/8/8/8", Color::White);
        assert_eq!(game.is_in_check(Color::White), Err(Error::KingNotFound(Color::White)));
        assert_eq!(game.is_checkmate(Color::White), Err(Error::KingNotFound(Color::White)));
    }

    #[test]
    fn test_back_rank_mate() {
        let mut game = game("4k3/8/8/8/8/8/6PP/q6K", Color::White);
        let before = game.board().clone();
        assert_eq!(game.is_in_check(Color::White), Ok(true));
        assert_eq!(game.is_checkmate(Color::White), Ok(true));
        // 模拟之后棋盘不变
        assert_eq!(game.board(), &before);

        // 打开一个逃跑格
        let mut game = self::game("4k3/8/8/8/8/8/6P1/q6K", Color::White);
        assert_eq!(game.is_in_check(Color::White), Ok(true));
        assert_eq!(game.is_checkmate(Color::White), Ok(false));
    }

    #[test]
    fn test_king_escape_by_capture() {
        // 王可以吃掉没有保护的将军棋子
        let mut game = game("4k3/8/8/8/8/8/6PP/6rK", Color::White);
        assert_eq!(game.is_in_check(Color::White), Ok(true));
        assert_eq!(game.is_checkmate(Color::White), Ok(false));

        // 有保护就不行
        let mut game = self::game("4k3/8/8/8/8/8/6PP/5rrK", Color::White);
        assert_eq!(game.is_checkmate(Color::White), Ok(true));
    }

    #[test]
    fn test_checkmate_ignores_blocks() {
        // 白车可以挡在 (7,3)，但只搜索王的逃跑格，所以仍判为将死
        let mut game = game("4k3/8/8/8/8/8/3R2PP/q6K", Color::White);
        assert!(game
            .legal_moves_for(Position::new(6, 3))
            .contains(&Position::new(7, 3)));
        assert_eq!(game.is_checkmate(Color::White), Ok(true));
    }

    #[test]
    fn test_self_check_rejected() {
        let fen = "4r2k/8/8/8/8/8/4R3/4K3";
        let mut game = game(fen, Color::White);
        assert_eq!(game.attempt_move(Position::new(6, 4), Position::new(6, 0)), Ok(false));
        assert_eq!(game.board().placement(), fen);
        assert_eq!(game.current_turn(), Color::White);

        // 沿线移动仍然挡着
        assert_eq!(game.attempt_move(Position::new(6, 4), Position::new(2, 4)), Ok(true));

        // 王不能走进被攻击的格子
        let mut game = self::game("3r3k/8/8/8/8/8/8/4K3", Color::White);
        assert_eq!(game.attempt_move(Position::new(7, 4), Position::new(7, 3)), Ok(false));
        assert_eq!(game.attempt_move(Position::new(7, 4), Position::new(6, 4)), Ok(true));
    }

    #[test]
    fn test_self_check_allowed_by_config() {
        let board = Board::from_fen("4r2k/8/8/8/8/8/4R3/4K3").unwrap();
        let mut game = Game::from_board(board, Color::White);
        game.config = GameConfig {
            allow_self_check: true,
        };
        assert_eq!(game.attempt_move(Position::new(6, 4), Position::new(6, 0)), Ok(true));
        assert_eq!(game.is_in_check(Color::White), Ok(true));

        // 黑车吃王之后，王不在棋盘上
        assert_eq!(game.attempt_move(Position::new(0, 4), Position::new(7, 4)), Ok(true));
        assert_eq!(game.is_in_check(Color::White), Err(Error::KingNotFound(Color::White)));
    }

    #[test]
    fn test_would_be_in_check_restores_board() {
        let mut game = game("4k3/8/8/8/8/8/3q4/4K3", Color::White);
        let before = game.board().clone();
        // 吃掉王旁边的后
        assert_eq!(
            game.would_be_in_check_after_move(Color::White, Position::new(7, 4), Position::new(6, 3)),
            Ok(false)
        );
        assert_eq!(
            game.would_be_in_check_after_move(Color::White, Position::new(7, 4), Position::new(7, 3)),
            Ok(true)
        );
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_selection_flow() {
        let mut game = Game::new();
        // 空格和对方棋子都不能选
        assert_eq!(game.handle_square_selection(4, 4), Ok(false));
        assert!(!game.is_piece_selected());
        assert_eq!(game.handle_square_selection(1, 4), Ok(false));
        assert!(!game.is_piece_selected());
        assert_eq!(game.handle_square_selection(12, 4), Ok(false));
        assert!(!game.is_piece_selected());

        assert_eq!(game.handle_square_selection(6, 4), Ok(false));
        assert_eq!(game.selected(), Some(Position::new(6, 4)));

        // 非法目标：清除选中，棋盘不变
        assert_eq!(game.handle_square_selection(3, 4), Ok(false));
        assert!(!game.is_piece_selected());
        assert_eq!(game.board().placement(), START_PLACEMENT);
        assert_eq!(game.current_turn(), Color::White);

        assert_eq!(game.handle_square_selection(6, 4), Ok(false));
        assert_eq!(game.handle_square_selection(4, 4), Ok(true));
        assert!(!game.is_piece_selected());
        assert_eq!(game.current_turn(), Color::Black);
        assert_eq!(game.piece_at(4, 4).map(|p| p.kind()), Some(PieceKind::Pawn));
    }

    #[test]
    fn test_reselect_own_piece_clears_selection() {
        let mut game = Game::new();
        game.handle_square_selection(6, 4).unwrap();
        // 第二次点击己方棋子当作目标，走法非法，选中被清除
        assert_eq!(game.handle_square_selection(6, 3), Ok(false));
        assert!(!game.is_piece_selected());
    }

    #[test]
    fn test_legal_moves_for() {
        let game = Game::new();
        let moves = game.legal_moves_for(Position::new(7, 6));
        assert_eq!(
            moves.into_iter().collect::<Vec<_>>(),
            vec![Position::new(5, 5), Position::new(5, 7)]
        );
        assert!(game.legal_moves_for(Position::new(3, 3)).is_empty());
        assert!(game.legal_moves_for(Position::new(7, 3)).is_empty());
    }

    #[test]
    fn test_reset() {
        let mut game = Game::new();
        game.handle_square_selection(6, 4).unwrap();
        game.handle_square_selection(4, 4).unwrap();
        game.handle_square_selection(1, 4).unwrap();
        game.reset();
        assert_eq!(game.board().placement(), START_PLACEMENT);
        assert_eq!(game.current_turn(), Color::White);
        assert!(!game.is_piece_selected());
        for piece in game.board().pieces() {
            assert_eq!(game.board().get(piece.position()), Some(piece));
        }
    }
}
