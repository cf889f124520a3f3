/*
 * 棋盘模块（Board、Position 与 Move）
 *
 * 设计要点
 * - 棋盘为 8 x 8，第 0 行是黑方底线，第 7 行是白方底线，白方向行号减小的方向推进
 * - 每格最多一个棋子，Board 是所有棋子的唯一拥有者
 * - 格子内容是唯一的事实来源；棋子自身记录的位置由 Board 在 put/set 时同步
 * - Move 记录一次走子的起点、终点、走的子和被吃的子，apply_move / undo_move 成对使用，
 *   用于将军模拟：走一步、查询、原样恢复
 */

use std::fmt;

use crate::constant::{BACK_RANK, BOARD_SIZE, FEN_MAP, KING_STEPS, KNIGHT_DELTAS};
use crate::error::{Error, Result};
use crate::piece::{Color, Piece, PieceKind};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// The square `(row_delta, col_delta)` away. May lie off the board.
    pub fn offset(&self, row_delta: i32, col_delta: i32) -> Self {
        Position::new(self.row + row_delta, self.col + col_delta)
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Position::new(row, col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// 位置是否在棋盘内
pub fn in_board(pos: Position) -> bool {
    pos.row >= 0 && pos.row < BOARD_SIZE && pos.col >= 0 && pos.col < BOARD_SIZE
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Move {
    pub from: Position,          // 起手位置
    pub to: Position,            // 落子位置
    pub piece: Piece,            // 走的子，位置仍是 from
    pub capture: Option<Piece>, // 这一步吃的子
}

#[derive(Clone, PartialEq, Debug)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Board {
    // 标准开局：双方底线车马象后王象马车，前一行全是兵
    pub fn init() -> Self {
        let mut board = Board::empty();
        for (col, kind) in BACK_RANK.into_iter().enumerate() {
            let col = col as i32;
            for color in [Color::Black, Color::White] {
                let back = Position::new(color.back_row(), col);
                let pawn = Position::new(color.pawn_row(), col);
                board.put(back, Some(Piece::new(kind, color, back)));
                board.put(pawn, Some(Piece::new(PieceKind::Pawn, color, pawn)));
            }
        }
        board
    }

    pub fn empty() -> Self {
        Board {
            cells: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
        }
    }

    /// Builds a board from a FEN piece-placement field, row 0 first.
    /// Anything after the first space (side to move etc.) is ignored.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let placement = fen.split_whitespace().next().unwrap_or_default();
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(Error::InvalidFen(format!(
                "expected {} rows, found {}",
                BOARD_SIZE,
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (row, text) in rows.into_iter().enumerate() {
            let row = row as i32;
            let mut col = 0;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as i32;
                } else if let Some(&(kind, color)) = FEN_MAP.get(&c) {
                    let pos = Position::new(row, col);
                    if !in_board(pos) {
                        return Err(Error::InvalidFen(format!("row {} is too long", row)));
                    }
                    board.put(pos, Some(Piece::new(kind, color, pos)));
                    col += 1;
                } else {
                    return Err(Error::InvalidFen(format!("unknown piece '{}'", c)));
                }
            }
            if col != BOARD_SIZE {
                return Err(Error::InvalidFen(format!(
                    "row {} covers {} squares",
                    row, col
                )));
            }
        }
        Ok(board)
    }

    /// FEN piece-placement field of this board, the inverse of `from_fen`.
    pub fn placement(&self) -> String {
        let mut fen = String::new();
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                fen.push('/');
            }
            let mut empty = 0;
            for cell in row {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
        }
        fen
    }

    pub fn get(&self, pos: Position) -> Option<&Piece> {
        if in_board(pos) {
            self.cells[pos.row as usize][pos.col as usize].as_ref()
        } else {
            None
        }
    }

    /// Places `piece` on `pos` (or vacates it) and returns the previous occupant.
    /// The placed piece's stored position is updated to `pos`.
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) -> Result<Option<Piece>> {
        if !in_board(pos) {
            return Err(Error::OffBoard(pos));
        }
        Ok(self.put(pos, piece))
    }

    // 调用方保证 pos 在棋盘内
    fn put(&mut self, pos: Position, mut piece: Option<Piece>) -> Option<Piece> {
        if let Some(p) = piece.as_mut() {
            p.set_position(pos);
        }
        std::mem::replace(&mut self.cells[pos.row as usize][pos.col as usize], piece)
    }

    /// Captures the current contents of `from` and `to` as a move record.
    /// `None` if either square is off the board or `from` is empty.
    pub fn record_move(&self, from: Position, to: Position) -> Option<Move> {
        if !in_board(to) {
            return None;
        }
        let piece = *self.get(from)?;
        Some(Move {
            from,
            to,
            piece,
            capture: self.get(to).copied(),
        })
    }

    // 直接落子，不检查走法（用于模拟）
    pub fn apply_move(&mut self, m: &Move) {
        self.put(m.from, None);
        self.put(m.to, Some(m.piece));
    }

    // 撤销 apply_move：把走的子放回起点，被吃的子放回终点
    pub fn undo_move(&mut self, m: &Move) {
        self.put(m.from, Some(m.piece));
        self.put(m.to, m.capture);
    }

    /// Moves the piece on `from` to `to` if its movement rule allows it,
    /// capturing whatever stands on `to`. Returns false and leaves the board
    /// untouched otherwise.
    pub fn move_piece(&mut self, from: Position, to: Position) -> bool {
        let Some(m) = self.record_move(from, to) else {
            return false;
        };
        if !m.piece.is_valid_move(to, self) {
            return false;
        }
        self.apply_move(&m);
        true
    }

    // from 与 to 之间（不含两端）的格子是否都为空；两点不在同一直线或斜线上时返回 false
    pub fn is_path_clear(&self, from: Position, to: Position) -> bool {
        let row_diff = to.row - from.row;
        let col_diff = to.col - from.col;
        if row_diff != 0 && col_diff != 0 && row_diff.abs() != col_diff.abs() {
            return false;
        }

        let (row_step, col_step) = (row_diff.signum(), col_diff.signum());
        let mut pos = from.offset(row_step, col_step);
        while pos != to {
            if !in_board(pos) || self.get(pos).is_some() {
                return false;
            }
            pos = pos.offset(row_step, col_step);
        }
        true
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|p| p.kind() == PieceKind::King && p.belong_to(color))
            .map(|p| p.position())
    }

    /// Every piece on the board, row by row.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.cells.iter().flatten().flatten()
    }

    /// Destination squares for the piece on `pos`, for move highlighting.
    /// Sliding pieces stop at the first occupied square and include it only
    /// when it holds an opponent. Self-check is not considered.
    pub fn generate_moves(&self, pos: Position) -> Vec<Position> {
        let Some(piece) = self.get(pos) else {
            return vec![];
        };
        let mut targets = vec![];
        match piece.kind() {
            PieceKind::Pawn => {
                let forward = piece.color().forward();
                for (dr, dc) in [(forward, 0), (2 * forward, 0), (forward, -1), (forward, 1)] {
                    let to = pos.offset(dr, dc);
                    if piece.is_valid_move(to, self) {
                        targets.push(to);
                    }
                }
            }
            PieceKind::Knight => self.step_targets(piece, &KNIGHT_DELTAS, &mut targets),
            PieceKind::King => self.step_targets(piece, &KING_STEPS, &mut targets),
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                for &(dr, dc) in piece.kind().slide_dirs() {
                    let mut to = pos.offset(dr, dc);
                    while in_board(to) {
                        match self.get(to) {
                            None => targets.push(to),
                            Some(other) => {
                                if !other.belong_to(piece.color()) {
                                    targets.push(to);
                                }
                                break;
                            }
                        }
                        to = to.offset(dr, dc);
                    }
                }
            }
        }
        targets
    }

    fn step_targets(&self, piece: &Piece, steps: &[(i32, i32)], targets: &mut Vec<Position>) {
        for &(dr, dc) in steps {
            let to = piece.position().offset(dr, dc);
            if in_board(to) && !self.get(to).is_some_and(|p| p.belong_to(piece.color())) {
                targets.push(to);
            }
        }
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::init()
    }
}
