/*
 * 棋子与走法规则
 *
 * - Color 表示执子方，白方先行，向第 0 行推进
 * - PieceKind 区分六种棋子，每种棋子一条走法规则
 * - Piece 只记录种类、颜色和当前位置，不持有棋盘；位置由 Board 在落子时维护
 * - is_valid_move 是纯函数：只看棋子、目标格和棋盘内容，不修改任何状态，也不考虑走后是否被将军
 */

use std::fmt;

use crate::board::{in_board, Board, Position};
use crate::constant::{
    BISHOP_DIRS, BLACK_BACK_ROW, BLACK_PAWN_ROW, QUEEN_DIRS, ROOK_DIRS, WHITE_BACK_ROW,
    WHITE_PAWN_ROW,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row step of a pawn advance.
    pub fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn pawn_row(self) -> i32 {
        match self {
            Color::White => WHITE_PAWN_ROW,
            Color::Black => BLACK_PAWN_ROW,
        }
    }

    pub fn back_row(self) -> i32 {
        match self {
            Color::White => WHITE_BACK_ROW,
            Color::Black => BLACK_BACK_ROW,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub fn symbol(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    /// Unit directions for sliding pieces, empty for everything else.
    pub fn slide_dirs(self) -> &'static [(i32, i32)] {
        match self {
            PieceKind::Bishop => &BISHOP_DIRS,
            PieceKind::Rook => &ROOK_DIRS,
            PieceKind::Queen => &QUEEN_DIRS,
            _ => &[],
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    position: Position,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, position: Position) -> Self {
        Piece {
            kind,
            color,
            position,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Square this piece stands on. Kept equal to its board cell by `Board`.
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn belong_to(&self, color: Color) -> bool {
        self.color == color
    }

    /// Glyph of the piece: uppercase for White, lowercase for Black.
    pub fn symbol(&self) -> char {
        match self.color {
            Color::White => self.kind.symbol(),
            Color::Black => self.kind.symbol().to_ascii_lowercase(),
        }
    }

    // 判断棋子能否走到 to（不检查走后己方是否被将军）
    pub fn is_valid_move(&self, to: Position, board: &Board) -> bool {
        let from = self.position;
        if !in_board(to) || to == from {
            return false;
        }

        // 目标格有己方棋子，不能吃
        if board.get(to).is_some_and(|target| target.belong_to(self.color)) {
            return false;
        }

        let row_diff = to.row - from.row;
        let col_diff = to.col - from.col;

        match self.kind {
            PieceKind::Pawn => self.is_valid_pawn_move(to, row_diff, col_diff, board),
            PieceKind::Knight => matches!((row_diff.abs(), col_diff.abs()), (1, 2) | (2, 1)),
            PieceKind::Bishop => row_diff.abs() == col_diff.abs() && board.is_path_clear(from, to),
            PieceKind::Rook => (row_diff == 0 || col_diff == 0) && board.is_path_clear(from, to),
            PieceKind::Queen => {
                (row_diff == 0 || col_diff == 0 || row_diff.abs() == col_diff.abs())
                    && board.is_path_clear(from, to)
            }
            PieceKind::King => row_diff.abs().max(col_diff.abs()) == 1,
        }
    }

    fn is_valid_pawn_move(&self, to: Position, row_diff: i32, col_diff: i32, board: &Board) -> bool {
        let forward = self.color.forward();
        let target_empty = board.get(to).is_none();

        if col_diff == 0 {
            if row_diff == forward {
                return target_empty;
            }
            // 只有在起始行才能走两步，中间格和目标格都必须为空
            if row_diff == 2 * forward {
                return self.position.row == self.color.pawn_row()
                    && target_empty
                    && board.get(self.position.offset(forward, 0)).is_none();
            }
            return false;
        }

        // 斜吃：目标格必须是对方棋子，同色已在上面排除
        col_diff.abs() == 1 && row_diff == forward && !target_empty
    }
}
