use crate::piece::{Color, PieceKind};
use std::{collections::HashMap, sync::LazyLock};

pub const BOARD_SIZE: i32 = 8;

// 黑方底线在第 0 行，白方底线在第 7 行
pub const BLACK_BACK_ROW: i32 = 0;
pub const BLACK_PAWN_ROW: i32 = 1;
pub const WHITE_PAWN_ROW: i32 = 6;
pub const WHITE_BACK_ROW: i32 = 7;

pub const BACK_RANK: [PieceKind; BOARD_SIZE as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// FEN piece-placement field of the starting position, row 0 first.
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Unit (row, col) steps.
pub const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (-1, -1), (1, -1), (-1, 1)];
pub const QUEEN_DIRS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];
pub const KING_STEPS: [(i32, i32); 8] = QUEEN_DIRS;
pub const KNIGHT_DELTAS: [(i32, i32); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (-1, 2),
    (1, -2),
    (-1, -2),
];

pub static FEN_MAP: LazyLock<HashMap<char, (PieceKind, Color)>> = LazyLock::new(|| {
    HashMap::from([
        ('p', (PieceKind::Pawn, Color::Black)),
        ('n', (PieceKind::Knight, Color::Black)),
        ('b', (PieceKind::Bishop, Color::Black)),
        ('r', (PieceKind::Rook, Color::Black)),
        ('q', (PieceKind::Queen, Color::Black)),
        ('k', (PieceKind::King, Color::Black)),
        ('P', (PieceKind::Pawn, Color::White)),
        ('N', (PieceKind::Knight, Color::White)),
        ('B', (PieceKind::Bishop, Color::White)),
        ('R', (PieceKind::Rook, Color::White)),
        ('Q', (PieceKind::Queen, Color::White)),
        ('K', (PieceKind::King, Color::White)),
    ])
});
