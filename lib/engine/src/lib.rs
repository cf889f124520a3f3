/*
 * 国际象棋规则引擎核心库入口
 *
 * 说明
 * - board：棋盘、坐标、走子记录
 * - piece：颜色、棋种以及每种棋子的走法规则
 * - game：对局状态，轮次、选子、将军与将死判定
 * - constant：棋盘尺寸、方向表、FEN 字符表
 * - error：错误类型
 */
pub mod board;
pub mod constant;
pub mod error;
pub mod game;
pub mod piece;

pub use board::{Board, Move, Position};
pub use error::{Error, Result};
pub use game::{Game, GameConfig};
pub use piece::{Color, Piece, PieceKind};
