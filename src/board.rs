use std::fmt;

use cozy_chess::{Board, Color, File, Piece, Rank, Square};

use crate::error::{EngineError, EngineResult};

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A full board snapshot: placement, side to move, castling rights,
/// en-passant target and move counters.
///
/// The core never mutates a `Position`; every step asks the Rules Engine for
/// a fresh copy with the move applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            board: Board::default(),
        }
    }
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a FEN string.
    pub fn from_fen(fen: &str) -> EngineResult<Self> {
        let fen = fen.trim();
        Board::from_fen(fen, false)
            .map(Self::from_board)
            .map_err(|e| EngineError::InvalidPosition {
                fen: fen.to_string(),
                reason: e.to_string(),
            })
    }

    pub(crate) fn from_board(board: Board) -> Self {
        Self { board }
    }

    pub(crate) fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_fen(&self) -> String {
        self.board.to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn halfmove_clock(&self) -> u8 {
        self.board.halfmove_clock()
    }

    pub fn fullmove_number(&self) -> u16 {
        self.board.fullmove_number()
    }

    pub fn get_piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(square)?;
        let color = self.board.color_on(square)?;
        Some((piece, color))
    }

    /// Squares holding `piece` of `color`, a1 to h8.
    pub fn squares_of(&self, piece: Piece, color: Color) -> impl Iterator<Item = Square> {
        (self.board.pieces(piece) & self.board.colors(color)).into_iter()
    }

    pub fn count(&self, piece: Piece, color: Color) -> usize {
        (self.board.pieces(piece) & self.board.colors(color)).len() as usize
    }

    /// The same position with colors swapped and the board flipped
    /// vertically: a white knight on b1 becomes a black knight on b8.
    pub fn mirrored(&self) -> EngineResult<Self> {
        let fen = self.to_fen();
        let mut fields = fen.split(' ');
        let (placement, side, castling, en_passant, halfmove, fullmove) = match (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) {
            (Some(p), Some(s), Some(c), Some(e), Some(h), Some(f)) => (p, s, c, e, h, f),
            _ => {
                return Err(EngineError::InvalidPosition {
                    fen,
                    reason: "expected six FEN fields".to_string(),
                })
            }
        };

        let placement = placement
            .split('/')
            .rev()
            .map(swap_case)
            .collect::<Vec<_>>()
            .join("/");
        let side = if side == "w" { "b" } else { "w" };
        let castling = if castling == "-" {
            castling.to_string()
        } else {
            let swapped = swap_case(castling);
            "KQkq".chars().filter(|c| swapped.contains(*c)).collect()
        };
        let en_passant = match en_passant.parse::<Square>() {
            Ok(square) => square.flip_rank().to_string(),
            Err(_) => "-".to_string(),
        };

        Self::from_fen(&format!(
            "{} {} {} {} {} {}",
            placement, side, castling, en_passant, halfmove, fullmove
        ))
    }
}

fn swap_case(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}

pub fn piece_char(piece: Piece, color: Color) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    if color == Color::White {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for rank in (0..8).rev() {
            for file in 0..8 {
                let square = Square::new(File::index(file), Rank::index(rank));
                match self.get_piece_at(square) {
                    Some((piece, color)) => result.push(piece_char(piece, color)),
                    None => result.push('.'),
                }
                if file < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        write!(f, "{}", result)
    }
}
