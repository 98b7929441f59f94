use std::fmt;

use cozy_chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves,
    BitBoard, Board, Color, File, Piece, Square,
};

use crate::board::Position;
use crate::error::{EngineError, EngineResult};

/// A legal transition produced by the Rules Engine.
///
/// `to` is the square the moving piece lands on, so castling reads e1g1
/// rather than king-takes-rook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured_piece: Option<Piece>,
    pub promotion: Option<Piece>,
    pub is_en_passant: bool,
    pub is_castling: bool,
    raw: cozy_chess::Move,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }

    /// Square the captured piece stood on. Differs from `to` only for en passant.
    pub fn capture_square(&self) -> Option<Square> {
        if !self.is_capture() {
            return None;
        }
        if self.is_en_passant {
            Some(Square::new(self.to.file(), self.from.rank()))
        } else {
            Some(self.to)
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            let c = match promotion {
                Piece::Queen => 'q',
                Piece::Rook => 'r',
                Piece::Bishop => 'b',
                Piece::Knight => 'n',
                _ => '?',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    /// The winner.
    Checkmate(Color),
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        *self != GameState::Ongoing
    }
}

/// The query/mutate surface the search core consumes. Implementations own
/// the chess rules; the core never inspects a board beyond these calls and
/// `Position`'s read-only accessors.
pub trait RulesEngine {
    /// Every legal move, possibly none.
    fn legal_moves(&self, position: &Position) -> Vec<Move>;

    /// A new position with `mv` played. `mv` must come from `legal_moves`.
    fn apply_move(&self, position: &Position, mv: &Move) -> Position;

    fn game_state(&self, position: &Position) -> GameState;

    fn is_game_over(&self, position: &Position) -> bool {
        self.game_state(position).is_over()
    }

    /// Whether any piece of `attacker_color` attacks `square`.
    fn is_square_under_attack(
        &self,
        position: &Position,
        square: Square,
        attacker_color: Color,
    ) -> bool;

    /// Opaque board encoding for logging and display.
    fn to_notation(&self, position: &Position) -> String {
        position.to_fen()
    }
}

/// Rules Engine backed by `cozy-chess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_position(&self, fen: &str) -> EngineResult<Position> {
        Position::from_fen(fen)
    }

    /// Finds the legal move written in long algebraic notation (`e2e4`,
    /// `e7e8q`, `e1g1`).
    pub fn parse_move(&self, position: &Position, text: &str) -> EngineResult<Move> {
        let text = text.trim();
        self.legal_moves(position)
            .into_iter()
            .find(|mv| mv.to_string() == text)
            .ok_or_else(|| EngineError::IllegalMove {
                mv: text.to_string(),
                fen: position.to_fen(),
            })
    }

    /// `apply_move` for moves that did not come from `legal_moves`.
    pub fn try_apply_move(&self, position: &Position, mv: &Move) -> EngineResult<Position> {
        if !position.board().is_legal(mv.raw) {
            return Err(EngineError::IllegalMove {
                mv: mv.to_string(),
                fen: position.to_fen(),
            });
        }
        Ok(self.apply_move(position, mv))
    }

    pub fn is_move_valid(&self, position: &Position, mv: &Move) -> bool {
        self.legal_moves(position).contains(mv)
    }

    pub fn is_king_in_check(&self, position: &Position, color: Color) -> bool {
        let king = position.board().king(color);
        self.is_square_under_attack(position, king, !color)
    }

    fn describe(&self, board: &Board, piece: Piece, raw: cozy_chess::Move) -> Move {
        let us = board.side_to_move();
        let mut mv = Move {
            from: raw.from,
            to: raw.to,
            piece,
            captured_piece: None,
            promotion: raw.promotion,
            is_en_passant: false,
            is_castling: false,
            raw,
        };

        if piece == Piece::King && board.color_on(raw.to) == Some(us) {
            // cozy-chess encodes castling as the king capturing its own rook
            let file = if raw.to.file() > raw.from.file() {
                File::G
            } else {
                File::C
            };
            mv.to = Square::new(file, raw.from.rank());
            mv.is_castling = true;
        } else if board.color_on(raw.to) == Some(!us) {
            mv.captured_piece = board.piece_on(raw.to);
        } else if piece == Piece::Pawn && raw.from.file() != raw.to.file() {
            mv.captured_piece = Some(Piece::Pawn);
            mv.is_en_passant = true;
        }
        mv
    }

    fn insufficient_material(&self, board: &Board) -> bool {
        let heavy = board.pieces(Piece::Rook) | board.pieces(Piece::Queen) | board.pieces(Piece::Pawn);
        match board.occupied().len() {
            2 => true,
            3 => heavy.is_empty(),
            _ => false,
        }
    }
}

impl RulesEngine for MoveGenerator {
    fn legal_moves(&self, position: &Position) -> Vec<Move> {
        let board = position.board();
        let mut moves = Vec::with_capacity(64);
        board.generate_moves(|piece_moves| {
            for raw in piece_moves {
                moves.push(self.describe(board, piece_moves.piece, raw));
            }
            false
        });
        moves
    }

    fn apply_move(&self, position: &Position, mv: &Move) -> Position {
        let mut board = position.board().clone();
        debug_assert!(board.is_legal(mv.raw), "{} is not legal", mv);
        board.play_unchecked(mv.raw);
        Position::from_board(board)
    }

    fn game_state(&self, position: &Position) -> GameState {
        let board = position.board();
        let has_moves = board.generate_moves(|_| true);
        if !has_moves {
            if board.checkers().is_empty() {
                return GameState::Stalemate;
            }
            return GameState::Checkmate(!board.side_to_move());
        }
        if board.halfmove_clock() >= 100 {
            return GameState::FiftyMoveRule;
        }
        if self.insufficient_material(board) {
            return GameState::InsufficientMaterial;
        }
        GameState::Ongoing
    }

    fn is_square_under_attack(
        &self,
        position: &Position,
        square: Square,
        attacker_color: Color,
    ) -> bool {
        let board = position.board();
        let occupied = board.occupied();
        let attackers = board.colors(attacker_color);
        let pieces = |piece: Piece| board.pieces(piece) & attackers;
        let queens = pieces(Piece::Queen);

        // a pawn of `attacker_color` hits `square` from where a pawn of the
        // other color standing on `square` would capture
        let hits = (get_pawn_attacks(square, !attacker_color) & pieces(Piece::Pawn))
            | (get_knight_moves(square) & pieces(Piece::Knight))
            | (get_bishop_moves(square, occupied) & (pieces(Piece::Bishop) | queens))
            | (get_rook_moves(square, occupied) & (pieces(Piece::Rook) | queens))
            | (get_king_moves(square) & pieces(Piece::King));
        hits != BitBoard::EMPTY
    }
}
