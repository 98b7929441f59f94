use cozy_chess::{Color, Piece, Square};
use tracing::trace;

use crate::board::Position;
use crate::config::EvalWeights;
use crate::pawns::pawn_flags;
use crate::tables::{self, GamePhase};

/// Centipawn score, positive when White is better.
pub type Score = i32;

/// The three raw evaluation terms and their weighted sum, all from White's
/// point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalBreakdown {
    pub material: Score,
    pub piece_square: Score,
    pub pawn_structure: Score,
    pub total: Score,
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    // Piece values
    pub pawn_value: i32,
    pub knight_value: i32,
    pub bishop_value: i32,
    pub rook_value: i32,
    pub queen_value: i32,
    pub king_value: i32,

    // Pawn structure, per pawn
    pub doubled_pawn_penalty: i32,
    pub isolated_pawn_penalty: i32,
    pub passed_pawn_bonus: i32,
    pub pawn_chain_bonus: i32,

    pub weights: EvalWeights,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            pawn_value: 100,
            knight_value: 320,
            bishop_value: 330,
            rook_value: 500,
            queen_value: 900,
            king_value: 20000,

            doubled_pawn_penalty: -20,
            isolated_pawn_penalty: -10,
            passed_pawn_bonus: 20,
            pawn_chain_bonus: 5,

            weights: EvalWeights::default(),
        }
    }

    pub fn with_weights(weights: EvalWeights) -> Self {
        Self {
            weights,
            ..Self::new()
        }
    }

    pub fn evaluate(&self, position: &Position) -> Score {
        self.breakdown(position).total
    }

    pub fn breakdown(&self, position: &Position) -> EvalBreakdown {
        let material = self.material(position);
        let piece_square = self.piece_square(position);
        let pawn_structure = self.pawn_structure(position);
        let total = self.weights.material * material
            + self.weights.piece_square * piece_square
            + self.weights.pawn_structure * pawn_structure;

        trace!(
            material,
            piece_square,
            pawn_structure,
            total,
            fen = %position.to_fen(),
            "evaluated"
        );

        EvalBreakdown {
            material,
            piece_square,
            pawn_structure,
            total,
        }
    }

    pub fn piece_value(&self, piece: Piece) -> i32 {
        match piece {
            Piece::Pawn => self.pawn_value,
            Piece::Knight => self.knight_value,
            Piece::Bishop => self.bishop_value,
            Piece::Rook => self.rook_value,
            Piece::Queen => self.queen_value,
            Piece::King => self.king_value,
        }
    }

    /// White material minus Black material.
    pub fn material(&self, position: &Position) -> Score {
        Piece::ALL
            .iter()
            .map(|&piece| {
                let diff = position.count(piece, Color::White) as i32
                    - position.count(piece, Color::Black) as i32;
                diff * self.piece_value(piece)
            })
            .sum()
    }

    pub fn piece_square(&self, position: &Position) -> Score {
        let phase = GamePhase::of(position);
        self.sum_per_piece(position, |piece, color, square| {
            tables::value(piece, color, phase, square)
        })
    }

    pub fn pawn_structure(&self, position: &Position) -> Score {
        self.sum_per_piece(position, |piece, _, square| {
            if piece != Piece::Pawn {
                return 0;
            }
            let Some(flags) = pawn_flags(position, square) else {
                return 0;
            };
            let mut score = 0;
            if flags.doubled {
                score += self.doubled_pawn_penalty;
            }
            if flags.isolated {
                score += self.isolated_pawn_penalty;
            }
            if flags.passed {
                score += self.passed_pawn_bonus;
            }
            if flags.chain {
                score += self.pawn_chain_bonus;
            }
            score
        })
    }

    /// Sums a side-relative term over every piece, White minus Black.
    fn sum_per_piece(
        &self,
        position: &Position,
        term: impl Fn(Piece, Color, Square) -> i32,
    ) -> Score {
        let mut score = 0;
        for color in Color::ALL {
            for piece in Piece::ALL {
                for square in position.squares_of(piece, color) {
                    let value = term(piece, color, square);
                    score += if color == Color::White { value } else { -value };
                }
            }
        }
        score
    }
}
