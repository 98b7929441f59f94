use cozy_chess::{Color, Piece, Square};

use crate::board::Position;

/// 8x8 bonus grid seen from White's side of the board: row 0 is rank 8,
/// column 0 is the a-file.
pub type PieceSquareTable = [[i32; 8]; 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Opening and middle game.
    MiddleGame,
    EndGame,
}

impl GamePhase {
    /// The end game starts once neither side has a queen, or every side that
    /// still has one is left with at most a single minor piece beside it.
    pub fn of(position: &Position) -> Self {
        let queenless_or_light = Color::ALL.iter().all(|&color| {
            if position.count(Piece::Queen, color) == 0 {
                return true;
            }
            let rooks = position.count(Piece::Rook, color);
            let minors =
                position.count(Piece::Knight, color) + position.count(Piece::Bishop, color);
            let queens = position.count(Piece::Queen, color);
            queens == 1 && rooks == 0 && minors <= 1
        });
        if queenless_or_light {
            GamePhase::EndGame
        } else {
            GamePhase::MiddleGame
        }
    }
}

pub const PAWN: PieceSquareTable = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [50, 50, 50, 50, 50, 50, 50, 50],
    [10, 10, 20, 30, 30, 20, 10, 10],
    [5, 5, 10, 25, 25, 10, 5, 5],
    [0, 0, 0, 20, 20, 0, 0, 0],
    [5, -5, -10, 0, 0, -10, -5, 5],
    [5, 10, 10, -20, -20, 10, 10, 5],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

pub const KNIGHT: PieceSquareTable = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20, 0, 0, 0, 0, -20, -40],
    [-30, 0, 10, 15, 15, 10, 0, -30],
    [-30, 5, 15, 20, 20, 15, 5, -30],
    [-30, 0, 15, 20, 20, 15, 0, -30],
    [-30, 5, 10, 15, 15, 10, 5, -30],
    [-40, -20, 0, 5, 5, 0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

pub const BISHOP: PieceSquareTable = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 10, 10, 5, 0, -10],
    [-10, 5, 5, 10, 10, 5, 5, -10],
    [-10, 0, 10, 10, 10, 10, 0, -10],
    [-10, 10, 10, 10, 10, 10, 10, -10],
    [-10, 5, 0, 0, 0, 0, 5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

pub const ROOK: PieceSquareTable = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [5, 10, 10, 10, 10, 10, 10, 5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [0, 0, 0, 5, 5, 0, 0, 0],
];

pub const QUEEN: PieceSquareTable = [
    [-20, -10, -10, -5, -5, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 5, 5, 5, 0, -10],
    [-5, 0, 5, 5, 5, 5, 0, -5],
    [0, 0, 5, 5, 5, 5, 0, -5],
    [-10, 5, 5, 5, 5, 5, 0, -10],
    [-10, 0, 5, 0, 0, 0, 0, -10],
    [-20, -10, -10, -5, -5, -10, -10, -20],
];

/// Shelter behind the pawns while the heavy pieces are on the board.
pub const KING_MIDDLE_GAME: PieceSquareTable = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [20, 20, 0, 0, 0, 0, 20, 20],
    [20, 30, 10, 0, 0, 10, 30, 20],
];

/// Centralize once they are gone.
pub const KING_END_GAME: PieceSquareTable = [
    [-50, -40, -30, -20, -20, -30, -40, -50],
    [-30, -20, -10, 0, 0, -10, -20, -30],
    [-30, -10, 20, 30, 30, 20, -10, -30],
    [-30, -10, 30, 40, 40, 30, -10, -30],
    [-30, -10, 30, 40, 40, 30, -10, -30],
    [-30, -10, 20, 30, 30, 20, -10, -30],
    [-30, -30, 0, 0, 0, 0, -30, -30],
    [-50, -30, -30, -30, -30, -30, -30, -50],
];

pub fn table_for(piece: Piece, phase: GamePhase) -> &'static PieceSquareTable {
    match piece {
        Piece::Pawn => &PAWN,
        Piece::Knight => &KNIGHT,
        Piece::Bishop => &BISHOP,
        Piece::Rook => &ROOK,
        Piece::Queen => &QUEEN,
        Piece::King => match phase {
            GamePhase::MiddleGame => &KING_MIDDLE_GAME,
            GamePhase::EndGame => &KING_END_GAME,
        },
    }
}

/// Bonus for `piece` of `color` on `square`, from that side's point of view.
/// Black reads the White table upside down.
pub fn value(piece: Piece, color: Color, phase: GamePhase, square: Square) -> i32 {
    let rank = square.rank() as usize;
    let row = match color {
        Color::White => 7 - rank,
        Color::Black => rank,
    };
    table_for(piece, phase)[row][square.file() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase_of(fen: &str) -> GamePhase {
        GamePhase::of(&Position::from_fen(fen).unwrap())
    }

    #[test]
    fn lookups_are_side_relative() {
        let mid = GamePhase::MiddleGame;
        assert_eq!(value(Piece::Pawn, Color::White, mid, Square::E2), -20);
        assert_eq!(value(Piece::Pawn, Color::White, mid, Square::E4), 20);
        assert_eq!(value(Piece::Pawn, Color::Black, mid, Square::E7), -20);
        assert_eq!(value(Piece::Pawn, Color::Black, mid, Square::E5), 20);
        assert_eq!(value(Piece::Knight, Color::White, mid, Square::B1), -40);
        assert_eq!(value(Piece::King, Color::White, mid, Square::G1), 30);
        assert_eq!(value(Piece::King, Color::Black, mid, Square::G8), 30);
    }

    #[test]
    fn mirrored_squares_share_a_value() {
        for phase in [GamePhase::MiddleGame, GamePhase::EndGame] {
            for piece in Piece::ALL {
                for square in Square::ALL {
                    assert_eq!(
                        value(piece, Color::White, phase, square),
                        value(piece, Color::Black, phase, square.flip_rank()),
                    );
                }
            }
        }
    }

    #[test]
    fn king_table_depends_on_phase() {
        assert_eq!(
            value(Piece::King, Color::White, GamePhase::MiddleGame, Square::E4),
            -40
        );
        assert_eq!(
            value(Piece::King, Color::White, GamePhase::EndGame, Square::E4),
            40
        );
        // every other piece ignores the phase
        assert_eq!(
            table_for(Piece::Queen, GamePhase::EndGame),
            table_for(Piece::Queen, GamePhase::MiddleGame)
        );
    }

    #[test]
    fn test_game_phase() {
        assert_eq!(
            phase_of("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            GamePhase::MiddleGame
        );
        // no queens at all
        assert_eq!(
            phase_of("4k3/pppppppp/8/8/8/8/PPPPPPPP/4K3 w - - 0 1"),
            GamePhase::EndGame
        );
        // queen plus a single minor piece
        assert_eq!(
            phase_of("3qk3/8/8/8/8/8/8/3QK1N1 w - - 0 1"),
            GamePhase::EndGame
        );
        // a rook next to the queen keeps the middle game going
        assert_eq!(
            phase_of("3qk3/8/8/8/8/8/8/R2QK3 w - - 0 1"),
            GamePhase::MiddleGame
        );
        // only one side still has a queen
        assert_eq!(
            phase_of("r3k3/8/8/8/8/8/8/3QK3 w - - 0 1"),
            GamePhase::EndGame
        );
    }
}
