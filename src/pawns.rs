use cozy_chess::{BitBoard, Color, Piece, Rank, Square};

use crate::board::Position;

/// Structural features of a single pawn. A pawn can carry several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PawnFlags {
    /// Another friendly pawn shares the file.
    pub doubled: bool,
    /// No friendly pawn on either neighbouring file.
    pub isolated: bool,
    /// No enemy pawn in front of it on its own file.
    pub passed: bool,
    /// Backed by a friendly pawn diagonally one rank ahead.
    pub chain: bool,
}

/// `None` unless `square` holds a pawn.
pub fn pawn_flags(position: &Position, square: Square) -> Option<PawnFlags> {
    let (piece, color) = position.get_piece_at(square)?;
    if piece != Piece::Pawn {
        return None;
    }

    let board = position.board();
    let pawns = board.pieces(Piece::Pawn);
    let ours = pawns & board.colors(color);
    let theirs = pawns & board.colors(!color);
    let file = square.file();

    let chain = [-1i8, 1]
        .iter()
        .filter_map(|&df| square.try_offset(df, forward(color)))
        .any(|sq| ours.has(sq));

    Some(PawnFlags {
        doubled: !(ours & file.bitboard() & !square.bitboard()).is_empty(),
        isolated: (ours & file.adjacent()).is_empty(),
        passed: (theirs & file.bitboard() & ranks_ahead(square, color)).is_empty(),
        chain,
    })
}

fn forward(color: Color) -> i8 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

fn ranks_ahead(square: Square, color: Color) -> BitBoard {
    let rank = square.rank();
    Rank::ALL
        .iter()
        .filter(|&&r| match color {
            Color::White => r > rank,
            Color::Black => r < rank,
        })
        .fold(BitBoard::EMPTY, |acc, r| acc | r.bitboard())
}
