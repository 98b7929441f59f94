use cozy_chess::{Color, Piece, Square};

use crate::board::Position;
use crate::movegen::{Move, RulesEngine};

/// A piece is hanging when the opponent attacks its square and no piece of
/// its own side does. Attacks are read off the position as it stands, one ply
/// deep, with no exchange evaluation. Empty squares never hang.
pub fn is_hanging<E: RulesEngine + ?Sized>(rules: &E, position: &Position, square: Square) -> bool {
    let Some((_, owner)) = position.get_piece_at(square) else {
        return false;
    };
    rules.is_square_under_attack(position, square, !owner)
        && !rules.is_square_under_attack(position, square, owner)
}

/// Whether `mv` takes a piece that was left hanging: once the capture is
/// played, nothing of the victim's side attacks the destination square.
/// Judged after the move, so a defender standing behind the capturing piece
/// counts.
pub fn is_free_capture<E: RulesEngine + ?Sized>(rules: &E, position: &Position, mv: &Move) -> bool {
    if !mv.is_capture() {
        return false;
    }
    let victim = !position.side_to_move();
    let child = rules.apply_move(position, mv);
    !rules.is_square_under_attack(&child, mv.to, victim)
}

/// Every hanging piece of `color`, a1 to h8.
pub fn hanging_pieces<E: RulesEngine + ?Sized>(
    rules: &E,
    position: &Position,
    color: Color,
) -> Vec<Square> {
    let mut squares: Vec<Square> = Piece::ALL
        .iter()
        .flat_map(|&piece| position.squares_of(piece, color))
        .filter(|&square| is_hanging(rules, position, square))
        .collect();
    squares.sort();
    squares
}
