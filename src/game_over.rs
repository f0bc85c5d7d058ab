//! Terminal-position detection.
//!
//! Cheaper than a rules library's draw-claim logic: nothing here looks ahead
//! over the legal moves, only the current position and its own history.

use chess::{ChessMove, Color};

use crate::position::Position;

/// Halfmove clock at which the game ends without a claim.
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
/// Halfmove clock beyond which the fifty-move rule applies.
pub const FIFTY_MOVE_PLIES: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawReason {
    SeventyFiveMoves,
    InsufficientMaterial,
    Stalemate,
    FivefoldRepetition,
    FiftyMoves,
    ThreefoldRepetition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Checkmate { winner: Color },
    Draw(DrawReason),
}

impl Outcome {
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(winner),
            Outcome::Draw(_) => None,
        }
    }
}

/// Whether the game has ended in `position`.
///
/// Takes `&mut` because repetition counting unwinds the move stack; the
/// position is identical on return.
pub fn is_game_over(position: &mut Position) -> bool {
    outcome(position).is_some()
}

/// How the game ended, or `None` while it goes on.
pub fn outcome(position: &mut Position) -> Option<Outcome> {
    // Mate stands whatever the clock says.
    let stuck = !position.has_legal_moves();
    if stuck && position.in_check() {
        return Some(Outcome::Checkmate {
            winner: !position.side_to_move(),
        });
    }
    if position.halfmove_clock() >= SEVENTY_FIVE_MOVE_PLIES {
        return Some(Outcome::Draw(DrawReason::SeventyFiveMoves));
    }
    if position.is_insufficient_material() {
        return Some(Outcome::Draw(DrawReason::InsufficientMaterial));
    }
    if stuck {
        return Some(Outcome::Draw(DrawReason::Stalemate));
    }

    let repetitions = repetition_count(position);
    if repetitions >= 5 {
        return Some(Outcome::Draw(DrawReason::FivefoldRepetition));
    }
    if position.halfmove_clock() > FIFTY_MOVE_PLIES {
        return Some(Outcome::Draw(DrawReason::FiftyMoves));
    }
    if repetitions >= 3 {
        return Some(Outcome::Draw(DrawReason::ThreefoldRepetition));
    }
    None
}

pub fn is_threefold_repetition(position: &mut Position) -> bool {
    repetition_count(position) >= 3
}

/// How often the current position has occurred since the last irreversible
/// move, the current occurrence included.
///
/// Walks back through the move stack and replays it, so the position is left
/// exactly as it was found.
pub fn repetition_count(position: &mut Position) -> u32 {
    let key = position.transposition_key();
    let mut count = 1;
    let mut switchyard: Vec<ChessMove> = Vec::new();

    while let Some(mv) = position.pop() {
        switchyard.push(mv);
        if position.is_irreversible(mv) {
            break;
        }
        if position.transposition_key() == key {
            count += 1;
        }
    }

    while let Some(mv) = switchyard.pop() {
        position.push(mv);
    }

    count
}
