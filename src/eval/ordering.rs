//! Move ordering for the main search and for quiescence.

use std::cmp::Reverse;

use chess::{ChessMove, Piece};

use super::Evaluator;
use crate::position::Position;

/// Priority class of a move, tried in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoveBucket {
    TranspositionMove,
    PrincipalVariation,
    PrimaryKiller,
    SecondaryKiller,
    /// Pawn captures and captures onto undefended squares
    GoodCapture,
    Capture,
    Quiet,
    /// Puts the moved piece where a cheaper piece can take it
    Exposed,
}

/// Moves the search already believes in for the current node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderingHints {
    pub tt_move: Option<ChessMove>,
    pub pv_move: Option<ChessMove>,
    pub killers: [Option<ChessMove>; 2],
}

impl Evaluator {
    /// Legal moves, most promising first.
    ///
    /// A move that mates on the spot is returned on its own. Otherwise moves
    /// are grouped by [`MoveBucket`]; within a bucket generation order is kept.
    pub fn move_order(&self, position: &Position, hints: &OrderingHints) -> Vec<ChessMove> {
        let legal = position.legal_moves();
        if let Some(mate) = legal.iter().copied().find(|&mv| position.gives_checkmate(mv)) {
            return vec![mate];
        }

        let mut ranked: Vec<(MoveBucket, ChessMove)> = legal
            .into_iter()
            .map(|mv| (self.bucket(position, hints, mv), mv))
            .collect();
        ranked.sort_by_key(|&(bucket, _)| bucket);
        ranked.into_iter().map(|(_, mv)| mv).collect()
    }

    /// Classify a single legal move.
    pub fn bucket(&self, position: &Position, hints: &OrderingHints, mv: ChessMove) -> MoveBucket {
        let hinted = Some(mv);
        if hints.tt_move == hinted {
            return MoveBucket::TranspositionMove;
        }
        if hints.pv_move == hinted {
            return MoveBucket::PrincipalVariation;
        }
        if hints.killers[0] == hinted {
            return MoveBucket::PrimaryKiller;
        }
        if hints.killers[1] == hinted {
            return MoveBucket::SecondaryKiller;
        }
        self.heuristic_bucket(position, mv)
    }

    fn heuristic_bucket(&self, position: &Position, mv: ChessMove) -> MoveBucket {
        let them = !position.side_to_move();
        let board = position.board();
        let moving = board.piece_on(mv.get_source());

        if position.is_capture(mv) {
            return if moving == Some(Piece::Pawn) || !position.is_attacked_by(them, mv.get_dest()) {
                MoveBucket::GoodCapture
            } else {
                MoveBucket::Capture
            };
        }

        if moving == Some(Piece::Queen) && position.is_attacked_by(them, mv.get_dest()) {
            return MoveBucket::Exposed;
        }

        let threatened_at_dest = self.attacked_by_inferior_piece(position, mv, true);
        if self.attacked_by_inferior_piece(position, mv, false) {
            // Escaping: fine if the new square is quiet and held at least as
            // often as it is hit.
            let dest = mv.get_dest();
            let defenders = position.attackers(position.side_to_move(), dest).popcnt();
            let attackers = position.attackers(them, dest).popcnt();
            if threatened_at_dest || defenders < attackers {
                return MoveBucket::Exposed;
            }
            return MoveBucket::Quiet;
        }
        if threatened_at_dest {
            return MoveBucket::Exposed;
        }
        MoveBucket::Quiet
    }

    /// Whether an enemy piece worth less than the mover attacks the move's
    /// destination (`to_square`) or its origin.
    ///
    /// Values are compared in whole pawns so knight and bishop count as equal.
    pub fn attacked_by_inferior_piece(
        &self,
        position: &Position,
        mv: ChessMove,
        to_square: bool,
    ) -> bool {
        let board = position.board();
        let Some(mover) = board.piece_on(mv.get_source()) else {
            return false;
        };
        let checked = if to_square {
            mv.get_dest()
        } else {
            mv.get_source()
        };
        let our_value = self.piece_value(mover) / 100;

        position
            .attackers(!position.side_to_move(), checked)
            .into_iter()
            .filter_map(|sq| board.piece_on(sq))
            .any(|attacker| our_value > self.piece_value(attacker) / 100)
    }

    /// Material swing of a capture: victim minus attacker. En passant counts
    /// as winning a pawn outright; non-captures are 0.
    pub fn capture_value(&self, position: &Position, mv: ChessMove) -> i32 {
        if position.is_en_passant(mv) {
            return self.piece_value(Piece::Pawn);
        }
        let board = position.board();
        match (board.piece_on(mv.get_dest()), board.piece_on(mv.get_source())) {
            (Some(victim), Some(attacker)) => self.piece_value(victim) - self.piece_value(attacker),
            _ => 0,
        }
    }

    /// Captures for quiescence, best material gain first. Stable for ties.
    pub fn capture_order(&self, position: &Position) -> Vec<ChessMove> {
        let mut captures = position.captures();
        captures.sort_by_key(|&mv| Reverse(self.capture_value(position, mv)));
        captures
    }
}
