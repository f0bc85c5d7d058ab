//! Static evaluation.
//!
//! A tapered material and piece-square score plus a handful of positional
//! terms, blended between midgame and endgame tables by the game phase.
//! Terminal positions are scored first: mate as `±MATE_SCORE`, draws at a
//! contempt-adjusted value.

pub mod ordering;
pub mod tables;
mod terms;

use std::fmt;

use chess::{Color, Piece, ALL_PIECES};

use crate::game_over::{self, Outcome};
use crate::position::Position;

pub use ordering::{MoveBucket, OrderingHints};
pub use tables::{EvalWeights, MAX_PHASE};

/// Score of a checkmate from White's perspective before ply adjustment.
pub const MATE_SCORE: i32 = 1_000_000;

/// Breakdown of the evaluation for one color.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SideScores {
    pub gamephase: i32,
    /// Material per piece type, indexed by [`Piece::to_index`]
    pub piece_score: [i32; 6],
    pub piece_square_midgame: [i32; 6],
    pub piece_square_endgame: [i32; 6],
    pub material_midgame: i32,
    pub material_endgame: i32,
    pub pair_bonus: i32,
    pub rook_bonus: i32,
    pub tempo_bonus: i32,
    pub blocked_pieces: i32,
    /// Already included in `material_midgame`
    pub king_shield_bonus: i32,
    pub passed_pawn_bonus: i32,
}

impl SideScores {
    fn tapered_material(&self, phase: i32) -> i32 {
        (phase * self.material_midgame + (MAX_PHASE - phase) * self.material_endgame) / MAX_PHASE
    }

    fn positional(&self) -> i32 {
        self.pair_bonus
            + self.rook_bonus
            + self.tempo_bonus
            + self.blocked_pieces
            + self.passed_pawn_bonus
    }
}

/// Result of evaluating one position.
///
/// Built empty, filled once by [`Evaluation::evaluate`]; evaluating the same
/// object again is a no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    contempt_side: Option<Color>,
    sides: [SideScores; 2],
    phase: i32,
    side_to_move: Color,
    outcome: Option<Outcome>,
    total: i32,
    total_perspective: i32,
    evaluated: bool,
}

impl Evaluation {
    pub fn new(contempt_side: Option<Color>) -> Self {
        Evaluation {
            contempt_side,
            sides: [SideScores::default(), SideScores::default()],
            phase: 0,
            side_to_move: Color::White,
            outcome: None,
            total: 0,
            total_perspective: 0,
            evaluated: false,
        }
    }

    pub fn evaluate(&mut self, weights: &EvalWeights, position: &mut Position) -> &Self {
        if self.evaluated {
            return self;
        }
        self.evaluated = true;
        self.side_to_move = position.side_to_move();

        let board = *position.board();
        for color in [Color::White, Color::Black] {
            self.sides[color.to_index()].gamephase = terms::gamephase(&board, color);
        }
        self.phase = (self.sides[0].gamephase + self.sides[1].gamephase).min(MAX_PHASE);

        if let Some(outcome) = game_over::outcome(position) {
            self.outcome = Some(outcome);
            self.total = self.terminal_score(weights, outcome);
        } else {
            for color in [Color::White, Color::Black] {
                let scores = &mut self.sides[color.to_index()];
                terms::material(scores, weights, &board, color);
                terms::pair_bonus(scores, weights, &board, color);
                terms::rook_files(scores, weights, &board, color);
                terms::tempo(scores, weights, &board, color);
                terms::blocked_pieces(scores, weights, &board, color);
                terms::king_shield(scores, weights, &board, color);
                terms::passed_pawns(scores, weights, &board, color);
            }
            self.total = self.combine();
        }

        self.total_perspective = match self.side_to_move {
            Color::White => self.total,
            Color::Black => -self.total,
        };
        self
    }

    fn terminal_score(&self, weights: &EvalWeights, outcome: Outcome) -> i32 {
        match outcome {
            Outcome::Checkmate {
                winner: Color::White,
            } => MATE_SCORE,
            Outcome::Checkmate {
                winner: Color::Black,
            } => -MATE_SCORE,
            Outcome::Draw(_) => {
                let penalty = weights.contempt_per_phase * self.phase;
                match self.contempt_side {
                    Some(Color::White) => -penalty,
                    Some(Color::Black) => penalty,
                    None => 0,
                }
            }
        }
    }

    fn combine(&self) -> i32 {
        let [white, black] = &self.sides;
        white.tapered_material(self.phase) - black.tapered_material(self.phase)
            + white.positional()
            - black.positional()
    }

    /// Signed score, positive when White stands better.
    #[inline]
    pub fn total(&self) -> i32 {
        self.total
    }

    /// Score from the side to move's point of view.
    #[inline]
    pub fn total_perspective(&self) -> i32 {
        self.total_perspective
    }

    pub fn side(&self, color: Color) -> &SideScores {
        &self.sides[color.to_index()]
    }

    /// Combined game-phase weight, capped at [`MAX_PHASE`].
    pub fn phase(&self) -> i32 {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }
}

const PIECE_NAMES: [&str; 6] = ["pawn", "knight", "bishop", "rook", "queen", "king"];

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---------- EVAL ----------")?;
        if let Some(outcome) = self.outcome {
            writeln!(f, "terminal: {outcome:?}")?;
        }
        for color in [Color::White, Color::Black] {
            let s = self.side(color);
            writeln!(f, "--------- {color:?} ---------")?;
            writeln!(f, "gamephase: {}", s.gamephase)?;
            for piece in ALL_PIECES {
                let i = piece.to_index();
                writeln!(
                    f,
                    "    {}: material {} pst {}/{}",
                    PIECE_NAMES[i],
                    s.piece_score[i],
                    s.piece_square_midgame[i],
                    s.piece_square_endgame[i]
                )?;
            }
            writeln!(f, "material: {}/{}", s.material_midgame, s.material_endgame)?;
            writeln!(
                f,
                "pair {} rook {} tempo {} blocked {} shield {} passed {}",
                s.pair_bonus,
                s.rook_bonus,
                s.tempo_bonus,
                s.blocked_pieces,
                s.king_shield_bonus,
                s.passed_pawn_bonus
            )?;
        }
        writeln!(f, "------- TOTAL SCORE ------")?;
        writeln!(f, "total: {}", self.total)?;
        write!(f, "perspective ({:?}): {}", self.side_to_move, self.total_perspective)
    }
}

/// Owns the evaluation weights and hands out fresh [`Evaluation`]s.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    weights: EvalWeights,
    contempt_side: Option<Color>,
}

impl Evaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Evaluator {
            weights,
            contempt_side: None,
        }
    }

    /// Side that dislikes draws. `None` scores every draw as 0.
    #[must_use]
    pub fn with_contempt_side(mut self, side: Option<Color>) -> Self {
        self.contempt_side = side;
        self
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    pub fn evaluate(&self, position: &mut Position) -> Evaluation {
        let mut evaluation = Evaluation::new(self.contempt_side);
        evaluation.evaluate(&self.weights, position);
        evaluation
    }

    #[inline]
    pub fn piece_value(&self, piece: Piece) -> i32 {
        self.weights.piece_value(piece)
    }
}
