//! Evaluation constants and tables.
//!
//! Square tables are laid out from White's point of view with a1 at index 0
//! and h8 at index 63; Black looks them up through a vertical mirror.

use chess::Piece;

/// Upper bound of the summed game-phase weight (full material).
pub const MAX_PHASE: i32 = 24;

// ============================================================================
// PIECE-SQUARE TABLES
// ============================================================================

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,  0,  0,   0,   0,  0,  0,  0,
    -6, -4,  1, -24, -24,  1, -4, -6,
    -4, -4,  1,   5,   5,  1, -4, -4,
    -6, -4,  5,  10,  10,  5, -4, -6,
    -6, -4,  2,   8,   8,  2, -4, -6,
    -6, -4,  1,   2,   2,  1, -4, -6,
    -6, -4,  1,   1,   1,  1, -4, -6,
     0,  0,  0,   0,   0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -8, -12, -8, -8, -8, -8, -12, -8,
    -8,   0,  1,  2,  2,  1,   0, -8,
    -8,   0,  4,  4,  4,  4,   0, -8,
    -8,   0,  4,  8,  8,  4,   0, -8,
    -8,   0,  4,  8,  8,  4,   0, -8,
    -8,   0,  4,  4,  4,  4,   0, -8,
    -8,   0,  0,  0,  0,  0,   0, -8,
    -8,  -8, -8, -8, -8, -8,  -8, -8,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -4, -4, -12, -4, -4, -12, -4, -4,
    -4,  2,   1,  1,  1,   1,  2, -4,
    -4,  1,   2,  4,  4,   2,  1, -4,
    -4,  0,   4,  6,  6,   4,  0, -4,
    -4,  0,   4,  6,  6,   4,  0, -4,
    -4,  0,   2,  4,  4,   2,  0, -4,
    -4,  0,   0,  0,  0,   0,  0, -4,
    -4, -4,  -4, -4, -4,  -4, -4, -4,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,  0,  0,  2,  2,  0,  0,  0,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    20, 20, 20, 20, 20, 20, 20, 20,
     5,  5,  5,  5,  5,  5,  5,  5,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -5, -5, -5, -5, -5, -5, -5, -5,
     0,  0,  1,  1,  1,  1,  0,  0,
     0,  0,  1,  2,  2,  1,  0,  0,
     0,  0,  2,  3,  3,  2,  0,  0,
     0,  0,  2,  3,  3,  2,  0,  0,
     0,  0,  1,  2,  2,  1,  0,  0,
     0,  0,  1,  1,  1,  1,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KING_TABLE_MG: [i32; 64] = [
     40,  50,  30,  10,  10,  30,  50,  40,
     30,  40,  20,   0,   0,  20,  40,  30,
     10,  20,   0, -20, -20,   0,  20,  10,
      0,  10, -10, -30, -30, -10,  10,   0,
    -10,   0, -20, -40, -40, -20,   0, -10,
    -20, -10, -30, -50, -50, -30, -10, -20,
    -30, -20, -40, -60, -60, -40, -20, -30,
    -40, -30, -50, -70, -70, -50, -30, -40,
];

#[rustfmt::skip]
const KING_TABLE_EG: [i32; 64] = [
    -72, -48, -36, -24, -24, -36, -48, -72,
    -48, -24, -12,   0,   0, -12, -24, -48,
    -36, -12,   0,  12,  12,   0, -12, -36,
    -24,   0,  12,  24,  24,  12,   0, -24,
    -24,   0,  12,  24,  24,  12,   0, -24,
    -36, -12,   0,  12,  12,   0, -12, -36,
    -48, -24, -12,   0,   0, -12, -24, -48,
    -72, -48, -36, -24, -24, -36, -48, -72,
];

/// Passed pawn bonus by square, growing as the pawn nears promotion
#[rustfmt::skip]
const PASSED_PAWN_TABLE: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     20,  20,  20,  20,  20,  20,  20,  20,
     20,  20,  20,  20,  20,  20,  20,  20,
     40,  40,  40,  40,  40,  40,  40,  40,
     60,  60,  60,  60,  60,  60,  60,  60,
     80,  80,  80,  80,  80,  80,  80,  80,
    100, 100, 100, 100, 100, 100, 100, 100,
      0,   0,   0,   0,   0,   0,   0,   0,
];

// ============================================================================
// WEIGHTS
// ============================================================================

/// Every tunable number the evaluator uses.
///
/// `Default` yields the tuned set. Tables are indexed by
/// [`Piece::to_index`] and then by White-relative square index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalWeights {
    pub piece_values: [i32; 6],
    pub pst_midgame: [[i32; 64]; 6],
    pub pst_endgame: [[i32; 64]; 6],
    pub passed_pawn: [i32; 64],
    pub bishop_pair: i32,
    /// Subtracted when a side keeps both knights
    pub knight_pair: i32,
    /// Subtracted when a side keeps both rooks
    pub rook_pair: i32,
    pub open_rook: i32,
    pub half_open_rook: i32,
    pub tempo: i32,
    pub king_shield_rank_2: i32,
    pub king_shield_rank_3: i32,
    pub king_blocks_rook_penalty: i32,
    /// Draw penalty per unit of game phase for the side holding contempt
    pub contempt_per_phase: i32,
}

impl EvalWeights {
    #[inline]
    #[must_use]
    pub fn piece_value(&self, piece: Piece) -> i32 {
        self.piece_values[piece.to_index()]
    }
}

impl Default for EvalWeights {
    fn default() -> Self {
        EvalWeights {
            piece_values: [100, 320, 330, 500, 900, 2000],
            pst_midgame: [
                PAWN_TABLE,
                KNIGHT_TABLE,
                BISHOP_TABLE,
                ROOK_TABLE,
                QUEEN_TABLE,
                KING_TABLE_MG,
            ],
            pst_endgame: [
                PAWN_TABLE,
                KNIGHT_TABLE,
                BISHOP_TABLE,
                ROOK_TABLE,
                QUEEN_TABLE,
                KING_TABLE_EG,
            ],
            passed_pawn: PASSED_PAWN_TABLE,
            bishop_pair: 30,
            knight_pair: 8,
            rook_pair: 16,
            open_rook: 10,
            half_open_rook: 5,
            tempo: 10,
            king_shield_rank_2: 10,
            king_shield_rank_3: 5,
            king_blocks_rook_penalty: 24,
            contempt_per_phase: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_material_is_6000_per_side() {
        let w = EvalWeights::default();
        let total = 8 * w.piece_value(Piece::Pawn)
            + 2 * w.piece_value(Piece::Knight)
            + 2 * w.piece_value(Piece::Bishop)
            + 2 * w.piece_value(Piece::Rook)
            + w.piece_value(Piece::Queen)
            + w.piece_value(Piece::King);
        assert_eq!(total, 6000);
    }

    #[test]
    fn tables_are_left_right_symmetric() {
        let w = EvalWeights::default();
        for table in w.pst_midgame.iter().chain(w.pst_endgame.iter()) {
            for rank in 0..8 {
                for file in 0..4 {
                    assert_eq!(table[rank * 8 + file], table[rank * 8 + 7 - file]);
                }
            }
        }
    }
}
