//! Per-color evaluation terms.
//!
//! Each term fills its own field of [`SideScores`] for one color. Nothing here
//! subtracts one side from the other; that happens when the result is combined.

use chess::{
    get_adjacent_files, get_file, get_rank, BitBoard, Board, Color, File, Piece, Rank, Square,
    ALL_PIECES, ALL_SQUARES, EMPTY,
};
use once_cell::sync::Lazy;

use super::tables::EvalWeights;
use super::SideScores;

/// Squares that must be free of enemy pawns for a pawn of the given color on
/// the given square to be passed: same and adjacent files, strictly ahead.
static PASSED_PAWN_MASK: Lazy<[[BitBoard; 64]; 2]> = Lazy::new(|| {
    let mut masks = [[EMPTY; 64]; 2];
    for sq in ALL_SQUARES {
        let files = get_file(sq.get_file()) | get_adjacent_files(sq.get_file());
        let rank = sq.get_rank().to_index();
        let mut white_ahead = EMPTY;
        let mut black_ahead = EMPTY;
        for r in 0..8 {
            if r > rank {
                white_ahead |= get_rank(Rank::from_index(r));
            }
            if r < rank {
                black_ahead |= get_rank(Rank::from_index(r));
            }
        }
        masks[Color::White.to_index()][sq.to_index()] = files & white_ahead;
        masks[Color::Black.to_index()][sq.to_index()] = files & black_ahead;
    }
    masks
});

const KINGSIDE_FILES: [File; 3] = [File::F, File::G, File::H];
const QUEENSIDE_FILES: [File; 3] = [File::A, File::B, File::C];

#[inline]
fn pieces_of(board: &Board, color: Color, piece: Piece) -> BitBoard {
    *board.pieces(piece) & *board.color_combined(color)
}

/// Index into a White-oriented table.
#[inline]
fn relative_index(square: Square, color: Color) -> usize {
    match color {
        Color::White => square.to_index(),
        Color::Black => square.to_index() ^ 56,
    }
}

#[inline]
fn home_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::First,
        Color::Black => Rank::Eighth,
    }
}

fn files_mask(files: &[File]) -> BitBoard {
    files.iter().fold(EMPTY, |acc, &file| acc | get_file(file))
}

/// Game-phase weight of one side's pieces.
pub(super) fn gamephase(board: &Board, color: Color) -> i32 {
    let count = |piece| pieces_of(board, color, piece).popcnt() as i32;
    count(Piece::Knight) + count(Piece::Bishop) + 2 * count(Piece::Rook) + 4 * count(Piece::Queen)
}

pub(super) fn material(
    scores: &mut SideScores,
    weights: &EvalWeights,
    board: &Board,
    color: Color,
) {
    for piece in ALL_PIECES {
        let idx = piece.to_index();
        let pieces = pieces_of(board, color, piece);

        let mut midgame = 0;
        let mut endgame = 0;
        for sq in pieces {
            let rel = relative_index(sq, color);
            midgame += weights.pst_midgame[idx][rel];
            endgame += weights.pst_endgame[idx][rel];
        }

        scores.piece_score[idx] = pieces.popcnt() as i32 * weights.piece_values[idx];
        scores.piece_square_midgame[idx] = midgame;
        scores.piece_square_endgame[idx] = endgame;
        scores.material_midgame += midgame + scores.piece_score[idx];
        scores.material_endgame += endgame + scores.piece_score[idx];
    }
}

pub(super) fn pair_bonus(
    scores: &mut SideScores,
    weights: &EvalWeights,
    board: &Board,
    color: Color,
) {
    if pieces_of(board, color, Piece::Bishop).popcnt() > 1 {
        scores.pair_bonus += weights.bishop_pair;
    }
    if pieces_of(board, color, Piece::Knight).popcnt() > 1 {
        scores.pair_bonus -= weights.knight_pair;
    }
    if pieces_of(board, color, Piece::Rook).popcnt() > 1 {
        scores.pair_bonus -= weights.rook_pair;
    }
}

/// Rooks on files without own pawns; fully open files score higher than files
/// still holding an enemy pawn.
pub(super) fn rook_files(
    scores: &mut SideScores,
    weights: &EvalWeights,
    board: &Board,
    color: Color,
) {
    let own_pawns = pieces_of(board, color, Piece::Pawn);
    let enemy_pawns = pieces_of(board, !color, Piece::Pawn);

    for rook in pieces_of(board, color, Piece::Rook) {
        let file = get_file(rook.get_file());
        if own_pawns & file != EMPTY {
            continue;
        }
        scores.rook_bonus += if enemy_pawns & file != EMPTY {
            weights.half_open_rook
        } else {
            weights.open_rook
        };
    }
}

pub(super) fn tempo(
    scores: &mut SideScores,
    weights: &EvalWeights,
    board: &Board,
    color: Color,
) {
    if board.side_to_move() == color {
        scores.tempo_bonus += weights.tempo;
    }
}

/// King standing between a rook and the corner on the home rank.
pub(super) fn blocked_pieces(
    scores: &mut SideScores,
    weights: &EvalWeights,
    board: &Board,
    color: Color,
) {
    let rank = home_rank(color);
    let has = |piece: Piece, file: File| {
        let sq = Square::make_square(rank, file);
        board.piece_on(sq) == Some(piece) && board.color_on(sq) == Some(color)
    };

    let kingside = (has(Piece::King, File::F) || has(Piece::King, File::G))
        && (has(Piece::Rook, File::G) || has(Piece::Rook, File::H));
    let queenside = (has(Piece::King, File::B) || has(Piece::King, File::C))
        && (has(Piece::Rook, File::A) || has(Piece::Rook, File::B));

    if kingside {
        scores.blocked_pieces -= weights.king_blocks_rook_penalty;
    }
    if queenside {
        scores.blocked_pieces -= weights.king_blocks_rook_penalty;
    }
}

/// Pawns in front of a castled king. Counts toward the midgame material only.
pub(super) fn king_shield(
    scores: &mut SideScores,
    weights: &EvalWeights,
    board: &Board,
    color: Color,
) {
    let king = board.king_square(color);
    if king.get_rank() != home_rank(color) {
        return;
    }

    let (second, third) = match color {
        Color::White => (Rank::Second, Rank::Third),
        Color::Black => (Rank::Seventh, Rank::Sixth),
    };
    let flank = match king.get_file().to_index() {
        f if f > 4 => files_mask(&KINGSIDE_FILES),
        f if f < 3 => files_mask(&QUEENSIDE_FILES),
        _ => EMPTY,
    };

    let shield = pieces_of(board, color, Piece::Pawn) & flank;
    let close = (shield & get_rank(second)).popcnt() as i32;
    let far = (shield & get_rank(third)).popcnt() as i32;
    scores.king_shield_bonus += close * weights.king_shield_rank_2 + far * weights.king_shield_rank_3;
    scores.material_midgame += scores.king_shield_bonus;
}

pub(super) fn passed_pawns(
    scores: &mut SideScores,
    weights: &EvalWeights,
    board: &Board,
    color: Color,
) {
    let enemy_pawns = pieces_of(board, !color, Piece::Pawn);
    let masks = &PASSED_PAWN_MASK[color.to_index()];

    for pawn in pieces_of(board, color, Piece::Pawn) {
        if masks[pawn.to_index()] & enemy_pawns == EMPTY {
            scores.passed_pawn_bonus += weights.passed_pawn[relative_index(pawn, color)];
        }
    }
}
