//! End-to-end tests for move selection.

use std::collections::HashMap;
use std::time::Duration;

use chess_search::book::BookEntry;
use chess_search::game_over;
use chess_search::search::MATE_THRESHOLD;
use chess_search::{
    ChessMove, EngineError, EnginePhase, Evaluator, MoveSource, OpeningBook, PolyglotBook,
    Position, SearchConfig, SearchEngine, StopFlag, TablebaseProbe, Wdl,
};

const INF: i32 = 1_000_000_000;

fn best_move(fen: &str, depth: u32) -> (String, Option<i32>) {
    let position = Position::from_fen(fen).unwrap();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(depth));
    let (mv, stats) = engine.next_move().unwrap();
    (mv.to_string(), stats.score)
}

/// Test that the engine finds a simple back rank mate
#[test]
fn finds_back_rank_mate() {
    // White to move, Qe8# is mate
    let (uci, _) = best_move("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1", 3);
    assert_eq!(uci, "e1e8", "Should find Qe8# (back rank mate)");
}

/// Test scholar's mate pattern
#[test]
fn finds_scholars_mate() {
    let (uci, score) = best_move(
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 0 4",
        2,
    );
    assert_eq!(uci, "h5f7", "Should find Qxf7#");
    assert!(score.unwrap() >= MATE_THRESHOLD, "mate should score as mate");
}

/// Test that a shallow search from the start position returns a legal move
#[test]
fn start_position_depth_one() {
    let position = Position::new();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(1));
    let (mv, stats) = engine.next_move().unwrap();
    assert!(position.is_legal(mv));
    assert_eq!(stats.source, Some(MoveSource::Search));
    assert_eq!(stats.max_depth, 1);
    assert!(stats.finished);
    assert!(stats.nodes > 0);
    assert_eq!(stats.principal_variation.first(), Some(&mv.to_string()));
}

/// Test that the engine wins a hanging piece
#[test]
fn captures_hanging_knight() {
    let (uci, score) = best_move("4k3/8/8/8/3n4/4P3/8/4K3 w - - 0 1", 3);
    assert_eq!(uci, "e3d4");
    assert!(score.unwrap() > 0);
}

/// An engine answers exactly once
#[test]
fn second_request_is_rejected() {
    let position = Position::new();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(1));
    engine.next_move().unwrap();
    assert!(engine.is_finished());
    assert_eq!(engine.phase(), EnginePhase::Done);
    assert_eq!(engine.next_move().unwrap_err(), EngineError::SearchFinished);
    assert_eq!(
        engine.next_move_by_search().unwrap_err(),
        EngineError::SearchFinished
    );
}

/// Test that no move is offered when the side to move has none
#[test]
fn stalemate_has_no_move() {
    let position = Position::from_fen("k7/8/1QK5/8/8/8/8/8 b - - 0 1").unwrap();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(2));
    let err = engine.next_move().unwrap_err();
    assert!(matches!(err, EngineError::NoLegalMoves { .. }), "{err:?}");
    assert!(engine.is_finished());
}

/// Test that a checkmated side gets no move either
#[test]
fn checkmated_side_has_no_move() {
    let position =
        Position::from_fen("rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1")
            .unwrap();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(2));
    assert!(matches!(
        engine.next_move(),
        Err(EngineError::NoLegalMoves { .. })
    ));
}

/// The time limit cuts deep searches short without corrupting the position
#[test]
fn time_limit_stops_deep_search() {
    let position =
        Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
            .unwrap();
    let config = SearchConfig::depth(30).with_time_limit(Some(Duration::from_millis(50)));
    let mut engine = SearchEngine::new(&position, config);
    let (mv, stats) = engine.next_move().unwrap();

    assert!(position.is_legal(mv));
    assert!(stats.max_depth >= 1);
    assert!(stats.max_depth < 30);
    assert_eq!(engine.position(), &position);
}

/// A stop request still lets the first iteration finish
#[test]
fn stop_flag_keeps_depth_one() {
    let position = Position::new();
    let config = SearchConfig::depth(8).with_stop_flag(StopFlag::stopped());
    let mut engine = SearchEngine::new(&position, config);
    let (mv, stats) = engine.next_move().unwrap();
    assert!(position.is_legal(mv));
    assert_eq!(stats.max_depth, 1);
    assert_eq!(stats.depth_times.len(), 1);
    assert_eq!(engine.position(), &position);
}

#[test]
fn book_move_skips_search() {
    let position = Position::new();
    let e4 = ChessMove::new(chess_search::Square::E2, chess_search::Square::E4, None);
    let book = PolyglotBook::from_entries(vec![BookEntry::new(&position, e4, 10)]);

    let mut engine =
        SearchEngine::new(&position, SearchConfig::depth(4)).with_opening_book(Box::new(book));
    let (mv, stats) = engine.next_move().unwrap();
    assert_eq!(mv, e4);
    assert_eq!(stats.source, Some(MoveSource::OpeningBook));
    assert_eq!(stats.nodes, 0);
}

#[test]
fn book_miss_falls_through_to_search() {
    let start = Position::new();
    let e4 = ChessMove::new(chess_search::Square::E2, chess_search::Square::E4, None);
    let book = PolyglotBook::from_entries(vec![BookEntry::new(&start, e4, 10)]);

    let mut after_e4 = start.clone();
    after_e4.push(e4);
    let mut engine =
        SearchEngine::new(&after_e4, SearchConfig::depth(1)).with_opening_book(Box::new(book));
    let (mv, stats) = engine.next_move().unwrap();
    assert!(after_e4.is_legal(mv));
    assert_eq!(stats.source, Some(MoveSource::Search));
}

/// Book that always suggests the same move, legal or not
struct FixedBook(ChessMove);

impl OpeningBook for FixedBook {
    fn probe(&self, _position: &Position) -> Option<ChessMove> {
        Some(self.0)
    }
}

#[test]
fn illegal_book_move_is_ignored() {
    let position = Position::new();
    let bogus = ChessMove::new(chess_search::Square::E2, chess_search::Square::E5, None);
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(1))
        .with_opening_book(Box::new(FixedBook(bogus)));
    let (mv, stats) = engine.next_move().unwrap();
    assert_ne!(mv, bogus);
    assert_eq!(stats.source, Some(MoveSource::Search));
}

/// Tablebase claiming every move zeroes in one
struct EagerTablebase;

impl TablebaseProbe for EagerTablebase {
    fn probe_wdl(&self, _position: &Position) -> Option<Wdl> {
        Some(Wdl::Win)
    }

    fn probe_dtz(&self, _position: &Position) -> Option<i32> {
        Some(-1)
    }
}

#[test]
fn tablebase_answers_small_endgames() {
    let position = Position::from_fen("8/8/4k3/8/8/8/3QK3/8 w - - 0 1").unwrap();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(4))
        .with_tablebase(Box::new(EagerTablebase));
    let (mv, stats) = engine.next_move().unwrap();
    assert!(position.is_legal(mv));
    assert_eq!(stats.source, Some(MoveSource::Tablebase));
    assert_eq!(mv, *position.legal_moves().last().unwrap());
}

#[test]
fn tablebase_not_consulted_with_many_pieces() {
    let position = Position::new();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(1))
        .with_tablebase(Box::new(EagerTablebase));
    let (_, stats) = engine.next_move().unwrap();
    assert_eq!(stats.source, Some(MoveSource::Search));
}

/// The table from one move helps the next
#[test]
fn transposition_table_carries_over() {
    let start = Position::new();
    let mut first = SearchEngine::new(&start, SearchConfig::depth(3));
    first.next_move().unwrap();
    let tt = first.into_transposition_table();
    assert!(!tt.is_empty());

    let mut next = start.clone();
    next.push_uci("e2e4").unwrap();
    let mut second =
        SearchEngine::new(&next, SearchConfig::depth(2)).with_transposition_table(tt);
    let (_, stats) = second.next_move().unwrap();
    assert!(stats.cache_hits > 0);
}

#[test]
fn report_sections_follow_flags() {
    let position = Position::new();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(2));
    let (_, stats) = engine.next_move().unwrap();

    let bare = stats.report(false, false);
    assert!(bare.depth_times.is_none());
    assert!(bare.cache.is_none());
    assert!(!bare.to_string().contains("cache_hits"));

    let full = stats.report(true, true);
    assert_eq!(full.depth_times.as_ref().map(|t| t.len()), Some(2));
    assert_eq!(full.cache.map(|c| c.len), Some(stats.cache_len));
    let text = full.to_string();
    assert!(text.contains("depth1="), "{text}");
    assert!(text.contains("cache_hits="), "{text}");
}

fn adjust_mate(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Full-window quiescence with no pruning
fn quiesce(evaluator: &Evaluator, position: &mut Position, depth_left: i32, ply: i32) -> i32 {
    let evaluation = evaluator.evaluate(position);
    let stand_pat = adjust_mate(evaluation.total_perspective(), ply);
    let mut best = stand_pat;
    if depth_left > 0 || !evaluation.is_game_over() {
        for mv in evaluator.capture_order(position) {
            position.push(mv);
            let score = -quiesce(evaluator, position, depth_left - 1, ply + 1);
            position.pop();
            best = best.max(score);
        }
    }
    best
}

fn negamax(
    evaluator: &Evaluator,
    position: &mut Position,
    depth: i32,
    ply: i32,
    quiesce_depth: i32,
) -> i32 {
    if depth <= 0 || game_over::is_game_over(position) {
        return quiesce(evaluator, position, quiesce_depth - 1, ply);
    }
    let mut best = -INF;
    for mv in position.legal_moves() {
        position.push(mv);
        let score = -negamax(evaluator, position, depth - 1, ply + 1, quiesce_depth);
        position.pop();
        best = best.max(score);
    }
    best
}

/// Tactical positions for comparing the search against plain negamax
const TACTICAL_FENS: [&str; 5] = [
    // Knight takes an undefended rook
    "4k3/1p6/8/3r4/8/2N1P3/8/4K3 w - - 0 1",
    // Pawn takes a knight
    "4k3/8/8/8/3n4/4P3/8/4K3 w - - 0 1",
    // Doubled rooks against a queen on the d-file
    "r3k3/8/8/3q4/8/8/3R4/3RK3 w - - 0 1",
    // Defended pawn chain with a knight eyeing it
    "4k3/8/3p4/4p3/3P4/5N2/8/4K3 w - - 0 1",
    // Black to move, bishop can win the exchange
    "4k3/8/8/2b5/8/8/5R2/4K3 b - - 0 1",
];

fn assert_search_matches_negamax(fen: &str, depth: u32, quiesce_depth: u32) {
    let position = Position::from_fen(fen).unwrap();

    let config = SearchConfig::depth(depth).with_quiesce_depth(quiesce_depth);
    let mut engine = SearchEngine::new(&position, config);
    let (chosen, stats) = engine.next_move().unwrap();
    let engine_score = stats.score.unwrap();

    let evaluator = Evaluator::default().with_contempt_side(Some(position.side_to_move()));
    let mut scratch = position.clone();
    let mut scores: HashMap<ChessMove, i32> = HashMap::new();
    for mv in position.legal_moves() {
        scratch.push(mv);
        let score = -negamax(&evaluator, &mut scratch, depth as i32 - 1, 1, quiesce_depth as i32);
        scratch.pop();
        scores.insert(mv, score);
    }
    let best = scores.values().copied().max().unwrap();

    assert_eq!(engine_score, best, "score mismatch for {fen}");
    assert_eq!(scores[&chosen], best, "chose {chosen} in {fen}");
    assert_eq!(scratch, position);
}

/// Alpha-beta with all its pruning agrees with plain negamax
#[test]
fn search_matches_brute_force_negamax() {
    for fen in TACTICAL_FENS {
        assert_search_matches_negamax(fen, 2, 4);
    }
}

/// Same comparison one ply deeper, where killers and the table start to matter
#[test]
fn search_matches_brute_force_negamax_depth_three() {
    for fen in &TACTICAL_FENS[..2] {
        assert_search_matches_negamax(fen, 3, 4);
    }
}

#[cfg(feature = "serde")]
#[test]
fn report_serializes_to_json() {
    let position = Position::new();
    let mut engine = SearchEngine::new(&position, SearchConfig::depth(1));
    let (_, stats) = engine.next_move().unwrap();
    let json = serde_json::to_value(stats.report(false, true)).unwrap();
    assert_eq!(json["max_depth"], 1);
    assert_eq!(json["source"], "Search");

    let config = serde_json::to_value(SearchConfig::default().with_stop_flag(StopFlag::new()))
        .unwrap();
    assert!(config.get("stop").is_none());
}
