use serde::Deserialize;

use chess_search::{Position, SearchConfig, SearchEngine};

#[derive(Deserialize)]
struct ProblemSet {
    problems: Vec<Problem>,
}

#[derive(Deserialize)]
struct Problem {
    #[serde(rename = "type")]
    kind: String,
    fen: String,
    moves: String,
}

fn uci_from_problem_moves(moves: &str) -> String {
    moves.replace('-', "")
}

fn load() -> ProblemSet {
    let data = include_str!("data/problems.json");
    serde_json::from_str(data).expect("invalid problems.json")
}

#[test]
fn mate_in_one_suite() {
    let set = load();

    for problem in set.problems.iter().filter(|p| p.kind == "Mate in One") {
        let uci = uci_from_problem_moves(&problem.moves);
        let mut position = Position::from_fen(&problem.fen).unwrap();
        position.push_uci(&uci).unwrap();

        assert!(
            position.is_checkmate(),
            "mate in one failed for fen: {} move: {}",
            problem.fen,
            problem.moves
        );
    }
}

#[test]
fn mate_search_suite() {
    let set = load();
    let mut failures = 0;

    for problem in set.problems.iter().filter(|p| p.kind == "Mate in One") {
        let position = Position::from_fen(&problem.fen).unwrap();
        let mut engine = SearchEngine::new(&position, SearchConfig::depth(2));
        let (mv, _) = engine.next_move().unwrap();

        let mut after = position.clone();
        after.push(mv);
        if !after.is_checkmate() {
            failures += 1;
            eprintln!(
                "Mismatch: type={} fen={} move={} not checkmate",
                problem.kind, problem.fen, mv
            );
        }
    }

    assert_eq!(failures, 0, "mate search mismatches: {}", failures);
}
