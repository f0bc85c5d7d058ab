//! Move selection.
//!
//! A [`SearchEngine`] is built for one position and produces one move. It
//! tries, in order:
//! - the opening book
//! - the endgame tablebase (few pieces left)
//! - iterative-deepening alpha-beta with a transposition table, killer moves
//!   and quiescence search, cut short by a cooperative deadline

mod alphabeta;
pub mod constants;
pub mod deadline;
mod iterative;
pub mod killers;
mod probes;
mod quiescence;

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use chess::ChessMove;
use log::info;

use crate::book::OpeningBook;
use crate::error::{EngineError, Result};
use crate::eval::Evaluator;
use crate::position::Position;
use crate::sync::StopFlag;
use crate::tablebase::TablebaseProbe;
use crate::tt::{TranspositionTable, DEFAULT_CAPACITY};

use constants::{
    DEFAULT_ALPHA_BETA_DEPTH, DEFAULT_QUIESCE_DEPTH, DEFAULT_TABLEBASE_PIECES,
    DEFAULT_TIME_LIMIT_SECS,
};
pub use constants::{INFINITY, MATE_SCORE, MATE_THRESHOLD};
use deadline::Deadline;
use killers::KillerTable;

/// Search parameters
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchConfig {
    /// Deepest iteration of iterative deepening
    pub alpha_beta_depth: u32,
    /// Quiescence plies searched before terminal positions stop it
    pub quiesce_depth: u32,
    /// Budget for iterations past depth 1; `None` is unlimited
    pub time_limit: Option<Duration>,
    pub tt_capacity: usize,
    /// Consult the tablebase at or below this many pieces
    pub tablebase_pieces: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub stop: Option<StopFlag>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            alpha_beta_depth: DEFAULT_ALPHA_BETA_DEPTH,
            quiesce_depth: DEFAULT_QUIESCE_DEPTH,
            time_limit: Some(Duration::from_secs(DEFAULT_TIME_LIMIT_SECS)),
            tt_capacity: DEFAULT_CAPACITY,
            tablebase_pieces: DEFAULT_TABLEBASE_PIECES,
            stop: None,
        }
    }
}

impl SearchConfig {
    /// Fixed-depth search without a time limit
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        SearchConfig {
            alpha_beta_depth: depth,
            time_limit: None,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_quiesce_depth(mut self, depth: u32) -> Self {
        self.quiesce_depth = depth;
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    /// Whole-second budget; `0` disables the limit.
    #[must_use]
    pub fn with_time_limit_secs(self, secs: u64) -> Self {
        let limit = (secs > 0).then(|| Duration::from_secs(secs));
        self.with_time_limit(limit)
    }

    #[must_use]
    pub fn with_tt_capacity(mut self, capacity: usize) -> Self {
        self.tt_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_tablebase_pieces(mut self, pieces: u32) -> Self {
        self.tablebase_pieces = pieces;
        self
    }

    #[must_use]
    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Where the chosen move came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MoveSource {
    OpeningBook,
    Tablebase,
    Search,
}

/// Lifecycle of a [`SearchEngine`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    OpeningBookProbe,
    TablebaseProbe,
    IterativeDeepening { depth: u32 },
    Done,
}

/// Statistics tracked during search
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchStats {
    pub finished: bool,
    pub source: Option<MoveSource>,
    /// Deepest fully completed iteration
    pub max_depth: u32,
    pub nodes: u64,
    pub q_nodes: u64,
    pub cache_hits: u64,
    pub cache_cutoffs: u64,
    pub elapsed: Duration,
    /// Time spent on each completed iteration
    pub depth_times: BTreeMap<u32, Duration>,
    /// Score of the chosen move for the side to move, when searched
    pub score: Option<i32>,
    pub principal_variation: Vec<String>,
    pub cache_len: usize,
}

impl SearchStats {
    /// Nodes per second, only once at least a second has passed.
    pub fn nps(&self) -> Option<u64> {
        let secs = self.elapsed.as_secs_f64();
        (secs >= 1.0).then(|| (self.nodes as f64 / secs) as u64)
    }

    /// Summary with optional detail sections.
    pub fn report(&self, show_timings: bool, show_cache: bool) -> SearchReport {
        SearchReport {
            finished: self.finished,
            source: self.source,
            max_depth: self.max_depth,
            nodes: self.nodes,
            q_nodes: self.q_nodes,
            elapsed: self.elapsed,
            nps: self.nps(),
            depth_times: show_timings.then(|| self.depth_times.clone()),
            cache: show_cache.then_some(CacheReport {
                hits: self.cache_hits,
                cutoffs: self.cache_cutoffs,
                len: self.cache_len,
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CacheReport {
    pub hits: u64,
    pub cutoffs: u64,
    pub len: usize,
}

/// Measurements of one search, as handed to logs or a UI.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchReport {
    pub finished: bool,
    pub source: Option<MoveSource>,
    pub max_depth: u32,
    pub nodes: u64,
    pub q_nodes: u64,
    pub elapsed: Duration,
    pub nps: Option<u64>,
    pub depth_times: Option<BTreeMap<u32, Duration>>,
    pub cache: Option<CacheReport>,
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "finished={} source={:?} max_depth={} nodes={} q_nodes={} time={:.3}s",
            self.finished,
            self.source,
            self.max_depth,
            self.nodes,
            self.q_nodes,
            self.elapsed.as_secs_f64()
        )?;
        if let Some(nps) = self.nps {
            write!(f, " nps={nps}")?;
        }
        if let Some(times) = &self.depth_times {
            for (depth, time) in times {
                write!(f, " depth{depth}={:.3}s", time.as_secs_f64())?;
            }
        }
        if let Some(cache) = &self.cache {
            write!(
                f,
                " cache_hits={} cache_cutoffs={} cache_len={}",
                cache.hits, cache.cutoffs, cache.len
            )?;
        }
        Ok(())
    }
}

/// A move line with its score, best move first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Line {
    pub score: i32,
    pub moves: Vec<ChessMove>,
}

impl Line {
    fn leaf(score: i32) -> Self {
        Line {
            score,
            moves: Vec::new(),
        }
    }
}

/// One-shot move chooser for a single position.
///
/// ```no_run
/// use chess_search::{Position, SearchConfig, SearchEngine};
///
/// let position = Position::new();
/// let mut engine = SearchEngine::new(&position, SearchConfig::depth(3));
/// let (best, stats) = engine.next_move().unwrap();
/// println!("{best} after {} nodes", stats.nodes);
/// ```
pub struct SearchEngine {
    position: Position,
    config: SearchConfig,
    evaluator: Evaluator,
    tt: TranspositionTable,
    killers: KillerTable,
    deadline: Deadline,
    book: Option<Box<dyn OpeningBook>>,
    tablebase: Option<Box<dyn TablebaseProbe>>,
    stats: SearchStats,
    phase: EnginePhase,
}

impl SearchEngine {
    /// Engine searching a private copy of `position`.
    pub fn new(position: &Position, config: SearchConfig) -> Self {
        let evaluator = Evaluator::default().with_contempt_side(Some(position.side_to_move()));
        SearchEngine {
            position: position.clone(),
            tt: TranspositionTable::new(config.tt_capacity),
            deadline: Deadline::new(config.stop.clone()),
            config,
            evaluator,
            killers: KillerTable::new(),
            book: None,
            tablebase: None,
            stats: SearchStats::default(),
            phase: EnginePhase::Idle,
        }
    }

    /// Reuse a table filled by an earlier engine.
    #[must_use]
    pub fn with_transposition_table(mut self, tt: TranspositionTable) -> Self {
        self.tt = tt;
        self
    }

    /// Replace the evaluator. Its contempt side is reset to the side to move.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator.with_contempt_side(Some(self.position.side_to_move()));
        self
    }

    #[must_use]
    pub fn with_opening_book(mut self, book: Box<dyn OpeningBook>) -> Self {
        self.book = Some(book);
        self
    }

    #[must_use]
    pub fn with_tablebase(mut self, tablebase: Box<dyn TablebaseProbe>) -> Self {
        self.tablebase = Some(tablebase);
        self
    }

    /// Choose a move: book, then tablebase, then search.
    pub fn next_move(&mut self) -> Result<(ChessMove, &SearchStats)> {
        let start = self.begin()?;

        self.phase = EnginePhase::OpeningBookProbe;
        if let Some(mv) = self.probe_book() {
            return Ok(self.finish(start, mv, MoveSource::OpeningBook));
        }

        self.phase = EnginePhase::TablebaseProbe;
        if let Some(mv) = self.probe_tablebase() {
            return Ok(self.finish(start, mv, MoveSource::Tablebase));
        }

        let mv = self.iterative_deepening();
        Ok(self.finish(start, mv, MoveSource::Search))
    }

    /// Choose a move by search alone, ignoring book and tablebase.
    pub fn next_move_by_search(&mut self) -> Result<(ChessMove, &SearchStats)> {
        let start = self.begin()?;
        let mv = self.iterative_deepening();
        Ok(self.finish(start, mv, MoveSource::Search))
    }

    fn begin(&mut self) -> Result<Instant> {
        if self.phase != EnginePhase::Idle {
            return Err(EngineError::SearchFinished);
        }
        if !self.position.has_legal_moves() {
            self.phase = EnginePhase::Done;
            return Err(EngineError::NoLegalMoves {
                fen: self.position.fen(),
            });
        }
        Ok(Instant::now())
    }

    fn finish(
        &mut self,
        start: Instant,
        mv: ChessMove,
        source: MoveSource,
    ) -> (ChessMove, &SearchStats) {
        self.phase = EnginePhase::Done;
        self.stats.finished = true;
        self.stats.source = Some(source);
        self.stats.elapsed = start.elapsed();
        self.stats.cache_len = self.tt.len();
        info!("{mv} from {source:?} in {:.3}s", self.stats.elapsed.as_secs_f64());
        (mv, &self.stats)
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == EnginePhase::Done
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Hand the table on to the engine for the next move.
    pub fn into_transposition_table(self) -> TranspositionTable {
        self.tt
    }
}
