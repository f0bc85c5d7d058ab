//! Chess move selection: opening book, tablebase and iterative-deepening
//! alpha-beta search over the `chess` crate's board.

pub mod book;
pub mod error;
pub mod eval;
pub mod game_over;
pub mod position;
pub mod search;
pub mod sync;
pub mod tablebase;
pub mod tt;

pub use book::{BookEntry, OpeningBook, PolyglotBook};
pub use error::{EngineError, Result};
pub use eval::{EvalWeights, Evaluation, Evaluator, MoveBucket, OrderingHints, MATE_SCORE};
pub use game_over::{DrawReason, Outcome};
pub use position::{Position, START_FEN};
pub use search::{
    EnginePhase, MoveSource, SearchConfig, SearchEngine, SearchReport, SearchStats,
};
pub use sync::StopFlag;
pub use tablebase::{NoTablebase, TablebaseProbe, Wdl};
pub use tt::{BoundType, TranspositionTable};

pub use chess::{ChessMove, Color, Piece, Square};
