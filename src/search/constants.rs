//! Search constants.

// ============================================================================
// SCORE BOUNDS
// ============================================================================

pub use crate::eval::MATE_SCORE;

/// Window bound wider than any reachable score
pub const INFINITY: i32 = 1_000_000_000;

/// Scores with absolute value >= this are mate scores
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;

/// Deepest ply a mate can be adjusted for
pub const MAX_PLY: usize = 1024;

// ============================================================================
// DEFAULT LIMITS
// ============================================================================

/// Maximum iterative-deepening depth
pub const DEFAULT_ALPHA_BETA_DEPTH: u32 = 10;

/// Quiescence depth before terminal checks kick in
pub const DEFAULT_QUIESCE_DEPTH: u32 = 10;

/// Seconds allowed for depths 2 and beyond
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 180;

/// Tablebases are only consulted with this many pieces or fewer
pub const DEFAULT_TABLEBASE_PIECES: u32 = 5;
