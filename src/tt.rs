use std::collections::HashMap;

use chess::ChessMove;
use log::trace;

/// Default number of entries before the table is flushed.
pub const DEFAULT_CAPACITY: usize = 10_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub depth: u32,
    pub score: i32,
    pub bound_type: BoundType,
    pub best_move: Option<ChessMove>,
}

/// Hash-keyed cache of search results.
///
/// One entry per position hash, newest write wins. Hash collisions between
/// different positions are accepted. When the table holds `capacity` entries
/// and a new key arrives, everything is dropped and filling starts over.
#[derive(Clone, Debug)]
pub struct TranspositionTable {
    table: HashMap<u64, TTEntry>,
    capacity: usize,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        TranspositionTable {
            table: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn probe(&self, hash: u64) -> Option<&TTEntry> {
        self.table.get(&hash)
    }

    pub fn store(
        &mut self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<ChessMove>,
    ) {
        if self.table.len() >= self.capacity && !self.table.contains_key(&hash) {
            trace!("transposition table full at {} entries, clearing", self.table.len());
            self.table.clear();
        }

        self.table.insert(
            hash,
            TTEntry {
                depth,
                score,
                bound_type,
                best_move,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
