use chess::ChessMove;

use crate::position::Position;

/// Two quiet moves per ply that recently caused a beta cutoff, newest first.
#[derive(Clone, Debug, Default)]
pub struct KillerTable {
    slots: Vec<[Option<ChessMove>; 2]>,
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable { slots: Vec::new() }
    }

    #[must_use]
    pub fn get(&self, ply: usize) -> [Option<ChessMove>; 2] {
        self.slots.get(ply).copied().unwrap_or_default()
    }

    /// Remember `mv` as the newest killer at `ply`. Captures in `position`
    /// (the node the move was played from) are ignored.
    pub fn update(&mut self, ply: usize, mv: ChessMove, position: &Position) {
        if position.is_capture(mv) {
            return;
        }
        if self.slots.len() <= ply {
            self.slots.resize(ply + 1, [None, None]);
        }
        let row = &mut self.slots[ply];
        if row[0] != Some(mv) {
            row[1] = row[0];
            row[0] = Some(mv);
        }
    }
}
