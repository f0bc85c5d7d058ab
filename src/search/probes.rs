use chess::ChessMove;
use log::{debug, warn};

use super::SearchEngine;
use crate::tablebase::select_dtz_move;

impl SearchEngine {
    pub(super) fn probe_book(&mut self) -> Option<ChessMove> {
        let book = self.book.as_deref()?;
        let mv = book.probe(&self.position)?;
        if !self.position.is_legal(mv) {
            warn!("opening book offered illegal move {mv} in {}", self.position.fen());
            return None;
        }
        Some(mv)
    }

    pub(super) fn probe_tablebase(&mut self) -> Option<ChessMove> {
        let tablebase = self.tablebase.as_deref()?;
        if self.position.piece_count() > self.config.tablebase_pieces {
            return None;
        }

        let before = self.position.hash();
        let mv = select_dtz_move(tablebase, &mut self.position);
        debug_assert_eq!(before, self.position.hash());

        match mv {
            Some(mv) if self.position.is_legal(mv) => Some(mv),
            Some(mv) => {
                warn!("tablebase chose illegal move {mv}");
                None
            }
            None => {
                debug!("tablebase probe failed for {}", self.position.fen());
                None
            }
        }
    }
}
