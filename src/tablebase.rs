//! Endgame tablebase probing.
//!
//! The crate ships no tablebase reader. Callers plug one in through
//! [`TablebaseProbe`]; the engine uses it to pick a move by distance to
//! zeroing once few enough pieces remain.

use std::collections::BTreeMap;

use chess::ChessMove;

use crate::position::Position;

/// Win/draw/loss from the side to move's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wdl {
    Loss,
    /// Loss that the fifty-move rule turns into a draw
    BlessedLoss,
    Draw,
    /// Win that the fifty-move rule turns into a draw
    CursedWin,
    Win,
}

impl Wdl {
    pub fn value(self) -> i32 {
        match self {
            Wdl::Loss => -2,
            Wdl::BlessedLoss => -1,
            Wdl::Draw => 0,
            Wdl::CursedWin => 1,
            Wdl::Win => 2,
        }
    }
}

pub trait TablebaseProbe {
    /// `None` when the position is not covered or the probe failed.
    fn probe_wdl(&self, position: &Position) -> Option<Wdl>;

    /// Signed distance to zeroing for the side to move; `None` on failure.
    fn probe_dtz(&self, position: &Position) -> Option<i32>;
}

/// Probe that covers nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTablebase;

impl TablebaseProbe for NoTablebase {
    fn probe_wdl(&self, _position: &Position) -> Option<Wdl> {
        None
    }

    fn probe_dtz(&self, _position: &Position) -> Option<i32> {
        None
    }
}

/// Choose a root move by DTZ.
///
/// Every legal move is played and the child's DTZ negated to get the mover's
/// view. When the root is not lost the smallest positive DTZ wins, falling
/// back to a DTZ of 0. When it is lost a DTZ of 0 is preferred, otherwise the
/// one closest to zero. Among moves sharing the chosen DTZ the last generated
/// one is taken. Any failed probe aborts with `None`.
pub fn select_dtz_move(
    probe: &dyn TablebaseProbe,
    position: &mut Position,
) -> Option<ChessMove> {
    let wdl = probe.probe_wdl(position)?;

    let mut by_dtz: BTreeMap<i32, Vec<ChessMove>> = BTreeMap::new();
    for mv in position.legal_moves() {
        position.push(mv);
        let child = probe.probe_dtz(position);
        position.pop();
        by_dtz.entry(-child?).or_default().push(mv);
    }

    let key = if wdl.value() >= 0 {
        by_dtz.keys().copied().find(|&dtz| dtz > 0).unwrap_or(0)
    } else if by_dtz.contains_key(&0) {
        0
    } else {
        by_dtz.keys().copied().min_by_key(|dtz| dtz.abs())?
    };

    by_dtz.get(&key).and_then(|moves| moves.last().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Tablebase stub answering from fixed tables keyed by position hash.
    struct Table {
        wdl: Option<Wdl>,
        dtz: HashMap<u64, i32>,
    }

    impl TablebaseProbe for Table {
        fn probe_wdl(&self, _position: &Position) -> Option<Wdl> {
            self.wdl
        }

        fn probe_dtz(&self, position: &Position) -> Option<i32> {
            self.dtz.get(&position.hash()).copied()
        }
    }

    const KQK: &str = "8/8/4k3/8/8/8/3QK3/8 w - - 0 1";

    fn table_with(position: &mut Position, wdl: Wdl, dtz: &[(&str, i32)]) -> Table {
        table_with_default(position, wdl, dtz, -7)
    }

    fn table_with_default(
        position: &mut Position,
        wdl: Wdl,
        dtz: &[(&str, i32)],
        default: i32,
    ) -> Table {
        let mut map = HashMap::new();
        for mv in position.legal_moves() {
            position.push(mv);
            let value = dtz
                .iter()
                .find(|(uci, _)| *uci == mv.to_string())
                .map_or(default, |&(_, v)| v);
            map.insert(position.hash(), value);
            position.pop();
        }
        Table {
            wdl: Some(wdl),
            dtz: map,
        }
    }

    #[test]
    fn winning_side_takes_fastest_zeroing() {
        let mut pos = Position::from_fen(KQK).unwrap();
        let table = table_with(&mut pos, Wdl::Win, &[("d2d5", -3), ("d2d6", -1)]);
        let before = pos.clone();
        let mv = select_dtz_move(&table, &mut pos).unwrap();
        assert_eq!(mv.to_string(), "d2d6");
        assert_eq!(pos, before);
    }

    #[test]
    fn losing_side_prefers_zero_then_nearest() {
        let mut pos = Position::from_fen(KQK).unwrap();
        let table = table_with(&mut pos, Wdl::Loss, &[("d2d5", 0)]);
        assert_eq!(select_dtz_move(&table, &mut pos).unwrap().to_string(), "d2d5");

        // Mover's DTZ is -3 for d2d5 and -9 for everything else.
        let table = table_with_default(&mut pos, Wdl::Loss, &[("d2d5", 3)], 9);
        assert_eq!(select_dtz_move(&table, &mut pos).unwrap().to_string(), "d2d5");

        // Closeness to zero wins over sign: -12 loses to 7.
        let table = table_with(&mut pos, Wdl::Loss, &[("d2d5", 12)]);
        let chosen = select_dtz_move(&table, &mut pos).unwrap();
        let expected = pos
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.to_string() != "d2d5")
            .last();
        assert_eq!(Some(chosen), expected);
    }

    #[test]
    fn failed_probe_gives_nothing() {
        let mut pos = Position::from_fen(KQK).unwrap();
        assert_eq!(select_dtz_move(&NoTablebase, &mut pos), None);

        let mut table = table_with(&mut pos, Wdl::Win, &[]);
        table.dtz.clear();
        assert_eq!(select_dtz_move(&table, &mut pos), None);
        assert_eq!(pos.move_stack().len(), 0);
    }

    #[test]
    fn wdl_order_matches_values() {
        assert!(Wdl::Loss < Wdl::Win);
        assert_eq!(Wdl::BlessedLoss.value(), -1);
        assert_eq!(Wdl::CursedWin.value(), 1);
    }
}
