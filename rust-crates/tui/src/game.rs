use chrono::{
    DateTime,
    Local,
    Utc,
};
use generated_abi::rps_types::GameRecord;
use std::fmt;

/// A player's choice, encoded on chain as a fixed integer selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    pub fn selector(self) -> u64 {
        match self {
            Move::Rock => 0,
            Move::Paper => 1,
            Move::Scissors => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
        }
    }

    pub fn next(self) -> Self {
        let idx = self.selector() as usize;
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = self.selector() as usize;
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl TryFrom<u64> for Move {
    type Error = u64;

    fn try_from(selector: u64) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(Move::Rock),
            1 => Ok(Move::Paper),
            2 => Ok(Move::Scissors),
            other => Err(other),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One past play, as shown in the history panel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryEntry {
    /// `Err` carries a selector the client does not know about.
    pub player_move: Result<Move, u64>,
    pub result: String,
    /// Seconds since the unix epoch; zero when the contract did not record one.
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn move_label(&self) -> String {
        match self.player_move {
            Ok(m) => m.name().to_string(),
            Err(raw) => format!("Unknown ({raw})"),
        }
    }

    pub fn played_at(&self) -> Option<DateTime<Utc>> {
        if self.timestamp == 0 {
            return None;
        }
        let secs = i64::try_from(self.timestamp).ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    pub fn played_at_local(&self) -> Option<String> {
        self.played_at().map(|at| {
            at.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
    }
}

impl From<GameRecord> for HistoryEntry {
    fn from(record: GameRecord) -> Self {
        Self {
            player_move: Move::try_from(record.player_move),
            result: record.result,
            timestamp: record.timestamp,
        }
    }
}

/// Maps the contract's records (oldest first) into display order.
pub fn newest_first(records: Vec<GameRecord>) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> =
        records.into_iter().map(HistoryEntry::from).collect();
    entries.reverse();
    entries
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use proptest::prelude::*;

    fn record(player_move: u64, result: &str, timestamp: u64) -> GameRecord {
        GameRecord {
            player_move,
            result: result.to_string(),
            timestamp,
        }
    }

    #[test]
    fn selector__matches_the_contract_encoding() {
        assert_eq!(Move::Rock.selector(), 0);
        assert_eq!(Move::Paper.selector(), 1);
        assert_eq!(Move::Scissors.selector(), 2);
    }

    #[test]
    fn try_from__rejects_selectors_outside_the_three_moves() {
        assert_eq!(Move::try_from(3), Err(3));
        assert_eq!(Move::try_from(u64::MAX), Err(u64::MAX));
    }

    #[test]
    fn next_and_prev__cycle_through_all_moves() {
        assert_eq!(Move::Rock.next(), Move::Paper);
        assert_eq!(Move::Scissors.next(), Move::Rock);
        assert_eq!(Move::Rock.prev(), Move::Scissors);
    }

    #[test]
    fn newest_first__reverses_contract_order() {
        // given
        let records = vec![
            record(0, "win", 100),
            record(1, "lose", 200),
            record(2, "draw", 300),
        ];

        // when
        let entries = newest_first(records);

        // then
        let timestamps: Vec<u64> = entries.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![300, 200, 100]);
        assert_eq!(entries[0].player_move, Ok(Move::Scissors));
        assert_eq!(entries[0].result, "draw");
    }

    #[test]
    fn from__keeps_unknown_selector_visible() {
        // when
        let entry = HistoryEntry::from(record(7, "win", 1));

        // then
        assert_eq!(entry.player_move, Err(7));
        assert_eq!(entry.move_label(), "Unknown (7)");
    }

    #[test]
    fn played_at__is_none_for_missing_timestamp() {
        let entry = HistoryEntry::from(record(0, "win", 0));
        assert!(entry.played_at().is_none());
        assert!(entry.played_at_local().is_none());
    }

    #[test]
    fn played_at__converts_seconds_since_epoch() {
        let entry = HistoryEntry::from(record(0, "win", 1_700_000_000));
        let at = entry.played_at().unwrap();
        assert_eq!(at.timestamp(), 1_700_000_000);
    }

    proptest! {
        #[test]
        fn newest_first__is_the_exact_reverse_of_any_input(
            raw in proptest::collection::vec((0u64..5, 0u64..10_000), 0..40)
        ) {
            let records: Vec<GameRecord> = raw
                .iter()
                .map(|(m, ts)| record(*m, "label", *ts))
                .collect();

            let entries = newest_first(records.clone());

            prop_assert_eq!(entries.len(), records.len());
            for (entry, played) in entries.iter().zip(records.iter().rev()) {
                prop_assert_eq!(entry.timestamp, played.timestamp);
                prop_assert_eq!(entry.player_move, Move::try_from(played.player_move));
            }
        }

        #[test]
        fn try_from__round_trips_every_selector(m in prop::sample::select(Move::ALL.to_vec())) {
            prop_assert_eq!(Move::try_from(m.selector()), Ok(m));
            prop_assert!(m.selector() <= 2);
        }
    }
}
