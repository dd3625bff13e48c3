use crate::PlayerId;
use std::collections::HashMap;

/// Per-round log of the damage values each player has walked into.
///
/// The first encounter with a given non-zero value is evaded; every later
/// encounter with that same value lands in full. Values are tracked
/// independently, so a player who already evaded a 1 still evades their
/// first 2.
#[derive(Debug, Clone, Default)]
pub struct DamageTracker {
    history: HashMap<PlayerId, Vec<u8>>,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the encounter and returns the damage that actually applies.
    pub fn check_and_record(&mut self, player: PlayerId, damage: u8) -> u8 {
        if damage == 0 {
            return 0;
        }
        let log = self.history.entry(player).or_default();
        let seen = log.contains(&damage);
        log.push(damage);
        if seen {
            damage
        } else {
            0
        }
    }

    pub fn history(&self, player: PlayerId) -> &[u8] {
        self.history.get(&player).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.history.values().all(Vec::is_empty)
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_hit_is_evaded_second_lands() {
        let mut tracker = DamageTracker::new();
        let p = PlayerId(1);
        assert_eq!(tracker.check_and_record(p, 1), 0);
        assert_eq!(tracker.check_and_record(p, 1), 1);
        assert_eq!(tracker.check_and_record(p, 1), 1);
        assert_eq!(tracker.history(p), &[1, 1, 1]);
    }

    #[test]
    fn values_and_players_are_independent() {
        let mut tracker = DamageTracker::new();
        let (a, b) = (PlayerId(1), PlayerId(2));
        assert_eq!(tracker.check_and_record(a, 1), 0);
        assert_eq!(tracker.check_and_record(a, 2), 0);
        assert_eq!(tracker.check_and_record(b, 1), 0);
        assert_eq!(tracker.check_and_record(a, 2), 2);
    }

    #[test]
    fn zero_damage_is_never_recorded() {
        let mut tracker = DamageTracker::new();
        assert_eq!(tracker.check_and_record(PlayerId(1), 0), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn reset_forgets_everything() {
        let mut tracker = DamageTracker::new();
        tracker.check_and_record(PlayerId(1), 3);
        tracker.reset();
        assert!(tracker.is_empty());
        assert_eq!(tracker.check_and_record(PlayerId(1), 3), 0);
    }

    proptest! {
        #[test]
        fn only_first_occurrence_of_each_value_is_evaded(values in prop::collection::vec(0u8..=3, 0..40)) {
            let mut tracker = DamageTracker::new();
            let mut seen = [false; 4];
            for value in values {
                let applied = tracker.check_and_record(PlayerId(7), value);
                let expected = if value == 0 || !seen[value as usize] { 0 } else { value };
                if value > 0 {
                    seen[value as usize] = true;
                }
                prop_assert_eq!(applied, expected);
            }
        }
    }
}
