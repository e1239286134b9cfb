//! Id generation for records added without an explicit id.
//!
//! Ids are Unix-millisecond timestamps, bumped so that each one is strictly
//! greater than the previous one and than every numeric id already observed
//! in the collection. Once the top of the `i64` range is occupied, the
//! lowest free id at or above the clock is used instead.

use crate::error::ValidationError;
use crate::types::{IdKind, RecordId};

/// Per-collection id allocator.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an existing id so later allocations stay above it.
    pub fn observe(&mut self, id: &RecordId) {
        if let Some(n) = id.as_i64() {
            self.last = self.last.max(n);
        }
    }

    /// Allocate the next id.
    ///
    /// `now_millis` is the current clock reading; `taken` reports ids that
    /// are already in use, which are skipped. Fails only when every id from
    /// the clock up to `i64::MAX` is taken.
    pub fn next_id(
        &mut self,
        kind: IdKind,
        now_millis: i64,
        taken: impl Fn(&RecordId) -> bool,
    ) -> Result<RecordId, ValidationError> {
        let floor = now_millis.max(self.last.saturating_add(1));

        let mut candidate = Some(floor);
        while let Some(value) = candidate {
            let id = kind.make(value);
            if !taken(&id) {
                self.last = self.last.max(value);
                return Ok(id);
            }
            candidate = value.checked_add(1);
        }

        // Nothing free above the floor: reuse a gap below it
        let mut value = now_millis.max(1);
        while value < floor {
            let id = kind.make(value);
            if !taken(&id) {
                return Ok(id);
            }
            value += 1;
        }

        Err(ValidationError::IdSpaceExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uses_clock_when_ahead() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(IdKind::Numeric, 1000, |_| false), Ok(RecordId::Num(1000)));
    }

    #[test]
    fn test_same_millisecond_still_unique() {
        let mut ids = IdGenerator::new();
        let a = ids.next_id(IdKind::Numeric, 1000, |_| false).unwrap();
        let b = ids.next_id(IdKind::Numeric, 1000, |_| false).unwrap();
        assert_eq!(a, RecordId::Num(1000));
        assert_eq!(b, RecordId::Num(1001));
    }

    #[test]
    fn test_observed_ids_raise_floor() {
        let mut ids = IdGenerator::new();
        ids.observe(&RecordId::Num(5000));
        ids.observe(&RecordId::from("not-a-number"));
        assert_eq!(ids.next_id(IdKind::Numeric, 10, |_| false), Ok(RecordId::Num(5001)));
    }

    #[test]
    fn test_text_ids_skip_taken() {
        let mut ids = IdGenerator::new();
        let id = ids.next_id(IdKind::Text, 7, |id| *id == RecordId::from("7"));
        assert_eq!(id, Ok(RecordId::from("8")));
    }

    #[test]
    fn test_max_id_taken_falls_back_below() {
        let mut ids = IdGenerator::new();
        ids.observe(&RecordId::Num(i64::MAX));

        let max = RecordId::Num(i64::MAX);
        let id = ids.next_id(IdKind::Numeric, 1000, |id| *id == max).unwrap();
        assert_eq!(id, RecordId::Num(1000));

        // The fallback skips taken ids too
        let id = ids
            .next_id(IdKind::Numeric, 1000, |id| {
                *id == max || *id == RecordId::Num(1000)
            })
            .unwrap();
        assert_eq!(id, RecordId::Num(1001));
    }

    #[test]
    fn test_text_max_id_taken_falls_back_below() {
        let mut ids = IdGenerator::new();
        let max = RecordId::from(i64::MAX.to_string());
        ids.observe(&max);

        let id = ids.next_id(IdKind::Text, 42, |id| *id == max).unwrap();
        assert_eq!(id, RecordId::from("42"));
    }

    #[test]
    fn test_exhausted_range_is_an_error() {
        let mut ids = IdGenerator::new();
        let floor = i64::MAX - 2;
        let err = ids.next_id(IdKind::Numeric, floor, |_| true).unwrap_err();
        assert_eq!(err, ValidationError::IdSpaceExhausted);
    }

    proptest! {
        #[test]
        fn test_ids_strictly_increase(clock in prop::collection::vec(0i64..1_000_000, 1..200)) {
            let mut ids = IdGenerator::new();
            let mut previous = None;
            for now in clock {
                let id = ids.next_id(IdKind::Numeric, now, |_| false).unwrap().as_i64().unwrap();
                if let Some(prev) = previous {
                    prop_assert!(id > prev);
                }
                previous = Some(id);
            }
        }
    }
}
