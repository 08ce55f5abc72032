use chrono::{DateTime, Duration, Utc};

/// Creation and modification timestamps. Serialized as RFC 3339.
pub type Timestamp = DateTime<Utc>;

/// Hands out strictly increasing timestamps.
///
/// Wall-clock reads can repeat or step backwards; entities created in quick
/// succession still need a total order for the recent filter, and a refresh
/// must never move `updated_at` into the past.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Clock {
    last: Option<Timestamp>,
}

impl Clock {
    pub(crate) fn tick(&mut self) -> Timestamp {
        let now = Utc::now();
        let next = match self.last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last = Some(next);
        next
    }

    /// Never issue a timestamp at or before `seen`.
    pub(crate) fn observe(&mut self, seen: Timestamp) {
        if self.last.map_or(true, |last| seen > last) {
            self.last = Some(seen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_strictly_increase() {
        let mut clock = Clock::default();
        let mut previous = clock.tick();
        for _ in 0..1_000 {
            let next = clock.tick();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn observe_moves_past_future_timestamps() {
        let mut clock = Clock::default();
        let future = Utc::now() + Duration::days(365);
        clock.observe(future);

        assert!(clock.tick() > future);
    }
}
