//! Fixed launch schedule.
//!
//! Every launch runs the same list of one-shot `(offset, Phase)` entries. A
//! `Timeline` is anchored at the launch timestamp and hands out the entries that
//! became due each time it is polled, the same way the board's beat clock turns
//! `performance.now()` into whole beats.

/// Number of wobble steps after the settle bounce.
pub const WOBBLE_STEPS: u8 = 6;
/// Number of drool trails left during the slide.
pub const DROOL_TRAILS: u8 = 3;

// Offsets relative to the launch call (ms).
pub const IMPACT_AT_MS: f64 = 350.0;
pub const SETTLE_AT_MS: f64 = 430.0;
pub const WOBBLE_AT_MS: f64 = 580.0;
pub const WOBBLE_INTERVAL_MS: f64 = 100.0;
pub const SLIDE_AT_MS: f64 = 1200.0;
pub const DROOL_STAGGER_MS: f64 = 150.0;
pub const DROOL_GROW_DELAY_MS: f64 = 100.0; // after the trail is created
pub const CLEANUP_AT_MS: f64 = 3500.0;

// Durations (ms).
pub const FLY_IN_MS: f64 = 350.0;
pub const IMPACT_MS: f64 = 80.0;
pub const SETTLE_MS: f64 = 150.0;
pub const SLIDE_MS: f64 = 1800.0;
pub const DROOL_GROW_MS: f64 = 1500.0;
pub const SHAKE_MS: f64 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Impact,
    Settle,
    Wobble(u8),
    SlideDown,
    DroolSpawn(u8),
    DroolGrow(u8),
    Cleanup,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineEntry {
    pub offset_ms: f64,
    pub phase: Phase,
}

/// Everything that follows the fly-in, sorted by offset. The fly-in itself runs
/// synchronously inside `launch`.
pub fn schedule() -> Vec<TimelineEntry> {
    let mut entries = vec![
        TimelineEntry { offset_ms: IMPACT_AT_MS, phase: Phase::Impact },
        TimelineEntry { offset_ms: SETTLE_AT_MS, phase: Phase::Settle },
    ];
    for step in 0..WOBBLE_STEPS {
        entries.push(TimelineEntry {
            offset_ms: WOBBLE_AT_MS + step as f64 * WOBBLE_INTERVAL_MS,
            phase: Phase::Wobble(step),
        });
    }
    entries.push(TimelineEntry { offset_ms: SLIDE_AT_MS, phase: Phase::SlideDown });
    for i in 0..DROOL_TRAILS {
        let spawn = SLIDE_AT_MS + i as f64 * DROOL_STAGGER_MS;
        entries.push(TimelineEntry { offset_ms: spawn, phase: Phase::DroolSpawn(i) });
        entries.push(TimelineEntry {
            offset_ms: spawn + DROOL_GROW_DELAY_MS,
            phase: Phase::DroolGrow(i),
        });
    }
    entries.push(TimelineEntry { offset_ms: CLEANUP_AT_MS, phase: Phase::Cleanup });
    // stable: equal offsets keep insertion order (slide before first trail)
    entries.sort_by(|a, b| a.offset_ms.total_cmp(&b.offset_ms));
    entries
}

/// Cursor over [`schedule`] anchored at a start timestamp.
#[derive(Debug)]
pub struct Timeline {
    start_ms: f64,
    entries: Vec<TimelineEntry>,
    next: usize, // index of the first entry not yet handed out
}

impl Timeline {
    pub fn new(start_ms: f64) -> Self {
        Self { start_ms, entries: schedule(), next: 0 }
    }

    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.start_ms
    }

    /// Next phase due at `now`, if any. Call repeatedly to drain overdue entries.
    pub fn pop_due(&mut self, now: f64) -> Option<Phase> {
        let entry = self.entries.get(self.next)?;
        if self.elapsed(now) >= entry.offset_ms {
            self.next += 1;
            Some(entry.phase)
        } else {
            None
        }
    }

    /// Absolute timestamp of the next entry still to be handed out.
    pub fn next_due_at(&self) -> Option<f64> {
        self.entries.get(self.next).map(|e| self.start_ms() + e.offset_ms)
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.entries.len()
    }

    pub fn remaining(&self) -> usize {
        self.entries.len() - self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_is_sorted_and_ends_with_cleanup() {
        let s = schedule();
        assert!(s.windows(2).all(|w| w[0].offset_ms <= w[1].offset_ms));
        let last = s.last().unwrap();
        assert_eq!(last.phase, Phase::Cleanup);
        assert_eq!(last.offset_ms, CLEANUP_AT_MS);
    }

    #[test]
    fn test_schedule_counts() {
        let s = schedule();
        let wobbles = s.iter().filter(|e| matches!(e.phase, Phase::Wobble(_))).count();
        let spawns = s.iter().filter(|e| matches!(e.phase, Phase::DroolSpawn(_))).count();
        let grows = s.iter().filter(|e| matches!(e.phase, Phase::DroolGrow(_))).count();
        assert_eq!(wobbles, 6);
        assert_eq!(spawns, 3);
        assert_eq!(grows, 3);
    }

    #[test]
    fn test_drool_growth_offsets() {
        let grows: Vec<f64> = schedule()
            .iter()
            .filter(|e| matches!(e.phase, Phase::DroolGrow(_)))
            .map(|e| e.offset_ms - SLIDE_AT_MS)
            .collect();
        assert_eq!(grows, vec![100.0, 250.0, 400.0]);
    }

    #[test]
    fn test_slide_precedes_first_trail() {
        let s = schedule();
        let slide = s.iter().position(|e| e.phase == Phase::SlideDown).unwrap();
        let first = s.iter().position(|e| e.phase == Phase::DroolSpawn(0)).unwrap();
        assert!(slide < first);
    }

    #[test]
    fn test_pop_due_drains_overdue_in_order() {
        let mut t = Timeline::new(1_000.0);
        assert_eq!(t.pop_due(1_349.0), None);
        // jump straight past settle: both fire, impact first
        assert_eq!(t.pop_due(1_450.0), Some(Phase::Impact));
        assert_eq!(t.pop_due(1_450.0), Some(Phase::Settle));
        assert_eq!(t.pop_due(1_450.0), None);
        assert_eq!(t.next_due_at(), Some(1_580.0)); // first wobble step
        while t.pop_due(10_000.0).is_some() {}
        assert!(t.is_finished());
        assert_eq!(t.next_due_at(), None);
        assert_eq!(t.remaining(), 0);
    }
}
