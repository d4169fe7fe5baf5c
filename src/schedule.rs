// FarmWatch — Cooperative Cadences
//
// Millisecond-gated periodic tasks for the single control loop.

pub struct Cadence {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl Cadence {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// True on the first poll and whenever a full interval has passed since
    /// the last firing. A late poll does not queue catch-up firings.
    pub fn due(&mut self, now_ms: u64) -> bool {
        let fire = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if fire {
            self.last_ms = Some(now_ms);
        }
        fire
    }
}
