use std::time::{Duration, Instant};

/// Fixed-period timer driven by the frame loop. Nothing fires on its own; the
/// owner asks how many periods elapsed since the last check.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: Some(now + period),
        }
    }

    pub fn stopped(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn restart(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Number of whole periods that elapsed up to `now`; advances the
    /// schedule past them.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next_due else {
            return 0;
        };
        let mut ticks = 0;
        while next <= now {
            ticks += 1;
            next += self.period;
        }
        self.next_due = Some(next);
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_elapsed_periods() {
        let t0 = Instant::now();
        let mut t = Ticker::start(Duration::from_secs(1), t0);
        assert_eq!(t.due_ticks(t0), 0);
        assert_eq!(t.due_ticks(t0 + Duration::from_millis(1500)), 1);
        assert_eq!(t.due_ticks(t0 + Duration::from_secs(4)), 3);
    }

    #[test]
    fn cancelled_ticker_never_fires() {
        let t0 = Instant::now();
        let mut t = Ticker::start(Duration::from_secs(1), t0);
        t.cancel();
        assert!(!t.is_running());
        assert_eq!(t.due_ticks(t0 + Duration::from_secs(10)), 0);
    }
}
