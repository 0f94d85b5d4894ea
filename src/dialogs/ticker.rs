//! Auto-click countdown for dialog buttons

use std::time::Duration;
use tokio::time::Instant;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Ticks and click due after advancing a [`Ticker`]
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct TickerStep {
    /// 1-based counters of the ticks that came due, in order
    pub ticks: Vec<u32>,
    /// The auto-click deadline has passed
    pub fire: bool,
}

/// A running countdown: one tick per second until the click deadline
#[derive(Debug, Clone)]
pub(crate) struct Ticker {
    counter: u32,
    next_tick: Instant,
    deadline: Instant,
}

impl Ticker {
    pub fn start(now: Instant, delay: Duration) -> Self {
        Self {
            counter: 1,
            next_tick: now + TICK_PERIOD,
            deadline: now + delay,
        }
    }

    /// Ticks that fall on the deadline are delivered before the click.
    pub fn advance(&mut self, now: Instant) -> TickerStep {
        let mut step = TickerStep::default();
        let horizon = now.min(self.deadline);

        while self.next_tick <= horizon {
            step.ticks.push(self.counter);
            self.counter += 1;
            self.next_tick += TICK_PERIOD;
        }

        step.fire = now >= self.deadline;
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_once_per_second() {
        let start = Instant::now();
        let mut ticker = Ticker::start(start, Duration::from_secs(5));

        assert_eq!(ticker.advance(start + Duration::from_millis(500)), TickerStep::default());

        let step = ticker.advance(start + Duration::from_millis(1000));
        assert_eq!(step.ticks, vec![1]);
        assert!(!step.fire);

        let step = ticker.advance(start + Duration::from_millis(3200));
        assert_eq!(step.ticks, vec![2, 3]);
        assert!(!step.fire);
    }

    #[test]
    fn test_tick_on_deadline_precedes_click() {
        let start = Instant::now();
        let mut ticker = Ticker::start(start, Duration::from_secs(2));

        let step = ticker.advance(start + Duration::from_secs(2));
        assert_eq!(step.ticks, vec![1, 2]);
        assert!(step.fire);
    }

    #[test]
    fn test_no_ticks_past_deadline() {
        let start = Instant::now();
        let mut ticker = Ticker::start(start, Duration::from_millis(1500));

        let step = ticker.advance(start + Duration::from_secs(10));
        assert_eq!(step.ticks, vec![1]);
        assert!(step.fire);
    }
}
