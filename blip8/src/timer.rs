//! Delay timer.
//!
//! The countdown is anchored to wall-clock timestamps rather than
//! decremented per cycle, so its 60 Hz decay stays correct no matter
//! how often the caller advances cycles. Timestamps are passed in by
//! the owner from its time source, keeping this type deterministic
//! under test.
use std::time::Instant;

use crate::constants::TIMER_FREQUENCY;

pub(crate) struct DelayTimer {
    /// Fractional countdown so sub-tick elapsed time is not lost
    /// between updates.
    value: f64,
    /// Timestamp of the last update while armed. `None` means the
    /// timer has run out.
    last_check: Option<Instant>,
}

impl Default for DelayTimer {
    fn default() -> Self {
        Self {
            value: 0.0,
            last_check: None,
        }
    }
}

impl DelayTimer {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Current countdown value, implicitly zero once disarmed.
    pub(crate) fn value(&self) -> u8 {
        self.value as u8
    }

    /// Arm the countdown.
    pub(crate) fn start(&mut self, value: u8, now: Instant) {
        self.value = value as f64;
        self.last_check = Some(now);
    }

    /// Subtract the 60 Hz ticks that elapsed since the last update.
    ///
    /// Must run once per cycle advance, before the instruction executes,
    /// so `FX07` observes a value consistent with wall-clock time.
    pub(crate) fn update(&mut self, now: Instant) {
        let Some(last_check) = self.last_check else {
            return;
        };

        let elapsed = now.saturating_duration_since(last_check).as_secs_f64();
        let result = self.value - elapsed * TIMER_FREQUENCY;

        if result > 0.0 {
            self.value = result;
            self.last_check = Some(now);
        } else {
            self.value = 0.0;
            self.last_check = None;
        }
    }

    /// Disarm and zero the countdown.
    pub(crate) fn reset(&mut self) {
        self.value = 0.0;
        self.last_check = None;
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_full_second_drains_sixty_ticks() {
        let mut timer = DelayTimer::new();
        let t0 = Instant::now();

        timer.start(60, t0);
        timer.update(t0 + Duration::from_secs(1));

        assert_eq!(timer.value(), 0);
    }

    #[test]
    fn test_half_second_drains_thirty_ticks() {
        let mut timer = DelayTimer::new();
        let t0 = Instant::now();

        timer.start(60, t0);
        timer.update(t0 + Duration::from_millis(500));

        assert_eq!(timer.value(), 30);
    }

    #[test]
    fn test_value_is_stable_when_time_stands_still() {
        let mut timer = DelayTimer::new();
        let t0 = Instant::now();

        timer.start(42, t0);
        timer.update(t0);
        timer.update(t0);

        assert_eq!(timer.value(), 42);
    }

    #[test]
    fn test_fractional_ticks_accumulate() {
        let mut timer = DelayTimer::new();
        let t0 = Instant::now();

        timer.start(60, t0);
        // 120 updates of ~4.2ms each, one simulated cycle at ~240Hz.
        // Each step drains a quarter tick; none of it may be lost.
        for i in 1..=120u32 {
            timer.update(t0 + Duration::from_micros(u64::from(i) * 4_166));
        }

        // ~0.5s elapsed in total, ~30 ticks drained.
        assert_eq!(timer.value(), 30);
    }

    #[test]
    fn test_disarmed_timer_reads_zero() {
        let mut timer = DelayTimer::new();
        let t0 = Instant::now();

        timer.start(1, t0);
        timer.update(t0 + Duration::from_secs(5));
        assert_eq!(timer.value(), 0);

        // Further updates are no-ops once disarmed.
        timer.update(t0 + Duration::from_secs(6));
        assert_eq!(timer.value(), 0);
    }
}
