//! Report echo scheduling
//!
//! The Switch applies controller state slower than it polls, so every newly
//! computed report is held on the wire for `echo_count` extra polls before
//! the next one is computed. Without this, consecutive moves arrive faster
//! than the console consumes them and steps get dropped.

use pokken_report::InputReport;

/// Repeats each fresh report `echo_count` extra times
#[derive(Debug, Clone)]
pub struct EchoScheduler {
    echo_count: u32,
    remaining: u32,
    last: InputReport,
}

impl EchoScheduler {
    pub fn new(echo_count: u32) -> Self {
        Self {
            echo_count,
            remaining: 0,
            last: InputReport::neutral(),
        }
    }

    /// Produce the report for this poll.
    ///
    /// While echoes remain, the previous report is returned and `compute` is
    /// not called. Otherwise `compute` runs once, its result is latched, and
    /// the echo counter is rearmed.
    pub fn next_with<F>(&mut self, compute: F) -> InputReport
    where
        F: FnOnce() -> InputReport,
    {
        if self.remaining > 0 {
            self.remaining -= 1;
            return self.last;
        }

        self.last = compute();
        self.remaining = self.echo_count;
        self.last
    }

    pub fn echo_count(&self) -> u32 {
        self.echo_count
    }

    /// Echoes still owed for the latched report
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Most recently computed report
    pub fn last(&self) -> &InputReport {
        &self.last
    }

    /// True when the next poll will compute a fresh report
    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    pub fn reset(&mut self) {
        self.remaining = 0;
        self.last = InputReport::neutral();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokken_report::Hat;

    fn report_with(hat: Hat) -> InputReport {
        let mut r = InputReport::neutral();
        r.set_hat(hat);
        r
    }

    #[test]
    fn test_each_report_repeats_echo_plus_one_times() {
        let mut echo = EchoScheduler::new(2);
        let hats = [Hat::Up, Hat::Right, Hat::Down];
        let mut next = hats.iter();
        let mut computed = 0;

        let mut out = Vec::new();
        for _ in 0..9 {
            out.push(echo.next_with(|| {
                computed += 1;
                report_with(*next.next().unwrap())
            }));
        }

        assert_eq!(computed, 3);
        let seen: Vec<Hat> = out.iter().map(|r| r.hat()).collect();
        assert_eq!(
            seen,
            vec![
                Hat::Up,
                Hat::Up,
                Hat::Up,
                Hat::Right,
                Hat::Right,
                Hat::Right,
                Hat::Down,
                Hat::Down,
                Hat::Down
            ]
        );
    }

    #[test]
    fn test_zero_echo_computes_every_poll() {
        let mut echo = EchoScheduler::new(0);
        let mut calls = 0;
        for _ in 0..5 {
            echo.next_with(|| {
                calls += 1;
                InputReport::neutral()
            });
            assert!(echo.is_ready());
        }
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_reset_drops_pending_echoes() {
        let mut echo = EchoScheduler::new(3);
        echo.next_with(|| report_with(Hat::Left));
        assert_eq!(echo.remaining(), 3);
        echo.reset();
        assert!(echo.is_ready());
        assert!(echo.last().is_neutral());
    }
}
