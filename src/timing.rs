//! Millisecond to tick conversion
//!
//! A tick is one *logical* report: one call into the sequencer that is then
//! echoed `echo_count` extra times. Durations are divided by the echo count
//! and by the polling interval rounded to the 8 ms frame grid the host polls
//! on, so the result only depends on configuration, never on a clock.

/// Shortest polling interval the host honours, and the grid it rounds to
pub const POLLING_GRID_MS: u32 = 8;

/// Polling interval rounded down to the 8 ms grid, never below 8 ms
pub const fn polling_quantum_ms(polling_ms: u32) -> u32 {
    let ms = if polling_ms > POLLING_GRID_MS {
        polling_ms
    } else {
        POLLING_GRID_MS
    };
    ms / POLLING_GRID_MS * POLLING_GRID_MS
}

/// Tick quantization parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub echo_count: u32,
    pub polling_ms: u32,
}

impl Timing {
    pub const fn new(echo_count: u32, polling_ms: u32) -> Self {
        Self {
            echo_count,
            polling_ms,
        }
    }

    pub const fn quantum_ms(&self) -> u32 {
        polling_quantum_ms(self.polling_ms)
    }

    /// `ms / echo_count / quantum`, with an echo count of 0 treated as 1
    pub const fn ms_to_ticks(&self, ms: u32) -> u32 {
        let echoes = if self.echo_count == 0 {
            1
        } else {
            self.echo_count
        };
        ms / echoes / self.quantum_ms()
    }

    /// Number of polls one logical report occupies on the wire
    pub const fn polls_per_tick(&self) -> u32 {
        self.echo_count + 1
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new(2, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantum() {
        assert_eq!(polling_quantum_ms(1), 8);
        assert_eq!(polling_quantum_ms(8), 8);
        assert_eq!(polling_quantum_ms(12), 8);
        assert_eq!(polling_quantum_ms(16), 16);
        assert_eq!(polling_quantum_ms(23), 16);
    }

    #[test]
    fn test_sync_marks_at_default_timing() {
        let t = Timing::new(2, 8);
        assert_eq!(t.ms_to_ticks(500), 31);
        assert_eq!(t.ms_to_ticks(1000), 62);
        assert_eq!(t.ms_to_ticks(1500), 93);
        assert_eq!(t.ms_to_ticks(2000), 125);
    }

    #[test]
    fn test_position_sync_marks() {
        let t = Timing::default();
        assert_eq!(t.ms_to_ticks(4000), 250);
        assert_eq!(t.ms_to_ticks(1200), 75);
        assert_eq!(t.ms_to_ticks(2400), 150);
    }

    #[test]
    fn test_zero_echo_does_not_divide_by_zero() {
        let t = Timing::new(0, 8);
        assert_eq!(t.ms_to_ticks(800), 100);
        assert_eq!(t.polls_per_tick(), 1);
    }
}
