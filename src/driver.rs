//! Polling driver: binds the sequencer to a transport
//!
//! Every report slot the driver drains (and drops) at most one host packet,
//! asks the sequencer for the next report, and sends it. The gadget node
//! blocks writes until the host has collected the previous report, so with
//! a real gadget the host's own polling paces the loop; the interval pacing
//! keeps dry runs and previews at the same rate.

use pokken_report::{hex_report, BoxedTransport, TransportError};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::indicator::CompletionIndicator;
use crate::sequencer::Sequencer;

/// How report slots are timed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// One slot per interval tick
    Interval(Duration),
    /// Back to back; the transport applies back-pressure
    Unpaced,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Interval(Duration::from_millis(8))
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Report slots served
    pub ticks: u64,
    /// Reports handed to the transport
    pub sent: u64,
    /// Host packets read and dropped
    pub discarded_output: u64,
    /// Sequencer reached `Done`
    pub finished: bool,
}

pub struct PollingDriver {
    sequencer: Sequencer,
    transport: BoxedTransport,
    pacing: Pacing,
    max_ticks: Option<u64>,
    stop_when_done: bool,
    indicator: Option<Box<dyn CompletionIndicator>>,
    last_level: Option<bool>,
}

impl PollingDriver {
    pub fn new(sequencer: Sequencer, transport: BoxedTransport) -> Self {
        Self {
            sequencer,
            transport,
            pacing: Pacing::default(),
            max_ticks: None,
            stop_when_done: false,
            indicator: None,
            last_level: None,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Stop after this many report slots
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Stop as soon as the sequencer reaches `Done`
    pub fn with_stop_when_done(mut self, stop: bool) -> Self {
        self.stop_when_done = stop;
        self
    }

    pub fn with_indicator(mut self, indicator: Box<dyn CompletionIndicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn into_sequencer(self) -> Sequencer {
        self.sequencer
    }

    /// Serve report slots until `shutdown` resolves or a stop condition hits
    pub async fn run<F>(&mut self, shutdown: F) -> Result<DriverStats, TransportError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut interval = match self.pacing {
            Pacing::Interval(period) => {
                let mut interval = tokio::time::interval(period);
                // A late slot is served late, never twice
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Some(interval)
            }
            Pacing::Unpaced => None,
        };

        info!(
            "Driving {} ({:?}, echo {})",
            self.transport.describe(),
            self.pacing,
            self.sequencer.config().timing.echo_count
        );

        let mut stats = DriverStats::default();
        loop {
            if self.max_ticks.is_some_and(|max| stats.ticks >= max) {
                debug!("Tick limit reached");
                break;
            }
            if self.stop_when_done && self.sequencer.is_done() {
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = next_slot(interval.as_mut()) => {}
            }

            self.serve_slot(&mut stats).await?;
        }

        stats.finished = self.sequencer.is_done();
        info!(
            "Stopped after {} reports ({} host packets dropped)",
            stats.sent, stats.discarded_output
        );
        Ok(stats)
    }

    async fn serve_slot(&mut self, stats: &mut DriverStats) -> Result<(), TransportError> {
        if let Some(packet) = self.transport.poll_output().await? {
            trace!("Dropping host packet {:02x?}", packet.data);
            stats.discarded_output += 1;
        }

        let report = self.sequencer.next_report();
        trace!("{:?} {}", self.sequencer.phase(), hex_report(&report));
        if let Err(e) = self.transport.send_input(&report).await {
            error!("Failed to send report {}: {}", stats.ticks, e);
            return Err(e);
        }
        stats.ticks += 1;
        stats.sent += 1;

        self.forward_completion();
        Ok(())
    }

    fn forward_completion(&mut self) {
        let Some(level) = self.sequencer.completion_signal() else {
            return;
        };
        if self.last_level == Some(level) {
            return;
        }
        self.last_level = Some(level);
        if let Some(indicator) = self.indicator.as_mut() {
            if let Err(e) = indicator.set(level) {
                warn!("Failed to update completion indicator: {}", e);
            }
        }
    }
}

async fn next_slot(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => tokio::task::yield_now().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::sequencer::{Payload, PositionSync, SequencerConfig};
    use crate::timing::Timing;
    use crate::traversal::TraversalMode;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pokken_report::{
        Button, InputReport, MemoryTransport, OutputReport, ReportTransport,
    };
    use std::sync::Arc;

    fn macro_sequencer(echo: u32, loop_forever: bool) -> Sequencer {
        let payload = Payload::Macro {
            script: "A(2),B(1)".parse().unwrap(),
            loop_forever,
        };
        Sequencer::new(SequencerConfig::new(Timing::new(echo, 8), payload))
    }

    fn memory() -> (Arc<MemoryTransport>, BoxedTransport) {
        let mem = Arc::new(MemoryTransport::new());
        let transport: BoxedTransport = mem.clone();
        (mem, transport)
    }

    struct RecordingIndicator(Arc<Mutex<Vec<bool>>>);

    impl CompletionIndicator for RecordingIndicator {
        fn set(&mut self, on: bool) -> std::io::Result<()> {
            self.0.lock().push(on);
            Ok(())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl ReportTransport for FailingTransport {
        async fn send_input(&self, _report: &InputReport) -> Result<(), TransportError> {
            Err(TransportError::Disconnected)
        }

        async fn poll_output(&self) -> Result<Option<OutputReport>, TransportError> {
            Ok(None)
        }

        fn describe(&self) -> String {
            "failing".into()
        }
    }

    #[tokio::test]
    async fn test_max_ticks_and_echo() {
        let (mem, transport) = memory();
        let mut driver = PollingDriver::new(macro_sequencer(2, true), transport)
            .with_pacing(Pacing::Unpaced)
            .with_max_ticks(30);

        let stats = driver.run(std::future::pending()).await.unwrap();
        assert_eq!(stats.ticks, 30);
        assert_eq!(stats.sent, 30);
        assert!(!stats.finished);

        let sent = mem.sent();
        assert_eq!(sent.len(), 30);
        for chunk in sent.chunks(3) {
            assert!(chunk.iter().all(|r| *r == chunk[0]));
        }
    }

    #[tokio::test]
    async fn test_host_packets_are_dropped() {
        let (mem, transport) = memory();
        for i in 0..3 {
            mem.inject_output(OutputReport::from_packet(&[i; 8]));
        }
        let mut driver = PollingDriver::new(macro_sequencer(0, true), transport)
            .with_pacing(Pacing::Unpaced)
            .with_max_ticks(10);

        let stats = driver.run(std::future::pending()).await.unwrap();
        assert_eq!(stats.discarded_output, 3);
        assert_eq!(mem.pending_output(), 0);
        // Host packets never disturb the report stream
        assert_eq!(mem.sent_count(), 10);
    }

    #[tokio::test]
    async fn test_shutdown_stops_immediately() {
        let (mem, transport) = memory();
        let mut driver =
            PollingDriver::new(macro_sequencer(2, true), transport).with_pacing(Pacing::Unpaced);

        let stats = driver.run(std::future::ready(())).await.unwrap();
        assert_eq!(stats.ticks, 0);
        assert_eq!(mem.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_when_done() {
        let payload = Payload::Raster {
            canvas: Canvas::from_ascii("#.\n.#\n").unwrap(),
            mode: TraversalMode::ZigZag,
            ink_button: Button::A,
            position_sync: PositionSync::default(),
        };
        let seq = Sequencer::new(SequencerConfig::new(Timing::new(0, 8), payload));
        let (mem, transport) = memory();
        let mut driver = PollingDriver::new(seq, transport)
            .with_pacing(Pacing::Unpaced)
            .with_stop_when_done(true);

        let stats = driver.run(std::future::pending()).await.unwrap();
        assert!(stats.finished);
        assert!(driver.sequencer().is_done());
        let inked = mem
            .sent()
            .iter()
            .filter(|r| r.is_pressed(Button::A))
            .count();
        // Two confirm presses during sync, the origin once, and (1, 1) three
        // times as the end of the sweep steps back through it
        assert_eq!(inked, 6);
    }

    #[tokio::test]
    async fn test_completion_forwarded_on_change() {
        let payload = Payload::Macro {
            script: "A(1)".parse().unwrap(),
            loop_forever: false,
        };
        let mut config = SequencerConfig::new(Timing::new(0, 8), payload);
        config.completion_signal = true;
        config.blink_ms = 24; // 3 ticks
        let seq = Sequencer::new(config);

        let levels = Arc::new(Mutex::new(Vec::new()));
        let (_mem, transport) = memory();
        let mut driver = PollingDriver::new(seq, transport)
            .with_pacing(Pacing::Unpaced)
            .with_max_ticks(400)
            .with_indicator(Box::new(RecordingIndicator(levels.clone())));

        let stats = driver.run(std::future::pending()).await.unwrap();
        assert!(stats.finished);
        let levels = levels.lock();
        assert!(levels.len() > 2);
        // Starts off and alternates, one call per change
        assert!(!levels[0]);
        for pair in levels.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport: BoxedTransport = Arc::new(FailingTransport);
        let mut driver =
            PollingDriver::new(macro_sequencer(0, true), transport).with_pacing(Pacing::Unpaced);
        let err = driver.run(std::future::pending()).await.unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[tokio::test]
    async fn test_interval_pacing() {
        let (mem, transport) = memory();
        let mut driver = PollingDriver::new(macro_sequencer(0, true), transport)
            .with_pacing(Pacing::Interval(Duration::from_millis(1)))
            .with_max_ticks(5);
        let started = std::time::Instant::now();
        driver.run(std::future::pending()).await.unwrap();
        assert_eq!(mem.sent_count(), 5);
        // First interval tick completes immediately
        assert!(started.elapsed() >= Duration::from_millis(4));
    }
}
