//! Linux USB gadget HID transport
//!
//! With the `f_hid` gadget function bound (configfs or the legacy g_hid
//! module), the kernel exposes `/dev/hidgN`. Writing 8 bytes queues one
//! input report for the host's next interrupt IN poll; the write blocks until
//! the previous report has been collected, which paces the caller to the
//! host's polling interval. Reads return host OUT reports.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::TransportError;
use crate::report::{InputReport, OutputReport, REPORT_SIZE};
use crate::transport::ReportTransport;

/// Host packets buffered before the reader starts dropping them
const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// Default gadget node
pub const DEFAULT_GADGET_PATH: &str = "/dev/hidg0";

/// Transport writing reports to a `/dev/hidgN` node
pub struct HidGadgetTransport {
    path: PathBuf,
    writer: Arc<Mutex<File>>,
    output_rx: Mutex<mpsc::Receiver<OutputReport>>,
    /// Host packets dropped because nobody drained the channel
    overflowed: Arc<AtomicU64>,
    /// Shutdown flag for the reader thread
    shutdown: Arc<AtomicBool>,
}

impl HidGadgetTransport {
    /// Open a gadget node and start draining host packets on a reader thread
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| TransportError::from_open(&name, e))?;
        let reader = file.try_clone()?;

        let (tx, rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let overflowed = Arc::new(AtomicU64::new(0));

        let shutdown_clone = shutdown.clone();
        let overflowed_clone = overflowed.clone();
        std::thread::Builder::new()
            .name("hidg-out-reader".into())
            .spawn(move || output_reader_loop(reader, tx, shutdown_clone, overflowed_clone))?;

        debug!("Opened gadget node {}", name);

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(file)),
            output_rx: Mutex::new(rx),
            overflowed,
            shutdown,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of host packets dropped since open
    pub fn overflowed(&self) -> u64 {
        self.overflowed.load(Ordering::Relaxed)
    }
}

impl Drop for HidGadgetTransport {
    fn drop(&mut self) {
        // The reader may still be parked in read(); it exits on its next packet.
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl ReportTransport for HidGadgetTransport {
    async fn send_input(&self, report: &InputReport) -> Result<(), TransportError> {
        let bytes = report.to_bytes();
        let writer = self.writer.clone();

        let written = tokio::task::spawn_blocking(move || writer.lock().write(&bytes))
            .await
            .map_err(|e| TransportError::Internal(format!("writer task failed: {e}")))?
            .map_err(TransportError::from_write)?;

        if written != REPORT_SIZE {
            return Err(TransportError::ShortWrite {
                written,
                expected: REPORT_SIZE,
            });
        }
        trace!("hidg wrote {:02x?}", bytes);
        Ok(())
    }

    async fn poll_output(&self) -> Result<Option<OutputReport>, TransportError> {
        match self.output_rx.lock().try_recv() {
            Ok(report) => Ok(Some(report)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TransportError::Disconnected),
        }
    }

    fn describe(&self) -> String {
        format!("hidg({})", self.path.display())
    }
}

/// Dedicated reader loop for host OUT packets
fn output_reader_loop(
    mut file: File,
    tx: mpsc::Sender<OutputReport>,
    shutdown: Arc<AtomicBool>,
    overflowed: Arc<AtomicU64>,
) {
    debug!("Gadget output reader thread started");
    let mut buf = [0u8; 64];

    while !shutdown.load(Ordering::Relaxed) {
        match file.read(&mut buf) {
            Ok(0) => {
                // No configuration yet; avoid spinning
                std::thread::sleep(Duration::from_millis(50));
            }
            Ok(len) => {
                trace!("hidg read {} bytes: {:02x?}", len, &buf[..len.min(REPORT_SIZE)]);
                let report = OutputReport::from_packet(&buf[..len]);
                match tx.try_send(report) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        overflowed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }
            Err(e) => {
                warn!("Gadget output reader error: {}", e);
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }

    debug!("Gadget output reader thread exiting");
}
