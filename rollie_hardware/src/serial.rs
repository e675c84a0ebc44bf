//! Line-oriented serial link to the tag reader.
//!
//! A background thread owns the read half, parses each line, and pushes the
//! result through a bounded channel. `poll` drains whatever arrived since the
//! previous call without blocking. Only lines that decode into a record count
//! as a tag being present.
//!
//! The thread exits at EOF, on a read error, or once the link is dropped and
//! the next line arrives. Drop gives it a short grace period and joins it only
//! if it finished, so a reader parked in a blocking read never stalls shutdown.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel as xch;
use rollie_traits::{BoxError, TagLink, TagPoll, TagRecord};

use crate::error::HwError;
use crate::tag::{format_weight_line, parse_tag_line};
use crate::util::wait_until;

/// Lines buffered between polls before the reader thread blocks.
const LINE_BACKLOG: usize = 16;
/// How long drop waits for the reader thread before detaching it.
const DROP_GRACE: Duration = Duration::from_millis(20);

pub struct SerialTagLink<W: Write> {
    rx: xch::Receiver<Option<TagRecord>>,
    writer: W,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
    closed_reported: bool,
}

impl<W: Write> SerialTagLink<W> {
    pub fn spawn<R>(reader: R, writer: W) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = xch::bounded(LINE_BACKLOG);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            let mut reader = reader;
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) => {
                        tracing::debug!("tag link reached EOF");
                        break;
                    }
                    Ok(_) => {
                        if shutdown_clone.load(Ordering::Relaxed) {
                            break;
                        }
                        let parsed = parse_tag_line(&line);
                        if parsed.is_none() {
                            tracing::debug!(line = line.trim_end(), "unparsable tag line");
                        }
                        // Consumer gone; exit gracefully
                        if tx.send(parsed).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "tag link read failed");
                        break;
                    }
                }
            }
            tracing::trace!("tag reader thread exiting");
        });

        Self {
            rx,
            writer,
            shutdown,
            join_handle: Some(join_handle),
            closed_reported: false,
        }
    }
}

impl SerialTagLink<std::fs::File> {
    /// Open a tty (or any readable/writable file) already configured for
    /// the reader's baud rate, e.g. with `stty`.
    pub fn open(path: &std::path::Path) -> Result<Self, HwError> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)?;
        let reader = std::io::BufReader::new(file.try_clone()?);
        tracing::info!(port = %path.display(), "tag link opened");
        Ok(Self::spawn(reader, file))
    }
}

impl<W: Write> TagLink for SerialTagLink<W> {
    fn poll(&mut self) -> Result<TagPoll, BoxError> {
        // Sampled before draining so lines sent just before exit are not lost.
        let finished = self
            .join_handle
            .as_ref()
            .is_some_and(JoinHandle::is_finished);
        let mut arrived = false;
        let mut record = None;
        for parsed in self.rx.try_iter() {
            arrived = true;
            match parsed {
                Some(r) => record = Some(r),
                None => tracing::debug!("discarding unparsable tag line"),
            }
        }
        if !arrived && finished && !self.closed_reported {
            self.closed_reported = true;
            return Err(Box::new(HwError::LinkClosed));
        }
        // A line that does not decode is noise on the wire, not a tag.
        Ok(record.map_or_else(TagPoll::absent, TagPoll::read))
    }

    fn write_weight(&mut self, grams: f32) -> Result<(), BoxError> {
        self.writer
            .write_all(format_weight_line(grams).as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| Box::new(HwError::Io(e)) as BoxError)
    }
}

impl<W: Write> Drop for SerialTagLink<W> {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            if !wait_until(|| handle.is_finished(), DROP_GRACE, Duration::from_millis(1)) {
                // Parked in read_line; it exits on the next line or EOF.
                tracing::debug!("detaching tag reader thread");
                return;
            }
            if handle.join().is_err() {
                tracing::warn!("tag reader thread panicked");
            }
        }
    }
}

#[cfg(feature = "hardware")]
pub use uart::open_uart;

#[cfg(feature = "hardware")]
mod uart {
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use rppal::uart::{Parity, Uart};

    use super::SerialTagLink;
    use crate::error::HwError;

    /// Both halves share the port; reads time out so writes get a turn.
    #[derive(Clone)]
    pub struct SharedUart(Arc<Mutex<Uart>>);

    impl io::Read for SharedUart {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            loop {
                let n = {
                    let mut uart = self
                        .0
                        .lock()
                        .map_err(|_| io::Error::other("uart lock poisoned"))?;
                    uart.read(buf).map_err(io::Error::other)?
                };
                if n > 0 {
                    return Ok(n);
                }
            }
        }
    }

    impl io::Write for SharedUart {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut uart = self
                .0
                .lock()
                .map_err(|_| io::Error::other("uart lock poisoned"))?;
            uart.write(buf).map_err(io::Error::other)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Open the reader's UART at `baud_rate`, 8N1.
    pub fn open_uart(
        path: &std::path::Path,
        baud_rate: u32,
    ) -> Result<SerialTagLink<SharedUart>, HwError> {
        let mut uart = Uart::with_path(path, baud_rate, Parity::None, 8, 1)
            .map_err(|e| HwError::Serial(e.to_string()))?;
        uart.set_read_mode(0, Duration::from_millis(100))
            .map_err(|e| HwError::Serial(e.to_string()))?;
        let shared = SharedUart(Arc::new(Mutex::new(uart)));
        tracing::info!(port = %path.display(), baud_rate, "tag uart opened");
        Ok(SerialTagLink::spawn(
            io::BufReader::new(shared.clone()),
            shared,
        ))
    }
}
