//! # Serial Communication Module
//!
//! Handles serial communication with the SBUS receiver.
//!
//! This module handles:
//! - Opening the serial port at 100,000 baud, 8E2, no flow control
//! - The async read loop feeding bytes into the frame synchronizer
//! - Gap-based resynchronization (a stalled stream discards partial frames)
//! - Recovery from read errors
//! - Transmitting packed SBUS frames
//!
//! The protocol core ([`crate::sbus`]) never blocks and never touches I/O;
//! everything timing- and transport-related lives here.

pub mod port_trait;

use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio::sync::mpsc;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, SbusBridgeError};
use crate::sbus::codec::pack_frame;
use crate::sbus::protocol::SbusFrame;
use crate::sbus::sync::SbusSync;
use port_trait::{SerialPortIo, TokioSerialPort};

/// SBUS baud rate (100,000 baud)
pub const SBUS_BAUD_RATE: u32 = 100_000;

/// Frame synchronizer plus the inter-chunk gap clock
///
/// The synchronizer itself is timing-agnostic; the transport tracks the
/// time since the previous byte delivery and forces a reset when the gap
/// exceeds the configured threshold. SBUS streams continuously, so a long
/// gap means the link was interrupted and any partial capture is stale.
#[derive(Debug)]
pub struct LinkSync {
    sync: SbusSync,
    max_gap: Duration,
    last_rx: Instant,
}

impl LinkSync {
    /// Create a gap-aware synchronizer
    ///
    /// # Arguments
    ///
    /// * `max_gap` - Largest tolerated interval between byte deliveries
    ///   before a partial capture is discarded (protocol cadence: 3ms)
    pub fn new(max_gap: Duration) -> Self {
        Self {
            sync: SbusSync::new(),
            max_gap,
            last_rx: Instant::now(),
        }
    }

    /// Accept one delivered chunk, invoking `on_frame` per completed frame
    ///
    /// If more than `max_gap` elapsed since the previous delivery, the
    /// synchronizer is reset first so stale bytes never merge into a frame
    /// assembled from the new data. Returns the number of frames delivered.
    pub fn accept(
        &mut self,
        data: &[u8],
        now: Instant,
        on_frame: impl FnMut(SbusFrame),
    ) -> usize {
        if now.duration_since(self.last_rx) > self.max_gap {
            debug!("inter-byte gap exceeded {:?}, discarding partial frame", self.max_gap);
            self.sync.reset();
        }
        self.last_rx = now;
        self.sync.feed(data, on_frame)
    }

    /// Discard any partial capture after a transport error
    pub fn note_error(&mut self) {
        self.sync.reset();
    }
}

/// Consumer-side duplicate-frame suppression
///
/// Receivers repeat the previous frame when no channel moved; suppressing
/// the repeats avoids redundant downstream processing. This is deliberately
/// a consumer policy, not part of the synchronizer: every completed frame
/// still produces a frame-ready signal upstream.
#[derive(Debug, Default)]
pub struct FrameDedup {
    last: Option<SbusFrame>,
}

impl FrameDedup {
    /// Pass `frame` through, or `None` if it repeats the previous delivery
    pub fn push(&mut self, frame: SbusFrame) -> Option<SbusFrame> {
        if self.last == Some(frame) {
            return None;
        }
        self.last = Some(frame);
        Some(frame)
    }
}

/// SBUS Serial Port Handler
///
/// Owns the port, the gap-aware synchronizer and the read buffer for one
/// physical stream. Exactly one task may run the receive loop.
pub struct SbusSerial {
    /// Serial port handle
    port: TokioSerialPort,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
    /// Synchronizer with gap tracking
    link: LinkSync,
    /// Read buffer capacity in bytes
    read_buffer: usize,
}

impl std::fmt::Debug for SbusSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SbusSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SbusSerial {
    /// Open the configured serial port with SBUS line settings
    ///
    /// SBUS requires 100,000 baud, 8 data bits, even parity, 2 stop bits
    /// and no flow control; everything except the baud rate is fixed here.
    ///
    /// # Errors
    ///
    /// Returns [`SbusBridgeError::Serial`] if the port cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        debug!("Trying to open serial port: {}", config.serial.port);

        let port = tokio_serial::new(&config.serial.port, config.serial.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::Even)
            .stop_bits(tokio_serial::StopBits::Two)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                SbusBridgeError::Serial(format!("Failed to open {}: {}", config.serial.port, e))
            })?;

        info!("Successfully opened SBUS device at {}", config.serial.port);

        Ok(Self {
            port: TokioSerialPort::new(port),
            device_path: config.serial.port.clone(),
            link: LinkSync::new(Duration::from_millis(config.link.max_gap_ms)),
            read_buffer: config.serial.read_buffer,
        })
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Pack and transmit one SBUS frame
    pub async fn send_frame(&mut self, frame: &SbusFrame) -> Result<()> {
        write_frame(&mut self.port, frame).await
    }

    /// Run the receive loop, pushing completed frames onto `tx`
    ///
    /// Runs until the port reports end-of-stream or every receiver of the
    /// channel is dropped. Read errors do not end the session: the partial
    /// capture is discarded and reception resumes (the synchronizer can
    /// always recover to header hunting).
    pub async fn run(mut self, tx: mpsc::Sender<SbusFrame>) -> Result<()> {
        pump_frames(&mut self.port, &mut self.link, self.read_buffer, &tx).await
    }
}

/// Pack and write one frame through the port seam
pub(crate) async fn write_frame<P: SerialPortIo>(port: &mut P, frame: &SbusFrame) -> Result<()> {
    let payload = pack_frame(frame);

    port.write_all(&payload)
        .await
        .map_err(|e| SbusBridgeError::Serial(format!("Failed to write frame: {}", e)))?;

    port.flush()
        .await
        .map_err(|e| SbusBridgeError::Serial(format!("Failed to flush serial port: {}", e)))?;

    debug!("Sent SBUS frame ({} bytes)", payload.len());
    Ok(())
}

/// Receive-loop body, generic over the port seam for testability
pub(crate) async fn pump_frames<P: SerialPortIo>(
    port: &mut P,
    link: &mut LinkSync,
    read_buffer: usize,
    tx: &mpsc::Sender<SbusFrame>,
) -> Result<()> {
    let mut buf = BytesMut::with_capacity(read_buffer);
    // Holds the frames completed by one chunk; a chunk rarely carries more
    // than a couple of frames, so the allocation is reused across reads.
    let mut completed: Vec<SbusFrame> = Vec::new();

    loop {
        buf.clear();
        match port.read_into(&mut buf).await {
            Ok(0) => {
                debug!("serial stream ended");
                return Ok(());
            }
            Ok(_) => {
                completed.clear();
                link.accept(&buf[..], Instant::now(), |frame| completed.push(frame));
                for frame in completed.drain(..) {
                    if tx.send(frame).await.is_err() {
                        debug!("frame consumer dropped, stopping receive loop");
                        return Ok(());
                    }
                }
            }
            Err(e) => {
                // Same recovery as a stream gap: whatever was captured so
                // far may be damaged, so restart header hunting.
                warn!("serial read error: {}", e);
                link.note_error();
            }
        }
    }
}
