//! # SBUS Stream Synchronizer
//!
//! Recovers frame boundaries from an unbounded, possibly noisy byte stream.
//!
//! The synchronizer owns the only mutable state in the protocol core: a
//! 25-byte capture buffer, a byte count and a two-state machine. It accepts
//! one byte at a time and reports when a complete, correctly bounded frame
//! sits in the buffer, ready for [`unpack_frame`].
//!
//! SBUS is strict fixed-length framing: no escape sequence, no checksum.
//! The only integrity signals are the 0x0F header, the 0x00 footer and the
//! exact 25-byte length. A corrupted interior byte goes undetected unless
//! it collides with resynchronization; that is a protocol limitation.

use super::codec::unpack_frame;
use super::protocol::*;

/// Synchronizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    /// Hunting for the header byte
    Idle,
    /// Accumulating payload bytes into the capture buffer
    Capturing,
}

/// Frame-synchronization state machine for one SBUS byte stream
///
/// Single-writer: exactly one stream-reading activity may feed bytes into a
/// given instance. No operation blocks or performs I/O. The caller is
/// responsible for the timing rule (reset after an inter-byte gap, see
/// [`crate::serial::LinkSync`]) and for handling transport errors.
///
/// # Examples
///
/// ```
/// use sbus_bridge::sbus::codec::pack_frame;
/// use sbus_bridge::sbus::protocol::SbusFrame;
/// use sbus_bridge::sbus::sync::SbusSync;
///
/// let payload = pack_frame(&SbusFrame::default());
/// let mut sync = SbusSync::new();
/// let mut frames = Vec::new();
/// sync.feed(&payload, |frame| frames.push(frame));
/// assert_eq!(frames, vec![SbusFrame::default()]);
/// ```
#[derive(Debug)]
pub struct SbusSync {
    state: SyncState,
    nbytes: usize,
    buf: [u8; SBUS_FRAME_LEN],
}

impl SbusSync {
    /// Create a synchronizer in the initial (hunting) state
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
            nbytes: 0,
            buf: [0u8; SBUS_FRAME_LEN],
        }
    }

    /// Discard any partial capture and return to header hunting
    ///
    /// Idempotent: resetting from any state yields behavior identical to a
    /// freshly constructed synchronizer.
    pub fn reset(&mut self) {
        self.state = SyncState::Idle;
        self.nbytes = 0;
    }

    /// Ingest one byte; returns `true` when a complete frame is captured
    ///
    /// Transition rules, applied in order:
    ///
    /// 1. If the buffer already holds a full frame (consumed or not), it is
    ///    discarded before `byte` is processed, so `nbytes` never exceeds
    ///    the frame length.
    /// 2. Idle: the header byte starts a capture; any other byte is
    ///    discarded. This is how alignment is recovered after noise.
    /// 3. Capturing: the byte is appended. Reaching 25 bytes with a
    ///    matching footer signals frame-ready and leaves the buffer intact
    ///    for [`Self::frame`]; reaching 25 bytes with a footer mismatch
    ///    signals nothing, and rule 1 clears the buffer on the next byte.
    ///
    /// The footer-mismatch path intentionally does not resynchronize on its
    /// own: one frame's worth of bytes is dropped before hunting resumes,
    /// matching the reference receiver's timing.
    pub fn push_byte(&mut self, byte: u8) -> bool {
        if self.nbytes >= SBUS_FRAME_LEN {
            self.reset();
        }

        match self.state {
            SyncState::Idle => {
                if byte == SBUS_HEADER_BYTE {
                    self.state = SyncState::Capturing;
                    self.buf[0] = byte;
                    self.nbytes = 1;
                }
                false
            }
            SyncState::Capturing => {
                self.buf[self.nbytes] = byte;
                self.nbytes += 1;
                self.nbytes == SBUS_FRAME_LEN && byte == SBUS_FOOTER_BYTE
            }
        }
    }

    /// Ingest a buffer of bytes, invoking `on_frame` per completed frame
    ///
    /// Processes byte-by-byte in order with the same rules as
    /// [`Self::push_byte`]. Returns the number of frames delivered. A batch
    /// may complete zero frames (all noise or a partial capture) or several
    /// (back-to-back frames in one read).
    pub fn feed(&mut self, data: &[u8], mut on_frame: impl FnMut(SbusFrame)) -> usize {
        let mut count = 0;
        for &byte in data {
            if self.push_byte(byte) {
                on_frame(self.frame());
                count += 1;
            }
        }
        count
    }

    /// Unpack the capture buffer
    ///
    /// Meaningful right after [`Self::push_byte`] returned `true` (or
    /// within a `feed` callback); at any other time the buffer holds a
    /// partial or stale capture.
    pub fn frame(&self) -> SbusFrame {
        unpack_frame(&self.buf)
    }
}

impl Default for SbusSync {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbus::codec::pack_frame;

    fn test_frame() -> SbusFrame {
        SbusFrame {
            channels: core::array::from_fn(|i| 172 + i as u16 * 100),
            switches: [true, false],
            frame_lost: false,
            failsafe: true,
        }
    }

    fn feed_all(sync: &mut SbusSync, data: &[u8]) -> Vec<SbusFrame> {
        let mut frames = Vec::new();
        sync.feed(data, |f| frames.push(f));
        frames
    }

    #[test]
    fn test_hunts_past_non_header_bytes() {
        let mut sync = SbusSync::new();
        for byte in [0x08u8, 0x00, 0xFF, 0xF0] {
            assert!(!sync.push_byte(byte));
        }
        // Still hunting: a valid frame afterwards must decode cleanly
        let frames = feed_all(&mut sync, &pack_frame(&test_frame()));
        assert_eq!(frames, vec![test_frame()]);
    }

    #[test]
    fn test_single_frame_signals_on_last_byte() {
        let payload = pack_frame(&test_frame());
        let mut sync = SbusSync::new();
        for &byte in &payload[..SBUS_FRAME_LEN - 1] {
            assert!(!sync.push_byte(byte));
        }
        assert!(sync.push_byte(payload[SBUS_FRAME_LEN - 1]));
        assert_eq!(sync.frame(), test_frame());
    }

    #[test]
    fn test_back_to_back_frames() {
        let payload = pack_frame(&test_frame());
        let mut stream = Vec::new();
        stream.extend_from_slice(&payload);
        stream.extend_from_slice(&payload);
        stream.extend_from_slice(&payload);

        let mut sync = SbusSync::new();
        let frames = feed_all(&mut sync, &stream);
        // Identical repeats all signal; suppression is the consumer's policy
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| *f == test_frame()));
    }

    #[test]
    fn test_noise_then_frame_yields_exactly_one_signal() {
        let noise: Vec<u8> = (0u8..64).map(|i| i | 0x80).collect();
        assert!(!noise.contains(&SBUS_HEADER_BYTE));

        let mut stream = noise;
        stream.extend_from_slice(&pack_frame(&test_frame()));

        let mut sync = SbusSync::new();
        assert_eq!(feed_all(&mut sync, &stream), vec![test_frame()]);
    }

    #[test]
    fn test_footer_mismatch_discards_one_frame_worth() {
        // 25 bytes starting with a header but ending 0x55: no signal, and
        // the buffer is only cleared by the next byte's overflow guard.
        let mut garbage = [0x55u8; SBUS_FRAME_LEN];
        garbage[0] = SBUS_HEADER_BYTE;

        let mut sync = SbusSync::new();
        assert_eq!(feed_all(&mut sync, &garbage), vec![]);

        // Recovery: a valid frame following the garbage run decodes once
        let frames = feed_all(&mut sync, &pack_frame(&test_frame()));
        assert_eq!(frames, vec![test_frame()]);
    }

    #[test]
    fn test_garbage_run_without_header_recovers() {
        let mut sync = SbusSync::new();
        let frames = feed_all(&mut sync, &[0xA5u8; 25]);
        assert_eq!(frames, vec![]);

        let frames = feed_all(&mut sync, &pack_frame(&test_frame()));
        assert_eq!(frames, vec![test_frame()]);
    }

    #[test]
    fn test_frame_split_across_batches() {
        let payload = pack_frame(&test_frame());
        let mut sync = SbusSync::new();
        assert_eq!(feed_all(&mut sync, &payload[..10]), vec![]);
        assert_eq!(feed_all(&mut sync, &payload[10..20]), vec![]);
        assert_eq!(feed_all(&mut sync, &payload[20..]), vec![test_frame()]);
    }

    #[test]
    fn test_reset_discards_partial_capture() {
        let payload = pack_frame(&test_frame());
        let mut sync = SbusSync::new();
        sync.feed(&payload[..12], |_| {});
        sync.reset();

        // The abandoned bytes must not leak into the next capture
        let frames = feed_all(&mut sync, &payload);
        assert_eq!(frames, vec![test_frame()]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut sync = SbusSync::new();
        sync.feed(&pack_frame(&test_frame()), |_| {});
        sync.reset();
        sync.reset();

        let mut fresh = SbusSync::new();
        let payload = pack_frame(&test_frame());
        for &byte in payload.iter() {
            assert_eq!(sync.push_byte(byte), fresh.push_byte(byte));
        }
        assert_eq!(sync.frame(), fresh.frame());
    }

    #[test]
    fn test_interior_zero_bytes_do_not_terminate_early() {
        // A frame full of zero channels has many 0x00 interior bytes; only
        // the 25th byte may signal completion.
        let payload = pack_frame(&SbusFrame::default());
        let mut sync = SbusSync::new();
        for (i, &byte) in payload.iter().enumerate() {
            let ready = sync.push_byte(byte);
            assert_eq!(ready, i == SBUS_FRAME_LEN - 1, "byte index {}", i);
        }
    }

    #[test]
    fn test_header_value_inside_payload_is_data() {
        // 0x0F appearing inside a capture must be treated as payload, not
        // as the start of a new frame.
        let mut frame = SbusFrame::default();
        frame.channels[0] = SBUS_HEADER_BYTE as u16; // byte 1 becomes 0x0F
        let payload = pack_frame(&frame);
        assert_eq!(payload[1], SBUS_HEADER_BYTE);

        let mut sync = SbusSync::new();
        assert_eq!(feed_all(&mut sync, &payload), vec![frame]);
    }

    #[test]
    fn test_overflow_guard_after_delivered_frame() {
        let payload = pack_frame(&test_frame());
        let mut sync = SbusSync::new();
        assert_eq!(feed_all(&mut sync, &payload), vec![test_frame()]);

        // The machine parks at a full buffer; the next byte trips the
        // overflow guard and header hunting resumes immediately.
        assert!(!sync.push_byte(0x42));
        let frames = feed_all(&mut sync, &payload);
        assert_eq!(frames, vec![test_frame()]);
    }
}
