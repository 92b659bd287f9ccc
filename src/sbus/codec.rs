//! # SBUS Frame Codec
//!
//! Packs decoded frames into the 25-byte wire payload and unpacks captured
//! payloads back into frames. Pure functions, no I/O, no mutable context.

use super::protocol::*;

/// Pack a frame into a complete 25-byte SBUS payload
///
/// Total function: every frame produces a payload. Channel values wider
/// than 11 bits are silently masked to `0x07FF` before packing; the wire
/// protocol has no way to represent them and receivers tolerate the
/// truncation, so no error is raised.
///
/// # Arguments
///
/// * `frame` - Decoded frame to serialize
///
/// # Returns
///
/// * `[u8; 25]` - Wire payload: header, 22 bytes of packed channels,
///   status byte, footer
///
/// # Algorithm
///
/// The 16 channel values form a single 176-bit stream written LSB-first
/// into bytes 1..=22. Channel `i` occupies bit offset `11 * i`:
/// ```text
/// Byte 1: Ch0[0:7]
/// Byte 2: Ch0[8:10] | Ch1[0:4]
/// Byte 3: Ch1[5:10] | Ch2[0:1]
/// ...
/// ```
///
/// # Examples
///
/// ```
/// use sbus_bridge::sbus::codec::{pack_frame, unpack_frame};
/// use sbus_bridge::sbus::protocol::SbusFrame;
///
/// let frame = SbusFrame::default();
/// let payload = pack_frame(&frame);
/// assert_eq!(payload[0], 0x0F);
/// assert_eq!(payload[24], 0x00);
/// assert_eq!(unpack_frame(&payload), frame);
/// ```
pub fn pack_frame(frame: &SbusFrame) -> [u8; SBUS_FRAME_LEN] {
    let mut buf = [0u8; SBUS_FRAME_LEN];

    // Mask every channel to 11 bits up front so an out-of-range value
    // cannot bleed into its neighbour through the shifts below.
    let mut ch = [0u16; SBUS_NUM_CHANNELS];
    for (masked, value) in ch.iter_mut().zip(frame.channels.iter()) {
        *masked = value & SBUS_CHANNEL_MASK;
    }

    buf[0] = SBUS_HEADER_BYTE;
    buf[1] = ch[0] as u8;
    buf[2] = (ch[0] >> 8 | ch[1] << 3) as u8;
    buf[3] = (ch[1] >> 5 | ch[2] << 6) as u8;
    buf[4] = (ch[2] >> 2) as u8;
    buf[5] = (ch[2] >> 10 | ch[3] << 1) as u8;
    buf[6] = (ch[3] >> 7 | ch[4] << 4) as u8;
    buf[7] = (ch[4] >> 4 | ch[5] << 7) as u8;
    buf[8] = (ch[5] >> 1) as u8;
    buf[9] = (ch[5] >> 9 | ch[6] << 2) as u8;
    buf[10] = (ch[6] >> 6 | ch[7] << 5) as u8;
    buf[11] = (ch[7] >> 3) as u8;
    buf[12] = ch[8] as u8;
    buf[13] = (ch[8] >> 8 | ch[9] << 3) as u8;
    buf[14] = (ch[9] >> 5 | ch[10] << 6) as u8;
    buf[15] = (ch[10] >> 2) as u8;
    buf[16] = (ch[10] >> 10 | ch[11] << 1) as u8;
    buf[17] = (ch[11] >> 7 | ch[12] << 4) as u8;
    buf[18] = (ch[12] >> 4 | ch[13] << 7) as u8;
    buf[19] = (ch[13] >> 1) as u8;
    buf[20] = (ch[13] >> 9 | ch[14] << 2) as u8;
    buf[21] = (ch[14] >> 6 | ch[15] << 5) as u8;
    buf[22] = (ch[15] >> 3) as u8;

    buf[23] = (if frame.switches[0] { SBUS_STATUS_SWITCH0 } else { 0 })
        | (if frame.switches[1] { SBUS_STATUS_SWITCH1 } else { 0 })
        | (if frame.frame_lost { SBUS_STATUS_FRAME_LOST } else { 0 })
        | (if frame.failsafe { SBUS_STATUS_FAILSAFE } else { 0 });
    buf[24] = SBUS_FOOTER_BYTE;

    buf
}

/// Unpack a captured 25-byte SBUS payload into a frame
///
/// Exact inverse of [`pack_frame`] for the channel and flag fields:
/// `unpack_frame(&pack_frame(&f)) == f` for any frame whose channel values
/// fit in 11 bits.
///
/// Does not validate the header or footer bytes; locating a correctly
/// bounded payload in the byte stream is the synchronizer's job
/// (see [`crate::sbus::sync::SbusSync`]).
///
/// # Arguments
///
/// * `buf` - Captured 25-byte wire payload
///
/// # Returns
///
/// * `SbusFrame` - Decoded channel, switch and flag values
pub fn unpack_frame(buf: &[u8; SBUS_FRAME_LEN]) -> SbusFrame {
    // Widen once so the shift/or combinations below stay readable.
    let b: [u16; SBUS_FRAME_LEN] = core::array::from_fn(|i| buf[i] as u16);

    let channels: SbusChannels = [
        (b[1] | b[2] << 8) & SBUS_CHANNEL_MASK,
        (b[2] >> 3 | b[3] << 5) & SBUS_CHANNEL_MASK,
        (b[3] >> 6 | b[4] << 2 | b[5] << 10) & SBUS_CHANNEL_MASK,
        (b[5] >> 1 | b[6] << 7) & SBUS_CHANNEL_MASK,
        (b[6] >> 4 | b[7] << 4) & SBUS_CHANNEL_MASK,
        (b[7] >> 7 | b[8] << 1 | b[9] << 9) & SBUS_CHANNEL_MASK,
        (b[9] >> 2 | b[10] << 6) & SBUS_CHANNEL_MASK,
        (b[10] >> 5 | b[11] << 3) & SBUS_CHANNEL_MASK,
        (b[12] | b[13] << 8) & SBUS_CHANNEL_MASK,
        (b[13] >> 3 | b[14] << 5) & SBUS_CHANNEL_MASK,
        (b[14] >> 6 | b[15] << 2 | b[16] << 10) & SBUS_CHANNEL_MASK,
        (b[16] >> 1 | b[17] << 7) & SBUS_CHANNEL_MASK,
        (b[17] >> 4 | b[18] << 4) & SBUS_CHANNEL_MASK,
        (b[18] >> 7 | b[19] << 1 | b[20] << 9) & SBUS_CHANNEL_MASK,
        (b[20] >> 2 | b[21] << 6) & SBUS_CHANNEL_MASK,
        (b[21] >> 5 | b[22] << 3) & SBUS_CHANNEL_MASK,
    ];

    let status = buf[23];

    SbusFrame {
        channels,
        switches: [
            status & SBUS_STATUS_SWITCH0 != 0,
            status & SBUS_STATUS_SWITCH1 != 0,
        ],
        frame_lost: status & SBUS_STATUS_FRAME_LOST != 0,
        failsafe: status & SBUS_STATUS_FAILSAFE != 0,
    }
}
