//! # SBUS Protocol Constants and Types
//!
//! Core wire-format definitions for SBUS communication.

/// SBUS frame length on the wire (header + 22 data bytes + status + footer)
pub const SBUS_FRAME_LEN: usize = 25;

/// SBUS frame header byte (always 0x0F)
pub const SBUS_HEADER_BYTE: u8 = 0x0F;

/// SBUS frame footer byte (always 0x00)
pub const SBUS_FOOTER_BYTE: u8 = 0x00;

/// Number of proportional channels per frame
pub const SBUS_NUM_CHANNELS: usize = 16;

/// Number of digital switch channels per frame
pub const SBUS_NUM_SWITCHES: usize = 2;

/// Mask for one 11-bit channel value
pub const SBUS_CHANNEL_MASK: u16 = 0x07FF;

/// Channel value range (11-bit: 0-2047); conventional physical range
/// is 172-1811, but the codec round-trips any 11-bit value
pub const SBUS_CHANNEL_VALUE_MIN: u16 = 172;
pub const SBUS_CHANNEL_VALUE_MAX: u16 = 1811;

/// Status byte (byte 23) bit masks
pub const SBUS_STATUS_SWITCH0: u8 = 0x01;
pub const SBUS_STATUS_SWITCH1: u8 = 0x02;
pub const SBUS_STATUS_FRAME_LOST: u8 = 0x04;
pub const SBUS_STATUS_FAILSAFE: u8 = 0x08;

/// RC channels array type (16 channels, 11-bit values)
pub type SbusChannels = [u16; SBUS_NUM_CHANNELS];

/// One decoded SBUS frame
///
/// Plain value type with no allocation; `Eq` so consumers can suppress
/// byte-for-byte repeated frames by comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SbusFrame {
    /// Proportional channel values (11-bit: 0-2047)
    pub channels: SbusChannels,

    /// Digital switch channels (often labelled CH17/CH18)
    pub switches: [bool; SBUS_NUM_SWITCHES],

    /// Set by the receiver when frames from the transmitter are being lost
    pub frame_lost: bool,

    /// Set by the receiver when fail-safe is active
    pub failsafe: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(SBUS_FRAME_LEN, 25);
        assert_eq!(SBUS_HEADER_BYTE, 0x0F);
        assert_eq!(SBUS_FOOTER_BYTE, 0x00);
        assert_eq!(SBUS_NUM_CHANNELS, 16);
        assert_eq!(SBUS_NUM_SWITCHES, 2);
    }

    #[test]
    fn test_channel_value_range() {
        assert_eq!(SBUS_CHANNEL_VALUE_MIN, 172);
        assert_eq!(SBUS_CHANNEL_VALUE_MAX, 1811);
        assert!(SBUS_CHANNEL_VALUE_MAX <= SBUS_CHANNEL_MASK);
    }

    #[test]
    fn test_status_bits_are_distinct() {
        let bits = [
            SBUS_STATUS_SWITCH0,
            SBUS_STATUS_SWITCH1,
            SBUS_STATUS_FRAME_LOST,
            SBUS_STATUS_FAILSAFE,
        ];
        for (i, a) in bits.iter().enumerate() {
            for b in &bits[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
    }

    #[test]
    fn test_default_frame_is_zeroed() {
        let frame = SbusFrame::default();
        assert_eq!(frame.channels, [0u16; SBUS_NUM_CHANNELS]);
        assert_eq!(frame.switches, [false; SBUS_NUM_SWITCHES]);
        assert!(!frame.frame_lost);
        assert!(!frame.failsafe);
    }
}
