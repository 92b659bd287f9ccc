//! # SBUS Protocol Module
//!
//! Implementation of the SBUS serial protocol used by RC receivers.
//!
//! This module handles:
//! - Frame packing (16 channels, 11-bit resolution, into a 25-byte payload)
//! - Frame unpacking back into channel/switch/flag values
//! - Byte-stream frame synchronization and recovery from noise

pub mod protocol;
pub mod codec;
pub mod sync;
