//! # SBUS Bridge Library
//!
//! Decode and encode SBUS RC receiver frames over an asynchronous serial link.
//!
//! This library provides the core functionality for capturing SBUS frames
//! (16 proportional channels, 2 digital switches, frame-lost and fail-safe
//! flags) from a continuous, possibly noisy byte stream, and for producing
//! wire-exact frames for transmission.

pub mod config;
pub mod error;
pub mod sbus;
pub mod serial;
