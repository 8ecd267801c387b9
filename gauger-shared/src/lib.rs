//! Shared library for the gauger tools.
//!
//! Holds the analog measurement value model, the schema-defined CBOR wire
//! encoding, and (behind the `utils` feature) the serial link used to hand
//! a finished report to the device channel.

#![cfg_attr(not(any(test, feature = "utils")), no_std)]

pub mod cbor;
pub mod encode;
pub mod model;

#[cfg(feature = "utils")]
pub mod link;

pub use encode::{encode_analog_measurement, required_size, EncodeError};
pub use model::MAX_QTY;

#[cfg(feature = "utils")]
pub use link::SerialLink;
