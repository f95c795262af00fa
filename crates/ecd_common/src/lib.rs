//! Shared foundational types used across the ECD sample preparation tools.
//!
//! This crate provides the internal-consistency error type and the byte-size
//! value used for buffer capacities.

#![warn(missing_docs)]

pub mod byte_size;
pub mod result;

pub use byte_size::{ByteSize, ParseByteSizeError};
pub use result::{EcdResult, InternalError};
