//! Framed, checksummed record containers.
//!
//! A container is a flat sequence of records with no header or footer:
//!
//! ```text
//! ┌──────────────┬─────────────────┬──────────────────┬──────────────────┐
//! │ length (u64) │ masked crc (u32)│ payload (length) │ masked crc (u32) │
//! │ little-endian│ of length bytes │                  │ of payload bytes │
//! └──────────────┴─────────────────┴──────────────────┴──────────────────┘
//! ```
//!
//! This is the TFRecord layout. Every record costs [`FRAME_OVERHEAD`] bytes on
//! top of its payload. A record cut short by an interrupted write ends the
//! stream quietly; a checksum mismatch is reported as
//! [`CorruptContainer`](crate::CirclegenError::CorruptContainer) and ends it loudly.

mod crc;
mod reader;
mod writer;

pub use crc::{masked_crc32c, unmask_crc32c};
pub use reader::{read_all_records, RecordReader, DEFAULT_MAX_RECORD_LEN};
pub use writer::{write_record, RecordWriter};

/// Bytes of framing around each payload: length, two checksums.
pub const FRAME_OVERHEAD: u64 = 8 + 4 + 4;

pub(crate) const LENGTH_FIELD_LEN: usize = 8;
pub(crate) const CRC_FIELD_LEN: usize = 4;
