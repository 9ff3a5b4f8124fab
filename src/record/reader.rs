use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::iter::FusedIterator;
use std::path::Path;

use super::crc::masked_crc32c;
use super::{CRC_FIELD_LEN, FRAME_OVERHEAD, LENGTH_FIELD_LEN};
use crate::error::CirclegenError;

/// Largest payload a reader accepts before declaring the length field corrupt.
pub const DEFAULT_MAX_RECORD_LEN: u64 = 1 << 30;

/// Streams payloads out of a container, one record at a time.
///
/// Yields `Ok(payload)` per intact record. A record cut short at the end of
/// the stream ends iteration without an error. A checksum mismatch or an
/// implausible length yields a single `Err(CorruptContainer)` carrying the
/// record's byte offset, after which the iterator is exhausted: record
/// boundaries past that point cannot be recovered.
///
/// Reading is strictly sequential. To start over, open the source again.
#[derive(Debug)]
pub struct RecordReader<R: Read> {
    reader: R,
    offset: u64,
    max_record_len: u64,
    finished: bool,
}

/// Open the container at `path` for sequential reading.
pub fn read_all_records(path: &Path) -> Result<RecordReader<BufReader<File>>, CirclegenError> {
    let file = File::open(path).map_err(CirclegenError::Io)?;
    Ok(RecordReader::new(BufReader::new(file)))
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            finished: false,
        }
    }

    /// Override the payload size above which a length field counts as corrupt.
    pub fn with_max_record_len(mut self, max_record_len: u64) -> Self {
        self.max_record_len = max_record_len;
        self
    }

    /// Byte offset of the next record to be read.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn corrupt(&self, reason: String) -> CirclegenError {
        CirclegenError::CorruptContainer {
            offset: self.offset,
            reason,
        }
    }

    fn read_next(&mut self) -> Result<Option<Vec<u8>>, CirclegenError> {
        let mut length_bytes = [0u8; LENGTH_FIELD_LEN];
        let got = read_up_to(&mut self.reader, &mut length_bytes)?;
        if got == 0 {
            return Ok(None);
        }
        if got < LENGTH_FIELD_LEN {
            self.log_trailing(got as u64);
            return Ok(None);
        }

        let mut crc_bytes = [0u8; CRC_FIELD_LEN];
        let got = read_up_to(&mut self.reader, &mut crc_bytes)?;
        if got < CRC_FIELD_LEN {
            self.log_trailing((LENGTH_FIELD_LEN + got) as u64);
            return Ok(None);
        }

        let stored = u32::from_le_bytes(crc_bytes);
        let computed = masked_crc32c(&length_bytes);
        if stored != computed {
            return Err(self.corrupt(format!(
                "length checksum mismatch: stored {stored:08x}, computed {computed:08x}"
            )));
        }

        let length = u64::from_le_bytes(length_bytes);
        if length > self.max_record_len {
            return Err(self.corrupt(format!(
                "record length {length} exceeds limit of {} bytes",
                self.max_record_len
            )));
        }

        let (Some(body_len), Ok(payload_len)) = (
            length.checked_add(CRC_FIELD_LEN as u64),
            usize::try_from(length),
        ) else {
            return Err(self.corrupt(format!("record length {length} is not addressable")));
        };
        let mut body = Vec::new();
        self.reader
            .by_ref()
            .take(body_len)
            .read_to_end(&mut body)
            .map_err(CirclegenError::Io)?;
        if (body.len() as u64) < body_len {
            self.log_trailing((LENGTH_FIELD_LEN + CRC_FIELD_LEN + body.len()) as u64);
            return Ok(None);
        }

        let stored = u32::from_le_bytes([
            body[payload_len],
            body[payload_len + 1],
            body[payload_len + 2],
            body[payload_len + 3],
        ]);
        body.truncate(payload_len);
        let computed = masked_crc32c(&body);
        if stored != computed {
            return Err(self.corrupt(format!(
                "payload checksum mismatch: stored {stored:08x}, computed {computed:08x}"
            )));
        }

        self.offset += FRAME_OVERHEAD + length;
        Ok(Some(body))
    }

    fn log_trailing(&self, bytes: u64) {
        tracing::debug!(
            offset = self.offset,
            bytes,
            "ignoring incomplete trailing record"
        );
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<u8>, CirclegenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_next() {
            Ok(Some(payload)) => Some(Ok(payload)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: Read> FusedIterator for RecordReader<R> {}

/// Fill `buf` as far as the stream allows; returns the byte count read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, CirclegenError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CirclegenError::Io(e)),
        }
    }
    Ok(filled)
}
