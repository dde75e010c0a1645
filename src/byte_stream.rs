//! Dual-backend byte I/O.
//!
//! The writer and reader never touch their destination or source directly;
//! all bytes go through [`ByteSink`] and [`ByteSource`], which close over
//! exactly one of a contiguous caller buffer or a `std::io` stream handle.
//! Positional book-keeping for buffers lives here; streams track their own
//! position.

use crate::error::JlsError;
use std::io;

/// Destination descriptor for the writer: a fixed caller buffer or a stream.
pub enum ByteSink<'a> {
    Buffer { data: &'a mut [u8], position: usize },
    Stream { stream: &'a mut (dyn io::Write + 'a), bytes_written: usize },
}

impl<'a> ByteSink<'a> {
    pub fn from_buffer(data: &'a mut [u8]) -> Self {
        Self::Buffer { data, position: 0 }
    }

    pub fn from_stream(stream: &'a mut (dyn io::Write + 'a)) -> Self {
        Self::Stream { stream, bytes_written: 0 }
    }

    /// Writes one byte. Exhausting a buffer backend is the only
    /// out-of-resources condition the container recognizes; it is reported,
    /// never silently truncated.
    pub fn write_byte(&mut self, value: u8) -> Result<(), JlsError> {
        match self {
            Self::Buffer { data, position } => {
                if *position >= data.len() {
                    return Err(JlsError::UncompressedBufferTooSmall);
                }
                data[*position] = value;
                *position += 1;
                Ok(())
            }
            Self::Stream { stream, bytes_written } => {
                stream
                    .write_all(&[value])
                    .map_err(|_| JlsError::UnexpectedFailure)?;
                *bytes_written += 1;
                Ok(())
            }
        }
    }

    pub fn write_bytes(&mut self, values: &[u8]) -> Result<(), JlsError> {
        for &value in values {
            self.write_byte(value)?;
        }
        Ok(())
    }

    /// Advances the logical offset without emitting bytes. A no-op for
    /// stream backends, whose position is implicit.
    pub fn skip(&mut self, count: usize) -> Result<(), JlsError> {
        match self {
            Self::Buffer { data, position } => {
                if *position + count > data.len() {
                    return Err(JlsError::UncompressedBufferTooSmall);
                }
                *position += count;
                Ok(())
            }
            Self::Stream { .. } => Ok(()),
        }
    }

    pub fn bytes_written(&self) -> usize {
        match self {
            Self::Buffer { position, .. } => *position,
            Self::Stream { bytes_written, .. } => *bytes_written,
        }
    }

    /// Remaining capacity of a buffer backend. Streams have no declared
    /// capacity and report `usize::MAX`.
    pub fn remaining(&self) -> usize {
        match self {
            Self::Buffer { data, position } => data.len() - *position,
            Self::Stream { .. } => usize::MAX,
        }
    }

    /// The byte already present at the current offset, used by the writer's
    /// compare mode. Only buffer backends can look at previously produced
    /// output; streams return `None` and compare mode does not apply.
    pub fn existing_byte(&self) -> Option<u8> {
        match self {
            Self::Buffer { data, position } => data.get(*position).copied(),
            Self::Stream { .. } => None,
        }
    }
}

/// Source descriptor for the reader: a fixed caller buffer or a stream.
///
/// Decoding from a buffer is the fast path. A stream backend is drained into
/// an owned buffer when the reader is constructed, so that marker parsing and
/// scan dispatch operate over one contiguous region either way.
pub enum ByteSource<'a> {
    Buffer(&'a [u8]),
    Stream(&'a mut (dyn io::Read + 'a)),
}

impl<'a> ByteSource<'a> {
    pub(crate) fn into_bytes(self) -> Result<std::borrow::Cow<'a, [u8]>, JlsError> {
        match self {
            Self::Buffer(data) => Ok(std::borrow::Cow::Borrowed(data)),
            Self::Stream(stream) => {
                let mut data = Vec::new();
                stream
                    .read_to_end(&mut data)
                    .map_err(|_| JlsError::UnexpectedFailure)?;
                Ok(std::borrow::Cow::Owned(data))
            }
        }
    }
}
