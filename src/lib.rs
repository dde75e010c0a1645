//! JPEG-LS (ISO/IEC 14495-1 / ITU-T T.87) container layer.
//!
//! This crate reads and writes the marker-delimited structure that surrounds
//! raw JPEG-LS entropy-coded scan data:
//!
//! - [`JpegStreamWriter`]: assembles marker segments and scan payloads into a
//!   codestream, writing to a caller buffer or a byte stream.
//! - [`JpegStreamReader`]: walks a codestream marker-by-marker, populating a
//!   shared [`JlsParameters`] model and dispatching scan regions to a codec.
//! - [`ScanCodec`]: the boundary to the pixel-level entropy coder, which is
//!   deliberately not part of this crate.

pub mod byte_stream;
pub mod color_transform;
pub mod constants;
pub mod error;
pub mod jpeg_marker_code;
pub mod jpeg_segment;
pub mod jpeg_stream_reader;
pub mod jpeg_stream_writer;
pub mod parameters;
pub mod scan_codec;

pub use byte_stream::{ByteSink, ByteSource};
pub use error::JlsError;
pub use jpeg_stream_reader::{JpegStreamReader, ReaderState};
pub use jpeg_stream_writer::JpegStreamWriter;
pub use parameters::{JfifParameters, JlsParameters, JlsRect, PresetCodingParameters};
pub use scan_codec::ScanCodec;

use num_enum::TryFromPrimitive;

/// Interleave mode for multi-component scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive)]
#[repr(u8)]
pub enum InterleaveMode {
    /// The data is encoded and stored component for component: RRRGGGBBB.
    #[default]
    None = 0,
    /// A full line of each component is encoded before moving to the next line.
    Line = 1,
    /// The data is encoded and stored by sample: RGBRGBRGB.
    Sample = 2,
}

/// Color transformation for multi-component scans, signaled via an APP8 marker.
///
/// The HP transforms are not part of the JPEG-LS standard; they are provided
/// for compatibility with existing streams. `RgbAsYuvLossy` and `Matrix` are
/// recognized on the wire but not supported by this implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive)]
#[repr(u8)]
pub enum ColorTransformation {
    /// No color transformation (RGB).
    #[default]
    None = 0,
    /// HP1 color transformation.
    Hp1 = 1,
    /// HP2 color transformation.
    Hp2 = 2,
    /// HP3 color transformation.
    Hp3 = 3,
    /// Defined by HP but not supported.
    RgbAsYuvLossy = 4,
    /// Defined by HP but not supported.
    Matrix = 5,
}

/// Sample endianness signaled alongside a color transformation on the wire.
///
/// Occupies the high bits of the packed APP8 value (bit 29 big-endian, bit 30
/// little-endian); it is never folded into [`ColorTransformation`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformEndianness {
    Big,
    Little,
}

/// Image geometry recorded by the frame marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: i32,
    pub component_count: i32,
}
