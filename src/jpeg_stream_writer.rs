//! JPEG-LS codestream writer.
//!
//! `JpegStreamWriter` collects marker segments in emission order and
//! serializes them, together with the entropy payloads produced by the
//! external scan codec, into a [`ByteSink`].

use crate::byte_stream::ByteSink;
use crate::constants::{
    JFIF_FIXED_SEGMENT_SIZE, MAXIMUM_COMPONENT_COUNT_IN_SCAN, SEGMENT_LENGTH_SIZE,
    SEGMENT_MAX_DATA_SIZE,
};
use crate::error::JlsError;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};
use crate::jpeg_segment::{JpegSegment, ScanSegment};
use crate::parameters::{
    self, JfifParameters, JlsParameters, PresetCodingParameters, validate_frame_info,
    validate_parameters, validate_preset_coding_parameters, validate_transformation,
};
use crate::scan_codec::ScanCodec;
use crate::{ColorTransformation, FrameInfo, InterleaveMode, TransformEndianness};

/// Low-level byte emitter shared by the segment renderers.
///
/// In compare mode every byte is checked against the byte already present at
/// the destination offset before it is written; a mismatch fails the whole
/// write. Output is never altered by the check.
pub(crate) struct MarkerWriter<'s, 'd> {
    sink: &'s mut ByteSink<'d>,
    compare: bool,
}

impl<'s, 'd> MarkerWriter<'s, 'd> {
    fn new(sink: &'s mut ByteSink<'d>, compare: bool) -> Self {
        Self { sink, compare }
    }

    pub fn write_byte(&mut self, value: u8) -> Result<(), JlsError> {
        if self.compare {
            if let Some(existing) = self.sink.existing_byte() {
                if existing != value {
                    return Err(JlsError::UnexpectedFailure);
                }
            }
        }
        self.sink.write_byte(value)
    }

    pub fn write_bytes(&mut self, values: &[u8]) -> Result<(), JlsError> {
        for &value in values {
            self.write_byte(value)?;
        }
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), JlsError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), JlsError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_marker(&mut self, marker: JpegMarkerCode) -> Result<(), JlsError> {
        self.write_byte(JPEG_MARKER_START_BYTE)?;
        self.write_byte(marker as u8)
    }
}

/// Assembles an ordered list of marker segments plus scan payloads into an
/// output byte sequence.
///
/// Segment ordering is the wire contract: the frame marker precedes every
/// scan header, and preset-parameter / color-transform segments precede the
/// scan header they affect, because the reader applies each marker's effect
/// to the parameter model in encounter order.
#[derive(Default)]
pub struct JpegStreamWriter<'a> {
    frame_info: Option<FrameInfo>,
    jfif: Option<JfifParameters>,
    segments: Vec<JpegSegment<'a>>,
    compare: bool,
    bytes_written: usize,
    remaining_capacity: usize,
    // Next component index for planar scans.
    component_index: i32,
}

impl<'a> JpegStreamWriter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the writer and records the geometry used to synthesize the
    /// frame marker. No bytes are emitted until [`Self::write`].
    pub fn init(&mut self, frame_info: FrameInfo) -> Result<(), JlsError> {
        validate_frame_info(&frame_info)?;
        self.frame_info = Some(frame_info);
        self.jfif = None;
        self.segments.clear();
        self.component_index = 0;
        self.bytes_written = 0;
        self.remaining_capacity = 0;
        Ok(())
    }

    /// Records JFIF metadata, emitted as an APP0 segment directly after the
    /// start-of-image marker. A thumbnail buffer, when present, must already
    /// be sized to `3 * thumbnail_width * thumbnail_height` bytes.
    pub fn set_jfif(&mut self, jfif: &JfifParameters) -> Result<(), JlsError> {
        if jfif.version == 0 {
            return Err(JlsError::InvalidJlsParameters);
        }
        // Thumbnail dimensions are single wire bytes.
        if !(0..=255).contains(&jfif.thumbnail_width) || !(0..=255).contains(&jfif.thumbnail_height)
        {
            return Err(JlsError::InvalidJlsParameters);
        }
        if jfif.thumbnail.len() != jfif.thumbnail_size() {
            return Err(JlsError::InvalidJlsParameters);
        }
        // The 16-bit segment length bounds the thumbnail.
        if JFIF_FIXED_SEGMENT_SIZE - SEGMENT_LENGTH_SIZE + jfif.thumbnail.len()
            > SEGMENT_MAX_DATA_SIZE
        {
            return Err(JlsError::InvalidJlsParameters);
        }
        self.jfif = Some(jfif.clone());
        Ok(())
    }

    /// Appends a preset-parameters (LSE) segment; no immediate I/O.
    pub fn add_preset_parameters(
        &mut self,
        preset: &PresetCodingParameters,
    ) -> Result<(), JlsError> {
        let frame_info = self.frame_info.ok_or(JlsError::InvalidJlsParameters)?;
        let maximum_component_value = (1 << frame_info.bits_per_sample) - 1;
        validate_preset_coding_parameters(preset, maximum_component_value, 0)?;

        // A preset that only restates the computed defaults is not emitted.
        let defaults = self
            .default_preset_parameters(0)
            .ok_or(JlsError::InvalidJlsParameters)?;
        if parameters::is_default(preset, &defaults) {
            return Ok(());
        }
        self.segments.push(JpegSegment::PresetParameters(*preset));
        Ok(())
    }

    /// Appends an APP8 segment carrying the color-transform tag, packed with
    /// the optional endianness flag only in its wire form.
    pub fn add_color_transform(
        &mut self,
        transformation: ColorTransformation,
        endianness: Option<TransformEndianness>,
    ) -> Result<(), JlsError> {
        let frame_info = self.frame_info.ok_or(JlsError::InvalidJlsParameters)?;
        validate_transformation(
            transformation,
            frame_info.component_count,
            frame_info.bits_per_sample,
        )?;
        self.segments.push(JpegSegment::ColorTransform { transformation, endianness });
        Ok(())
    }

    /// Appends an opaque comment (COM) segment.
    pub fn add_comment(&mut self, data: &'a [u8]) -> Result<(), JlsError> {
        if data.len() > SEGMENT_MAX_DATA_SIZE {
            return Err(JlsError::InvalidJlsParameters);
        }
        self.segments.push(JpegSegment::Comment(data));
        Ok(())
    }

    /// Appends a scan-header segment derived from `parameters` plus the
    /// source samples the codec will compress during [`Self::write`].
    ///
    /// For planar images (interleave mode none, more than one component)
    /// each call covers the next single component and `source` is that
    /// component's plane; otherwise one call covers all components.
    pub fn add_scan(
        &mut self,
        source: &'a [u8],
        parameters: &JlsParameters,
    ) -> Result<(), JlsError> {
        let frame_info = self.frame_info.ok_or(JlsError::InvalidJlsParameters)?;
        validate_parameters(parameters)?;
        if parameters.frame_info() != frame_info {
            return Err(JlsError::InvalidJlsParameters);
        }

        let planar = parameters.interleave_mode == InterleaveMode::None
            && parameters.component_count > 1;
        let (first_component, components_in_scan) = if planar {
            if self.component_index >= frame_info.component_count {
                return Err(JlsError::InvalidJlsParameters);
            }
            (self.component_index, 1)
        } else {
            if self.component_index != 0 {
                return Err(JlsError::InvalidJlsParameters);
            }
            (0, parameters.component_count)
        };
        if components_in_scan > MAXIMUM_COMPONENT_COUNT_IN_SCAN {
            return Err(JlsError::ParameterValueNotSupported);
        }
        self.component_index += components_in_scan;

        let mut scan_parameters = parameters.clone();
        scan_parameters.component_count = components_in_scan;
        self.segments.push(JpegSegment::Scan(ScanSegment {
            source,
            parameters: scan_parameters,
            first_component,
        }));
        Ok(())
    }

    /// When enabled, each byte about to be written is first compared with
    /// the byte already present at the destination position (buffer-backed
    /// sinks only); a mismatch fails with [`JlsError::UnexpectedFailure`].
    /// Used to self-verify a writer against a previously produced stream.
    pub fn enable_compare(&mut self, compare: bool) {
        self.compare = compare;
    }

    /// Serializes, in fixed order: SOI, the optional JFIF APP0, the frame
    /// marker, every added segment in insertion order (each scan header
    /// immediately followed by its entropy payload), and EOI. Returns the
    /// number of bytes emitted.
    pub fn write(
        &mut self,
        sink: &mut ByteSink<'_>,
        codec: &mut dyn ScanCodec,
    ) -> Result<usize, JlsError> {
        let frame_info = self.frame_info.ok_or(JlsError::InvalidJlsParameters)?;

        let mut writer = MarkerWriter::new(sink, self.compare);
        writer.write_marker(JpegMarkerCode::StartOfImage)?;
        if let Some(jfif) = &self.jfif {
            JpegSegment::Jfif(jfif.clone()).write_to(&mut writer, codec)?;
        }
        JpegSegment::StartOfFrame(frame_info).write_to(&mut writer, codec)?;
        for segment in &self.segments {
            segment.write_to(&mut writer, codec)?;
        }
        writer.write_marker(JpegMarkerCode::EndOfImage)?;

        self.bytes_written = sink.bytes_written();
        self.remaining_capacity = sink.remaining();
        Ok(self.bytes_written)
    }

    /// Total bytes emitted by the last [`Self::write`].
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Unused destination capacity left by the last buffer-backed
    /// [`Self::write`] (`usize::MAX` for stream-backed sinks).
    pub fn length(&self) -> usize {
        self.remaining_capacity
    }

    /// Default preset coding parameters for the recorded frame.
    pub fn default_preset_parameters(&self, near_lossless: i32) -> Option<PresetCodingParameters> {
        let frame_info = self.frame_info?;
        let maximum_sample_value = (1 << frame_info.bits_per_sample) - 1;
        Some(parameters::compute_default(maximum_sample_value, near_lossless))
    }
}
