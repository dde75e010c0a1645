//! JPEG-LS codestream reader.
//!
//! `JpegStreamReader` consumes an input byte sequence marker-by-marker,
//! validating each recognized segment as it is parsed and populating the
//! shared [`JlsParameters`] model, then hands each scan's entropy-coded
//! region to the external scan codec.

use crate::byte_stream::ByteSource;
use crate::color_transform;
use crate::constants::{
    COLOR_TRANSFORM_IDENTIFIER, COLOR_TRANSFORM_SEGMENT_SIZE, JFIF_FIXED_SEGMENT_SIZE,
    JFIF_IDENTIFIER, MAXIMUM_BITS_PER_SAMPLE, MAXIMUM_COMPONENT_COUNT_IN_SCAN,
    MINIMUM_BITS_PER_SAMPLE,
};
use crate::error::JlsError;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};
use crate::parameters::{
    JlsParameters, JlsRect, PresetCodingParameters, compute_maximum_near_lossless,
    validate_preset_coding_parameters, validate_transformation,
};
use crate::scan_codec::ScanCodec;
use crate::{ColorTransformation, InterleaveMode, TransformEndianness};
use std::borrow::Cow;

/// Reader state machine. `Error` is reachable from every state; a reader in
/// that state must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Initial,
    HeaderParsing,
    ScanReady,
    ScanActive,
    Done,
    Error,
}

pub struct JpegStreamReader<'a> {
    source: Cow<'a, [u8]>,
    position: usize,
    state: ReaderState,
    parameters: JlsParameters,
    // set_info() pre-seeded the parameter model for validation.
    info_preset: bool,
    frame_parsed: bool,
    rect: JlsRect,
    transform_endianness: Option<TransformEndianness>,
    // Component selection of the scan parsed most recently.
    scan_component_ids: Vec<u8>,
}

impl<'a> JpegStreamReader<'a> {
    pub fn new(source: ByteSource<'a>) -> Result<Self, JlsError> {
        Ok(Self {
            source: source.into_bytes()?,
            position: 0,
            state: ReaderState::Initial,
            parameters: JlsParameters::default(),
            info_preset: false,
            frame_parsed: false,
            rect: JlsRect::default(),
            transform_endianness: None,
            scan_component_ids: Vec::new(),
        })
    }

    pub fn parameters(&self) -> &JlsParameters {
        &self.parameters
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Endianness flag carried by an APP8 color-transform marker, separated
    /// from the base tag at decode time. Wire-level detail, deliberately not
    /// part of the parameter model.
    pub fn transform_endianness(&self) -> Option<TransformEndianness> {
        self.transform_endianness
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Pre-seeds the parameter model when the caller already knows the
    /// format: a parsed frame marker that contradicts any non-zero
    /// pre-seeded geometry field fails instead of silently rediscovering.
    pub fn set_info(&mut self, parameters: &JlsParameters) {
        self.parameters = parameters.clone();
        self.info_preset = true;
    }

    /// Restricts decode to a sub-region. The rect is forwarded to the scan
    /// codec on every scan dispatch, including each component scan of a
    /// planar image.
    pub fn set_rect(&mut self, rect: JlsRect) {
        self.rect = rect;
    }

    /// Reads one byte of the current segment payload.
    pub fn read_byte(&mut self) -> Result<u8, JlsError> {
        if self.position >= self.source.len() {
            return Err(JlsError::CompressedBufferTooSmall);
        }
        let value = self.source[self.position];
        self.position += 1;
        Ok(value)
    }

    fn read_u16(&mut self) -> Result<u16, JlsError> {
        let high = self.read_byte()? as u16;
        let low = self.read_byte()? as u16;
        Ok(high << 8 | low)
    }

    fn read_u32(&mut self) -> Result<u32, JlsError> {
        let high = self.read_u16()? as u32;
        let low = self.read_u16()? as u32;
        Ok(high << 16 | low)
    }

    fn skip_bytes(&mut self, count: usize) -> Result<(), JlsError> {
        if self.position + count > self.source.len() {
            return Err(JlsError::CompressedBufferTooSmall);
        }
        self.position += count;
        Ok(())
    }

    fn read_marker(&mut self) -> Result<JpegMarkerCode, JlsError> {
        if self.read_byte()? != JPEG_MARKER_START_BYTE {
            return Err(JlsError::MissingJpegMarkerStart);
        }
        JpegMarkerCode::classify(self.read_byte()?)
    }

    fn fail(&mut self, error: JlsError) -> JlsError {
        self.state = ReaderState::Error;
        error
    }

    /// Parses the start-of-image marker and every header segment up to and
    /// including the first start-of-scan header.
    pub fn read_header(&mut self) -> Result<(), JlsError> {
        if self.state != ReaderState::Initial {
            return Err(self.fail(JlsError::UnspecifiedFailure));
        }
        match self.read_header_inner() {
            Ok(()) => Ok(()),
            Err(error) => Err(self.fail(error)),
        }
    }

    fn read_header_inner(&mut self) -> Result<(), JlsError> {
        if self.read_marker()? != JpegMarkerCode::StartOfImage {
            return Err(JlsError::InvalidCompressedData);
        }
        self.state = ReaderState::HeaderParsing;

        loop {
            match self.read_marker()? {
                JpegMarkerCode::StartOfFrameJpegls => self.read_start_of_frame_segment()?,
                JpegMarkerCode::JpeglsPresetParameters => self.read_preset_parameters_segment()?,
                JpegMarkerCode::Comment => self.skip_segment()?,
                JpegMarkerCode::ApplicationData0 => self.read_app0_segment()?,
                JpegMarkerCode::ApplicationData8 => self.read_app8_segment()?,
                marker if marker.is_application_data() => self.skip_segment()?,
                JpegMarkerCode::StartOfScan => {
                    self.read_start_of_scan_segment()?;
                    self.state = ReaderState::ScanReady;
                    return Ok(());
                }
                _ => return Err(JlsError::InvalidCompressedData),
            }
        }
    }

    fn read_start_of_frame_segment(&mut self) -> Result<(), JlsError> {
        if self.frame_parsed {
            return Err(JlsError::InvalidCompressedData);
        }

        let length = self.read_u16()? as usize;
        let bits_per_sample = self.read_byte()? as i32;
        let height = self.read_u16()? as u32;
        let width = self.read_u16()? as u32;
        let component_count = self.read_byte()? as i32;

        if width == 0 || height == 0 || component_count == 0 {
            return Err(JlsError::InvalidCompressedData);
        }
        if bits_per_sample < MINIMUM_BITS_PER_SAMPLE || bits_per_sample > MAXIMUM_BITS_PER_SAMPLE {
            return Err(JlsError::ParameterValueNotSupported);
        }
        if length != 8 + component_count as usize * 3 {
            return Err(JlsError::InvalidCompressedData);
        }

        if self.info_preset {
            let expected = &self.parameters;
            if (expected.width != 0 && expected.width != width)
                || (expected.height != 0 && expected.height != height)
                || (expected.bits_per_sample != 0 && expected.bits_per_sample != bits_per_sample)
                || (expected.component_count != 0 && expected.component_count != component_count)
            {
                return Err(JlsError::InvalidJlsParameters);
            }
        }

        self.parameters.width = width;
        self.parameters.height = height;
        self.parameters.bits_per_sample = bits_per_sample;
        self.parameters.component_count = component_count;
        self.frame_parsed = true;

        for _ in 0..component_count {
            let _id = self.read_byte()?;
            let _sampling = self.read_byte()?;
            let _tq = self.read_byte()?;
        }
        Ok(())
    }

    fn read_preset_parameters_segment(&mut self) -> Result<(), JlsError> {
        let length = self.read_u16()? as usize;
        if length < 3 {
            return Err(JlsError::InvalidCompressedData);
        }
        let parameter_type = self.read_byte()?;
        if parameter_type != 1 {
            // Mapping tables and oversize-image types are valid but unused here.
            return self.skip_bytes(length - 3);
        }
        if length != 2 + 1 + 5 * 2 {
            return Err(JlsError::InvalidCompressedData);
        }

        let preset = PresetCodingParameters {
            maximum_sample_value: self.read_u16()? as i32,
            threshold1: self.read_u16()? as i32,
            threshold2: self.read_u16()? as i32,
            threshold3: self.read_u16()? as i32,
            reset_value: self.read_u16()? as i32,
        };

        // Fail-fast: the ordering invariant is checked as soon as the
        // segment is parsed, against the frame bit depth when known.
        let maximum_component_value = if self.frame_parsed {
            (1 << self.parameters.bits_per_sample) - 1
        } else {
            u16::MAX as i32
        };
        validate_preset_coding_parameters(
            &preset,
            maximum_component_value,
            self.parameters.near_lossless,
        )?;

        // The raw values are preserved so a rewrite reproduces them exactly.
        self.parameters.preset = preset;
        Ok(())
    }

    fn skip_segment(&mut self) -> Result<(), JlsError> {
        let length = self.read_u16()? as usize;
        if length < 2 {
            return Err(JlsError::InvalidCompressedData);
        }
        self.skip_bytes(length - 2)
    }

    fn read_app0_segment(&mut self) -> Result<(), JlsError> {
        let length = self.read_u16()? as usize;
        if length < 2 {
            return Err(JlsError::InvalidCompressedData);
        }
        let remaining = length - 2;
        if remaining < JFIF_IDENTIFIER.len() {
            return self.skip_bytes(remaining);
        }

        let mut identifier = [0u8; 5];
        for byte in &mut identifier {
            *byte = self.read_byte()?;
        }
        if identifier != JFIF_IDENTIFIER {
            return self.skip_bytes(remaining - identifier.len());
        }

        self.parameters.jfif.version = self.read_u16()? as i32;
        self.parameters.jfif.units = self.read_byte()?;
        self.parameters.jfif.x_density = self.read_u16()? as i32;
        self.parameters.jfif.y_density = self.read_u16()? as i32;
        self.parameters.jfif.thumbnail_width = self.read_byte()? as i32;
        self.parameters.jfif.thumbnail_height = self.read_byte()? as i32;

        let thumbnail_size = self.parameters.jfif.thumbnail_size();
        if length != JFIF_FIXED_SEGMENT_SIZE + thumbnail_size {
            return Err(JlsError::InvalidCompressedData);
        }

        if thumbnail_size > 0 {
            // The thumbnail lands in the caller's buffer; the caller must
            // have preallocated it to the exact size via set_info().
            if self.parameters.jfif.thumbnail.len() != thumbnail_size {
                return Err(JlsError::UncompressedBufferTooSmall);
            }
            for i in 0..thumbnail_size {
                self.parameters.jfif.thumbnail[i] = self.read_byte()?;
            }
        }
        Ok(())
    }

    fn read_app8_segment(&mut self) -> Result<(), JlsError> {
        let length = self.read_u16()? as usize;
        if length < 2 {
            return Err(JlsError::InvalidCompressedData);
        }
        let remaining = length - 2;
        if length != COLOR_TRANSFORM_SEGMENT_SIZE {
            return self.skip_bytes(remaining);
        }

        let mut identifier = [0u8; 4];
        for byte in &mut identifier {
            *byte = self.read_byte()?;
        }
        if identifier != COLOR_TRANSFORM_IDENTIFIER {
            return self.skip_bytes(remaining - identifier.len());
        }

        let (transformation, endianness) = color_transform::unpack(self.read_u32()?)?;
        match transformation {
            ColorTransformation::RgbAsYuvLossy | ColorTransformation::Matrix => {
                Err(JlsError::UnsupportedColorTransform)
            }
            _ => {
                self.parameters.transformation = transformation;
                self.transform_endianness = endianness;
                Ok(())
            }
        }
    }

    /// Parses the fixed-size start-of-scan payload (the SOS marker itself has
    /// already been consumed) into the parameter model.
    fn read_start_of_scan_segment(&mut self) -> Result<(), JlsError> {
        // The scan header is meaningless without the frame geometry, even
        // when set_info() pre-seeded a component count.
        if !self.frame_parsed {
            return Err(JlsError::InvalidCompressedData);
        }

        let length = self.read_u16()? as usize;
        let components_in_scan = self.read_byte()? as i32;
        if components_in_scan < 1 {
            return Err(JlsError::InvalidCompressedData);
        }
        if components_in_scan > MAXIMUM_COMPONENT_COUNT_IN_SCAN {
            return Err(JlsError::ParameterValueNotSupported);
        }
        if length != 2 + 1 + components_in_scan as usize * 2 + 3 {
            return Err(JlsError::InvalidCompressedData);
        }

        self.scan_component_ids.clear();
        for _ in 0..components_in_scan {
            let id = self.read_byte()?;
            if id == 0 || id as i32 > self.parameters.component_count {
                return Err(JlsError::InvalidCompressedData);
            }
            let mapping = self.read_byte()?;
            if mapping != 0 {
                return Err(JlsError::ParameterValueNotSupported);
            }
            self.scan_component_ids.push(id);
        }

        let near_lossless = self.read_byte()? as i32;
        let maximum_sample_value = (1 << self.parameters.bits_per_sample) - 1;
        if near_lossless > compute_maximum_near_lossless(maximum_sample_value) {
            return Err(JlsError::InvalidCompressedData);
        }

        let interleave_mode = InterleaveMode::try_from(self.read_byte()?)
            .map_err(|_| JlsError::InvalidCompressedData)?;

        let point_transform = self.read_byte()?;
        if point_transform != 0 {
            return Err(JlsError::ImageTypeNotSupported);
        }

        // Later scans override custom parameters set earlier.
        self.parameters.near_lossless = near_lossless;
        self.parameters.interleave_mode = interleave_mode;
        Ok(())
    }

    /// Enters `ScanActive` for one scan. For the first scan the header
    /// payload was already parsed by [`Self::read_header`]; for subsequent
    /// scans the next marker is consumed and must be a start-of-scan.
    pub fn read_start_of_scan(&mut self, first_component: bool) -> Result<(), JlsError> {
        let result = if first_component {
            if self.state != ReaderState::ScanReady {
                Err(JlsError::UnspecifiedFailure)
            } else {
                self.validate_scan()
            }
        } else {
            self.read_next_scan_header()
        };
        match result {
            Ok(()) => {
                self.state = ReaderState::ScanActive;
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn read_next_scan_header(&mut self) -> Result<(), JlsError> {
        if self.read_marker()? != JpegMarkerCode::StartOfScan {
            return Err(JlsError::InvalidCompressedData);
        }
        self.read_start_of_scan_segment()?;
        self.validate_scan()
    }

    /// Consistency of the parsed scan header against the frame geometry.
    fn validate_scan(&self) -> Result<(), JlsError> {
        if !self.frame_parsed {
            return Err(JlsError::InvalidCompressedData);
        }
        let components_in_scan = self.scan_component_ids.len() as i32;
        if self.parameters.interleave_mode != InterleaveMode::None
            && components_in_scan != self.parameters.component_count
        {
            return Err(JlsError::InvalidCompressedData);
        }
        validate_transformation(
            self.parameters.transformation,
            self.parameters.component_count,
            self.parameters.bits_per_sample,
        )
    }

    /// Decodes every remaining scan into `destination`, dispatching each
    /// entropy-coded region to `codec` and resuming marker parsing at the
    /// boundary the codec reports. Finishes on the end-of-image marker.
    pub fn read(
        &mut self,
        destination: &mut [u8],
        codec: &mut dyn ScanCodec,
    ) -> Result<(), JlsError> {
        match self.read_inner(destination, codec) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.fail(error)),
        }
    }

    fn read_inner(
        &mut self,
        destination: &mut [u8],
        codec: &mut dyn ScanCodec,
    ) -> Result<(), JlsError> {
        match self.state {
            ReaderState::ScanReady => {
                self.validate_scan()?;
                self.state = ReaderState::ScanActive;
            }
            ReaderState::ScanActive => {}
            _ => return Err(JlsError::UnspecifiedFailure),
        }

        let required = self.parameters.required_sample_buffer_size();
        if destination.len() < required {
            return Err(JlsError::UncompressedBufferTooSmall);
        }

        let rect = if self.rect.is_empty() {
            JlsRect::full_frame(&self.parameters.frame_info())
        } else {
            self.rect
        };

        let planar = self.parameters.interleave_mode == InterleaveMode::None
            && self.parameters.component_count > 1;
        let plane_size = self.parameters.effective_stride() * self.parameters.height as usize;

        loop {
            let components_in_scan = self.scan_component_ids.len();
            let mut scan_parameters = self.parameters.clone();
            scan_parameters.component_count = components_in_scan as i32;

            let scan_destination = if planar {
                let first_id = self.scan_component_ids[0] as usize;
                let offset = (first_id - 1) * plane_size;
                let size = components_in_scan * plane_size;
                if offset + size > destination.len() {
                    return Err(JlsError::InvalidCompressedData);
                }
                &mut destination[offset..offset + size]
            } else {
                &mut destination[..required]
            };

            let consumed = codec.decode_scan(
                &self.source[self.position..],
                &scan_parameters,
                rect,
                scan_destination,
            )?;
            if self.position + consumed > self.source.len() {
                return Err(JlsError::UnexpectedFailure);
            }
            self.position += consumed;

            match self.read_marker()? {
                JpegMarkerCode::StartOfScan => {
                    self.read_start_of_scan_segment()?;
                    self.validate_scan()?;
                }
                JpegMarkerCode::EndOfImage => {
                    self.state = ReaderState::Done;
                    if self.position < self.source.len() {
                        return Err(JlsError::TooMuchCompressedData);
                    }
                    return Ok(());
                }
                _ => return Err(JlsError::InvalidCompressedData),
            }
        }
    }
}
