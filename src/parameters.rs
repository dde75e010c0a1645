//! The shared parameter model: image geometry, interleave mode, color
//! transform, preset coding thresholds, and optional JFIF metadata.
//!
//! The reader populates one [`JlsParameters`] value as markers are parsed;
//! the writer consults one to derive the segments it emits. Validation is
//! fail-fast: each field is checked as soon as it is known.

use crate::constants::{
    DEFAULT_RESET_VALUE, MAXIMUM_BITS_PER_SAMPLE, MAXIMUM_COMPONENT_COUNT,
    MAXIMUM_FRAME_DIMENSION, MAXIMUM_NEAR_LOSSLESS, MINIMUM_BITS_PER_SAMPLE,
    MINIMUM_COMPONENT_COUNT,
};
use crate::error::JlsError;
use crate::{ColorTransformation, FrameInfo, InterleaveMode};
use std::cmp::{max, min};

/// JPEG-LS preset coding parameters (the LSE type-1 segment payload).
///
/// A zero field means "use the default computed from MAXVAL and NEAR" as
/// defined by ISO/IEC 14495-1, C.2.4.1.1.1. Non-zero fields must satisfy
/// `0 < T1 <= T2 <= T3 <= MAXVAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresetCodingParameters {
    pub maximum_sample_value: i32,
    pub threshold1: i32,
    pub threshold2: i32,
    pub threshold3: i32,
    pub reset_value: i32,
}

/// An axis-aligned region restricting decode to a sub-area of the frame.
/// Zero width/height selects the full image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JlsRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl JlsRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn full_frame(frame_info: &FrameInfo) -> Self {
        Self {
            x: 0,
            y: 0,
            width: frame_info.width as i32,
            height: frame_info.height as i32,
        }
    }
}

/// Optional JFIF APP0 metadata.
///
/// `version == 0` means no JFIF segment is present/emitted. The thumbnail
/// buffer is caller-owned: the decoder writes into it only when the caller
/// sized it to exactly `3 * thumbnail_width * thumbnail_height` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JfifParameters {
    pub version: i32,
    pub units: u8,
    pub x_density: i32,
    pub y_density: i32,
    pub thumbnail_width: i32,
    pub thumbnail_height: i32,
    pub thumbnail: Vec<u8>,
}

impl JfifParameters {
    pub fn thumbnail_size(&self) -> usize {
        3 * self.thumbnail_width as usize * self.thumbnail_height as usize
    }
}

/// The aggregate parameter model shared between reader and writer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JlsParameters {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: i32,
    /// Bytes per line in the caller's sample buffer; 0 means auto-computed.
    pub stride: i32,
    pub component_count: i32,
    /// Allowed lossy error (NEAR); 0 is lossless.
    pub near_lossless: i32,
    pub interleave_mode: InterleaveMode,
    pub transformation: ColorTransformation,
    pub output_bgr: bool,
    pub preset: PresetCodingParameters,
    pub jfif: JfifParameters,
}

impl JlsParameters {
    pub fn frame_info(&self) -> FrameInfo {
        FrameInfo {
            width: self.width,
            height: self.height,
            bits_per_sample: self.bits_per_sample,
            component_count: self.component_count,
        }
    }

    pub fn maximum_sample_value(&self) -> i32 {
        if self.preset.maximum_sample_value != 0 {
            self.preset.maximum_sample_value
        } else {
            (1 << self.bits_per_sample) - 1
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        if self.bits_per_sample <= 8 { 1 } else { 2 }
    }

    /// Bytes per line in the caller's buffer, resolving a zero stride to the
    /// tightly packed default for the active interleave mode.
    pub fn effective_stride(&self) -> usize {
        if self.stride != 0 {
            return self.stride as usize;
        }
        let components_per_line = match self.interleave_mode {
            InterleaveMode::None => 1,
            InterleaveMode::Line | InterleaveMode::Sample => self.component_count as usize,
        };
        self.width as usize * self.bytes_per_sample() * components_per_line
    }

    /// Minimum caller buffer size holding the decoded (or source) samples.
    pub fn required_sample_buffer_size(&self) -> usize {
        let planes = match self.interleave_mode {
            InterleaveMode::None => self.component_count as usize,
            InterleaveMode::Line | InterleaveMode::Sample => 1,
        };
        self.effective_stride() * self.height as usize * planes
    }
}

pub fn validate_frame_info(frame_info: &FrameInfo) -> Result<(), JlsError> {
    if frame_info.width == 0 || frame_info.height == 0 {
        return Err(JlsError::InvalidJlsParameters);
    }
    if frame_info.width > MAXIMUM_FRAME_DIMENSION || frame_info.height > MAXIMUM_FRAME_DIMENSION {
        return Err(JlsError::ParameterValueNotSupported);
    }
    if frame_info.bits_per_sample < MINIMUM_BITS_PER_SAMPLE
        || frame_info.bits_per_sample > MAXIMUM_BITS_PER_SAMPLE
    {
        return Err(JlsError::ParameterValueNotSupported);
    }
    if frame_info.component_count < MINIMUM_COMPONENT_COUNT
        || frame_info.component_count > MAXIMUM_COMPONENT_COUNT
    {
        return Err(JlsError::ParameterValueNotSupported);
    }
    Ok(())
}

/// Cross-field consistency of the full parameter model.
pub fn validate_parameters(parameters: &JlsParameters) -> Result<(), JlsError> {
    validate_frame_info(&parameters.frame_info())?;

    if parameters.stride < 0 {
        return Err(JlsError::InvalidJlsParameters);
    }

    let maximum_sample_value = (1 << parameters.bits_per_sample) - 1;
    if parameters.near_lossless < 0
        || parameters.near_lossless > compute_maximum_near_lossless(maximum_sample_value)
    {
        return Err(JlsError::InvalidJlsParameters);
    }

    if parameters.interleave_mode != InterleaveMode::None && parameters.component_count == 1 {
        return Err(JlsError::InvalidJlsParameters);
    }

    if parameters.output_bgr && parameters.component_count != 3 {
        return Err(JlsError::InvalidJlsParameters);
    }

    validate_transformation(
        parameters.transformation,
        parameters.component_count,
        parameters.bits_per_sample,
    )
}

/// The HP transforms are defined for 3-component images with byte or word
/// samples only; the recognized-but-unsupported tags always fail.
pub fn validate_transformation(
    transformation: ColorTransformation,
    component_count: i32,
    bits_per_sample: i32,
) -> Result<(), JlsError> {
    match transformation {
        ColorTransformation::None => Ok(()),
        ColorTransformation::Hp1 | ColorTransformation::Hp2 | ColorTransformation::Hp3 => {
            if component_count != 3 {
                return Err(JlsError::UnsupportedColorTransform);
            }
            if bits_per_sample != 8 && bits_per_sample != 16 {
                return Err(JlsError::UnsupportedBitDepthForTransform);
            }
            Ok(())
        }
        ColorTransformation::RgbAsYuvLossy | ColorTransformation::Matrix => {
            Err(JlsError::UnsupportedColorTransform)
        }
    }
}

// Clamping function as defined by ISO/IEC 14495-1, Figure C.3
const fn clamp(i: i32, j: i32, maximum_sample_value: i32) -> i32 {
    if i > maximum_sample_value || i < j { j } else { i }
}

pub fn compute_maximum_near_lossless(maximum_sample_value: i32) -> i32 {
    debug_assert!(maximum_sample_value >= 1);
    min(MAXIMUM_NEAR_LOSSLESS, maximum_sample_value / 2)
}

// Default coding threshold values as defined by ISO/IEC 14495-1, C.2.4.1.1.1
pub fn compute_default(maximum_sample_value: i32, near_lossless: i32) -> PresetCodingParameters {
    debug_assert!(maximum_sample_value <= u16::MAX as i32);

    // Default threshold values for JPEG-LS statistical modeling as defined in
    // ISO/IEC 14495-1, table C.3 for the case MAXVAL = 255 and NEAR = 0.
    const DEFAULT_THRESHOLD1: i32 = 3; // BASIC_T1
    const DEFAULT_THRESHOLD2: i32 = 7; // BASIC_T2
    const DEFAULT_THRESHOLD3: i32 = 21; // BASIC_T3

    if maximum_sample_value >= 128 {
        let factor = (min(maximum_sample_value, 4095) + 128) / 256;
        let threshold1 = clamp(
            factor * (DEFAULT_THRESHOLD1 - 2) + 2 + 3 * near_lossless,
            near_lossless + 1,
            maximum_sample_value,
        );
        let threshold2 = clamp(
            factor * (DEFAULT_THRESHOLD2 - 3) + 3 + 5 * near_lossless,
            threshold1,
            maximum_sample_value,
        );

        PresetCodingParameters {
            maximum_sample_value,
            threshold1,
            threshold2,
            threshold3: clamp(
                factor * (DEFAULT_THRESHOLD3 - 4) + 4 + 7 * near_lossless,
                threshold2,
                maximum_sample_value,
            ),
            reset_value: DEFAULT_RESET_VALUE,
        }
    } else {
        let factor = 256 / (maximum_sample_value + 1);
        let threshold1 = clamp(
            max(2, DEFAULT_THRESHOLD1 / factor + 3 * near_lossless),
            near_lossless + 1,
            maximum_sample_value,
        );
        let threshold2 = clamp(
            max(3, DEFAULT_THRESHOLD2 / factor + 5 * near_lossless),
            threshold1,
            maximum_sample_value,
        );

        PresetCodingParameters {
            maximum_sample_value,
            threshold1,
            threshold2,
            threshold3: clamp(
                max(4, DEFAULT_THRESHOLD3 / factor + 7 * near_lossless),
                threshold2,
                maximum_sample_value,
            ),
            reset_value: DEFAULT_RESET_VALUE,
        }
    }
}

/// Validates preset coding parameters against the frame, resolving each zero
/// field to its default. ISO/IEC 14495-1, C.2.4.1.1, table C.1 defines the
/// valid value ranges.
pub fn validate_preset_coding_parameters(
    preset: &PresetCodingParameters,
    maximum_component_value: i32,
    near_lossless: i32,
) -> Result<PresetCodingParameters, JlsError> {
    if preset.maximum_sample_value != 0
        && (preset.maximum_sample_value < 1
            || preset.maximum_sample_value > maximum_component_value)
    {
        return Err(JlsError::InvalidJlsParameters);
    }

    let maximum_sample_value = if preset.maximum_sample_value != 0 {
        preset.maximum_sample_value
    } else {
        maximum_component_value
    };

    if preset.threshold1 != 0
        && (preset.threshold1 < near_lossless + 1 || preset.threshold1 > maximum_sample_value)
    {
        return Err(JlsError::InvalidJlsParameters);
    }

    let defaults = compute_default(maximum_sample_value, near_lossless);

    let threshold1 = if preset.threshold1 != 0 {
        preset.threshold1
    } else {
        defaults.threshold1
    };

    if preset.threshold2 != 0
        && (preset.threshold2 < threshold1 || preset.threshold2 > maximum_sample_value)
    {
        return Err(JlsError::InvalidJlsParameters);
    }

    let threshold2 = if preset.threshold2 != 0 {
        preset.threshold2
    } else {
        defaults.threshold2
    };

    if preset.threshold3 != 0
        && (preset.threshold3 < threshold2 || preset.threshold3 > maximum_sample_value)
    {
        return Err(JlsError::InvalidJlsParameters);
    }

    if preset.reset_value != 0
        && (preset.reset_value < 3 || preset.reset_value > max(255, maximum_sample_value))
    {
        return Err(JlsError::InvalidJlsParameters);
    }

    Ok(PresetCodingParameters {
        maximum_sample_value,
        threshold1,
        threshold2,
        threshold3: if preset.threshold3 != 0 {
            preset.threshold3
        } else {
            defaults.threshold3
        },
        reset_value: if preset.reset_value != 0 {
            preset.reset_value
        } else {
            defaults.reset_value
        },
    })
}

pub fn is_default(preset: &PresetCodingParameters, defaults: &PresetCodingParameters) -> bool {
    if *preset == PresetCodingParameters::default() {
        return true;
    }
    preset == defaults
}
