//! In-memory marker-segment model.
//!
//! Segments are tagged-union records owned in emission order by the writer's
//! segment list; each variant renders itself with the JPEG marker-segment
//! convention (2-byte marker code, 2-byte big-endian length that includes the
//! length field itself, payload). The reader never constructs segments; it
//! parses straight into the parameter model using the same layouts.

use crate::color_transform;
use crate::constants::{COLOR_TRANSFORM_IDENTIFIER, JFIF_IDENTIFIER};
use crate::error::JlsError;
use crate::jpeg_marker_code::JpegMarkerCode;
use crate::jpeg_stream_writer::MarkerWriter;
use crate::parameters::{JfifParameters, JlsParameters, PresetCodingParameters};
use crate::scan_codec::ScanCodec;
use crate::{ColorTransformation, FrameInfo, TransformEndianness};

/// One scan: its header fields plus the source samples handed to the codec.
pub struct ScanSegment<'a> {
    pub source: &'a [u8],
    /// Scan-local parameters; `component_count` is the count in this scan,
    /// which for planar images is 1 per segment.
    pub parameters: JlsParameters,
    /// Zero-based index of the first component covered by this scan.
    pub first_component: i32,
}

pub enum JpegSegment<'a> {
    StartOfFrame(FrameInfo),
    PresetParameters(PresetCodingParameters),
    ColorTransform {
        transformation: ColorTransformation,
        endianness: Option<TransformEndianness>,
    },
    Comment(&'a [u8]),
    Jfif(JfifParameters),
    Scan(ScanSegment<'a>),
}

impl<'a> JpegSegment<'a> {
    pub(crate) fn write_to(
        &self,
        writer: &mut MarkerWriter<'_, '_>,
        codec: &mut dyn ScanCodec,
    ) -> Result<(), JlsError> {
        match self {
            Self::StartOfFrame(frame_info) => write_start_of_frame(writer, frame_info),
            Self::PresetParameters(preset) => write_preset_parameters(writer, preset),
            Self::ColorTransform { transformation, endianness } => {
                write_color_transform(writer, *transformation, *endianness)
            }
            Self::Comment(data) => write_comment(writer, data),
            Self::Jfif(jfif) => write_jfif(writer, jfif),
            Self::Scan(scan) => write_scan(writer, scan, codec),
        }
    }
}

fn write_start_of_frame(
    writer: &mut MarkerWriter<'_, '_>,
    frame_info: &FrameInfo,
) -> Result<(), JlsError> {
    writer.write_marker(JpegMarkerCode::StartOfFrameJpegls)?;
    let length = 2 + 6 + frame_info.component_count as usize * 3;
    writer.write_u16(length as u16)?;

    writer.write_byte(frame_info.bits_per_sample as u8)?;
    writer.write_u16(frame_info.height as u16)?;
    writer.write_u16(frame_info.width as u16)?;
    writer.write_byte(frame_info.component_count as u8)?;

    for i in 0..frame_info.component_count {
        writer.write_byte((i + 1) as u8)?; // Component ID
        writer.write_byte(0x11)?; // H=1, V=1
        writer.write_byte(0)?; // Tq
    }
    Ok(())
}

fn write_preset_parameters(
    writer: &mut MarkerWriter<'_, '_>,
    preset: &PresetCodingParameters,
) -> Result<(), JlsError> {
    writer.write_marker(JpegMarkerCode::JpeglsPresetParameters)?;
    writer.write_u16(2 + 1 + 5 * 2)?;
    writer.write_byte(1)?; // Type 1: preset coding parameters

    writer.write_u16(preset.maximum_sample_value as u16)?;
    writer.write_u16(preset.threshold1 as u16)?;
    writer.write_u16(preset.threshold2 as u16)?;
    writer.write_u16(preset.threshold3 as u16)?;
    writer.write_u16(preset.reset_value as u16)?;
    Ok(())
}

fn write_color_transform(
    writer: &mut MarkerWriter<'_, '_>,
    transformation: ColorTransformation,
    endianness: Option<TransformEndianness>,
) -> Result<(), JlsError> {
    writer.write_marker(JpegMarkerCode::ApplicationData8)?;
    writer.write_u16(2 + 4 + 4)?;
    writer.write_bytes(&COLOR_TRANSFORM_IDENTIFIER)?;
    writer.write_u32(color_transform::pack(transformation, endianness))
}

fn write_comment(writer: &mut MarkerWriter<'_, '_>, data: &[u8]) -> Result<(), JlsError> {
    writer.write_marker(JpegMarkerCode::Comment)?;
    writer.write_u16((2 + data.len()) as u16)?;
    writer.write_bytes(data)
}

fn write_jfif(writer: &mut MarkerWriter<'_, '_>, jfif: &JfifParameters) -> Result<(), JlsError> {
    writer.write_marker(JpegMarkerCode::ApplicationData0)?;
    let length = 2 + 5 + 2 + 1 + 2 + 2 + 1 + 1 + jfif.thumbnail.len();
    writer.write_u16(length as u16)?;

    writer.write_bytes(&JFIF_IDENTIFIER)?;
    writer.write_u16(jfif.version as u16)?;
    writer.write_byte(jfif.units)?;
    writer.write_u16(jfif.x_density as u16)?;
    writer.write_u16(jfif.y_density as u16)?;
    writer.write_byte(jfif.thumbnail_width as u8)?;
    writer.write_byte(jfif.thumbnail_height as u8)?;
    writer.write_bytes(&jfif.thumbnail)
}

fn write_scan(
    writer: &mut MarkerWriter<'_, '_>,
    scan: &ScanSegment<'_>,
    codec: &mut dyn ScanCodec,
) -> Result<(), JlsError> {
    let component_count = scan.parameters.component_count;

    writer.write_marker(JpegMarkerCode::StartOfScan)?;
    let length = 2 + 1 + component_count as usize * 2 + 3;
    writer.write_u16(length as u16)?;

    writer.write_byte(component_count as u8)?;
    for i in 0..component_count {
        writer.write_byte((scan.first_component + i + 1) as u8)?; // Component selector
        writer.write_byte(0)?; // Mapping table selector
    }
    writer.write_byte(scan.parameters.near_lossless as u8)?;
    writer.write_byte(scan.parameters.interleave_mode as u8)?;
    writer.write_byte(0)?; // Point transform

    // The entropy-coded payload follows its scan header immediately.
    let coded = codec.encode_scan(scan.source, &scan.parameters)?;
    writer.write_bytes(&coded)
}
