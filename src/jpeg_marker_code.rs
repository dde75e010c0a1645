use crate::error::JlsError;
use num_enum::TryFromPrimitive;

/// Marker codes recognized by the container layer.
///
/// Every marker on the wire is the start byte 0xFF followed by one of these
/// tag bytes. Codes outside this set are either rejected as unknown or, for
/// the JPEG (non-LS) frame family, reported as an unsupported encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOI: Marks the start of an image.
    StartOfImage = 0xD8,

    /// EOI: Marks the end of an image.
    EndOfImage = 0xD9,

    /// SOS: Marks the start of scan.
    StartOfScan = 0xDA,

    /// APP0: Application data 0: used for the JFIF header.
    ApplicationData0 = 0xE0,
    /// APP1: Application data 1.
    ApplicationData1 = 0xE1,
    /// APP2: Application data 2.
    ApplicationData2 = 0xE2,
    /// APP3: Application data 3.
    ApplicationData3 = 0xE3,
    /// APP4: Application data 4.
    ApplicationData4 = 0xE4,
    /// APP5: Application data 5.
    ApplicationData5 = 0xE5,
    /// APP6: Application data 6.
    ApplicationData6 = 0xE6,
    /// APP7: Application data 7.
    ApplicationData7 = 0xE7,
    /// APP8: Application data 8: used for HP color-transformation info.
    ApplicationData8 = 0xE8,
    /// APP9: Application data 9.
    ApplicationData9 = 0xE9,
    /// APP10: Application data 10.
    ApplicationData10 = 0xEA,
    /// APP11: Application data 11.
    ApplicationData11 = 0xEB,
    /// APP12: Application data 12.
    ApplicationData12 = 0xEC,
    /// APP13: Application data 13.
    ApplicationData13 = 0xED,
    /// APP14: Application data 14.
    ApplicationData14 = 0xEE,
    /// APP15: Application data 15.
    ApplicationData15 = 0xEF,

    /// COM: Comment block.
    Comment = 0xFE,

    // The following markers are defined in ISO/IEC 14495-1 | ITU T.87. (JPEG-LS standard)
    /// SOF_55: Marks the start of a JPEG-LS encoded frame.
    StartOfFrameJpegls = 0xF7,

    /// LSE: Marks the start of a JPEG-LS preset parameters segment.
    JpeglsPresetParameters = 0xF8,
}

pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;

impl JpegMarkerCode {
    /// Classifies a raw tag byte, distinguishing the JPEG (non-LS) frame
    /// family from genuinely unknown codes.
    pub fn classify(value: u8) -> Result<Self, JlsError> {
        // SOF0..SOF15 and the table markers of the C0 block signal a stream
        // encoded with an algorithm other than JPEG-LS.
        if (0xC0..=0xCF).contains(&value) {
            return Err(JlsError::UnsupportedEncoding);
        }
        Self::try_from(value).map_err(|_| JlsError::UnknownJpegMarker)
    }

    pub fn is_application_data(self) -> bool {
        (Self::ApplicationData0 as u8..=Self::ApplicationData15 as u8).contains(&(self as u8))
    }
}
