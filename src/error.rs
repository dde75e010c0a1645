use thiserror::Error;

/// Result codes reported by the container layer.
///
/// The set is closed: every failure of the reader, the writer, or a scan codec
/// maps onto exactly one of these values. Buffer-capacity conditions
/// (`UncompressedBufferTooSmall`, `CompressedBufferTooSmall`) are recoverable
/// by retrying with a larger buffer; the structural conditions indicate
/// malformed input or inconsistent parameters and are not.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JlsError {
    #[error("One of the JPEG-LS parameters is invalid")]
    InvalidJlsParameters = 1,
    #[error("Parameter value not supported")]
    ParameterValueNotSupported = 2,
    #[error("The uncompressed buffer is too small to hold all the output")]
    UncompressedBufferTooSmall = 3,
    #[error("The compressed buffer is too small, more input data was expected")]
    CompressedBufferTooSmall = 4,
    #[error("The encoded bit stream contains a structural problem")]
    InvalidCompressedData = 5,
    #[error("Decoding is ready but the input buffer still contains encoded data")]
    TooMuchCompressedData = 6,
    #[error("The bit stream is encoded with an option not supported by this implementation")]
    ImageTypeNotSupported = 7,
    #[error("The bit depth for the color transformation is not supported")]
    UnsupportedBitDepthForTransform = 8,
    #[error("The color transformation is not supported")]
    UnsupportedColorTransform = 9,
    #[error("The frame is not encoded with the JPEG-LS algorithm")]
    UnsupportedEncoding = 10,
    #[error("An unknown JPEG marker code was detected in the encoded bit stream")]
    UnknownJpegMarker = 11,
    #[error("Expected a 0xFF JPEG marker start byte but none was found")]
    MissingJpegMarkerStart = 12,
    #[error("The implementation detected a failure, but no specific error is available")]
    UnspecifiedFailure = 13,
    /// No guarantees can be given for the state of the reader/writer or its
    /// buffers after this error; callers must discard the object.
    #[error("The implementation encountered a failure it did not expect")]
    UnexpectedFailure = 14,
}
