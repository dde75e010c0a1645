#![allow(dead_code)]

use jpegls_stream::error::JlsError;
use jpegls_stream::parameters::{JlsParameters, JlsRect};
use jpegls_stream::scan_codec::ScanCodec;
use jpegls_stream::{ByteSink, InterleaveMode, JpegStreamWriter};

/// Minimal stand-in for the entropy coder: copies sample bytes and stuffs a
/// zero byte after every 0xFF, so the payload can never contain a marker
/// prefix. Decoding stops at the first unstuffed 0xFF, exactly the stopping
/// condition the container requires from a real scan codec.
pub struct StuffingScanCodec;

impl ScanCodec for StuffingScanCodec {
    fn encode_scan(
        &mut self,
        source: &[u8],
        _parameters: &JlsParameters,
    ) -> Result<Vec<u8>, JlsError> {
        let mut coded = Vec::with_capacity(source.len());
        for &byte in source {
            coded.push(byte);
            if byte == 0xFF {
                coded.push(0x00);
            }
        }
        Ok(coded)
    }

    fn decode_scan(
        &mut self,
        source: &[u8],
        _parameters: &JlsParameters,
        _rect: JlsRect,
        destination: &mut [u8],
    ) -> Result<usize, JlsError> {
        let mut consumed = 0;
        let mut produced = 0;
        while consumed < source.len() {
            let byte = source[consumed];
            if byte == 0xFF {
                if source.get(consumed + 1) == Some(&0x00) {
                    if produced >= destination.len() {
                        return Err(JlsError::UncompressedBufferTooSmall);
                    }
                    destination[produced] = 0xFF;
                    produced += 1;
                    consumed += 2;
                    continue;
                }
                break; // marker boundary
            }
            if produced >= destination.len() {
                return Err(JlsError::UncompressedBufferTooSmall);
            }
            destination[produced] = byte;
            produced += 1;
            consumed += 1;
        }
        Ok(consumed)
    }
}

/// Wraps the stuffing codec and records the rect passed to each scan dispatch.
pub struct RectRecordingCodec {
    pub inner: StuffingScanCodec,
    pub rects: Vec<JlsRect>,
}

impl RectRecordingCodec {
    pub fn new() -> Self {
        Self { inner: StuffingScanCodec, rects: Vec::new() }
    }
}

impl ScanCodec for RectRecordingCodec {
    fn encode_scan(
        &mut self,
        source: &[u8],
        parameters: &JlsParameters,
    ) -> Result<Vec<u8>, JlsError> {
        self.inner.encode_scan(source, parameters)
    }

    fn decode_scan(
        &mut self,
        source: &[u8],
        parameters: &JlsParameters,
        rect: JlsRect,
        destination: &mut [u8],
    ) -> Result<usize, JlsError> {
        self.rects.push(rect);
        self.inner.decode_scan(source, parameters, rect, destination)
    }
}

pub fn gray_parameters(width: u32, height: u32, bits_per_sample: i32) -> JlsParameters {
    JlsParameters {
        width,
        height,
        bits_per_sample,
        component_count: 1,
        ..JlsParameters::default()
    }
}

pub fn color_parameters(
    width: u32,
    height: u32,
    interleave_mode: InterleaveMode,
) -> JlsParameters {
    JlsParameters {
        width,
        height,
        bits_per_sample: 8,
        component_count: 3,
        interleave_mode,
        ..JlsParameters::default()
    }
}

/// Gradient samples touching 0xFF so byte stuffing is exercised.
pub fn gradient_samples(count: usize) -> Vec<u8> {
    (0..count).map(|i| (251 + i % 6) as u8).collect()
}

/// Encodes one single-scan image into a fresh buffer and returns the bytes.
pub fn encode_to_vec(parameters: &JlsParameters, samples: &[u8]) -> Vec<u8> {
    let mut writer = JpegStreamWriter::new();
    writer.init(parameters.frame_info()).expect("init");
    writer.add_scan(samples, parameters).expect("add_scan");

    let mut buffer = vec![0u8; samples.len() * 2 + 256];
    let mut sink = ByteSink::from_buffer(&mut buffer);
    let written = writer.write(&mut sink, &mut StuffingScanCodec).expect("write");
    buffer.truncate(written);
    buffer
}
