// Round-trip tests for the container layer: a stream produced by the writer
// must parse back into the same parameter model and sample bytes.

mod common;

#[cfg(test)]
mod container_roundtrip {
    use crate::common::{
        RectRecordingCodec, StuffingScanCodec, color_parameters, encode_to_vec,
        gradient_samples, gray_parameters,
    };
    use jpegls_stream::parameters::{JfifParameters, JlsRect, PresetCodingParameters};
    use jpegls_stream::{
        ByteSink, ByteSource, InterleaveMode, JpegStreamReader, JpegStreamWriter, ReaderState,
    };

    #[test]
    fn round_trip_single_component() {
        let parameters = gray_parameters(16, 16, 8);
        let samples = gradient_samples(16 * 16);
        let encoded = encode_to_vec(&parameters, &samples);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&encoded)).unwrap();
        reader.read_header().unwrap();

        let decoded_parameters = reader.parameters();
        assert_eq!(decoded_parameters.width, 16);
        assert_eq!(decoded_parameters.height, 16);
        assert_eq!(decoded_parameters.bits_per_sample, 8);
        assert_eq!(decoded_parameters.component_count, 1);
        assert_eq!(decoded_parameters.near_lossless, 0);
        assert_eq!(decoded_parameters.interleave_mode, InterleaveMode::None);

        let mut decoded = vec![0u8; samples.len()];
        reader.read(&mut decoded, &mut StuffingScanCodec).unwrap();
        assert_eq!(decoded, samples);
        assert_eq!(reader.state(), ReaderState::Done);
        assert_eq!(reader.position(), encoded.len());
    }

    #[test]
    fn round_trip_preserves_near_lossless_and_interleave() {
        let mut parameters = color_parameters(8, 8, InterleaveMode::Sample);
        parameters.near_lossless = 2;
        let samples = gradient_samples(8 * 8 * 3);
        let encoded = encode_to_vec(&parameters, &samples);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&encoded)).unwrap();
        reader.read_header().unwrap();
        assert_eq!(reader.parameters().near_lossless, 2);
        assert_eq!(reader.parameters().interleave_mode, InterleaveMode::Sample);

        let mut decoded = vec![0u8; samples.len()];
        reader.read(&mut decoded, &mut StuffingScanCodec).unwrap();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn round_trip_preserves_preset_parameters_exactly() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(8 * 8);
        let preset = PresetCodingParameters {
            maximum_sample_value: 200,
            threshold1: 4,
            threshold2: 9,
            threshold3: 25,
            reset_value: 48,
        };

        let mut writer = JpegStreamWriter::new();
        writer.init(parameters.frame_info()).unwrap();
        writer.add_preset_parameters(&preset).unwrap();
        writer.add_scan(&samples, &parameters).unwrap();

        let mut buffer = vec![0u8; 512];
        let mut sink = ByteSink::from_buffer(&mut buffer);
        let written = writer.write(&mut sink, &mut StuffingScanCodec).unwrap();
        buffer.truncate(written);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&buffer)).unwrap();
        reader.read_header().unwrap();
        assert_eq!(reader.parameters().preset, preset);

        let mut decoded = vec![0u8; samples.len()];
        reader.read(&mut decoded, &mut StuffingScanCodec).unwrap();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn planar_three_component_round_trip() {
        let parameters = color_parameters(8, 8, InterleaveMode::None);
        let plane_size = 8 * 8;
        let planes: Vec<Vec<u8>> = (0..3)
            .map(|c| (0..plane_size).map(|i| (c * 80 + i % 60) as u8).collect())
            .collect();

        let mut writer = JpegStreamWriter::new();
        writer.init(parameters.frame_info()).unwrap();
        for plane in &planes {
            writer.add_scan(plane, &parameters).unwrap();
        }

        let mut buffer = vec![0u8; 1024];
        let mut sink = ByteSink::from_buffer(&mut buffer);
        let written = writer.write(&mut sink, &mut StuffingScanCodec).unwrap();
        buffer.truncate(written);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&buffer)).unwrap();
        reader.read_header().unwrap();

        let mut decoded = vec![0u8; 3 * plane_size];
        reader.read(&mut decoded, &mut StuffingScanCodec).unwrap();
        for (c, plane) in planes.iter().enumerate() {
            assert_eq!(
                &decoded[c * plane_size..(c + 1) * plane_size],
                plane.as_slice(),
                "plane {c} mismatch"
            );
        }
    }

    #[test]
    fn sixteen_bit_samples_round_trip() {
        let parameters = gray_parameters(4, 4, 12);
        let samples = gradient_samples(4 * 4 * 2);
        let encoded = encode_to_vec(&parameters, &samples);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&encoded)).unwrap();
        reader.read_header().unwrap();
        assert_eq!(reader.parameters().bits_per_sample, 12);

        let mut decoded = vec![0u8; samples.len()];
        reader.read(&mut decoded, &mut StuffingScanCodec).unwrap();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn marker_ordering_soi_first_eoi_last_payload_after_scan_header() {
        let parameters = gray_parameters(4, 4, 8);
        let samples: Vec<u8> = (0..16).collect();
        let encoded = encode_to_vec(&parameters, &samples);

        assert_eq!(&encoded[..2], &[0xFF, 0xD8], "stream must begin with SOI");
        assert_eq!(&encoded[encoded.len() - 2..], &[0xFF, 0xD9], "stream must end with EOI");

        let sos = encoded
            .windows(2)
            .position(|w| w == [0xFF, 0xDA])
            .expect("scan header present");
        // SOS header for one component: marker (2) + length (2) + payload (6).
        let payload = sos + 2 + 2 + 6;
        assert_eq!(encoded[payload], samples[0], "entropy payload follows its scan header");
    }

    #[test]
    fn buffer_one_byte_short_fails_one_byte_long_leaves_one() {
        let parameters = gray_parameters(4, 4, 8);
        let samples: Vec<u8> = (0..16).collect();
        let exact = encode_to_vec(&parameters, &samples).len();

        fn make_writer<'a>(
            parameters: &jpegls_stream::JlsParameters,
            samples: &'a [u8],
        ) -> JpegStreamWriter<'a> {
            let mut writer = JpegStreamWriter::new();
            writer.init(parameters.frame_info()).unwrap();
            writer.add_scan(samples, parameters).unwrap();
            writer
        }

        let mut short = vec![0u8; exact - 1];
        let mut sink = ByteSink::from_buffer(&mut short);
        assert_eq!(
            make_writer(&parameters, &samples).write(&mut sink, &mut StuffingScanCodec),
            Err(jpegls_stream::JlsError::UncompressedBufferTooSmall)
        );

        let mut long = vec![0u8; exact + 1];
        let mut sink = ByteSink::from_buffer(&mut long);
        let mut writer = make_writer(&parameters, &samples);
        let written = writer.write(&mut sink, &mut StuffingScanCodec).unwrap();
        assert_eq!(written, exact);
        assert_eq!(writer.bytes_written(), exact);
        assert_eq!(writer.length(), 1);
    }

    #[test]
    fn compare_mode_passes_on_identical_write() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let mut reference = encode_to_vec(&parameters, &samples);

        let mut writer = JpegStreamWriter::new();
        writer.init(parameters.frame_info()).unwrap();
        writer.add_scan(&samples, &parameters).unwrap();
        writer.enable_compare(true);

        let mut sink = ByteSink::from_buffer(&mut reference);
        writer.write(&mut sink, &mut StuffingScanCodec).unwrap();
    }

    #[test]
    fn compare_mode_fails_on_tampered_destination() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let mut reference = encode_to_vec(&parameters, &samples);
        reference[5] ^= 0x40;

        let mut writer = JpegStreamWriter::new();
        writer.init(parameters.frame_info()).unwrap();
        writer.add_scan(&samples, &parameters).unwrap();
        writer.enable_compare(true);

        let mut sink = ByteSink::from_buffer(&mut reference);
        assert_eq!(
            writer.write(&mut sink, &mut StuffingScanCodec),
            Err(jpegls_stream::JlsError::UnexpectedFailure)
        );
    }

    #[test]
    fn stream_backed_sink_produces_identical_bytes() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let buffered = encode_to_vec(&parameters, &samples);

        let mut writer = JpegStreamWriter::new();
        writer.init(parameters.frame_info()).unwrap();
        writer.add_scan(&samples, &parameters).unwrap();

        let mut streamed: Vec<u8> = Vec::new();
        let mut sink = ByteSink::from_stream(&mut streamed);
        let written = writer.write(&mut sink, &mut StuffingScanCodec).unwrap();

        assert_eq!(written, buffered.len());
        assert_eq!(streamed, buffered);
    }

    #[test]
    fn stream_backed_source_round_trips() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let encoded = encode_to_vec(&parameters, &samples);

        let mut cursor: &[u8] = &encoded;
        let mut reader =
            JpegStreamReader::new(ByteSource::Stream(&mut cursor)).unwrap();
        reader.read_header().unwrap();

        let mut decoded = vec![0u8; samples.len()];
        reader.read(&mut decoded, &mut StuffingScanCodec).unwrap();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn jfif_round_trip_with_thumbnail() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let jfif = JfifParameters {
            version: 0x0102,
            units: 1,
            x_density: 96,
            y_density: 96,
            thumbnail_width: 2,
            thumbnail_height: 2,
            thumbnail: (0u8..12).collect(),
        };

        let mut writer = JpegStreamWriter::new();
        writer.init(parameters.frame_info()).unwrap();
        writer.set_jfif(&jfif).unwrap();
        writer.add_scan(&samples, &parameters).unwrap();

        let mut buffer = vec![0u8; 512];
        let mut sink = ByteSink::from_buffer(&mut buffer);
        let written = writer.write(&mut sink, &mut StuffingScanCodec).unwrap();
        buffer.truncate(written);

        // The caller preallocates the thumbnail buffer via set_info.
        let mut seeded = jpegls_stream::JlsParameters::default();
        seeded.jfif.thumbnail = vec![0u8; 12];

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&buffer)).unwrap();
        reader.set_info(&seeded);
        reader.read_header().unwrap();

        let decoded_jfif = &reader.parameters().jfif;
        assert_eq!(decoded_jfif.version, jfif.version);
        assert_eq!(decoded_jfif.units, jfif.units);
        assert_eq!(decoded_jfif.x_density, jfif.x_density);
        assert_eq!(decoded_jfif.y_density, jfif.y_density);
        assert_eq!(decoded_jfif.thumbnail_width, 2);
        assert_eq!(decoded_jfif.thumbnail_height, 2);
        assert_eq!(decoded_jfif.thumbnail, jfif.thumbnail);
    }

    #[test]
    fn jfif_thumbnail_without_preallocated_buffer_fails() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let jfif = JfifParameters {
            version: 0x0102,
            units: 1,
            x_density: 96,
            y_density: 96,
            thumbnail_width: 2,
            thumbnail_height: 2,
            thumbnail: (0u8..12).collect(),
        };

        let mut writer = JpegStreamWriter::new();
        writer.init(parameters.frame_info()).unwrap();
        writer.set_jfif(&jfif).unwrap();
        writer.add_scan(&samples, &parameters).unwrap();

        let mut buffer = vec![0u8; 512];
        let mut sink = ByteSink::from_buffer(&mut buffer);
        let written = writer.write(&mut sink, &mut StuffingScanCodec).unwrap();
        buffer.truncate(written);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&buffer)).unwrap();
        assert_eq!(
            reader.read_header(),
            Err(jpegls_stream::JlsError::UncompressedBufferTooSmall)
        );
    }

    #[test]
    fn rect_is_forwarded_to_every_scan_dispatch() {
        let parameters = color_parameters(8, 8, InterleaveMode::None);
        let plane: Vec<u8> = (0..64).collect();

        let mut writer = JpegStreamWriter::new();
        writer.init(parameters.frame_info()).unwrap();
        for _ in 0..3 {
            writer.add_scan(&plane, &parameters).unwrap();
        }
        let mut buffer = vec![0u8; 1024];
        let mut sink = ByteSink::from_buffer(&mut buffer);
        let written = writer.write(&mut sink, &mut StuffingScanCodec).unwrap();
        buffer.truncate(written);

        let rect = JlsRect { x: 1, y: 2, width: 4, height: 4 };
        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&buffer)).unwrap();
        reader.set_rect(rect);
        reader.read_header().unwrap();

        let mut codec = RectRecordingCodec::new();
        let mut decoded = vec![0u8; 3 * 64];
        reader.read(&mut decoded, &mut codec).unwrap();
        assert_eq!(codec.rects, vec![rect; 3]);
    }

    #[test]
    fn empty_rect_defaults_to_full_frame() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let encoded = encode_to_vec(&parameters, &samples);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&encoded)).unwrap();
        reader.read_header().unwrap();

        let mut codec = RectRecordingCodec::new();
        let mut decoded = vec![0u8; 64];
        reader.read(&mut decoded, &mut codec).unwrap();
        assert_eq!(codec.rects, vec![JlsRect { x: 0, y: 0, width: 8, height: 8 }]);
    }

    #[test]
    fn explicit_scan_activation_then_read() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let encoded = encode_to_vec(&parameters, &samples);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&encoded)).unwrap();
        reader.read_header().unwrap();
        assert_eq!(reader.state(), ReaderState::ScanReady);

        reader.read_start_of_scan(true).unwrap();
        assert_eq!(reader.state(), ReaderState::ScanActive);

        let mut decoded = vec![0u8; 64];
        reader.read(&mut decoded, &mut StuffingScanCodec).unwrap();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn destination_too_small_is_reported_before_dispatch() {
        let parameters = gray_parameters(8, 8, 8);
        let samples = gradient_samples(64);
        let encoded = encode_to_vec(&parameters, &samples);

        let mut reader = JpegStreamReader::new(ByteSource::Buffer(&encoded)).unwrap();
        reader.read_header().unwrap();

        let mut decoded = vec![0u8; 63];
        assert_eq!(
            reader.read(&mut decoded, &mut StuffingScanCodec),
            Err(jpegls_stream::JlsError::UncompressedBufferTooSmall)
        );
    }
}
