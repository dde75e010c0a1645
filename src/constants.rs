pub const DEFAULT_RESET_VALUE: i32 = 64; // Default RESET value as defined in ISO/IEC 14495-1, table C.2

pub const MINIMUM_COMPONENT_COUNT: i32 = 1;
pub const MAXIMUM_COMPONENT_COUNT: i32 = 255;
pub const MAXIMUM_COMPONENT_COUNT_IN_SCAN: i32 = 4;
pub const MINIMUM_BITS_PER_SAMPLE: i32 = 2;
pub const MAXIMUM_BITS_PER_SAMPLE: i32 = 16;
pub const MAXIMUM_NEAR_LOSSLESS: i32 = 255;

// SOF55 stores width and height in 16-bit fields.
pub const MAXIMUM_FRAME_DIMENSION: u32 = u16::MAX as u32;

// The size in bytes of the segment length field.
pub const SEGMENT_LENGTH_SIZE: usize = 2;

// The maximum size of the data bytes that fit in a segment.
pub const SEGMENT_MAX_DATA_SIZE: usize = u16::MAX as usize - SEGMENT_LENGTH_SIZE;

// JFIF APP0 payload: identifier + version + units + densities + thumbnail dimensions.
pub const JFIF_IDENTIFIER: [u8; 5] = [b'J', b'F', b'I', b'F', 0];
pub const JFIF_FIXED_SEGMENT_SIZE: usize = 16;

// HP color-transform APP8 payload: identifier + packed 32-bit transform value.
pub const COLOR_TRANSFORM_IDENTIFIER: [u8; 4] = [b'm', b'r', b'f', b'x'];
pub const COLOR_TRANSFORM_SEGMENT_SIZE: usize = 10;
