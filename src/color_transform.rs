//! Wire packing of the HP color-transform APP8 value.
//!
//! On the wire the transform tag and an optional endianness flag share one
//! 32-bit big-endian integer: bit 29 marks big-endian samples, bit 30
//! little-endian. Internally the two are always kept apart; packing and
//! unpacking happen only here, at the marker boundary.

use crate::error::JlsError;
use crate::{ColorTransformation, TransformEndianness};

const BIG_ENDIAN_FLAG: u32 = 1 << 29;
const LITTLE_ENDIAN_FLAG: u32 = 1 << 30;
const ENDIANNESS_MASK: u32 = BIG_ENDIAN_FLAG | LITTLE_ENDIAN_FLAG;

pub fn pack(
    transformation: ColorTransformation,
    endianness: Option<TransformEndianness>,
) -> u32 {
    let flag = match endianness {
        Some(TransformEndianness::Big) => BIG_ENDIAN_FLAG,
        Some(TransformEndianness::Little) => LITTLE_ENDIAN_FLAG,
        None => 0,
    };
    transformation as u32 | flag
}

pub fn unpack(
    value: u32,
) -> Result<(ColorTransformation, Option<TransformEndianness>), JlsError> {
    let endianness = match value & ENDIANNESS_MASK {
        0 => None,
        BIG_ENDIAN_FLAG => Some(TransformEndianness::Big),
        LITTLE_ENDIAN_FLAG => Some(TransformEndianness::Little),
        _ => return Err(JlsError::InvalidCompressedData),
    };

    let base = value & !ENDIANNESS_MASK;
    let tag = u8::try_from(base).map_err(|_| JlsError::UnsupportedColorTransform)?;
    let transformation =
        ColorTransformation::try_from(tag).map_err(|_| JlsError::UnsupportedColorTransform)?;
    Ok((transformation, endianness))
}
