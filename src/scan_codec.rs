//! Boundary to the pixel-level entropy coder.
//!
//! The container layer does not compress samples itself; it hands each scan's
//! byte range to an external codec and only requires the contract below.

use crate::error::JlsError;
use crate::parameters::{JlsParameters, JlsRect};

/// One scan's worth of entropy coding, consumed by the container layer.
///
/// `parameters` carries the component count, interleave mode, bit depth and
/// preset thresholds for the scan being coded. For planar (non-interleaved)
/// multi-component images the container invokes the codec once per component
/// with `component_count == 1`.
pub trait ScanCodec {
    /// Produces the entropy-coded payload for one scan.
    fn encode_scan(
        &mut self,
        source: &[u8],
        parameters: &JlsParameters,
    ) -> Result<Vec<u8>, JlsError>;

    /// Consumes exactly one scan's entropy-coded bytes from the front of
    /// `source`, writing decoded samples for `rect` into `destination`, and
    /// returns the number of source bytes consumed. The codec stops when it
    /// recognizes a marker-prefix byte pattern, which cannot appear inside
    /// coded data.
    fn decode_scan(
        &mut self,
        source: &[u8],
        parameters: &JlsParameters,
        rect: JlsRect,
        destination: &mut [u8],
    ) -> Result<usize, JlsError>;
}
