//! QR Code reading and writing

pub mod bitstream;
pub mod decoder;
pub mod detector;
pub mod eci;
pub mod encoder;
pub mod finder;
pub mod format_info;
pub mod mask;
pub mod matrix_builder;
pub mod mode;
pub mod version;

pub use encoder::{encode, QrCode};
pub use format_info::ErrorCorrectionLevel;
pub use mode::Mode;

use crate::common::BitMatrix;
use crate::format::BarcodeFormat;
use crate::hints::DecodeHints;
use crate::symbol::{MetadataKey, MetadataValue, Symbol};
use crate::Result;

/// Detect and decode one QR code in a binarized image.
pub fn read(image: &BitMatrix, hints: &DecodeHints) -> Result<Symbol> {
    let detected = detector::detect(image, hints.try_harder)?;
    let result = decoder::decode_matrix(&detected.bits, hints)?;

    let mut symbol = Symbol::with_bytes(
        result.text,
        result.bytes,
        detected.points,
        BarcodeFormat::QrCode,
    );
    if let Some(charset) = result.charset {
        symbol.put_metadata(MetadataKey::CharacterSet, MetadataValue::Text(charset));
    }
    if result.fnc1 {
        symbol.put_metadata(MetadataKey::Gs1, MetadataValue::Flag(true));
    }
    Ok(symbol)
}

/// Decode a bare module grid (one cell per module, no quiet zone), for
/// callers that already hold the sampled matrix.
pub fn read_matrix(matrix: &BitMatrix, hints: &DecodeHints) -> Result<Symbol> {
    let result = decoder::decode_matrix(matrix, hints)?;
    let mut symbol = Symbol::with_bytes(result.text, result.bytes, Vec::new(), BarcodeFormat::QrCode);
    if let Some(charset) = result.charset {
        symbol.put_metadata(MetadataKey::CharacterSet, MetadataValue::Text(charset));
    }
    Ok(symbol)
}
