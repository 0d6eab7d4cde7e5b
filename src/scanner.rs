//! Scanner: the one-call decode entry point
//!
//! Tries the enabled symbologies in order over a luminance image. A
//! NotFound from one symbology just moves on to the next; Checksum and
//! Format failures abort that symbology but are remembered, so the caller
//! learns that a symbol was seen even when it would not decode.

use crate::binarize::{Binarizer, HybridBinarizer};
use crate::format::BarcodeFormat;
use crate::hints::DecodeHints;
use crate::luminance::LuminanceSource;
use crate::symbol::Symbol;
use crate::{oned, qr, Error, Result};

pub struct Scanner {
    hints: DecodeHints,
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            hints: DecodeHints::new(),
        }
    }

    pub fn with_hints(hints: DecodeHints) -> Self {
        Self { hints }
    }

    pub fn hints(&self) -> &DecodeHints {
        &self.hints
    }

    /// Find and decode the first barcode in the image.
    pub fn decode(&self, source: &dyn LuminanceSource) -> Result<Symbol> {
        let mut best_error = Error::NotFound;

        if self.hints.allows(BarcodeFormat::QrCode) {
            match self.decode_qr(source) {
                Ok(symbol) => return Ok(symbol),
                Err(Error::NotFound) => {}
                Err(error @ (Error::Checksum | Error::Format(_))) => best_error = error,
                Err(error) => return Err(error),
            }
        }

        match oned::decode(source, &self.hints) {
            Ok(symbol) => Ok(symbol),
            Err(Error::NotFound) => Err(best_error),
            Err(error @ (Error::Checksum | Error::Format(_))) => Err(error),
            Err(error) => Err(error),
        }
    }

    fn decode_qr(&self, source: &dyn LuminanceSource) -> Result<Symbol> {
        let matrix = HybridBinarizer::new().black_matrix(source)?;
        qr::read(&matrix, &self.hints)
    }

    /// Decode an already-sampled QR module grid.
    pub fn decode_matrix(&self, matrix: &crate::common::BitMatrix) -> Result<Symbol> {
        qr::read_matrix(matrix, &self.hints)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luminance::GrayImage;

    #[test]
    fn blank_image_is_not_found() {
        // A featureless image fails binarization, which reads as NotFound.
        let image = GrayImage::new(vec![200; 100 * 100], 100, 100).unwrap();
        assert_eq!(Scanner::new().decode(&image).unwrap_err(), Error::NotFound);
    }

    #[test]
    fn hints_can_disable_every_reader() {
        let image = GrayImage::new(vec![200; 100 * 100], 100, 100).unwrap();
        let scanner =
            Scanner::with_hints(DecodeHints::new().formats([BarcodeFormat::Pdf417]));
        assert_eq!(scanner.decode(&image).unwrap_err(), Error::NotFound);
    }
}
