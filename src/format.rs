//! Barcode format tags

use std::fmt;

/// The barcode symbologies this crate knows about.
///
/// Not every format has a registered reader or writer; the tag exists so
/// hints and results can name it either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BarcodeFormat {
    QrCode,
    DataMatrix,
    UpcA,
    UpcE,
    Ean8,
    Ean13,
    Code39,
    Code128,
    Itf,
    Pdf417,
    Rss14,
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::QrCode => "QR-Code",
            Self::DataMatrix => "DataMatrix",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
            Self::Ean8 => "EAN-8",
            Self::Ean13 => "EAN-13",
            Self::Code39 => "CODE-39",
            Self::Code128 => "CODE-128",
            Self::Itf => "ITF",
            Self::Pdf417 => "PDF417",
            Self::Rss14 => "DataBar",
        })
    }
}
