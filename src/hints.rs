//! Decode hints
//!
//! Purely advisory knobs for the scanner, built in the same chained style
//! as the scanner configuration upstream:
//!
//! ```
//! use zedcode::{BarcodeFormat, DecodeHints};
//!
//! let hints = DecodeHints::new()
//!     .formats([BarcodeFormat::QrCode, BarcodeFormat::Ean13])
//!     .try_harder(true);
//! ```

use std::collections::HashSet;

use crate::format::BarcodeFormat;

#[derive(Debug, Clone, Default)]
pub struct DecodeHints {
    /// Restrict the formats the dispatcher tries. Empty means "all".
    pub(crate) possible_formats: HashSet<BarcodeFormat>,
    /// Spend more time: scan every row, also scan rows right-to-left.
    pub(crate) try_harder: bool,
    /// Character set to assume for QR byte segments without an ECI.
    pub(crate) character_set: Option<String>,
    /// Treat the trailing Code 39 character as a mod-43 check digit.
    pub(crate) code39_check_digit: bool,
    /// Expand extended Code 39 (+/$/%// pairs) to full ASCII.
    pub(crate) code39_extended: bool,
}

impl DecodeHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn formats(mut self, formats: impl IntoIterator<Item = BarcodeFormat>) -> Self {
        self.possible_formats.extend(formats);
        self
    }

    pub fn try_harder(mut self, enabled: bool) -> Self {
        self.try_harder = enabled;
        self
    }

    pub fn character_set(mut self, charset: impl Into<String>) -> Self {
        self.character_set = Some(charset.into());
        self
    }

    pub fn code39_check_digit(mut self, enabled: bool) -> Self {
        self.code39_check_digit = enabled;
        self
    }

    pub fn code39_extended(mut self, enabled: bool) -> Self {
        self.code39_extended = enabled;
        self
    }

    /// Whether `format` should be attempted under these hints.
    pub(crate) fn allows(&self, format: BarcodeFormat) -> bool {
        self.possible_formats.is_empty() || self.possible_formats.contains(&format)
    }
}
