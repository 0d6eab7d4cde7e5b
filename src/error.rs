//! Error types and result handling
//!
//! Every fallible operation in the crate returns [`Result`]. The variants
//! mirror the distinct failure classes the scanner dispatcher cares about:
//! `NotFound` is caught to try the next row or symbology, `Checksum` and
//! `Format` abort the current symbol but not the whole scan, and the rest
//! surface to the caller.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No barcode was found. Raised on every failed candidate during finder
    /// search and row scanning, so it carries no payload at all.
    NotFound,
    /// A symbol was located but its structural bits (format info, version
    /// info, segment modes) are invalid and uncorrectable.
    Format(&'static str),
    /// Reed-Solomon correction exhausted its capacity, or a 1D check digit
    /// did not verify.
    Checksum,
    /// The requested character set is not available.
    Unsupported(String),
    /// Encoder input cannot fit any version at the requested error
    /// correction level, or contains characters invalid for the mode.
    Writer(String),
    /// Programmer error: null required field, out-of-range value.
    InvalidArgument(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no barcode found"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Checksum => write!(f, "checksum error"),
            Self::Unsupported(what) => write!(f, "unsupported encoding: {what}"),
            Self::Writer(msg) => write!(f, "writer error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(Error::NotFound.to_string(), "no barcode found");
        assert_eq!(Error::Checksum.to_string(), "checksum error");
        assert_eq!(
            Error::Format("bad mode indicator").to_string(),
            "format error: bad mode indicator"
        );
    }
}
