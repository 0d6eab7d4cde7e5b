//! Zedcode barcode engine
//!
//! A pure Rust library for reading and writing 1D and 2D optical barcodes
//! from raster images and bit streams: a full QR Code codec (encode and
//! decode), row decoders for the UPC/EAN family, Code 39 and Code 128,
//! and the binarization and grid-sampling primitives that feed them.
//!
//! # Reading
//!
//! ```no_run
//! use zedcode::{GrayImage, Scanner};
//!
//! # fn main() -> zedcode::Result<()> {
//! let pixels: Vec<u8> = vec![/* 8-bit luminance, row-major */];
//! let image = GrayImage::new(pixels, 640, 480)?;
//! let symbol = Scanner::new().decode(&image)?;
//! println!("{}: {}", symbol.format(), symbol.text().unwrap_or(""));
//! # Ok(())
//! # }
//! ```
//!
//! # Writing
//!
//! ```
//! use zedcode::qr::{self, ErrorCorrectionLevel};
//! use zedcode::DecodeHints;
//!
//! let code = qr::encode("HELLO WORLD", ErrorCorrectionLevel::M, &DecodeHints::new()).unwrap();
//! let matrix = code.to_bit_matrix();
//! assert_eq!(matrix.width(), 21);
//! ```
//!
//! # Interpreting results
//!
//! Decoded text often carries structure (contact cards, geo URIs, phone
//! numbers); [`client::parse`] runs the recognizer chain over a symbol:
//!
//! ```
//! use zedcode::client::{parse_text, ParsedResult};
//!
//! match parse_text("geo:52.5,13.4") {
//!     ParsedResult::Geo(geo) => assert_eq!(geo.latitude, 52.5),
//!     _ => unreachable!(),
//! }
//! ```

// Public modules
pub mod binarize;
pub mod client;
pub mod common;
pub mod error;
pub mod format;
pub mod hints;
pub mod luminance;
pub mod oned;
pub mod qr;
pub mod scanner;
pub mod symbol;

// Re-export the main types
pub use common::{install_grid_sampler, GridSampler};
pub use error::{Error, Result};
pub use format::BarcodeFormat;
pub use hints::DecodeHints;
pub use luminance::{GrayImage, LuminanceSource};
pub use scanner::Scanner;
pub use symbol::{MetadataKey, MetadataValue, Point, Symbol};
