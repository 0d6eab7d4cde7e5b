//! Command-line barcode scanner
//!
//! Reads one or more image files, scans each for a barcode, and prints the
//! decoded text. Exit codes: 0 on success, 1 when nothing was found, 2 on
//! a checksum failure, 3 on invalid input.

use std::process::ExitCode;

use clap::Parser;
use zedcode::client::{self, ParsedResult};
use zedcode::{BarcodeFormat, DecodeHints, Error, GrayImage, Scanner};

/// Scan and decode bar codes from one or more image files
#[derive(Parser)]
#[command(name = "zedcodeimg", version)]
#[command(about = "Scan and decode bar codes from one or more image files", long_about = None)]
struct Args {
    /// Minimal output, only print decoded symbol data
    #[arg(short, long)]
    quiet: bool,

    /// Print the parsed interpretation (contact card, URL, geo, ...)
    #[arg(long)]
    parse: bool,

    /// Spend more time: scan every row, also right-to-left
    #[arg(long)]
    try_harder: bool,

    /// Character set to assume for QR byte segments without an ECI
    #[arg(long)]
    charset: Option<String>,

    /// Only look for the given formats (qr, ean13, ean8, upca, upce,
    /// code39, code128); repeatable
    #[arg(long = "format")]
    formats: Vec<String>,

    /// Treat the trailing Code 39 character as a check digit
    #[arg(long)]
    code39_check_digit: bool,

    /// Expand extended Code 39 sequences to full ASCII
    #[arg(long)]
    code39_extended: bool,

    /// Image files to scan
    #[arg(required = true)]
    files: Vec<String>,
}

fn parse_format(name: &str) -> Option<BarcodeFormat> {
    Some(match name.to_ascii_lowercase().as_str() {
        "qr" | "qrcode" => BarcodeFormat::QrCode,
        "ean13" => BarcodeFormat::Ean13,
        "ean8" => BarcodeFormat::Ean8,
        "upca" => BarcodeFormat::UpcA,
        "upce" => BarcodeFormat::UpcE,
        "code39" => BarcodeFormat::Code39,
        "code128" => BarcodeFormat::Code128,
        _ => return None,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut hints = DecodeHints::new()
        .try_harder(args.try_harder)
        .code39_check_digit(args.code39_check_digit)
        .code39_extended(args.code39_extended);
    if let Some(charset) = &args.charset {
        hints = hints.character_set(charset.clone());
    }
    for name in &args.formats {
        match parse_format(name) {
            Some(format) => hints = hints.formats([format]),
            None => {
                eprintln!("unknown format '{name}'");
                return ExitCode::from(3);
            }
        }
    }
    let scanner = Scanner::with_hints(hints);

    let mut found = 0usize;
    let mut checksum_failures = 0usize;
    for filename in &args.files {
        let img = match image::ImageReader::open(filename).map(|r| r.decode()) {
            Ok(Ok(img)) => img,
            Ok(Err(e)) => {
                eprintln!("failed to decode image '{filename}': {e}");
                return ExitCode::from(3);
            }
            Err(e) => {
                eprintln!("failed to open '{filename}': {e}");
                return ExitCode::from(3);
            }
        };

        let gray = img.to_luma8();
        let (width, height) = gray.dimensions();
        let image = match GrayImage::new(gray.into_raw(), width as usize, height as usize) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("bad image '{filename}': {e}");
                return ExitCode::from(3);
            }
        };

        match scanner.decode(&image) {
            Ok(symbol) => {
                found += 1;
                let text = symbol.text().unwrap_or("");
                if args.quiet {
                    println!("{text}");
                } else {
                    println!("{}:{text}", symbol.format());
                }
                if args.parse {
                    describe(&client::parse(&symbol));
                }
            }
            Err(Error::NotFound) => {
                if !args.quiet {
                    eprintln!("{filename}: no barcode found");
                }
            }
            Err(Error::Checksum) => {
                checksum_failures += 1;
                if !args.quiet {
                    eprintln!("{filename}: symbol found but checksum failed");
                }
            }
            Err(e) => {
                if !args.quiet {
                    eprintln!("{filename}: {e}");
                }
            }
        }
    }

    if found > 0 {
        if !args.quiet {
            eprintln!("scanned {found} barcode(s) from {} image(s)", args.files.len());
        }
        ExitCode::SUCCESS
    } else if checksum_failures > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn describe(parsed: &ParsedResult) {
    match parsed {
        ParsedResult::AddressBook(card) => {
            println!("  [{}] {}", parsed.type_name(), card.names.join(", "));
        }
        ParsedResult::Geo(geo) => {
            println!("  [GEO] {},{},{}", geo.latitude, geo.longitude, geo.altitude);
        }
        ParsedResult::Uri(uri) => println!("  [URI] {}", uri.uri),
        ParsedResult::Tel(tel) => println!("  [TEL] {}", tel.number),
        ParsedResult::Email(email) => println!("  [EMAIL] {}", email.to),
        ParsedResult::Sms(sms) => println!("  [SMS] {}", sms.numbers.join(",")),
        ParsedResult::Calendar(event) => println!("  [CALENDAR] {}", event.start),
        ParsedResult::Text(_) => {}
    }
}
