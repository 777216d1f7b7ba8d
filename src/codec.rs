//! Share token codec
//!
//! A share token is a note's markup compressed with gzip and written in the
//! URL-fragment-safe base64 alphabet:
//!
//! ```text
//! markup --UTF-8--> bytes --gzip--> bytes --base64--> text --(+ -> -, / -> _, strip =)--> token
//! ```
//!
//! Decoding runs the same chain backwards. The round trip is lossless for
//! every string, and every way a foreign or damaged token can fail surfaces
//! as a decompression error rather than as altered text.
//!
//! # Examples
//!
//! ```
//! use hashnote::codec::{compress, decompress};
//!
//! let token = compress("<p>Hello</p>").expect("compress");
//! assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
//! assert_eq!(decompress(&token).expect("decompress"), "<p>Hello</p>");
//! assert_eq!(compress("").expect("empty"), "");
//! ```

use std::io::{Read, Write};
use std::time::Instant;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{debug, warn};

use crate::error::CodecError;

/// Default gzip level
pub const DEFAULT_LEVEL: u32 = 6;

/// Default cap on decompressed document size (8 MiB)
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 8 * 1024 * 1024;

/// Sample used by the capability probe; includes multi-byte characters
const PROBE_SAMPLE: &str = "<p>probe \u{1f600} e\u{301}</p>";

/// Standard alphabet; decoding tolerates non-zero trailing bits and any padding
const STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Codec options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// gzip compression level, 0-9
    pub level: u32,
    /// Largest document `decompress` will produce
    pub max_decompressed_bytes: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

/// Markup <-> share token codec
///
/// Obtain one through [`ContentCodec::probe`], which checks the compression
/// stage before any note is loaded or saved.
#[derive(Debug, Clone, Copy)]
pub struct ContentCodec {
    options: CodecOptions,
}

impl ContentCodec {
    /// Capability probe
    ///
    /// Round-trips a fixed sample through the full chain. Failure means the
    /// editing session must not start.
    pub fn probe(options: CodecOptions) -> Result<Self, CodecError> {
        if options.level > 9 {
            return Err(CodecError::CompressionUnavailable(format!(
                "gzip level {} is outside 0-9",
                options.level
            )));
        }

        let codec = Self { options };
        let token = codec
            .compress(PROBE_SAMPLE)
            .map_err(|e| CodecError::CompressionUnavailable(e.to_string()))?;
        match codec.decompress(&token) {
            Ok(text) if text == PROBE_SAMPLE => {
                debug!(level = options.level, "compression probe passed");
                Ok(codec)
            }
            Ok(_) => Err(CodecError::CompressionUnavailable(
                "probe round trip altered the sample".to_string(),
            )),
            Err(e) => Err(CodecError::CompressionUnavailable(e.to_string())),
        }
    }

    /// Options this codec was probed with
    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Compress markup into a share token
    pub fn compress(&self, text: &str) -> Result<String, CodecError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let start = Instant::now();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.options.level));
        encoder
            .write_all(text.as_bytes())
            .map_err(CodecError::CompressionFailed)?;
        let compressed = encoder.finish().map_err(CodecError::CompressionFailed)?;

        let token = to_url_safe(STANDARD.encode(&compressed));
        debug!(
            text_bytes = text.len(),
            compressed_bytes = compressed.len(),
            token_len = token.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "compressed note"
        );
        Ok(token)
    }

    /// Decode a share token back into markup
    pub fn decompress(&self, token: &str) -> Result<String, CodecError> {
        if token.is_empty() {
            return Ok(String::new());
        }

        self.decode_token(token).inspect_err(|e| {
            warn!(token_len = token.len(), code = e.code(), error = %e, "rejected share token");
        })
    }

    fn decode_token(&self, token: &str) -> Result<String, CodecError> {
        let compressed = STANDARD.decode(from_url_safe(token))?;

        let limit = self.options.max_decompressed_bytes;
        // bufread decoder so that into_inner() reports exactly the unread bytes
        let mut decoder = GzDecoder::new(compressed.as_slice());
        let mut bytes = Vec::new();
        // One byte past the limit distinguishes "exactly at" from "over"
        (&mut decoder)
            .take((limit as u64).saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(CodecError::CorruptStream)?;
        if bytes.len() > limit {
            return Err(CodecError::SizeLimit(limit));
        }

        let remaining = decoder.into_inner();
        if !remaining.is_empty() {
            return Err(CodecError::TrailingData(remaining.len()));
        }

        let text = String::from_utf8(bytes)?;
        debug!(
            token_len = token.len(),
            text_bytes = text.len(),
            "decompressed note"
        );
        Ok(text)
    }
}

/// Compress with default options
pub fn compress(text: &str) -> Result<String, CodecError> {
    ContentCodec {
        options: CodecOptions::default(),
    }
    .compress(text)
}

/// Decompress with default options
pub fn decompress(token: &str) -> Result<String, CodecError> {
    ContentCodec {
        options: CodecOptions::default(),
    }
    .decompress(token)
}

/// Map standard base64 onto the token alphabet and drop padding
fn to_url_safe(mut encoded: String) -> String {
    let trimmed = encoded.trim_end_matches('=').len();
    encoded.truncate(trimmed);
    encoded
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

/// Map the token alphabet back onto standard base64 and restore padding
fn from_url_safe(token: &str) -> String {
    let mut encoded: String = token
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while encoded.len() % 4 != 0 {
        encoded.push('=');
    }
    encoded
}
