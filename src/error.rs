//! Error types for the content codec
//!
//! The sanitizer has no error type: disallowed or malformed markup is
//! downgraded, never rejected. Everything that can fail lives in the codec.

use thiserror::Error;

/// Errors that can occur while turning markup into a share token and back
#[derive(Debug, Error)]
pub enum CodecError {
    /// The compression primitive failed its startup probe
    #[error("Compression unavailable: {0}")]
    CompressionUnavailable(String),
    /// The compressor failed on well-formed input
    #[error("Compression failed: {0}")]
    CompressionFailed(#[source] std::io::Error),
    /// The token is not valid base64url
    #[error("Invalid share token: {0}")]
    InvalidToken(#[from] base64::DecodeError),
    /// The decoded bytes are not a valid gzip stream
    #[error("Corrupt compressed stream: {0}")]
    CorruptStream(#[source] std::io::Error),
    /// Bytes remain after the end of the gzip member
    #[error("{0} trailing bytes after compressed stream")]
    TrailingData(usize),
    /// Decompressed output grew past the configured limit
    #[error("Decompressed document exceeds {0} bytes")]
    SizeLimit(usize),
    /// Decompressed bytes are not UTF-8
    #[error("Decompressed document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl CodecError {
    /// Get numeric error code for hosts that surface errors as integers
    pub fn code(&self) -> u32 {
        match self {
            CodecError::CompressionUnavailable(_) => 1,
            CodecError::CompressionFailed(_) => 2,
            CodecError::InvalidToken(_) => 10,
            CodecError::CorruptStream(_) => 11,
            CodecError::TrailingData(_) => 12,
            CodecError::SizeLimit(_) => 13,
            CodecError::InvalidUtf8(_) => 14,
        }
    }

    /// True for every failure raised while decoding a token
    pub fn is_decompression(&self) -> bool {
        self.code() >= 10
    }
}
