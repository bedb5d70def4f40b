//! Line codec for engine streams.
//!
//! Wraps [`tokio_util::codec::AnyDelimiterCodec`] with a `\n` delimiter and
//! a maximum line length so a runaway engine cannot make the server buffer
//! unbounded output. Over-long lines are dropped inside the codec rather than
//! surfaced as errors, because a framed stream ends after its first decode
//! error. Decoded lines are converted to UTF-8 lossily.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tokio_util::codec::FramedRead;
//! use simdeck::engine::codec::EngineCodec;
//!
//! let lines = FramedRead::new(child_stdout, EngineCodec::new());
//! ```

use bytes::BytesMut;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, Encoder};
use tracing::warn;

use crate::{AppError, Result};

/// Maximum line length accepted from the engine: 64 KiB.
pub const MAX_LINE_BYTES: usize = 65_536;

/// Newline-delimited codec for engine stdin/stdout/stderr.
#[derive(Debug)]
pub struct EngineCodec {
    inner: AnyDelimiterCodec,
    max_length: usize,
    discarded: u64,
}

impl EngineCodec {
    /// Create a codec with the default [`MAX_LINE_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_BYTES)
    }

    /// Create a codec with a custom line limit.
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                b"\n".to_vec(),
                b"\n".to_vec(),
                max_length,
            ),
            max_length,
            discarded: 0,
        }
    }

    /// Number of over-long lines dropped so far.
    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn next_line(
        &mut self,
        src: &mut BytesMut,
        eof: bool,
    ) -> Result<Option<String>> {
        loop {
            let decoded = if eof {
                self.inner.decode_eof(src)
            } else {
                self.inner.decode(src)
            };
            match decoded {
                Ok(chunk) => return Ok(chunk.map(|bytes| to_line(&bytes))),
                Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                    self.discarded += 1;
                    warn!(limit = self.max_length, "discarding over-long engine output line");
                }
                Err(AnyDelimiterCodecError::Io(err)) => return Err(AppError::Io(err.to_string())),
            }
        }
    }
}

impl Default for EngineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for EngineCodec {
    type Item = String;
    type Error = AppError;

    /// Decode the next line, without its `\n` or `\r\n` terminator.
    ///
    /// Returns `Ok(None)` while `src` holds no complete line yet.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.next_line(src, false)
    }

    /// Decode the trailing unterminated line when the stream reaches EOF.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.next_line(src, true)
    }
}

impl Encoder<&str> for EngineCodec {
    type Error = AppError;

    /// Encode `item` as a `\n`-terminated line.
    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<()> {
        self.inner.encode(item, dst).map_err(|err| match err {
            AnyDelimiterCodecError::Io(io_err) => AppError::Io(io_err.to_string()),
            AnyDelimiterCodecError::MaxChunkLengthExceeded => {
                AppError::Io("command exceeds line limit".into())
            }
        })
    }
}

fn to_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
