use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufRead, AsyncRead, ReadBuf};

/// Streaming decompression for log files, selected by their file extension.
///
/// CloudFront delivers its standard logs as `.gz` files, `.zst` is accepted
/// for logs that were recompressed before being uploaded.
pub enum Decompressor<T> {
    Gzip(GzipDecoder<T>),
    Zstd(ZstdDecoder<T>),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UnsupportedCompression {
    #[error("Unsupported log file extension: {0}")]
    Extension(String),
    #[error("Log file has no extension")]
    MissingExtension,
}

impl<T: AsyncBufRead> Decompressor<T> {
    pub fn from_extension(
        inner: T,
        extension: Option<&str>,
    ) -> Result<Self, UnsupportedCompression> {
        match extension {
            Some("gz") => Ok(Decompressor::gzip(inner)),
            Some("zst") => Ok(Decompressor::zstd(inner)),
            Some(ext) => Err(UnsupportedCompression::Extension(ext.to_string())),
            None => Err(UnsupportedCompression::MissingExtension),
        }
    }

    pub fn gzip(inner: T) -> Self {
        Decompressor::Gzip(GzipDecoder::new(inner))
    }

    pub fn zstd(inner: T) -> Self {
        Decompressor::Zstd(ZstdDecoder::new(inner))
    }
}

impl<T: AsyncBufRead + Unpin> AsyncRead for Decompressor<T> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match &mut *self {
            Decompressor::Gzip(inner) => Pin::new(inner).poll_read(cx, buf),
            Decompressor::Zstd(inner) => Pin::new(inner).poll_read(cx, buf),
        }
    }
}
