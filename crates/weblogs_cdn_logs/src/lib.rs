//! Turns CDN edge server access logs into bulk indexing requests.
//!
//! A log file is read line by line, each record is parsed according to a
//! [`Schema`], tagged with the crawler that sent it (see [`bots`]) and then
//! appended to a [`BulkPayload`].

pub mod bots;
mod bulk;
pub mod cloudfront;
mod compression;
mod errors;
mod record;
mod schema;
#[cfg(test)]
mod test_utils;

pub use crate::bots::{Bot, classify};
pub use crate::bulk::BulkPayload;
pub use crate::cloudfront::{PayloadSummary, build_payload};
pub use crate::compression::{Decompressor, UnsupportedCompression};
pub use crate::errors::{Error, ErrorPolicy, RowError, UnknownErrorPolicy};
pub use crate::record::{INDEX_PREFIX, LogRecord, MalformedRecord, is_header_line, parse_record};
pub use crate::schema::Schema;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use claims::assert_ok;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_compressed_cloudfront() {
        let _guard = enable_tracing_output();

        let cursor = Cursor::new(include_bytes!("../test_data/cloudfront/basic.log.gz"));

        let decompressor = assert_ok!(Decompressor::from_extension(cursor, Some("gz")));
        let reader = tokio::io::BufReader::new(decompressor);

        let summary = assert_ok!(build_payload(reader, ErrorPolicy::Abort).await);

        let mut cursor = Cursor::new(include_bytes!("../test_data/cloudfront/basic.log"));
        let uncompressed = assert_ok!(build_payload(&mut cursor, ErrorPolicy::Abort).await);

        assert_eq!(summary.payload.len(), 3);
        assert_eq!(summary.payload.as_str(), uncompressed.payload.as_str());
    }
}
