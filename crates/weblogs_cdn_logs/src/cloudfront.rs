//! # CloudFront log parsing
//!
//! see <https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/AccessLogs.html#LogFileFormat>
//! and <https://www.w3.org/TR/WD-logfile.html>.

use crate::bulk::BulkPayload;
use crate::errors::{Error, ErrorPolicy, RowError};
use crate::record::{is_header_line, parse_record};
use crate::schema::Schema;
use std::borrow::Cow;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, instrument, warn};

/// Result of turning a complete log file into a [`BulkPayload`].
#[derive(Debug, Default)]
pub struct PayloadSummary {
    pub payload: BulkPayload,
    /// Number of `#` header lines that were skipped.
    pub skipped_headers: usize,
    /// Lines that were skipped, always empty for [`ErrorPolicy::Abort`].
    pub row_errors: Vec<RowError>,
}

impl PayloadSummary {
    fn reject(&mut self, error: Error, policy: ErrorPolicy) -> Result<(), Error> {
        match policy {
            ErrorPolicy::Abort => Err(error),
            ErrorPolicy::Collect => {
                let line = error.line().unwrap_or_default();
                let reason = error.reason();
                warn!("Skipping line {line}: {reason}");

                self.row_errors.push(RowError { line, reason });

                Ok(())
            }
        }
    }
}

/// Reads a CloudFront log file line by line and builds the bulk indexing
/// payload for all of its records.
///
/// Lines are not required to be valid UTF-8. Invalid byte sequences are
/// replaced with `U+FFFD` and the line is processed like any other.
#[instrument(level = "debug", skip(reader))]
pub async fn build_payload(
    reader: impl AsyncBufRead + Unpin,
    policy: ErrorPolicy,
) -> Result<PayloadSummary, Error> {
    let schema = Schema::CLOUDFRONT;

    let mut summary = PayloadSummary::default();
    let mut line_number = 0;

    let mut lines = reader.split(b'\n');
    while let Some(line) = lines.next_segment().await? {
        line_number += 1;

        let line = decode_line(&line);

        if is_header_line(&line) {
            debug!("Skipping header line: {line}");
            summary.skipped_headers += 1;
            continue;
        }

        let values = line.split('\t').collect::<Vec<_>>();

        let record = match parse_record(&values, &schema) {
            Ok(record) => record,
            Err(source) => {
                let error = Error::MalformedRecord {
                    line: line_number,
                    source,
                };
                summary.reject(error, policy)?;
                continue;
            }
        };

        if let Err(source) = summary.payload.push(&record) {
            let error = Error::Encoding {
                line: line_number,
                source,
            };
            summary.reject(error, policy)?;
        }
    }

    Ok(summary)
}

fn decode_line(line: &[u8]) -> Cow<'_, str> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::Bot;
    use crate::record::LogRecord;
    use crate::record::tests::line_with;
    use crate::test_utils::*;
    use claims::{assert_err, assert_matches, assert_ok, assert_some};
    use insta::{assert_debug_snapshot, assert_snapshot};
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, BufReader, ReadBuf};

    #[tokio::test]
    async fn test_basic() {
        let _guard = enable_tracing_output();

        let mut cursor = Cursor::new(include_bytes!("../test_data/cloudfront/basic.log"));
        let summary = assert_ok!(build_payload(&mut cursor, ErrorPolicy::Abort).await);

        assert_eq!(summary.skipped_headers, 2);
        assert!(summary.row_errors.is_empty());
        assert_eq!(summary.payload.len(), 3);

        assert_debug_snapshot!(summary.payload, @r#"
        BulkPayload {
            {"index":{"_index":"weblogs-2024-01-15"}}
            {"timestamp":"2024-01-15 12:30:00","client_ip":"1.2.3.4","client_method":"GET","request_uri_stem":"/index.html","http_response_code":"200","referer_page":"https://www.example.com/","client_user_agent":"Mozilla/5.0%20(compatible;%20Googlebot/2.1;%20+http://www.google.com/bot.html)","bot_detected":"GoogleBot","query_string":"q=1","cf_edge_result":"Hit","host_header":"www.example.com","http_protocol":"https","ssl_protocol":"TLSv1.3","cf_client_result":"Hit"}
            {"index":{"_index":"weblogs-2024-01-15"}}
            {"timestamp":"2024-01-15 12:31:07","client_ip":"5.6.7.8","client_method":"GET","request_uri_stem":"/about.html","http_response_code":"304","referer_page":"-","client_user_agent":"Mozilla/5.0%20(Macintosh;%20Intel%20Mac%20OS%20X%2010_15_7)","bot_detected":"Human","query_string":"-","cf_edge_result":"RefreshHit","host_header":"www.example.com","http_protocol":"https","ssl_protocol":"TLSv1.2","cf_client_result":"RefreshHit"}
            {"index":{"_index":"weblogs-2024-01-16"}}
            {"timestamp":"2024-01-16 00:00:01","client_ip":"2001:db8::1","client_method":"POST","request_uri_stem":"/api/search","http_response_code":"502","referer_page":"https://www.example.com/search","client_user_agent":"Mozilla/5.0%20(compatible;%20bingbot/2.0;%20+http://www.bing.com/bingbot.htm)","bot_detected":"BingBot","query_string":"term=rust","cf_edge_result":"Error","host_header":"www.example.com","http_protocol":"http","ssl_protocol":"-","cf_client_result":"Error"}
        }
        "#);
    }

    #[tokio::test]
    async fn test_comment_and_single_record() {
        let _guard = enable_tracing_output();

        let mut values = (0..33).map(|_| "x").collect::<Vec<_>>();
        values[0] = "2024-01-15";
        values[1] = "12:30:00";
        values[4] = "1.2.3.4";
        values[5] = "GET";
        values[7] = "/index.html";
        values[8] = "200";
        values[9] = "http://ref";
        values[10] = "Googlebot/2.1";
        values[11] = "";
        values[13] = "Hit";
        values[15] = "example.com";
        values[16] = "HTTP/2";
        values[20] = "TLSv1.3";
        let input = format!("#comment header line\n{}\n", values.join("\t"));

        let summary = assert_ok!(build_payload(input.as_bytes(), ErrorPolicy::Abort).await);
        assert_eq!(summary.skipped_headers, 1);

        let lines = summary.payload.as_str().lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"index":{"_index":"weblogs-2024-01-15"}}"#);

        let document = assert_ok!(serde_json::from_str::<LogRecord>(lines[1]));
        assert_eq!(document.timestamp, "2024-01-15 12:30:00");
        assert_eq!(document.client_ip, "1.2.3.4");
        assert_eq!(document.client_method, "GET");
        assert_eq!(document.request_uri_stem, "/index.html");
        assert_eq!(document.http_response_code, "200");
        assert_eq!(document.referer_page, "http://ref");
        assert_eq!(document.client_user_agent, "Googlebot/2.1");
        assert_eq!(document.bot_detected, Bot::GoogleBot);
        assert_eq!(document.query_string, "");
        assert_eq!(document.cf_edge_result, "Hit");
        assert_eq!(document.host_header, "example.com");
        assert_eq!(document.http_protocol, "HTTP/2");
        assert_eq!(document.ssl_protocol, "TLSv1.3");
        assert_eq!(document.cf_client_result, "x");
    }

    #[tokio::test]
    async fn test_headers_only() {
        let _guard = enable_tracing_output();

        let input = "#Version: 1.0\n#Fields: date time\n";
        let summary = assert_ok!(build_payload(input.as_bytes(), ErrorPolicy::Abort).await);

        assert!(summary.payload.is_empty());
        assert_eq!(summary.skipped_headers, 2);
    }

    #[tokio::test]
    async fn test_malformed_record_aborts() {
        let _guard = enable_tracing_output();

        let mut cursor = Cursor::new(include_bytes!("../test_data/cloudfront/malformed.log"));
        let error = assert_err!(build_payload(&mut cursor, ErrorPolicy::Abort).await);

        assert_matches!(error, Error::MalformedRecord { line: 4, .. });
        assert_snapshot!(error, @"Malformed record on line 4: Expected 33 fields, but found 20");
    }

    #[tokio::test]
    async fn test_malformed_record_collected() {
        let _guard = enable_tracing_output();

        let mut cursor = Cursor::new(include_bytes!("../test_data/cloudfront/malformed.log"));
        let summary = assert_ok!(build_payload(&mut cursor, ErrorPolicy::Collect).await);

        assert_eq!(summary.payload.len(), 2);
        assert_eq!(
            summary.payload.indices().iter().collect::<Vec<_>>(),
            ["weblogs-2024-01-15", "weblogs-2024-01-16"]
        );

        assert_eq!(
            summary.row_errors,
            vec![RowError {
                line: 4,
                reason: "Expected 33 fields, but found 20".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_line() {
        let _guard = enable_tracing_output();

        let input = "#Version: 1.0\n\n";
        let error = assert_err!(build_payload(input.as_bytes(), ErrorPolicy::Abort).await);
        assert_snapshot!(error, @"Malformed record on line 2: Expected 33 fields, but found 1");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let _guard = enable_tracing_output();

        let line = line_with(&[(0, "2024-01-15"), (10, "Mozilla/5.0 caf|")]);
        let (before, after) = assert_some!(line.split_once('|'));

        let mut input = Vec::new();
        input.extend_from_slice(b"#Version: 1.0\n");
        input.extend_from_slice(line_with(&[(0, "2024-01-15")]).as_bytes());
        input.push(b'\n');
        input.extend_from_slice(before.as_bytes());
        input.push(0xe9);
        input.extend_from_slice(after.as_bytes());
        input.push(b'\n');
        input.extend_from_slice(line_with(&[(0, "2024-01-16")]).as_bytes());
        input.extend_from_slice(b"\r\n");

        for policy in [ErrorPolicy::Abort, ErrorPolicy::Collect] {
            let summary = assert_ok!(build_payload(&input[..], policy).await);
            assert!(summary.row_errors.is_empty());
            assert_eq!(summary.payload.len(), 3);

            let lines = summary.payload.as_str().lines().collect::<Vec<_>>();
            let document = assert_ok!(serde_json::from_str::<LogRecord>(lines[3]));
            assert_eq!(document.client_user_agent, "Mozilla/5.0 caf\u{FFFD}");
            assert_eq!(document.bot_detected, Bot::Human);

            let document = assert_ok!(serde_json::from_str::<LogRecord>(lines[5]));
            assert_eq!(document.timestamp, "2024-01-16 v1");
        }
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::other("connection reset")))
        }
    }

    #[tokio::test]
    async fn test_read_error() {
        let _guard = enable_tracing_output();

        let reader = (&b"#Version: 1.0\n"[..]).chain(FailingReader);
        let reader = BufReader::new(reader);

        let error = assert_err!(build_payload(reader, ErrorPolicy::Collect).await);
        assert_snapshot!(error, @"Failed to read log file: connection reset");
    }
}
