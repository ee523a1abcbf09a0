use crate::bots::{Bot, classify};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// Prefix of the daily index every record is routed to.
pub const INDEX_PREFIX: &str = "weblogs-";

const HEADER_PREFIX: char = '#';

/// Returns `true` for `#Version:`, `#Fields:` and other comment lines.
///
/// Header lines never reach [`parse_record`].
pub fn is_header_line(line: &str) -> bool {
    line.starts_with(HEADER_PREFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Expected {expected} fields, but found {actual}")]
pub struct MalformedRecord {
    pub expected: usize,
    pub actual: usize,
}

/// A single request from an edge server access log.
///
/// All values are copied verbatim from the log line. CloudFront uses `-` for
/// empty values and percent-encodes some columns, neither is undone here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// `date` and `time` columns, joined by a single space.
    pub timestamp: String,
    pub client_ip: String,
    pub client_method: String,
    pub request_uri_stem: String,
    pub http_response_code: String,
    pub referer_page: String,
    pub client_user_agent: String,
    pub bot_detected: Bot,
    pub query_string: String,
    pub cf_edge_result: String,
    pub host_header: String,
    pub http_protocol: String,
    pub ssl_protocol: String,
    pub cf_client_result: String,
    #[serde(skip)]
    index_target: String,
}

impl LogRecord {
    /// Name of the index this record is written to, e.g. `weblogs-2024-01-15`.
    pub fn index_target(&self) -> &str {
        &self.index_target
    }
}

/// Turns the tab-separated values of one log line into a [`LogRecord`].
///
/// Only the number of values is validated. Field contents are accepted as
/// they are, so an unparsable date or status code still produces a record.
pub fn parse_record(values: &[&str], schema: &Schema) -> Result<LogRecord, MalformedRecord> {
    if values.len() != schema.num_fields {
        return Err(MalformedRecord {
            expected: schema.num_fields,
            actual: values.len(),
        });
    }

    let value = |index: usize| values[index].to_string();

    let date = values[schema.date];
    let time = values[schema.time];
    let user_agent = values[schema.user_agent];

    Ok(LogRecord {
        timestamp: format!("{date} {time}"),
        client_ip: value(schema.client_ip),
        client_method: value(schema.method),
        request_uri_stem: value(schema.uri_stem),
        http_response_code: value(schema.status),
        referer_page: value(schema.referer),
        client_user_agent: user_agent.to_string(),
        bot_detected: classify(user_agent),
        query_string: value(schema.query_string),
        cf_edge_result: value(schema.edge_result_type),
        host_header: value(schema.host_header),
        http_protocol: value(schema.protocol),
        ssl_protocol: value(schema.ssl_protocol),
        cf_client_result: value(schema.edge_response_result_type),
        index_target: format!("{INDEX_PREFIX}{date}"),
    })
}
