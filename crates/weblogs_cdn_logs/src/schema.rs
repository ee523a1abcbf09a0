//! Column layout of the supported edge log formats.
//!
//! see <https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/AccessLogs.html#LogFileFormat>

/// Column positions of the fields that end up in a [`LogRecord`](crate::LogRecord).
///
/// Supporting another log format version means adding another constant,
/// the parser itself only ever looks at the positions stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Number of tab-separated values a record must have.
    pub num_fields: usize,
    pub date: usize,
    pub time: usize,
    pub client_ip: usize,
    pub method: usize,
    pub uri_stem: usize,
    pub status: usize,
    pub referer: usize,
    pub user_agent: usize,
    pub query_string: usize,
    pub edge_result_type: usize,
    pub host_header: usize,
    pub protocol: usize,
    pub ssl_protocol: usize,
    pub edge_response_result_type: usize,
}

impl Schema {
    /// The 33 column standard log format written by CloudFront.
    pub const CLOUDFRONT: Schema = Schema {
        num_fields: 33,
        date: 0,
        time: 1,
        client_ip: 4,
        method: 5,
        uri_stem: 7,
        status: 8,
        referer: 9,
        user_agent: 10,
        query_string: 11,
        edge_result_type: 13,
        host_header: 15,
        protocol: 16,
        ssl_protocol: 20,
        edge_response_result_type: 22,
    };

    /// Returns the highest column index referenced by this schema.
    pub fn max_index(&self) -> usize {
        [
            self.date,
            self.time,
            self.client_ip,
            self.method,
            self.uri_stem,
            self.status,
            self.referer,
            self.user_agent,
            self.query_string,
            self.edge_result_type,
            self.host_header,
            self.protocol,
            self.ssl_protocol,
            self.edge_response_result_type,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::CLOUDFRONT
    }
}
