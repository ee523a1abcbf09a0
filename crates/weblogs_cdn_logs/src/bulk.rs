use crate::record::LogRecord;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Debug;

#[derive(Serialize)]
struct Action<'a> {
    index: IndexAction<'a>,
}

#[derive(Serialize)]
struct IndexAction<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
}

/// Newline delimited request body for the bulk indexing API.
///
/// Every record is written as an `index` action line followed by the record
/// itself as a JSON document line. Records are kept in the order they were
/// pushed and can't be removed again.
#[derive(Clone, Default)]
pub struct BulkPayload {
    body: String,
    len: usize,
    indices: BTreeSet<String>,
}

impl BulkPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the action and document lines for the given record.
    ///
    /// Both lines are encoded before anything is written, so a failure
    /// leaves the payload untouched.
    pub fn push(&mut self, record: &LogRecord) -> serde_json::Result<()> {
        let index = record.index_target();

        let action = serde_json::to_string(&Action {
            index: IndexAction { index },
        })?;
        let document = serde_json::to_string(record)?;

        self.body.reserve(action.len() + document.len() + 2);
        self.body.push_str(&action);
        self.body.push('\n');
        self.body.push_str(&document);
        self.body.push('\n');

        self.len += 1;
        if !self.indices.contains(index) {
            self.indices.insert(index.to_string());
        }

        Ok(())
    }

    /// Returns the number of records in the payload.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the names of all indices that the payload writes to.
    pub fn indices(&self) -> &BTreeSet<String> {
        &self.indices
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn into_string(self) -> String {
        self.body
    }
}

impl Debug for BulkPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BulkPayload {\n")?;
        for line in self.body.lines() {
            f.write_str("    ")?;
            f.write_str(line)?;
            f.write_str("\n")?;
        }
        f.write_str("}")?;

        Ok(())
    }
}
