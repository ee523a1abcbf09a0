//! Object storage event notifications that trigger a processing run.
//!
//! see <https://docs.aws.amazon.com/AmazonS3/latest/userguide/notification-content-structure.html>

use object_store::path::Path;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub key: String,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3 {
    pub bucket: Bucket,
    pub object: Object,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "awsRegion")]
    pub aws_region: String,
    pub s3: S3,
}

impl Record {
    /// Decodes the object key of the notification.
    ///
    /// Keys are URL-encoded in notifications, with spaces written as `+`.
    pub fn object_path(&self) -> Result<Path, object_store::path::Error> {
        let key = self.s3.object.key.replace('+', "%20");
        Path::from_url_path(key)
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "Records")]
    pub records: Vec<Record>,
}

impl FromStr for Message {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}
