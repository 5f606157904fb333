use serde::{Deserialize, Serialize};

/// Version id S3 reports for objects written while bucket versioning is off
pub const NULL_VERSION_ID: &str = "null";

/// A stored object version as exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub filename: String,
    pub size: u64,
    pub version_id: String,
    pub url: String,
}

/// One entry of a version-inclusive bucket listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersion {
    pub key: String,
    pub size: u64,
    pub version_id: String,
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub version_id: String,
}

/// Query parameters accepted by the download endpoint
///
/// Both fields are optional at the extractor level so a missing parameter
/// produces our own 400 body instead of axum's plain-text rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub file_name: Option<String>,
    pub version_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_record_serializes_with_client_field_names() {
        let record = FileRecord {
            filename: "report.pdf".to_string(),
            size: 10,
            version_id: "v1".to_string(),
            url: "http://gw/files/download?fileName=report.pdf&versionId=v1".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "filename": "report.pdf",
                "size": 10,
                "versionId": "v1",
                "url": "http://gw/files/download?fileName=report.pdf&versionId=v1",
            })
        );
    }

    #[test]
    fn test_download_query_uses_camel_case_names() {
        let query: DownloadQuery =
            serde_json::from_value(serde_json::json!({"fileName": "a.txt", "versionId": "v9"}))
                .unwrap();
        assert_eq!(query.file_name.as_deref(), Some("a.txt"));
        assert_eq!(query.version_id.as_deref(), Some("v9"));
    }
}
