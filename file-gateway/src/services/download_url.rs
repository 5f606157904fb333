use anyhow::{anyhow, Result};
use url::Url;

use crate::config::RouteConfig;

/// Builds the absolute download URL advertised in every `FileRecord`
///
/// The URL depends only on the configured public base URL, the route layout and the
/// filename/version pair, so it can be rebuilt at any time from a record's fields.
#[derive(Debug, Clone)]
pub struct DownloadUrlBuilder {
    endpoint: Url,
}

impl DownloadUrlBuilder {
    pub fn new(public_base_url: &Url, routes: &RouteConfig) -> Result<Self> {
        let mut endpoint = public_base_url.clone();
        endpoint.set_query(None);
        endpoint.set_fragment(None);

        {
            let mut segments = endpoint
                .path_segments_mut()
                .map_err(|_| anyhow!("'{}' cannot be used as a base URL", public_base_url))?;
            segments.pop_if_empty();
            segments.extend(routes.root.split('/').filter(|s| !s.is_empty()));
            segments.extend(routes.download.split('/').filter(|s| !s.is_empty()));
        }

        Ok(Self { endpoint })
    }

    pub fn build(&self, file_name: &str, version_id: &str) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("fileName", file_name)
            .append_pair("versionId", version_id);
        url.to_string()
    }
}
