//! Static upload directory configuration.

use serde::{Deserialize, Serialize};

/// Where uploaded images live and the URL prefix they are served under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Local directory served as static files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Public URL prefix mapped onto `upload_dir`.
    #[serde(default = "default_public_prefix")]
    pub public_url_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            public_url_prefix: default_public_prefix(),
        }
    }
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_public_prefix() -> String {
    "/uploads".to_string()
}
