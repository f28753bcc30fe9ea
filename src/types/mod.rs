use std::fmt;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

use zeroize_derive::{Zeroize, ZeroizeOnDrop};

pub mod error;

/// Key of an object discovered by listing the target bucket.
pub type ObjectKey = String;

/// One revision of an object, as reported by a version listing.
///
/// Delete markers are revisions too: they carry their own version id and
/// keep the bucket non-empty until they are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersion {
    pub key: ObjectKey,
    pub version_id: String,
    pub is_delete_marker: bool,
}

impl ObjectVersion {
    pub fn new(key: &str, version_id: &str) -> Self {
        Self {
            key: key.to_string(),
            version_id: version_id.to_string(),
            is_delete_marker: false,
        }
    }

    pub fn delete_marker(key: &str, version_id: &str) -> Self {
        Self {
            key: key.to_string(),
            version_id: version_id.to_string(),
            is_delete_marker: true,
        }
    }
}

impl fmt::Display for ObjectVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (version_id: {})", self.key, self.version_id)
    }
}

/// AWS configuration file locations.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigLocation {
    pub aws_config_file: Option<PathBuf>,
    pub aws_shared_credentials_file: Option<PathBuf>,
}

/// AWS credential sources supported by s3rb.
#[derive(Debug, Clone)]
pub enum S3Credentials {
    Profile(String),
    Credentials { access_keys: AccessKeys },
    FromEnvironment,
}

/// AWS access key pair with secure zeroization.
///
/// The secret_access_key and session_token are cleared from memory when
/// this struct is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKeys {
    pub access_key: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Debug for AccessKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("AccessKeys");
        let session_token = self
            .session_token
            .as_ref()
            .map_or("None", |_| "** redacted **");
        keys.field("access_key", &self.access_key)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &session_token);
        keys.finish()
    }
}
