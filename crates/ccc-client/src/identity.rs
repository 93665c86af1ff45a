//! Content identifiers and the service that assigns them.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, Result};

/// What the identity service knows about a registered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// File name without its directory.
    pub name: String,
    /// Directory the file was registered from.
    pub path: Option<String>,
    pub size: Option<u64>,
}

impl IdentityRecord {
    /// Record describing `path` as the service would store it.
    pub fn for_path(path: &str, size: Option<u64>) -> Self {
        Self {
            name: file_name(path).to_string(),
            path: Some(dir_name(path).to_string()),
            size,
        }
    }
}

/// Assigns and resolves content identifiers for file-like records.
pub trait IdentityService {
    /// Registers `path` on behalf of `site_id` and `user`, returning the new
    /// identifier. Fails with [`ClientError::AlreadyRegistered`] when the
    /// identifier for `path` is already known.
    fn register(&self, path: &str, site_id: &str, user: &str) -> Result<String>;

    /// Looks up a registered identifier. Absent identifiers are `Ok(None)`.
    fn lookup(&self, ccc_id: &str) -> Result<Option<IdentityRecord>>;
}

impl<T: IdentityService + ?Sized> IdentityService for &T {
    fn register(&self, path: &str, site_id: &str, user: &str) -> Result<String> {
        (**self).register(path, site_id, user)
    }

    fn lookup(&self, ccc_id: &str) -> Result<Option<IdentityRecord>> {
        (**self).lookup(ccc_id)
    }
}

/// How a content identifier is derived from a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UuidStrategy {
    /// Name-based UUIDv5.
    #[default]
    Sha1,
    /// Name-based UUIDv3.
    Md5,
    /// UUIDv4.
    Random,
}

impl UuidStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Md5 => "MD5",
            Self::Random => "RANDOM",
        }
    }
}

impl fmt::Display for UuidStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UuidStrategy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SHA-1" | "SHA1" => Ok(Self::Sha1),
            "MD5" => Ok(Self::Md5),
            "RANDOM" => Ok(Self::Random),
            _ => Err(ClientError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Identifier derived from `name` in the DNS namespace.
pub fn placeholder_id(name: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes()).to_string()
}

/// Derives the identifier the service would assign to `path`.
///
/// The path is made absolute first, so relative paths resolve against the
/// current directory.
pub fn infer_ccc_id(path: &Path, strategy: UuidStrategy) -> Result<String> {
    let absolute = std::path::absolute(path).map_err(|e| ClientError::io(path, e))?;
    let name = absolute.to_string_lossy();
    let id = match strategy {
        UuidStrategy::Sha1 => Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes()),
        UuidStrategy::Md5 => Uuid::new_v3(&Uuid::NAMESPACE_DNS, name.as_bytes()),
        UuidStrategy::Random => Uuid::new_v4(),
    };
    Ok(id.to_string())
}

const SITES: &[(&str, &str)] = &[
    ("central", "http://10.73.127.1"),
    ("ohsu", "http://10.73.127.6"),
    ("dfci", "http://10.73.127.18"),
    ("oicr", "http://10.73.127.14"),
];

/// Gateway URL recorded for a site in registration payloads.
pub fn site_url(site_id: &str) -> Result<&'static str> {
    SITES
        .iter()
        .find(|(name, _)| *name == site_id)
        .map(|(_, url)| *url)
        .ok_or_else(|| ClientError::UnknownSite(site_id.to_string()))
}

/// Final component of a path or URL.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Everything before the final component, without the trailing slash.
pub fn dir_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((dir, _)) => dir,
        None => "",
    }
}
