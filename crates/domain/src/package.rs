//! Package identifiers for the script host's repository proxy.
//!
//! Scripts refer to repository packages as `"<id>@<version>"`; the proxy
//! resolves files inside a package to `/repository/<id>/<version>/<file>`.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A parsed `"<id>@<version>"` package identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageUid {
    pub id: String,
    pub version: String,
}

impl PackageUid {
    /// The URI of a file inside this package.
    #[must_use]
    pub fn file_uri(&self, filename: &str) -> String {
        format!("/repository/{}/{}/{filename}", self.id, self.version)
    }
}

impl FromStr for PackageUid {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((id, version)) if !id.is_empty() && !version.is_empty() => Ok(Self {
                id: id.to_string(),
                version: version.to_string(),
            }),
            _ => Err(ValidationError::InvalidPackageUid(s.to_string())),
        }
    }
}

impl fmt::Display for PackageUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}
