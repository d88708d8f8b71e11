//! Parsed gated-link identifier.

use std::fmt;

/// Required length of the owner id (first path segment).
pub const OWNER_ID_LEN: usize = 6;

/// Base used when rendering an identifier back into a link.
const CANONICAL_BASE: &str = "https://linkvertise.com";

/// Owner id + post id of a gated link. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkIdentifier {
    owner_id: String,
    post_id: String,
}

/// Owner id had the wrong length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerIdLength(pub usize);

impl fmt::Display for OwnerIdLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner id must be {} characters, got {}", OWNER_ID_LEN, self.0)
    }
}

impl std::error::Error for OwnerIdLength {}

impl LinkIdentifier {
    pub fn new(owner_id: impl Into<String>, post_id: impl Into<String>) -> Result<Self, OwnerIdLength> {
        let owner_id = owner_id.into();
        let len = owner_id.chars().count();
        if len != OWNER_ID_LEN {
            return Err(OwnerIdLength(len));
        }
        Ok(Self {
            owner_id,
            post_id: post_id.into(),
        })
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    /// `https://linkvertise.com/<owner>/<post>`.
    pub fn canonical_url(&self) -> String {
        format!("{}/{}/{}", CANONICAL_BASE, self.owner_id, self.post_id)
    }
}

impl fmt::Display for LinkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_url())
    }
}
