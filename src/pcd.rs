//! PCD records
//!
//! The collection treats records as opaque: it only reads their id and type
//! name. Claims and proofs are carried as JSON values whose shape only the
//! owning package knows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type name of the fallback sentinel record.
pub const UNKNOWN_PCD_TYPE_NAME: &str = "unknown-pcd";

/// Transport form of a single record.
///
/// Field order matches the canonical (sorted-key) encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializedPcd {
    /// Opaque payload, only meaningful to the package named by `pcd_type`
    pub pcd: String,
    #[serde(rename = "type")]
    pub pcd_type: String,
}

impl SerializedPcd {
    pub fn new(pcd_type: impl Into<String>, pcd: impl Into<String>) -> Self {
        Self {
            pcd: pcd.into(),
            pcd_type: pcd_type.into(),
        }
    }
}

/// A record produced by a registered package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedPcd {
    pub id: String,
    #[serde(rename = "type")]
    pub pcd_type: String,
    pub claim: Value,
    pub proof: Value,
}

impl TypedPcd {
    pub fn new(
        id: impl Into<String>,
        pcd_type: impl Into<String>,
        claim: Value,
        proof: Value,
    ) -> Self {
        Self {
            id: id.into(),
            pcd_type: pcd_type.into(),
            claim,
            proof,
        }
    }
}

/// Sentinel for a record that could not be deserialized.
///
/// Keeps the original serialized form byte-for-byte so that it re-serializes
/// to exactly what was read, and can be recovered once the package becomes
/// available or the payload is repaired upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPcd {
    pub id: String,
    pub serialized: SerializedPcd,
    /// Display form of the error that forced the fallback, if any
    pub error: Option<String>,
}

impl UnknownPcd {
    pub fn new(id: impl Into<String>, serialized: SerializedPcd, error: Option<String>) -> Self {
        Self {
            id: id.into(),
            serialized,
            error,
        }
    }

    /// Type name of the wrapped record (not of the sentinel itself).
    pub fn wrapped_type(&self) -> &str {
        &self.serialized.pcd_type
    }
}

/// A record held by the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Pcd {
    Typed(TypedPcd),
    Unknown(UnknownPcd),
}

impl Pcd {
    pub fn id(&self) -> &str {
        match self {
            Pcd::Typed(pcd) => &pcd.id,
            Pcd::Unknown(pcd) => &pcd.id,
        }
    }

    /// Package name of this record; sentinels report [`UNKNOWN_PCD_TYPE_NAME`].
    pub fn pcd_type(&self) -> &str {
        match self {
            Pcd::Typed(pcd) => &pcd.pcd_type,
            Pcd::Unknown(_) => UNKNOWN_PCD_TYPE_NAME,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Pcd::Unknown(_))
    }

    pub fn as_typed(&self) -> Option<&TypedPcd> {
        match self {
            Pcd::Typed(pcd) => Some(pcd),
            Pcd::Unknown(_) => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&UnknownPcd> {
        match self {
            Pcd::Unknown(pcd) => Some(pcd),
            Pcd::Typed(_) => None,
        }
    }
}

impl From<TypedPcd> for Pcd {
    fn from(pcd: TypedPcd) -> Self {
        Pcd::Typed(pcd)
    }
}

impl From<UnknownPcd> for Pcd {
    fn from(pcd: UnknownPcd) -> Self {
        Pcd::Unknown(pcd)
    }
}
