//! Unknown PCD package
//!
//! Home of the fallback sentinel. A record whose package is missing, or whose
//! payload its package rejects, can be wrapped into an [`UnknownPcd`] instead
//! of failing the whole load. The sentinel serializes back to exactly the
//! bytes it was read from.

use crate::collection::{FallbackDeserializer, PcdCollection};
use crate::error::CollectionError;
use crate::hash::{compute_hash, hash_to_hex};
use crate::package::PcdPackage;
use crate::pcd::{Pcd, SerializedPcd, UnknownPcd, UNKNOWN_PCD_TYPE_NAME};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// How [`UnknownPcdPackage::verify`] treats sentinels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyBehavior {
    /// Fail verification with the wrapped cause
    #[default]
    Error,
    /// Report every sentinel as valid
    Valid,
    /// Report every sentinel as invalid
    Invalid,
}

/// Package for [`UNKNOWN_PCD_TYPE_NAME`] records
#[derive(Debug, Clone, Default)]
pub struct UnknownPcdPackage {
    verify_behavior: VerifyBehavior,
}

impl UnknownPcdPackage {
    pub fn new(verify_behavior: VerifyBehavior) -> Self {
        Self { verify_behavior }
    }

    pub fn from_config(config: &crate::config::CollectionConfig) -> Self {
        Self::new(config.unknown_pcd.verify_behavior)
    }

    pub fn verify_behavior(&self) -> VerifyBehavior {
        self.verify_behavior
    }
}

#[async_trait]
impl PcdPackage for UnknownPcdPackage {
    fn name(&self) -> &str {
        UNKNOWN_PCD_TYPE_NAME
    }

    async fn serialize(&self, pcd: &Pcd) -> Result<SerializedPcd, CollectionError> {
        match pcd {
            Pcd::Unknown(unknown) => Ok(unknown.serialized.clone()),
            Pcd::Typed(typed) => Err(CollectionError::malformed(
                UNKNOWN_PCD_TYPE_NAME,
                format!("{} is a {} pcd", typed.id, typed.pcd_type),
            )),
        }
    }

    async fn deserialize(&self, _serialized: &str) -> Result<Pcd, CollectionError> {
        Err(CollectionError::malformed(
            UNKNOWN_PCD_TYPE_NAME,
            "UnknownPCD cannot be deserialized.",
        ))
    }

    async fn verify(&self, pcd: &Pcd) -> Result<bool, CollectionError> {
        let unknown = pcd.as_unknown().ok_or_else(|| {
            CollectionError::malformed(UNKNOWN_PCD_TYPE_NAME, format!("{} is not unknown", pcd.id()))
        })?;

        match self.verify_behavior {
            VerifyBehavior::Valid => Ok(true),
            VerifyBehavior::Invalid => Ok(false),
            VerifyBehavior::Error => Err(CollectionError::Verification {
                pcd_type: UNKNOWN_PCD_TYPE_NAME.to_string(),
                reason: unknown.error.clone().unwrap_or_else(|| {
                    format!(
                        "UnknownPCD wrapping \"{}\" cannot be validated.",
                        unknown.wrapped_type()
                    )
                }),
            }),
        }
    }
}

/// Wrap a serialized record into a sentinel, keeping its bytes verbatim
///
/// The id is taken from the payload when it is a JSON object with a string
/// `id` field, so folder assignments keyed by that id survive the fallback.
/// Otherwise a stable id is derived from the serialized record; identical
/// payloads derive identical ids, which batch deserialization suffixes by
/// position.
pub fn wrap_unknown_pcd(serialized: SerializedPcd, cause: Option<String>) -> Pcd {
    let id = embedded_id(&serialized).unwrap_or_else(|| derived_id(&serialized));
    Pcd::Unknown(UnknownPcd::new(id, serialized, cause))
}

fn embedded_id(serialized: &SerializedPcd) -> Option<String> {
    serde_json::from_str::<Value>(&serialized.pcd)
        .ok()
        .and_then(|value| value.get("id").and_then(Value::as_str).map(str::to_string))
}

fn derived_id(serialized: &SerializedPcd) -> String {
    let mut material = Vec::with_capacity(serialized.pcd_type.len() + serialized.pcd.len() + 1);
    material.extend_from_slice(serialized.pcd_type.as_bytes());
    material.push(0);
    material.extend_from_slice(serialized.pcd.as_bytes());
    format!("unknown-{}", &hash_to_hex(&compute_hash(&material))[..32])
}

/// Give repeated derived ids in a batch a `-<n>` suffix, in batch order
///
/// Only sentinels whose id was derived are renamed; a repeated embedded id is
/// a real duplicate and is left for the add to reject.
pub(crate) fn disambiguate_derived_ids(pcds: &mut [Pcd]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for pcd in pcds.iter_mut() {
        let Pcd::Unknown(unknown) = pcd else {
            continue;
        };
        if embedded_id(&unknown.serialized).is_some() {
            continue;
        }
        let repeats = seen.entry(unknown.id.clone()).or_insert(0);
        if *repeats > 0 {
            unknown.id = format!("{}-{}", unknown.id, repeats);
        }
        *repeats += 1;
    }
}

/// Stock fallback: wrap every failing record into an [`UnknownPcd`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapUnknown;

#[async_trait]
impl FallbackDeserializer for WrapUnknown {
    async fn fallback(
        &self,
        _collection: &PcdCollection,
        _package: Option<&dyn PcdPackage>,
        serialized: &SerializedPcd,
        error: &CollectionError,
    ) -> Result<Pcd, CollectionError> {
        warn!(
            pcd_type = %serialized.pcd_type,
            error = %error,
            "Wrapping undeserializable pcd as unknown"
        );
        Ok(wrap_unknown_pcd(serialized.clone(), Some(error.to_string())))
    }
}
