//! Shared test utilities for integration tests
//!
//! A JSON-backed record package plus helpers for building registries and
//! collections with folder assignments.

use async_trait::async_trait;
use pcd_collection::{
    CollectionError, PackageRegistry, PcdCollection, PcdPackage, Pcd, SerializedPcd, TypedPcd,
    UnknownPcdPackage,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub const JSON_PCD_TYPE: &str = "json-pcd";

/// Stores a [`TypedPcd`] as its JSON encoding
///
/// Payloads without a `claim` field are rejected, the way a real proof
/// package rejects a corrupted record.
pub struct JsonPcdPackage;

#[async_trait]
impl PcdPackage for JsonPcdPackage {
    fn name(&self) -> &str {
        JSON_PCD_TYPE
    }

    async fn serialize(&self, pcd: &Pcd) -> Result<SerializedPcd, CollectionError> {
        let typed = pcd
            .as_typed()
            .ok_or_else(|| CollectionError::malformed(JSON_PCD_TYPE, "not a typed pcd"))?;
        let payload =
            serde_json::to_string(typed).map_err(|e| CollectionError::malformed(JSON_PCD_TYPE, e))?;
        Ok(SerializedPcd::new(JSON_PCD_TYPE, payload))
    }

    async fn deserialize(&self, serialized: &str) -> Result<Pcd, CollectionError> {
        let value: Value = serde_json::from_str(serialized)
            .map_err(|e| CollectionError::malformed(JSON_PCD_TYPE, e))?;
        if value.get("claim").is_none() {
            return Err(CollectionError::malformed(JSON_PCD_TYPE, "claim must be defined"));
        }
        let typed: TypedPcd =
            serde_json::from_value(value).map_err(|e| CollectionError::malformed(JSON_PCD_TYPE, e))?;
        Ok(typed.into())
    }

    async fn verify(&self, pcd: &Pcd) -> Result<bool, CollectionError> {
        Ok(pcd
            .as_typed()
            .map(|typed| typed.proof == json!(format!("signed:{}", typed.id)))
            .unwrap_or(false))
    }
}

/// Registry with the JSON package and the unknown-record package
pub fn full_registry() -> Arc<PackageRegistry> {
    Arc::new(
        PackageRegistry::new(vec![
            Arc::new(JsonPcdPackage) as Arc<dyn PcdPackage>,
            Arc::new(UnknownPcdPackage::default()),
        ])
        .unwrap(),
    )
}

/// Registry that cannot read JSON records
pub fn registry_without_json() -> Arc<PackageRegistry> {
    Arc::new(
        PackageRegistry::new(vec![Arc::new(UnknownPcdPackage::default()) as Arc<dyn PcdPackage>])
            .unwrap(),
    )
}

pub fn json_pcd(id: &str) -> Pcd {
    TypedPcd::new(
        id,
        JSON_PCD_TYPE,
        json!({ "owner": "test", "index": id }),
        json!(format!("signed:{}", id)),
    )
    .into()
}

pub fn serialized_json_pcd(id: &str) -> SerializedPcd {
    SerializedPcd::new(
        JSON_PCD_TYPE,
        serde_json::to_string(json_pcd(id).as_typed().unwrap()).unwrap(),
    )
}

/// Collection holding `(id, folder)` pairs in order; `""` leaves a record at the root
pub fn collection_with(placements: &[(&str, &str)]) -> PcdCollection {
    let mut collection = PcdCollection::new(full_registry());
    for (id, folder) in placements {
        collection.add(json_pcd(id), Default::default()).unwrap();
        collection.set_pcd_folder(id, folder).unwrap();
    }
    collection
}
