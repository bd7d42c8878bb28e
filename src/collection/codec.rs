//! Collection serialization
//!
//! Canonical form of a collection:
//!
//! ```text
//! {"folders":{"<id>":"<folder>",...},"pcds":[{"pcd":"<opaque>","type":"<package>"},...]}
//! ```
//!
//! Keys are sorted, there is no whitespace, and `pcds` follows collection
//! order. The same logical collection always encodes to the same bytes, which
//! is what makes the collection hash comparable across devices.

use crate::collection::{AddOptions, PcdCollection};
use crate::config::{CollectionConfig, FallbackMode};
use crate::error::CollectionError;
use crate::package::unknown::disambiguate_derived_ids;
use crate::package::{PackageRegistry, PcdPackage, WrapUnknown};
use crate::pcd::{Pcd, SerializedPcd};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Wire form of a whole collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedPcdCollection {
    #[serde(default)]
    pub folders: BTreeMap<String, String>,
    #[serde(default)]
    pub pcds: Vec<SerializedPcd>,
}

/// Recovery hook for records that cannot be deserialized
///
/// Invoked when no package matches the record's type, or when the package
/// rejects the payload. If the fallback itself fails, the original error is
/// reported as if there were no fallback.
#[async_trait]
pub trait FallbackDeserializer: Send + Sync {
    async fn fallback(
        &self,
        collection: &PcdCollection,
        package: Option<&dyn PcdPackage>,
        serialized: &SerializedPcd,
        error: &CollectionError,
    ) -> Result<Pcd, CollectionError>;
}

/// Options for the deserializing entry points
#[derive(Clone, Default)]
pub struct DeserializeOptions {
    /// Replace records whose id is already present (batch add only)
    pub upsert: bool,
    pub fallback: Option<Arc<dyn FallbackDeserializer>>,
}

impl DeserializeOptions {
    pub fn with_fallback(fallback: Arc<dyn FallbackDeserializer>) -> Self {
        Self {
            upsert: false,
            fallback: Some(fallback),
        }
    }

    /// Options matching the configured fallback mode
    pub fn from_config(config: &CollectionConfig) -> Self {
        match config.deserialize.fallback {
            FallbackMode::Reject => Self::default(),
            FallbackMode::WrapUnknown => Self::with_fallback(Arc::new(WrapUnknown)),
        }
    }
}

impl std::fmt::Debug for DeserializeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeserializeOptions")
            .field("upsert", &self.upsert)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl PcdCollection {
    /// Serialize one record through its package
    ///
    /// Unknown sentinels re-emit the bytes they were read from and need no
    /// package.
    pub async fn serialize(&self, pcd: &Pcd) -> Result<SerializedPcd, CollectionError> {
        match pcd {
            Pcd::Unknown(unknown) => Ok(unknown.serialized.clone()),
            Pcd::Typed(typed) => {
                self.packages()
                    .get_or_error(&typed.pcd_type)?
                    .serialize(pcd)
                    .await
            }
        }
    }

    /// Serialize every record, in collection order
    pub async fn serialize_all(&self) -> Result<Vec<SerializedPcd>, CollectionError> {
        join_all(self.get_all().iter().map(|pcd| self.serialize(pcd)))
            .await
            .into_iter()
            .collect()
    }

    /// Canonical encoding of records and folder assignments
    pub async fn serialize_collection(&self) -> Result<String, CollectionError> {
        let snapshot = SerializedPcdCollection {
            folders: self.snapshot_folders(),
            pcds: self.serialize_all().await?,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Deserialize one record, falling back when configured to
    pub async fn deserialize(
        &self,
        serialized: &SerializedPcd,
        options: &DeserializeOptions,
    ) -> Result<Pcd, CollectionError> {
        let package = self.get_package(&serialized.pcd_type);
        let attempt = match package {
            Some(package) => package.deserialize(&serialized.pcd).await,
            None => Err(CollectionError::MissingPackage(serialized.pcd_type.clone())),
        };

        let error = match attempt {
            Ok(pcd) => return Ok(pcd),
            Err(error) => error,
        };

        if let Some(fallback) = &options.fallback {
            match fallback.fallback(self, package, serialized, &error).await {
                Ok(pcd) => return Ok(pcd),
                Err(fallback_error) => {
                    debug!(
                        pcd_type = %serialized.pcd_type,
                        error = %fallback_error,
                        "Fallback deserialization failed"
                    );
                }
            }
        }
        Err(error)
    }

    /// Deserialize a batch; the first failure fails the whole batch
    ///
    /// Sentinels for identical unrecoverable payloads get position-suffixed
    /// ids, so each one stays a separate record.
    pub async fn deserialize_all(
        &self,
        serialized: &[SerializedPcd],
        options: &DeserializeOptions,
    ) -> Result<Vec<Pcd>, CollectionError> {
        let mut pcds = join_all(serialized.iter().map(|item| self.deserialize(item, options)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        disambiguate_derived_ids(&mut pcds);
        Ok(pcds)
    }

    /// Deserialize a batch and add it
    ///
    /// Nothing is added unless every record deserializes (directly or via the
    /// fallback) and the add itself succeeds.
    #[instrument(skip_all, fields(count = serialized.len()))]
    pub async fn deserialize_all_and_add(
        &mut self,
        serialized: &[SerializedPcd],
        options: &DeserializeOptions,
    ) -> Result<(), CollectionError> {
        let pcds = self.deserialize_all(serialized, options).await?;
        self.add_all(pcds, AddOptions { upsert: options.upsert })
    }

    pub async fn deserialize_and_add(
        &mut self,
        serialized: &SerializedPcd,
        options: &DeserializeOptions,
    ) -> Result<(), CollectionError> {
        self.deserialize_all_and_add(std::slice::from_ref(serialized), options)
            .await
    }

    /// Rebuild a collection from [`PcdCollection::serialize_collection`] output
    ///
    /// Missing keys read as empty. Folder entries naming an absent record stay
    /// out of the folder index but are kept for re-serialization, so a record
    /// that fell back under a derived id gets its folder back once it loads.
    #[instrument(skip_all, fields(bytes = serialized.len()))]
    pub async fn deserialize_collection(
        packages: Arc<PackageRegistry>,
        serialized: &str,
        options: &DeserializeOptions,
    ) -> Result<PcdCollection, CollectionError> {
        let snapshot: SerializedPcdCollection = serde_json::from_str(serialized)?;
        let mut collection = PcdCollection::new(packages);

        let pcds = collection.deserialize_all(&snapshot.pcds, options).await?;
        collection.upsert_all(pcds);

        for (id, folder) in &snapshot.folders {
            if collection.has_pcd_with_id(id) {
                collection.assign_folder(id, folder);
            } else {
                warn!(pcd_id = %id, folder = %folder, "Keeping folder entry for absent pcd");
                collection.keep_unresolved_folder(id, folder);
            }
        }

        debug!(size = collection.size(), "Deserialized collection");
        Ok(collection)
    }
}
