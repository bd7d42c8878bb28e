//! PCD Package Abstraction
//!
//! A package is the pluggable implementation of one record type: it knows how
//! to turn records into their transport form and back, and how to check their
//! proofs. The collection never looks inside a record; it resolves the owning
//! package by type name through a [`PackageRegistry`].

use crate::error::CollectionError;
use crate::pcd::{Pcd, SerializedPcd};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub mod unknown;

pub use unknown::{wrap_unknown_pcd, UnknownPcdPackage, VerifyBehavior, WrapUnknown};

/// Pluggable record implementation
///
/// Implementations may do expensive cryptographic work, hence the async
/// methods.
#[async_trait]
pub trait PcdPackage: Send + Sync {
    /// Unique type name of the records this package handles
    fn name(&self) -> &str;

    /// Convert a record to its transport form
    async fn serialize(&self, pcd: &Pcd) -> Result<SerializedPcd, CollectionError>;

    /// Parse the `pcd` field of a [`SerializedPcd`]
    ///
    /// Rejects payloads of the wrong shape with
    /// [`CollectionError::MalformedRecord`].
    async fn deserialize(&self, serialized: &str) -> Result<Pcd, CollectionError>;

    /// Check the record's proof against its claim
    async fn verify(&self, pcd: &Pcd) -> Result<bool, CollectionError>;
}

/// Closed map from type name to package implementation
///
/// Populated once at construction; registration order is kept for listing.
#[derive(Clone, Default)]
pub struct PackageRegistry {
    packages: Vec<Arc<dyn PcdPackage>>,
    index: HashMap<String, usize>,
}

impl PackageRegistry {
    /// Build a registry from a caller-supplied package list
    ///
    /// Two packages claiming the same name are rejected.
    pub fn new(packages: Vec<Arc<dyn PcdPackage>>) -> Result<Self, CollectionError> {
        let mut index = HashMap::with_capacity(packages.len());
        for (position, package) in packages.iter().enumerate() {
            if index.insert(package.name().to_string(), position).is_some() {
                return Err(CollectionError::DuplicatePackage(package.name().to_string()));
            }
        }

        Ok(Self { packages, index })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get_package(&self, name: &str) -> Option<&dyn PcdPackage> {
        self.index
            .get(name)
            .map(|&position| self.packages[position].as_ref())
    }

    pub fn has_package(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get a package by name or return an error
    pub fn get_or_error(&self, name: &str) -> Result<&dyn PcdPackage, CollectionError> {
        self.get_package(name)
            .ok_or_else(|| CollectionError::MissingPackage(name.to_string()))
    }

    /// Names of all registered packages, in registration order
    pub fn package_names(&self) -> Vec<&str> {
        self.packages.iter().map(|package| package.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl std::fmt::Debug for PackageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageRegistry")
            .field("packages", &self.package_names())
            .finish()
    }
}
