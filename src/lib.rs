//! PCD Collection: Folder-Organized Store for Verifiable Records
//!
//! A client-side store for proof-carrying data records. Records are opaque to
//! the store: pluggable packages serialize, deserialize and verify them.
//! The store adds a hierarchical folder namespace, capability-scoped
//! mutation for untrusted callers, one-way merging, and a deterministic
//! content hash for detecting divergence from a remote copy.

pub mod collection;
pub mod config;
pub mod emitter;
pub mod error;
pub mod folder;
pub mod hash;
pub mod logging;
pub mod package;
pub mod pcd;
pub mod permission;


pub use collection::{
    AddOptions, DeserializeOptions, FallbackDeserializer, MergeOptions, PcdCollection,
    SerializedPcdCollection,
};
pub use config::{CollectionConfig, ConfigLoader, FallbackMode};
pub use emitter::{ChangeEmitter, Subscription};
pub use error::CollectionError;
pub use package::{PackageRegistry, PcdPackage, UnknownPcdPackage, VerifyBehavior, WrapUnknown};
pub use pcd::{Pcd, SerializedPcd, TypedPcd, UnknownPcd, UNKNOWN_PCD_TYPE_NAME};
pub use permission::{PcdAction, PcdPermission};
