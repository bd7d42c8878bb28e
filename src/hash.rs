//! Hash computation for collection snapshots using BLAKE3
//!
//! The collection hash is the digest of the canonical serialized collection
//! (see [`crate::collection::codec`]). Two peers holding the same records, in
//! the same order, with the same folder assignments compute the same hash,
//! so a remote copy can be checked for divergence without moving content.

use crate::collection::PcdCollection;
use crate::error::CollectionError;
use blake3::Hasher;

/// 32-byte BLAKE3 digest
pub type Hash = [u8; 32];

/// Compute a generic hash of arbitrary data
pub fn compute_hash(data: &[u8]) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Compute the hash of a canonical collection snapshot
///
/// Hash = BLAKE3("pcd-collection:v1" || snapshot_len || snapshot)
pub fn compute_collection_hash(canonical: &str) -> Hash {
    let bytes = canonical.as_bytes();

    let mut hasher = Hasher::new();

    // Domain separator
    hasher.update(b"pcd-collection:v1");

    // Snapshot length (8 bytes, big-endian for determinism)
    hasher.update(&(bytes.len() as u64).to_be_bytes());

    hasher.update(bytes);

    *hasher.finalize().as_bytes()
}

pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

impl PcdCollection {
    /// Hex digest of the canonical serialized collection
    ///
    /// Changes whenever the records, their order, or their folders change.
    pub async fn get_hash(&self) -> Result<String, CollectionError> {
        let canonical = self.serialize_collection().await?;
        Ok(hash_to_hex(&compute_collection_hash(&canonical)))
    }
}
