//! Collection merging
//!
//! Merging is one-directional: records flow from `other` into `self`, and
//! `other` is only read.

use crate::collection::PcdCollection;
use crate::pcd::Pcd;
use tracing::debug;

type MergeFilter<'a> = Box<dyn Fn(&Pcd, &PcdCollection) -> bool + 'a>;

/// Options for [`PcdCollection::merge`]
#[derive(Default)]
pub struct MergeOptions<'a> {
    /// Decides which of `other`'s records take part, given the record and the
    /// target collection. Records it rejects leave the target untouched.
    pub should_include: Option<MergeFilter<'a>>,
}

impl<'a> MergeOptions<'a> {
    pub fn should_include<F>(filter: F) -> Self
    where
        F: Fn(&Pcd, &PcdCollection) -> bool + 'a,
    {
        Self {
            should_include: Some(Box::new(filter)),
        }
    }
}

impl PcdCollection {
    /// Upsert `other`'s records into this collection
    ///
    /// A record present in both takes `other`'s content and folder (an
    /// unassigned record in `other` moves to the root here). A record only in
    /// `other` is appended, keeping `other`'s relative order.
    pub fn merge(&mut self, other: &PcdCollection, options: MergeOptions<'_>) {
        let target: &PcdCollection = self;
        let incoming: Vec<&Pcd> = match &options.should_include {
            Some(should_include) => other
                .get_all()
                .iter()
                .filter(|&pcd| should_include(pcd, target))
                .collect(),
            None => other.get_all().iter().collect(),
        };

        debug!(
            offered = other.size(),
            merging = incoming.len(),
            "Merging collection"
        );

        let mut changed = false;
        for pcd in incoming {
            changed |= self.upsert_all(vec![pcd.clone()]);
            let folder = other.get_folder_of_pcd(pcd.id()).unwrap_or("");
            changed |= self.assign_folder(pcd.id(), folder);
        }

        if changed {
            self.emit_change();
        }
    }
}
