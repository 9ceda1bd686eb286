//! Live subentries, keyed by DN.

use crate::naming::Dn;
use crate::subentry::{AdministrativeRole, Subentry};
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Subentries currently in force.
///
/// The administrative point of a subentry is its immediate superior, so a
/// subentry's DN is all the cache needs to evaluate its region.
#[derive(Debug, Default)]
pub struct SubentryCache {
    subentries: RwLock<HashMap<Dn, Subentry>>,
}

impl SubentryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the subentry at `dn`, returning the previous one.
    pub fn add(&self, dn: Dn, subentry: Subentry) -> Option<Subentry> {
        debug!("Caching subentry {}", dn);
        self.subentries.write().insert(dn, subentry)
    }

    pub fn get(&self, dn: &Dn) -> Option<Subentry> {
        self.subentries.read().get(dn).cloned()
    }

    pub fn remove(&self, dn: &Dn) -> Option<Subentry> {
        debug!("Evicting subentry {}", dn);
        self.subentries.write().remove(dn)
    }

    pub fn contains(&self, dn: &Dn) -> bool {
        self.subentries.read().contains_key(dn)
    }

    /// Mutate the subentry at `dn` in place; returns whether it was present.
    pub fn modify(&self, dn: &Dn, f: impl FnOnce(&mut Subentry)) -> bool {
        match self.subentries.write().get_mut(dn) {
            Some(subentry) => {
                f(subentry);
                true
            }
            None => false,
        }
    }

    /// Move the subentry at `from` to `to`.
    pub fn rename(&self, from: &Dn, to: Dn) -> bool {
        let mut subentries = self.subentries.write();
        match subentries.remove(from) {
            Some(subentry) => {
                subentries.insert(to, subentry);
                true
            }
            None => false,
        }
    }

    /// DNs of subentries administered from `admin_point`, sorted.
    pub fn for_administrative_point(&self, admin_point: &Dn) -> Vec<Dn> {
        let mut found: Vec<Dn> = self
            .subentries
            .read()
            .keys()
            .filter(|dn| dn.parent().as_ref() == Some(admin_point))
            .cloned()
            .collect();
        sort(&mut found);
        found
    }

    /// DNs of subentries with `role` whose region contains `dn`, sorted.
    pub fn applicable(&self, dn: &Dn, role: AdministrativeRole) -> Vec<Dn> {
        let mut found: Vec<Dn> = self
            .subentries
            .read()
            .iter()
            .filter(|(_, subentry)| subentry.has_role(role))
            .filter(|(subentry_dn, subentry)| {
                subentry_dn.parent().is_some_and(|admin_point| {
                    subentry.subtree_specification().contains(&admin_point, dn)
                })
            })
            .map(|(subentry_dn, _)| subentry_dn.clone())
            .collect();
        sort(&mut found);
        found
    }

    pub fn len(&self) -> usize {
        self.subentries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subentries.read().is_empty()
    }
}

fn sort(dns: &mut [Dn]) {
    dns.sort_by_cached_key(ToString::to_string);
}
