//! Name to OID resolution.
//!
//! The OID registry maps every alias a schema entity is known by, and the
//! dotted OID itself, to the entity's [`Oid`]. Names are matched
//! case-insensitively. Bindings are claim-counted so that an alias shared by
//! entities of different kinds (a comparator and a matching rule have the
//! same OID) is only dropped when the last claimant releases it.

use crate::constants::{CN_AT_OID, M_OID_AT_OID, OU_AT_OID};
use crate::error::{SchemaError, SchemaResult};
use crate::naming::Oid;
use log::trace;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
struct Binding {
    oid: Oid,
    claims: usize,
}

#[derive(Debug, Default)]
struct OidTable {
    by_name: HashMap<String, Binding>,
    by_oid: HashMap<Oid, BTreeSet<String>>,
}

impl OidTable {
    fn check(&self, name: &str, oid: &Oid) -> SchemaResult<()> {
        let key = normalize(name);
        match self.by_name.get(&key) {
            Some(binding) if binding.oid != *oid => Err(SchemaError::NameConflict {
                name: name.to_string(),
                bound: binding.oid.to_string(),
                requested: oid.to_string(),
            }),
            None if Oid::is_valid(&key) && key != oid.as_str() => Err(SchemaError::NameConflict {
                name: name.to_string(),
                bound: key,
                requested: oid.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn bind(&mut self, name: &str, oid: &Oid) {
        let key = normalize(name);
        self.by_name
            .entry(key.clone())
            .and_modify(|binding| binding.claims += 1)
            .or_insert_with(|| Binding {
                oid: oid.clone(),
                claims: 1,
            });
        self.by_oid.entry(oid.clone()).or_default().insert(key);
    }

    fn unbind(&mut self, name: &str) -> bool {
        let key = normalize(name);
        let Some(binding) = self.by_name.get_mut(&key) else {
            return false;
        };
        binding.claims -= 1;
        if binding.claims > 0 {
            return false;
        }
        let oid = binding.oid.clone();
        self.by_name.remove(&key);
        if let Some(names) = self.by_oid.get_mut(&oid) {
            names.remove(&key);
            if names.is_empty() {
                self.by_oid.remove(&oid);
            }
        }
        true
    }

    fn bind_all(&mut self, names: &[String], oid: &Oid) -> SchemaResult<()> {
        for name in names {
            self.check(name, oid)?;
        }
        for name in names {
            self.bind(name, oid);
        }
        Ok(())
    }
}

pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive alias table shared by every catalog.
#[derive(Debug, Default)]
pub struct OidRegistry {
    table: RwLock<OidTable>,
}

impl OidRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry knowing the attribute types the meta-schema is named with.
    pub fn bootstrapped() -> Self {
        let registry = Self::new();
        {
            let mut table = registry.table.write();
            for (names, oid) in [
                (&["ou", "organizationalUnitName", OU_AT_OID][..], OU_AT_OID),
                (&["cn", "commonName", CN_AT_OID][..], CN_AT_OID),
                (&["m-oid", M_OID_AT_OID][..], M_OID_AT_OID),
            ] {
                let oid = Oid::new_unchecked(oid);
                for name in names {
                    table.bind(name, &oid);
                }
            }
        }
        registry
    }

    /// Bind one name to `oid`.
    pub fn register(&self, name: &str, oid: &Oid) -> SchemaResult<()> {
        self.register_names(&[name.to_string()], oid)
    }

    /// Bind every name to `oid`, or none of them.
    pub fn register_names(&self, names: &[String], oid: &Oid) -> SchemaResult<()> {
        self.table.write().bind_all(names, oid)?;
        trace!("Bound {:?} to {}", names, oid);
        Ok(())
    }

    /// Whether every name could be bound to `oid` right now.
    pub fn check_names(&self, names: &[String], oid: &Oid) -> SchemaResult<()> {
        let table = self.table.read();
        names.iter().try_for_each(|name| table.check(name, oid))
    }

    /// Drop one claim on `name`; returns whether the binding disappeared.
    pub fn release(&self, name: &str) -> bool {
        self.table.write().unbind(name)
    }

    pub fn release_names(&self, names: &[String]) {
        let mut table = self.table.write();
        for name in names {
            table.unbind(name);
        }
        trace!("Released {:?}", names);
    }

    /// Release `released`, then bind `bound` to `oid`, as one step.
    ///
    /// On a conflict the released claims are restored and nothing changes.
    pub(crate) fn exchange(&self, released: &[String], bound: &[String], oid: &Oid) -> SchemaResult<()> {
        let mut table = self.table.write();
        let restore: Vec<(String, Oid)> = released
            .iter()
            .filter_map(|name| {
                table
                    .by_name
                    .get(&normalize(name))
                    .map(|binding| (name.clone(), binding.oid.clone()))
            })
            .collect();
        for name in released {
            table.unbind(name);
        }
        if let Err(e) = table.bind_all(bound, oid) {
            for (name, previous) in &restore {
                table.bind(name, previous);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Resolve a name or dotted OID.
    pub fn get_oid(&self, name: &str) -> SchemaResult<Oid> {
        self.table
            .read()
            .by_name
            .get(&normalize(name))
            .map(|binding| binding.oid.clone())
            .ok_or_else(|| SchemaError::not_found("OID binding", name))
    }

    pub fn has_oid(&self, name: &str) -> bool {
        self.table.read().by_name.contains_key(&normalize(name))
    }

    /// Every name bound to `oid`, sorted.
    pub fn names_of(&self, oid: &Oid) -> Vec<String> {
        self.table
            .read()
            .by_oid
            .get(oid)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.table.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
