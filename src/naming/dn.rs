//! Distinguished names for locating schema and subentry entries.
//!
//! DN normalization belongs to the directory's naming layer; this crate only
//! consumes names that have already been normalized. [`Dn`] keeps the
//! components leaf first, exactly as the string form reads, and offers the
//! positional accessors the handlers need (leaf, parent, component counted
//! from the root).

use crate::error::{ValidationError, ValidationResult};
use std::fmt;
use std::str::FromStr;

/// A single-valued relative distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rdn {
    attribute_type: String,
    value: String,
}

impl Rdn {
    /// Create an RDN. The attribute type is lower-cased, both parts trimmed.
    pub fn new(attribute_type: impl AsRef<str>, value: impl AsRef<str>) -> ValidationResult<Self> {
        let attribute_type = attribute_type.as_ref().trim();
        let value = value.as_ref().trim();

        if attribute_type.is_empty() || value.is_empty() {
            return Err(ValidationError::InvalidRdn {
                rdn: format!("{attribute_type}={value}"),
            });
        }

        Ok(Self {
            attribute_type: attribute_type.to_ascii_lowercase(),
            value: value.to_string(),
        })
    }

    /// The normalized (lower-cased) attribute type.
    pub fn norm_type(&self) -> &str {
        &self.attribute_type
    }

    /// The RDN value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.attribute_type)?;
        for c in self.value.chars() {
            if matches!(c, ',' | '+' | '=' | '\\') {
                write!(f, "\\")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for Rdn {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        match split_unescaped(s, '=').as_deref() {
            Some([attribute_type, value]) => Self::new(unescape(attribute_type), unescape(value)),
            _ => Err(ValidationError::InvalidRdn { rdn: s.to_string() }),
        }
    }
}

/// A normalized distinguished name, components ordered leaf first.
///
/// ```rust
/// use meta_schema::naming::Dn;
///
/// let dn: Dn = "m-oid=1.1.1,ou=comparators,cn=example,ou=schema".parse().unwrap();
/// assert_eq!(dn.size(), 4);
/// assert_eq!(dn.rdn().unwrap().value(), "1.1.1");
/// assert_eq!(dn.rdn_from_root(1).unwrap().value(), "example");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The empty (root DSE) name.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a DN from components ordered leaf first.
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Self { rdns }
    }

    /// Number of components.
    pub fn size(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    /// The leaf component.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// Components, leaf first.
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// Component at `index` counted from the root (0 is the naming context).
    pub fn rdn_from_root(&self, index: usize) -> Option<&Rdn> {
        self.rdns.iter().rev().nth(index)
    }

    /// The name of the immediate superior, `None` for the root.
    pub fn parent(&self) -> Option<Dn> {
        if self.rdns.is_empty() {
            None
        } else {
            Some(Self {
                rdns: self.rdns[1..].to_vec(),
            })
        }
    }

    /// A new name with `rdn` appended below this one.
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(rdn);
        rdns.extend(self.rdns.iter().cloned());
        Self { rdns }
    }

    /// Whether `self` equals `ancestor` or lies beneath it.
    pub fn is_descendant_of(&self, ancestor: &Dn) -> bool {
        self.rdns.len() >= ancestor.rdns.len() && self.rdns.ends_with(&ancestor.rdns)
    }

    /// The part of `self` below `ancestor`, `None` if not a descendant.
    pub fn relative_to(&self, ancestor: &Dn) -> Option<Dn> {
        if !self.is_descendant_of(ancestor) {
            return None;
        }
        let keep = self.rdns.len() - ancestor.rdns.len();
        Some(Self {
            rdns: self.rdns[..keep].to_vec(),
        })
    }

    /// Append `suffix` above this name (`self` becomes relative to it).
    pub fn concat(&self, suffix: &Dn) -> Dn {
        let mut rdns = self.rdns.clone();
        rdns.extend(suffix.rdns.iter().cloned());
        Self { rdns }
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

impl FromStr for Dn {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        if s.trim().is_empty() {
            return Ok(Self::root());
        }

        let parts =
            split_unescaped(s, ',').ok_or_else(|| ValidationError::invalid_dn(s, "dangling escape"))?;

        let rdns = parts
            .iter()
            .map(|part| {
                if split_unescaped(part, '+').is_some_and(|values| values.len() > 1) {
                    return Err(ValidationError::invalid_dn(s, "multi-valued RDNs are not supported"));
                }
                part.parse::<Rdn>()
                    .map_err(|_| ValidationError::invalid_dn(s, format!("bad component '{part}'")))
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(Self { rdns })
    }
}

impl TryFrom<&str> for Dn {
    type Error = ValidationError;

    fn try_from(value: &str) -> ValidationResult<Self> {
        value.parse()
    }
}

/// Split on every unescaped `separator`. Escape sequences are kept verbatim so
/// that the next pass can split on a different separator.
fn split_unescaped(input: &str, separator: char) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            current.push(chars.next()?);
        } else if c == separator {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);

    Some(parts)
}

fn unescape(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    let mut chars = part.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
