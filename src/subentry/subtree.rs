//! Subtree specifications (RFC 3672).
//!
//! Only the structural parts are interpreted: `base`, `minimum`, `maximum`
//! and `specificExclusions`. A `specificationFilter` refinement is kept as
//! raw text; evaluating it needs object class information this crate does
//! not have.

use crate::error::{ValidationError, ValidationResult};
use crate::naming::Dn;
use std::str::FromStr;

/// The region of the tree a subentry applies to, relative to its
/// administrative point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtreeSpecification {
    base: Dn,
    minimum: usize,
    maximum: Option<usize>,
    chop_before: Vec<Dn>,
    chop_after: Vec<Dn>,
    refinement: Option<String>,
}

impl SubtreeSpecification {
    /// The whole subtree below the administrative point.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: Dn) -> Self {
        self.base = base;
        self
    }

    pub fn with_minimum(mut self, minimum: usize) -> Self {
        self.minimum = minimum;
        self
    }

    pub fn with_maximum(mut self, maximum: usize) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Exclude `name` (relative to the base) and everything below it.
    pub fn chop_before(mut self, name: Dn) -> Self {
        self.chop_before.push(name);
        self
    }

    /// Exclude everything below `name` (relative to the base).
    pub fn chop_after(mut self, name: Dn) -> Self {
        self.chop_after.push(name);
        self
    }

    pub fn with_refinement(mut self, refinement: impl Into<String>) -> Self {
        self.refinement = Some(refinement.into());
        self
    }

    pub fn base(&self) -> &Dn {
        &self.base
    }

    pub fn minimum(&self) -> usize {
        self.minimum
    }

    pub fn maximum(&self) -> Option<usize> {
        self.maximum
    }

    pub fn chop_before_exclusions(&self) -> &[Dn] {
        &self.chop_before
    }

    pub fn chop_after_exclusions(&self) -> &[Dn] {
        &self.chop_after
    }

    /// Raw `specificationFilter`, if any.
    pub fn refinement(&self) -> Option<&str> {
        self.refinement.as_deref()
    }

    /// Whether `dn` falls in the region when administered from `admin_point`.
    ///
    /// The refinement is not evaluated.
    pub fn contains(&self, admin_point: &Dn, dn: &Dn) -> bool {
        let base = self.base.concat(admin_point);
        let Some(relative) = dn.relative_to(&base) else {
            return false;
        };
        let depth = relative.size();
        if depth < self.minimum || self.maximum.is_some_and(|max| depth > max) {
            return false;
        }
        if self
            .chop_before
            .iter()
            .any(|chop| dn.is_descendant_of(&chop.concat(&base)))
        {
            return false;
        }
        !self.chop_after.iter().any(|chop| {
            let chop = chop.concat(&base);
            dn.is_descendant_of(&chop) && *dn != chop
        })
    }
}

impl FromStr for SubtreeSpecification {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).specification()
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, message: &str) -> ValidationError {
        ValidationError::invalid_subtree(format!("{message} at offset {}", self.pos))
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn expect(&mut self, c: char) -> ValidationResult<()> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    /// Consume `c` if it is next; returns whether it was.
    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> ValidationResult<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected an identifier"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn number(&mut self) -> ValidationResult<usize> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let value = rest[..len]
            .parse()
            .map_err(|_| self.error("expected a number"))?;
        self.pos += len;
        Ok(value)
    }

    /// A double-quoted string; `""` stands for a literal quote.
    fn quoted(&mut self) -> ValidationResult<String> {
        self.expect('"')?;
        let mut value = String::new();
        let mut chars = self.rest().char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            if c == '"' {
                if let Some((_, '"')) = chars.peek() {
                    chars.next();
                    value.push('"');
                    continue;
                }
                self.pos += offset + 1;
                return Ok(value);
            }
            value.push(c);
        }
        Err(self.error("unterminated string"))
    }

    fn dn(&mut self) -> ValidationResult<Dn> {
        let text = self.quoted()?;
        text.parse()
    }

    /// Raw text up to the next top-level ',' or '}'.
    fn raw_value(&mut self) -> ValidationResult<String> {
        self.skip_ws();
        let rest = self.rest();
        let mut depth = 0usize;
        let mut in_string = false;
        for (offset, c) in rest.char_indices() {
            match c {
                '"' => in_string = !in_string,
                _ if in_string => {}
                '{' | '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '}' if depth > 0 => depth -= 1,
                '}' | ',' if depth == 0 => {
                    let value = rest[..offset].trim().to_string();
                    self.pos += offset;
                    if value.is_empty() {
                        return Err(self.error("expected a refinement"));
                    }
                    return Ok(value);
                }
                _ => {}
            }
        }
        Err(self.error("unterminated refinement"))
    }

    fn exclusions(&mut self, spec: &mut SubtreeSpecification) -> ValidationResult<()> {
        self.expect('{')?;
        if self.eat('}') {
            return Ok(());
        }
        loop {
            let kind = self.identifier()?;
            self.expect(':')?;
            let name = self.dn()?;
            match kind {
                "chopBefore" => spec.chop_before.push(name),
                "chopAfter" => spec.chop_after.push(name),
                other => return Err(self.error(&format!("unknown exclusion '{other}'"))),
            }
            if self.eat(',') {
                continue;
            }
            return self.expect('}');
        }
    }

    fn specification(mut self) -> ValidationResult<SubtreeSpecification> {
        let mut spec = SubtreeSpecification::default();
        self.expect('{')?;
        if !self.eat('}') {
            loop {
                match self.identifier()? {
                    "base" => spec.base = self.dn()?,
                    "minimum" => spec.minimum = self.number()?,
                    "maximum" => spec.maximum = Some(self.number()?),
                    "specificExclusions" => self.exclusions(&mut spec)?,
                    "specificationFilter" => spec.refinement = Some(self.raw_value()?),
                    other => return Err(self.error(&format!("unknown component '{other}'"))),
                }
                if self.eat(',') {
                    continue;
                }
                self.expect('}')?;
                break;
            }
        }
        self.skip_ws();
        if !self.rest().is_empty() {
            return Err(self.error("trailing input"));
        }
        if spec.maximum.is_some_and(|max| max < spec.minimum) {
            return Err(ValidationError::invalid_subtree(
                "maximum must not be below minimum",
            ));
        }
        Ok(spec)
    }
}
