// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Marker byte that prefixes a version component.
pub const VERSION_MARKER: u8 = 0xFD;

/// One opaque segment of a [`Name`].
///
/// Components order shorter-first, then by bytes, which is the canonical NDN
/// ordering rather than plain lexicographic ordering.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct NameComponent(Vec<u8>);

impl NameComponent {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the URI form of a component.
    ///
    /// `%XX` escapes are decoded. A component consisting only of periods loses
    /// three of them, so `...` is the empty component; one or two periods alone
    /// are rejected.
    pub fn from_escaped(text: &str) -> Result<Self, ModelError> {
        let bytes = text.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                    .ok_or_else(|| ModelError::InvalidEscape(text.to_string()))?;
                let byte = (hex_value(hex[0]) << 4) | hex_value(hex[1]);
                out.push(byte);
                i += 3;
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }

        if !out.is_empty() && out.iter().all(|b| *b == b'.') {
            if out.len() < 3 {
                return Err(ModelError::IllegalPeriodComponent(out.len()));
            }
            out.truncate(out.len() - 3);
        }
        Ok(Self(out))
    }

    /// URI form: unreserved bytes verbatim, everything else `%XX`.
    pub fn to_escaped(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 3);
        if self.0.iter().all(|b| *b == b'.') {
            for _ in 0..self.0.len() + 3 {
                out.push('.');
            }
            return out;
        }
        for b in &self.0 {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
                out.push(*b as char);
            } else {
                out.push_str(&format!("%{b:02X}"));
            }
        }
        out
    }

    /// Builds a version component: the marker byte followed by the
    /// big-endian value without leading zero bytes.
    pub fn from_version(version: u64) -> Self {
        let be = version.to_be_bytes();
        let first = be.iter().position(|b| *b != 0).unwrap_or(be.len() - 1);
        let mut value = Vec::with_capacity(1 + be.len() - first);
        value.push(VERSION_MARKER);
        value.extend_from_slice(&be[first..]);
        Self(value)
    }

    pub fn is_version(&self) -> bool {
        self.0.len() >= 2 && self.0.len() <= 9 && self.0[0] == VERSION_MARKER
    }

    pub fn to_version(&self) -> Result<u64, ModelError> {
        if !self.is_version() {
            return Err(ModelError::NotAVersion);
        }
        Ok(self.0[1..]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }
}

impl Ord for NameComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for NameComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameComponent({})", self.to_escaped())
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_escaped())
    }
}

impl From<&str> for NameComponent {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

/// Hierarchical identifier: an ordered sequence of [`NameComponent`]s.
///
/// Names compare component-wise and a proper prefix sorts before any longer
/// name that extends it.
#[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Name {
    components: Vec<NameComponent>,
}

impl Name {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_components(components: Vec<NameComponent>) -> Self {
        Self { components }
    }

    /// Parses `/a/b%20c/...`; an `ndn:` scheme prefix is accepted and empty
    /// segments are ignored.
    pub fn from_uri(uri: &str) -> Result<Self, ModelError> {
        let trimmed = uri.trim();
        let path = trimmed.strip_prefix("ndn:").unwrap_or(trimmed);
        let components = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(NameComponent::from_escaped)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }

    pub fn to_uri(&self) -> String {
        if self.components.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for component in &self.components {
            out.push('/');
            out.push_str(&component.to_escaped());
        }
        out
    }

    pub fn size(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NameComponent> {
        self.components.get(index)
    }

    pub fn components(&self) -> &[NameComponent] {
        &self.components
    }

    pub fn last(&self) -> Option<&NameComponent> {
        self.components.last()
    }

    /// Leading components of the name. A negative `count` drops that many
    /// components from the end instead.
    pub fn get_prefix(&self, count: isize) -> Name {
        let len = self.components.len();
        let keep = if count < 0 {
            len.saturating_sub(count.unsigned_abs())
        } else {
            (count as usize).min(len)
        };
        Self {
            components: self.components[..keep].to_vec(),
        }
    }

    /// Components `[offset, offset + len)`, clamped to the name.
    pub fn sub_name(&self, offset: usize, len: usize) -> Name {
        let start = offset.min(self.components.len());
        let end = offset.saturating_add(len).min(self.components.len());
        Self {
            components: self.components[start..end].to_vec(),
        }
    }

    pub fn append(&mut self, component: NameComponent) -> &mut Self {
        self.components.push(component);
        self
    }

    pub fn append_name(&mut self, other: &Name) -> &mut Self {
        self.components.extend_from_slice(&other.components);
        self
    }

    /// Owned variant of [`Name::append`], handy when building names inline.
    pub fn with(mut self, component: impl Into<NameComponent>) -> Self {
        self.components.push(component.into());
        self
    }

    /// True when `self` is a (not necessarily proper) prefix of `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.components.len() <= other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(a, b)| a == b)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.to_uri())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromStr for Name {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl FromIterator<NameComponent> for Name {
    fn from_iter<T: IntoIterator<Item = NameComponent>>(iter: T) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Name {
    type Item = &'a NameComponent;
    type IntoIter = std::slice::Iter<'a, NameComponent>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
