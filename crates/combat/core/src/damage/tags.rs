use std::fmt;

/// Designer-defined damage type label ("fire", "slash", ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DamageTag(pub String);

impl DamageTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DamageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DamageTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Ordered set of damage tags carried by a request.
///
/// Insertion order is preserved and duplicates are dropped, so a tag listed
/// twice by a designer never applies its modifiers twice.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<DamageTag>", into = "Vec<DamageTag>"))]
pub struct DamageTypeSet {
    tags: Vec<DamageTag>,
}

impl DamageTypeSet {
    pub const fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Adds `tag` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, tag: DamageTag) -> bool {
        if self.contains(tag.as_str()) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.as_str() == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DamageTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<DamageTag> for DamageTypeSet {
    fn from_iter<I: IntoIterator<Item = DamageTag>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for DamageTypeSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(DamageTag::from).collect()
    }
}

impl From<Vec<DamageTag>> for DamageTypeSet {
    fn from(tags: Vec<DamageTag>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<DamageTypeSet> for Vec<DamageTag> {
    fn from(set: DamageTypeSet) -> Self {
        set.tags
    }
}
