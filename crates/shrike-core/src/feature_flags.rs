use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// A named toggle state recorded on events for correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlag {
    pub name: String,
    pub variant: Option<String>,
}

impl FeatureFlag {
    pub fn new(name: impl Into<String>, variant: Option<String>) -> Self {
        Self {
            name: name.into(),
            variant,
        }
    }
}

impl Serialize for FeatureFlag {
    // Wire shape: {"featureFlag": name, "variant"?: v}
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let len = if self.variant.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("featureFlag", &self.name)?;
        if let Some(variant) = &self.variant {
            map.serialize_entry("variant", variant)?;
        }
        map.end()
    }
}

/// Insertion-ordered set of feature flags, keyed by name.
///
/// Re-adding a name replaces its variant in place rather than moving the
/// flag to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlagSet {
    flags: Vec<FeatureFlag>,
}

impl FeatureFlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flags(flags: impl IntoIterator<Item = FeatureFlag>) -> Self {
        let mut set = Self::new();
        set.merge(flags);
        set
    }

    pub fn add(&mut self, name: impl Into<String>, variant: Option<String>) {
        let name = name.into();
        match self.flags.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.variant = variant,
            None => self.flags.push(FeatureFlag { name, variant }),
        }
    }

    pub fn merge(&mut self, flags: impl IntoIterator<Item = FeatureFlag>) {
        for flag in flags {
            self.add(flag.name, flag.variant);
        }
    }

    pub fn clear(&mut self, name: &str) {
        self.flags.retain(|f| f.name != name);
    }

    pub fn clear_all(&mut self) {
        self.flags.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureFlag> {
        self.flags.iter()
    }
}

impl Serialize for FeatureFlagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.flags.len()))?;
        for flag in &self.flags {
            seq.serialize_element(flag)?;
        }
        seq.end()
    }
}
