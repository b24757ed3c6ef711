//! Ordered init list and generated unit model.

use serde::{Deserialize, Serialize};

/// Qualified names in initialization order.
///
/// Produced only by the orderer, so adjacent entries never increase in
/// priority and ties keep discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedInitList(Vec<String>);

impl OrderedInitList {
    pub(crate) fn from_ordered(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a OrderedInitList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One generated compilation unit handed to the host writer.
///
/// Ownership moves to the writer; the generator keeps no copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedUnit {
    /// Dot-separated target package, e.g. `lol.ffi`.
    pub package_name: String,
    /// Target type name, e.g. `EagerInitializeGenerated`.
    pub type_name: String,
    /// References emitted as initializer statements, in order.
    pub init_order: OrderedInitList,
}

impl GeneratedUnit {
    /// Package segments, in declaration order.
    pub fn package_segments(&self) -> impl Iterator<Item = &str> {
        self.package_name
            .split('.')
            .filter(|segment| !segment.is_empty())
    }
}
