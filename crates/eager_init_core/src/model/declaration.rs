//! Annotated declaration model.
//!
//! # Responsibility
//! - Describe one marker-carrying declaration as discovery reported it.
//! - Hold the partition produced by validation.
//!
//! # Invariants
//! - `ValidationResult` partitions its input: disjoint and exhaustive.
//! - Every entry of `valid_singletons` has `DeclarationKind::Singleton`.

use crate::annotation::DEFAULT_PRIORITY;
use serde::{Deserialize, Serialize};

/// Declaration form of a marked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// An immutable module-level `static` whose type is a lazy cell.
    Singleton,
    /// Any other item form (struct, fn, const, impl, ...).
    Other,
}

impl DeclarationKind {
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

/// One declaration carrying the `eager_initialize` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDeclaration {
    /// Fully qualified path, e.g. `crate::db::POOL`.
    pub qualified_name: String,
    pub kind: DeclarationKind,
    /// Marker priority; higher initializes earlier.
    pub priority: i32,
    /// Containing file, relative to the scanned root.
    pub source_location: String,
}

impl AnnotatedDeclaration {
    /// Creates a declaration with the default marker priority.
    pub fn new(
        qualified_name: impl Into<String>,
        kind: DeclarationKind,
        source_location: impl Into<String>,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind,
            priority: DEFAULT_PRIORITY,
            source_location: source_location.into(),
        }
    }

    pub fn singleton(qualified_name: impl Into<String>, source_location: impl Into<String>) -> Self {
        Self::new(qualified_name, DeclarationKind::Singleton, source_location)
    }

    pub fn other(qualified_name: impl Into<String>, source_location: impl Into<String>) -> Self {
        Self::new(qualified_name, DeclarationKind::Other, source_location)
    }

    /// Returns a copy with the given priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Validation partition of all discovered declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid_singletons: Vec<AnnotatedDeclaration>,
    pub invalid_declarations: Vec<AnnotatedDeclaration>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.invalid_declarations.is_empty()
    }

    /// Total number of declarations seen by validation.
    pub fn len(&self) -> usize {
        self.valid_singletons.len() + self.invalid_declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
