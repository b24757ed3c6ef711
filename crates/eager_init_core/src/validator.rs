//! Declaration kind validation.
//!
//! # Responsibility
//! - Partition marked declarations into singletons and everything else.
//! - Build the enumerated abort message when any non-singleton is marked.
//!
//! # Invariants
//! - Partition keeps discovery order within each side.
//! - The abort message lists every invalid declaration; entries are joined
//!   with `;` and the last one ends with `.`.

use crate::config::ConfigError;
use crate::model::declaration::{AnnotatedDeclaration, ValidationResult};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

const INVALID_HEADER: &str = "The following files contain invalid #[eager_initialize] annotations!";

/// Splits `declarations` by kind without failing.
pub fn partition(declarations: Vec<AnnotatedDeclaration>) -> ValidationResult {
    let (valid_singletons, invalid_declarations): (Vec<_>, Vec<_>) = declarations
        .into_iter()
        .partition(|declaration| declaration.kind.is_singleton());
    ValidationResult {
        valid_singletons,
        invalid_declarations,
    }
}

/// Validates `declarations`, returning the singletons in discovery order.
///
/// # Errors
/// - Returns `InvalidDeclarationsError` listing every non-singleton.
pub fn validate(
    declarations: Vec<AnnotatedDeclaration>,
) -> Result<Vec<AnnotatedDeclaration>, InvalidDeclarationsError> {
    let result = partition(declarations);
    if result.is_valid() {
        info!(
            "event=validate module=validator status=ok valid={}",
            result.valid_singletons.len()
        );
        return Ok(result.valid_singletons);
    }

    error!(
        "event=validate module=validator status=error valid={} invalid={}",
        result.valid_singletons.len(),
        result.invalid_declarations.len()
    );
    Err(InvalidDeclarationsError::from_non_empty(
        result.invalid_declarations,
    ))
}

/// Non-singleton declarations carried the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDeclarationsError {
    invalids: Vec<AnnotatedDeclaration>,
    message: String,
}

impl InvalidDeclarationsError {
    /// Builds the error for a non-empty invalid set.
    ///
    /// # Errors
    /// - Returns `ConfigError::EmptyInvalidSet` when `invalids` is empty.
    pub fn new(invalids: Vec<AnnotatedDeclaration>) -> Result<Self, ConfigError> {
        if invalids.is_empty() {
            return Err(ConfigError::EmptyInvalidSet);
        }
        Ok(Self::from_non_empty(invalids))
    }

    fn from_non_empty(invalids: Vec<AnnotatedDeclaration>) -> Self {
        let message = render_invalid_message(&invalids);
        Self { invalids, message }
    }

    pub fn invalid_declarations(&self) -> &[AnnotatedDeclaration] {
        &self.invalids
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for InvalidDeclarationsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for InvalidDeclarationsError {}

fn render_invalid_message(invalids: &[AnnotatedDeclaration]) -> String {
    let mut message = String::from(INVALID_HEADER);
    message.push('\n');
    let last = invalids.len().saturating_sub(1);
    for (index, declaration) in invalids.iter().enumerate() {
        let terminator = if index == last { '.' } else { ';' };
        message.push_str(&format!(
            "{} on the {} declaration{terminator}\n",
            declaration.source_location, declaration.qualified_name
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::{partition, validate, InvalidDeclarationsError};
    use crate::config::ConfigError;
    use crate::model::declaration::AnnotatedDeclaration;

    #[test]
    fn partition_is_disjoint_and_keeps_order() {
        let result = partition(vec![
            AnnotatedDeclaration::singleton("crate::a::A", "a.rs"),
            AnnotatedDeclaration::other("crate::b::B", "b.rs"),
            AnnotatedDeclaration::singleton("crate::c::C", "c.rs"),
            AnnotatedDeclaration::other("crate::d::D", "d.rs"),
        ]);

        let valid: Vec<_> = result
            .valid_singletons
            .iter()
            .map(|d| d.qualified_name.as_str())
            .collect();
        let invalid: Vec<_> = result
            .invalid_declarations
            .iter()
            .map(|d| d.qualified_name.as_str())
            .collect();
        assert_eq!(valid, ["crate::a::A", "crate::c::C"]);
        assert_eq!(invalid, ["crate::b::B", "crate::d::D"]);
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn validate_passes_singletons_through() {
        let valid = validate(vec![
            AnnotatedDeclaration::singleton("crate::A", "lib.rs").with_priority(3)
        ])
        .expect("singletons are valid");
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].priority, 3);
    }

    #[test]
    fn validate_accepts_empty_input() {
        let valid = validate(Vec::new()).expect("empty input is valid");
        assert!(valid.is_empty());
    }

    #[test]
    fn single_invalid_entry_ends_with_period() {
        let err = validate(vec![
            AnnotatedDeclaration::other("crate::X", "x.rs"),
            AnnotatedDeclaration::singleton("crate::Y", "y.rs"),
        ])
        .expect_err("other-kind declaration must fail");

        assert_eq!(
            err.to_string(),
            "The following files contain invalid #[eager_initialize] annotations!\n\
             x.rs on the crate::X declaration.\n"
        );
        assert_eq!(err.invalid_declarations().len(), 1);
    }

    #[test]
    fn multiple_invalid_entries_are_joined_with_semicolons() {
        let err = validate(vec![
            AnnotatedDeclaration::other("crate::a::First", "a.rs"),
            AnnotatedDeclaration::other("crate::b::Second", "b.rs"),
            AnnotatedDeclaration::other("crate::c::Third", "c.rs"),
        ])
        .expect_err("other-kind declarations must fail");

        let lines: Vec<&str> = err.message().lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "a.rs on the crate::a::First declaration;");
        assert_eq!(lines[2], "b.rs on the crate::b::Second declaration;");
        assert_eq!(lines[3], "c.rs on the crate::c::Third declaration.");
    }

    #[test]
    fn empty_invalid_set_is_a_configuration_error() {
        let err = InvalidDeclarationsError::new(Vec::new()).expect_err("empty set must fail");
        assert_eq!(err, ConfigError::EmptyInvalidSet);
    }
}
