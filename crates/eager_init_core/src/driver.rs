//! Generation pass orchestration.
//!
//! # Responsibility
//! - Run discover -> validate -> order -> emit -> write once per invocation.
//! - Surface every failure through `GenerateError` without partial output.
//!
//! # Invariants
//! - The writer is called only after validation succeeded, and at most once.
//! - Invocations share no state; the same snapshot yields the same unit.
//! - A successful pass defers nothing to later passes.

use crate::config::{ConfigError, GeneratorConfig};
use crate::discovery::{DiscoveryError, SymbolDiscovery};
use crate::emitter::emit;
use crate::model::declaration::AnnotatedDeclaration;
use crate::model::unit::GeneratedUnit;
use crate::orderer::order;
use crate::validator::{validate, InvalidDeclarationsError};
use crate::writer::{CodeWriter, WriteError};
use log::{error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type GenerateResult<T> = Result<T, GenerateError>;

/// Eager-initialization generator for one configured output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EagerInitProcessor {
    config: GeneratorConfig,
}

impl EagerInitProcessor {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Builds a processor from host options (`packageName`, `className`).
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        GeneratorConfig::from_options(options).map(Self::new)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Validates, orders, and emits `declarations` without touching a writer.
    ///
    /// # Errors
    /// - `InvalidDeclarations` when any declaration is not a singleton.
    pub fn generate(&self, declarations: Vec<AnnotatedDeclaration>) -> GenerateResult<GeneratedUnit> {
        let valid = validate(declarations)?;
        let init_order = order(&valid);
        Ok(emit(
            self.config.package_name.as_str(),
            self.config.class_name.as_str(),
            init_order,
        ))
    }

    /// Runs one full pass and hands the unit to `writer`.
    ///
    /// Returns the declarations deferred to a later pass, which is always
    /// empty on success.
    ///
    /// # Side effects
    /// - Calls `writer.write_unit` exactly once on success, never on failure.
    /// - Emits `generate` logging events with duration and status.
    pub fn process<D, W>(
        &self,
        discovery: &D,
        writer: &mut W,
    ) -> GenerateResult<Vec<AnnotatedDeclaration>>
    where
        D: SymbolDiscovery + ?Sized,
        W: CodeWriter + ?Sized,
    {
        let started_at = Instant::now();
        info!(
            "event=generate module=driver status=start package={} class={}",
            self.config.package_name, self.config.class_name
        );

        match self.run_pass(discovery, writer) {
            Ok(count) => {
                info!(
                    "event=generate module=driver status=ok initializers={} duration_ms={}",
                    count,
                    started_at.elapsed().as_millis()
                );
                Ok(Vec::new())
            }
            Err(err) => {
                error!(
                    "event=generate module=driver status=error error_code={} duration_ms={}",
                    err.code(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn run_pass<D, W>(&self, discovery: &D, writer: &mut W) -> GenerateResult<usize>
    where
        D: SymbolDiscovery + ?Sized,
        W: CodeWriter + ?Sized,
    {
        let declarations = discovery.discover()?;
        let unit = self.generate(declarations)?;
        let count = unit.init_order.len();
        writer.write_unit(unit)?;
        Ok(count)
    }
}

/// Any failure that aborts a generation pass.
#[derive(Debug)]
pub enum GenerateError {
    Config(ConfigError),
    Discovery(DiscoveryError),
    InvalidDeclarations(InvalidDeclarationsError),
    Write(WriteError),
}

impl GenerateError {
    /// Stable short code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_invalid",
            Self::Discovery(_) => "discovery_failed",
            Self::InvalidDeclarations(_) => "invalid_declarations",
            Self::Write(_) => "write_failed",
        }
    }
}

impl Display for GenerateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Discovery(err) => write!(f, "{err}"),
            Self::InvalidDeclarations(err) => write!(f, "{err}"),
            Self::Write(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GenerateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Discovery(err) => Some(err),
            Self::InvalidDeclarations(err) => Some(err),
            Self::Write(err) => Some(err),
        }
    }
}

impl From<ConfigError> for GenerateError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DiscoveryError> for GenerateError {
    fn from(value: DiscoveryError) -> Self {
        Self::Discovery(value)
    }
}

impl From<InvalidDeclarationsError> for GenerateError {
    fn from(value: InvalidDeclarationsError) -> Self {
        Self::InvalidDeclarations(value)
    }
}

impl From<WriteError> for GenerateError {
    fn from(value: WriteError) -> Self {
        Self::Write(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{EagerInitProcessor, GenerateError};
    use crate::config::GeneratorConfig;
    use crate::discovery::SnapshotDiscovery;
    use crate::model::declaration::AnnotatedDeclaration;
    use crate::model::unit::GeneratedUnit;
    use crate::writer::{CodeWriter, WriteError};

    #[derive(Default)]
    struct RecordingWriter {
        units: Vec<GeneratedUnit>,
    }

    impl CodeWriter for RecordingWriter {
        fn write_unit(&mut self, unit: GeneratedUnit) -> Result<(), WriteError> {
            self.units.push(unit);
            Ok(())
        }
    }

    struct FailingWriter;

    impl CodeWriter for FailingWriter {
        fn write_unit(&mut self, _unit: GeneratedUnit) -> Result<(), WriteError> {
            Err(WriteError::Rejected("read-only output".to_string()))
        }
    }

    fn singleton(name: &str, priority: i32) -> AnnotatedDeclaration {
        AnnotatedDeclaration::singleton(name, "lib.rs").with_priority(priority)
    }

    #[test]
    fn process_writes_one_ordered_unit_and_defers_nothing() {
        let processor = EagerInitProcessor::default();
        let discovery = SnapshotDiscovery::new(vec![
            singleton("crate::A", 5),
            singleton("crate::B", 10),
            singleton("crate::C", 5),
        ]);
        let mut writer = RecordingWriter::default();

        let deferred = processor
            .process(&discovery, &mut writer)
            .expect("valid pass");

        assert!(deferred.is_empty());
        assert_eq!(writer.units.len(), 1);
        let unit = &writer.units[0];
        assert_eq!(unit.package_name, "lol.ffi");
        assert_eq!(unit.type_name, "EagerInitializeGenerated");
        assert_eq!(unit.init_order.as_slice(), ["crate::B", "crate::A", "crate::C"]);
    }

    #[test]
    fn invalid_declaration_aborts_before_writer() {
        let processor = EagerInitProcessor::default();
        let discovery = SnapshotDiscovery::new(vec![
            AnnotatedDeclaration::other("crate::X", "x.rs"),
            singleton("crate::Y", 0),
        ]);
        let mut writer = RecordingWriter::default();

        let err = processor
            .process(&discovery, &mut writer)
            .expect_err("other-kind declaration must abort");

        assert!(matches!(err, GenerateError::InvalidDeclarations(_)));
        assert_eq!(err.code(), "invalid_declarations");
        assert!(err.to_string().contains("x.rs on the crate::X declaration."));
        assert!(writer.units.is_empty());
    }

    #[test]
    fn writer_failure_is_propagated() {
        let processor = EagerInitProcessor::default();
        let err = processor
            .process(&SnapshotDiscovery::default(), &mut FailingWriter)
            .expect_err("writer failure must surface");
        assert!(matches!(err, GenerateError::Write(_)));
    }

    #[test]
    fn empty_snapshot_produces_empty_unit() {
        let processor = EagerInitProcessor::new(GeneratorConfig {
            package_name: "app.boot".to_string(),
            class_name: "Startup".to_string(),
        });
        let unit = processor.generate(Vec::new()).expect("empty input is valid");
        assert!(unit.init_order.is_empty());
        assert_eq!(unit.package_name, "app.boot");
        assert_eq!(unit.type_name, "Startup");
    }
}
