//! Build-time generator for priority-ordered eager initialization.
//!
//! Finds lazy statics marked `#[eager_initialize]`, rejects every other marked item,
//! orders the rest by descending priority, and emits one aggregating lazy
//! static that forces them all in that order.

pub mod annotation;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod emitter;
pub mod logging;
pub mod model;
pub mod orderer;
pub mod runtime;
pub mod validator;
pub mod writer;

pub use annotation::{EagerInitialize, MarkerError, DEFAULT_PRIORITY, MARKER_NAME};
pub use config::{ConfigError, GeneratorConfig, DEFAULT_CLASS_NAME, DEFAULT_PACKAGE_NAME};
pub use discovery::{DiscoveryError, SnapshotDiscovery, SourceTreeDiscovery, SymbolDiscovery};
pub use driver::{EagerInitProcessor, GenerateError, GenerateResult};
pub use emitter::{emit, render_source};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::declaration::{AnnotatedDeclaration, DeclarationKind, ValidationResult};
pub use model::unit::{GeneratedUnit, OrderedInitList};
pub use orderer::order;
pub use runtime::{register_global, run_global, InitRegistry, RuntimeInitError};
pub use validator::{partition, validate, InvalidDeclarationsError};
pub use writer::{CodeWriter, FsCodeWriter, WriteError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
