//! Generated unit persistence.
//!
//! # Responsibility
//! - Define the writer seam that receives each finished unit.
//! - Persist rendered units under an output directory.
//!
//! # Invariants
//! - Units are written to a temporary sibling and renamed into place, so a
//!   failed write never leaves a partial file at the target path.
//! - Target path: `<out_dir>/<package segments>/<type name in snake_case>.rs`.

use crate::emitter::render_source;
use crate::model::unit::GeneratedUnit;
use heck::ToSnakeCase;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Receives the generated unit at the end of a successful run.
pub trait CodeWriter {
    /// Takes ownership of `unit` and persists or registers it.
    fn write_unit(&mut self, unit: GeneratedUnit) -> Result<(), WriteError>;
}

/// Relative file path for `unit` below an output directory.
pub fn unit_relative_path(unit: &GeneratedUnit) -> PathBuf {
    let mut path: PathBuf = unit.package_segments().collect();
    path.push(format!("{}.rs", unit.type_name.to_snake_case()));
    path
}

/// Filesystem writer rooted at one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsCodeWriter {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FsCodeWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            written: Vec::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Paths written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl CodeWriter for FsCodeWriter {
    fn write_unit(&mut self, unit: GeneratedUnit) -> Result<(), WriteError> {
        let target = self.out_dir.join(unit_relative_path(&unit));
        let source = render_source(&unit);

        match write_atomically(&target, source.as_bytes()) {
            Ok(()) => {
                info!(
                    "event=write_unit module=writer status=ok path={} bytes={}",
                    target.display(),
                    source.len()
                );
                self.written.push(target);
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=write_unit module=writer status=error path={} error={}",
                    target.display(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn write_atomically(target: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let io_err = |source: std::io::Error| WriteError::Io {
        path: target.to_path_buf(),
        source,
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut staging = target.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    if let Err(err) = std::fs::write(&staging, contents) {
        let _ = std::fs::remove_file(&staging);
        return Err(io_err(err));
    }
    if let Err(err) = std::fs::rename(&staging, target) {
        let _ = std::fs::remove_file(&staging);
        return Err(io_err(err));
    }
    Ok(())
}

/// Writer errors.
#[derive(Debug)]
pub enum WriteError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Host-specific writer failure.
    Rejected(String),
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
            Self::Rejected(message) => write!(f, "writer rejected generated unit: {message}"),
        }
    }
}

impl Error for WriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Rejected(_) => None,
        }
    }
}
