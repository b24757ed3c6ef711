//! Runtime priority registry for startup initializers.
//!
//! # Responsibility
//! - Collect named initializers with priorities.
//! - Run them once, ordered by the same rule as generated units.
//!
//! # Invariants
//! - Higher priority runs first; ties run in registration order.
//! - Each registry runs at most once; registration closes when a run starts.
//! - The process-wide registry never holds its lock while an initializer runs.

use crate::orderer::sort_by_priority_desc;
use log::{debug, info};
use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type InitFn = Box<dyn FnOnce() + Send + 'static>;

static GLOBAL_REGISTRY: Lazy<Mutex<InitRegistry>> = Lazy::new(|| Mutex::new(InitRegistry::new()));
static GLOBAL_RUN_STARTED: AtomicBool = AtomicBool::new(false);
static GLOBAL_RUNNING: AtomicBool = AtomicBool::new(false);

struct Registration {
    name: String,
    priority: i32,
    init: InitFn,
}

impl Debug for Registration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RunState {
    #[default]
    Open,
    Finished,
}

/// Ordered, run-once set of initializers.
#[derive(Debug, Default)]
pub struct InitRegistry {
    entries: Vec<Registration>,
    state: RunState,
}

impl InitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one initializer.
    ///
    /// Names are informational; duplicates are kept and run twice.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        init: impl FnOnce() + Send + 'static,
    ) -> Result<(), RuntimeInitError> {
        let name = name.into();
        if self.state == RunState::Finished {
            return Err(RuntimeInitError::RegistrationClosed(name));
        }
        debug!("event=init_register module=runtime status=ok name={name} priority={priority}");
        self.entries.push(Registration {
            name,
            priority,
            init: Box::new(init),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in the order a run would invoke them.
    pub fn planned_order(&self) -> Vec<&str> {
        let mut ordered: Vec<&Registration> = self.entries.iter().collect();
        sort_by_priority_desc(&mut ordered, |entry| entry.priority);
        ordered.into_iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Invokes every initializer in priority order and closes the registry.
    ///
    /// Returns the invoked names, in invocation order.
    pub fn run(&mut self) -> Result<Vec<String>, RuntimeInitError> {
        let ordered = self.take_ordered()?;
        Ok(invoke_all(ordered))
    }

    fn take_ordered(&mut self) -> Result<Vec<Registration>, RuntimeInitError> {
        if self.state == RunState::Finished {
            return Err(RuntimeInitError::AlreadyRan);
        }
        self.state = RunState::Finished;
        let mut ordered = std::mem::take(&mut self.entries);
        sort_by_priority_desc(&mut ordered, |entry| entry.priority);
        Ok(ordered)
    }
}

fn invoke_all(ordered: Vec<Registration>) -> Vec<String> {
    info!(
        "event=init_run module=runtime status=start count={}",
        ordered.len()
    );
    let mut invoked = Vec::with_capacity(ordered.len());
    for entry in ordered {
        debug!(
            "event=init_invoke module=runtime status=start name={} priority={}",
            entry.name, entry.priority
        );
        (entry.init)();
        invoked.push(entry.name);
    }
    info!(
        "event=init_run module=runtime status=ok count={}",
        invoked.len()
    );
    invoked
}

/// Registers an initializer in the process-wide registry.
pub fn register_global(
    name: impl Into<String>,
    priority: i32,
    init: impl FnOnce() + Send + 'static,
) -> Result<(), RuntimeInitError> {
    let name = name.into();
    if GLOBAL_RUN_STARTED.load(Ordering::Acquire) {
        return Err(RuntimeInitError::RegistrationClosed(name));
    }
    let mut registry = GLOBAL_REGISTRY
        .lock()
        .map_err(|_| RuntimeInitError::Poisoned)?;
    registry.register(name, priority, init)
}

/// Runs the process-wide registry once.
///
/// # Errors
/// - `Reentrant` when called while the run is in progress.
/// - `AlreadyRan` on any later call, including after an initializer panicked.
pub fn run_global() -> Result<Vec<String>, RuntimeInitError> {
    if GLOBAL_RUN_STARTED.swap(true, Ordering::AcqRel) {
        if GLOBAL_RUNNING.load(Ordering::Acquire) {
            return Err(RuntimeInitError::Reentrant);
        }
        return Err(RuntimeInitError::AlreadyRan);
    }

    let _running = RunningGuard::enter();
    let ordered = GLOBAL_REGISTRY
        .lock()
        .map_err(|_| RuntimeInitError::Poisoned)?
        .take_ordered()?;
    Ok(invoke_all(ordered))
}

/// Marks the process-wide run as in progress until dropped, including when
/// an initializer panics.
struct RunningGuard;

impl RunningGuard {
    fn enter() -> Self {
        GLOBAL_RUNNING.store(true, Ordering::Release);
        Self
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        GLOBAL_RUNNING.store(false, Ordering::Release);
    }
}

/// Whether the process-wide registry has started running.
pub fn global_run_started() -> bool {
    GLOBAL_RUN_STARTED.load(Ordering::Acquire)
}

/// Runtime registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeInitError {
    AlreadyRan,
    Reentrant,
    RegistrationClosed(String),
    Poisoned,
}

impl Display for RuntimeInitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRan => write!(f, "initializers have already run"),
            Self::Reentrant => write!(f, "initializer run is already in progress"),
            Self::RegistrationClosed(name) => {
                write!(f, "cannot register `{name}`: initializers have already run")
            }
            Self::Poisoned => write!(f, "initializer registry lock is poisoned"),
        }
    }
}

impl Error for RuntimeInitError {}
