use eager_init_core::runtime::global_run_started;
use eager_init_core::{register_global, run_global, RuntimeInitError};
use std::sync::Mutex;

static CALLS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());
static NESTED_RESULT: Mutex<Option<Result<Vec<String>, RuntimeInitError>>> = Mutex::new(None);

fn record(name: &'static str) {
    CALLS.lock().unwrap().push(name);
}

// One test owns the process-wide registry for this binary.
#[test]
fn global_registry_runs_once_in_priority_order_and_rejects_reentry() {
    assert!(!global_run_started());

    register_global("logging", 100, || record("logging")).unwrap();
    register_global("metrics", 0, || record("metrics")).unwrap();
    register_global("config", 100, || record("config")).unwrap();
    register_global("reentry", 50, || {
        record("reentry");
        *NESTED_RESULT.lock().unwrap() = Some(run_global());
    })
    .unwrap();

    let invoked = run_global().unwrap();
    assert_eq!(invoked, ["logging", "config", "reentry", "metrics"]);
    assert_eq!(
        *CALLS.lock().unwrap(),
        ["logging", "config", "reentry", "metrics"]
    );
    assert_eq!(
        *NESTED_RESULT.lock().unwrap(),
        Some(Err(RuntimeInitError::Reentrant))
    );

    assert!(global_run_started());
    assert_eq!(run_global(), Err(RuntimeInitError::AlreadyRan));
    assert_eq!(
        register_global("late", 1, || record("late")),
        Err(RuntimeInitError::RegistrationClosed("late".to_string()))
    );
    assert_eq!(CALLS.lock().unwrap().len(), 4);
}
