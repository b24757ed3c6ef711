use eager_init_core::{register_global, run_global, RuntimeInitError};
use std::panic;
use std::sync::Mutex;

static CALLS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

// One test owns the process-wide registry for this binary.
#[test]
fn panicking_initializer_leaves_registry_finished_not_running() {
    register_global("first", 10, || CALLS.lock().unwrap().push("first")).unwrap();
    register_global("broken", 5, || panic!("initializer failed")).unwrap();
    register_global("never", 0, || CALLS.lock().unwrap().push("never")).unwrap();

    let outcome = panic::catch_unwind(run_global);
    assert!(outcome.is_err());
    assert_eq!(*CALLS.lock().unwrap(), ["first"]);

    assert_eq!(run_global(), Err(RuntimeInitError::AlreadyRan));
    assert_eq!(
        register_global("late", 1, || {}),
        Err(RuntimeInitError::RegistrationClosed("late".to_string()))
    );
}
