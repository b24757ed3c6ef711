// @generated by eager_init. Do not edit.
// package: lol.ffi

/// Eagerly initializes every `#[eager_initialize]` static in priority order.
pub struct EagerInitializeGenerated {
    _priv: (),
}

pub static EAGER_INITIALIZE_GENERATED: ::std::sync::LazyLock<EagerInitializeGenerated> =
    ::std::sync::LazyLock::new(|| {
        let _ = &*crate::db::POOL;
        let _ = &*crate::SETTINGS;
        let _ = &*crate::cache::CACHE;
        EagerInitializeGenerated { _priv: () }
    });

impl EagerInitializeGenerated {
    /// Forces every listed static, once per process.
    pub fn initialize() {
        let _ = &*EAGER_INITIALIZE_GENERATED;
    }
}
