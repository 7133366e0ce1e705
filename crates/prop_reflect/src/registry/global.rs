use std::sync::OnceLock;

use super::ClassRegistry;
use crate::ReflectError;

static GLOBAL: OnceLock<ClassRegistry> = OnceLock::new();

fn build(setup: impl FnOnce(&mut ClassRegistry)) -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry.auto_register();
    setup(&mut registry);
    let ran = registry.drain_pending();
    log::debug!("global class registry ready after {ran} initializers");
    registry
}

/// The process-wide registry.
///
/// Initialized on first use with the primitive leaves and every
/// `#[reflect(auto_register)]` type, unless [`init_global`] ran first.
/// Read-only from then on.
pub fn global() -> &'static ClassRegistry {
    GLOBAL.get_or_init(|| build(|_| {}))
}

/// Initializes the process-wide registry with extra registrations.
///
/// `setup` runs after the automatic registrations and before the drain.
/// Fails if the registry was already initialized, by this function or by
/// [`global`].
///
/// ```
/// use prop_reflect::Reflect;
/// use prop_reflect::registry;
///
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// struct Settings {
///     volume: f32,
/// }
///
/// let global = registry::init_global(|registry| {
///     registry.register::<Settings>();
/// })
/// .unwrap();
/// assert!(global.get_class_by_name("Settings").is_some());
///
/// assert!(registry::init_global(|_| {}).is_err());
/// ```
pub fn init_global(
    setup: impl FnOnce(&mut ClassRegistry),
) -> Result<&'static ClassRegistry, ReflectError> {
    let mut fresh = false;
    let registry = GLOBAL.get_or_init(|| {
        fresh = true;
        build(setup)
    });
    if fresh {
        Ok(registry)
    } else {
        Err(ReflectError::GlobalAlreadyInitialized)
    }
}

/// `true` once the process-wide registry exists.
#[inline]
pub fn is_global_initialized() -> bool {
    GLOBAL.get().is_some()
}
