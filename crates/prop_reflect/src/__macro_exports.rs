//! Paths used by `#[derive(Reflect)]` output. Not public API.

pub use alloc::borrow::Cow;
pub use alloc::format;
pub use alloc::string::String;
pub use alloc::vec::Vec;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::registry::ClassRegistry;

    /// One registration submitted by `#[reflect(auto_register)]`.
    pub struct AutoRegisterFn(pub fn(&mut ClassRegistry));

    inventory::collect!(AutoRegisterFn);
}
