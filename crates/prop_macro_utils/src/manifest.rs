use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The invoking crate's `Cargo.toml`, parsed once per modification time.
///
/// Generated code has to name `prop_reflect` the way the *calling* crate
/// sees it: directly, or through the `prop_core` facade.
///
/// ```rust
/// # use prop_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("prop_reflect"));
/// ```
///
/// # Resolution rules
///
/// 1. A direct dependency `name` yields `::name`.
/// 2. For `prop_xxx`, a dependency on the facade `prop_core` yields `::prop_core::xxx`.
/// 3. Steps 1-2 are repeated for `dev-dependencies`.
/// 4. Otherwise `::name`. A crate naming itself needs
///    `extern crate self as name;` at its root for this to resolve.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FACADE_NAME: &str = "prop_core";
const CRATE_PREFIX: &str = "prop_";

impl Manifest {
    #[inline(never)]
    fn manifest_path() -> PathBuf {
        let dir = std::env::var_os("CARGO_MANIFEST_DIR")
            .expect("CARGO_MANIFEST_DIR should be set by cargo.");
        let mut path = PathBuf::from(dir);
        path.push("Cargo.toml");
        path
    }

    #[inline(never)]
    fn load(path: &PathBuf, modified_time: SystemTime) -> Self {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|err| panic!("unable to read {}: {err}", path.display()));
        let manifest = Document::parse(text.into_boxed_str())
            .unwrap_or_else(|err| panic!("unable to parse {}: {err}", path.display()));
        Self {
            manifest,
            modified_time,
        }
    }

    fn parse_path(text: &str) -> syn::Path {
        syn::parse_str(text).unwrap_or_else(|_| panic!("`{text}` is not a valid path"))
    }

    fn find_in(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::parse_path(&format!("::{name}")));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        deps.contains_key(FACADE_NAME)
            .then(|| Self::parse_path(&format!("::{FACADE_NAME}::{module}")))
    }

    /// Resolve `name` as seen from the invoking crate.
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .find_map(|section| match self.manifest.get(section) {
                Some(Item::Table(deps)) => Self::find_in(deps, name),
                _ => None,
            })
            .unwrap_or_else(|| Self::parse_path(&format!("::{name}")))
    }

    /// Run `func` against the cached manifest of the invoking crate.
    ///
    /// Reading and parsing happen only when the file changed since the last
    /// call, but the lookup still touches the filesystem; call it once per
    /// macro expansion and pass the resulting path around.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static CACHE: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified_time = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        {
            let cache = CACHE.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = cache.get(&path)
                && manifest.modified_time == modified_time
            {
                return func(manifest);
            }
        }

        let manifest = Self::load(&path, modified_time);
        let result = func(&manifest);
        CACHE
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);
        result
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Manifest;
    use std::time::SystemTime;

    fn path_string(path: &syn::Path) -> String {
        path.segments
            .iter()
            .map(|seg| seg.ident.to_string())
            .collect::<Vec<_>>()
            .join("::")
    }

    fn manifest(text: &str) -> Manifest {
        Manifest {
            manifest: toml_edit::Document::parse(text.to_owned().into_boxed_str()).unwrap(),
            modified_time: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn direct_dependency() {
        let m = manifest("[dependencies]\nprop_reflect = \"0.1\"\n");
        assert_eq!(path_string(&m.get_crate_path("prop_reflect")), "prop_reflect");
    }

    #[test]
    fn through_facade() {
        let m = manifest("[dev-dependencies]\nprop_core = { path = \"..\" }\n");
        assert_eq!(path_string(&m.get_crate_path("prop_reflect")), "prop_core::reflect");
    }

    #[test]
    fn fallback_is_absolute() {
        let m = manifest("[package]\nname = \"x\"\n");
        let path = m.get_crate_path("prop_reflect");
        assert!(path.leading_colon.is_some());
        assert_eq!(path_string(&path), "prop_reflect");
    }
}
