///
/// # gamekit-pkg — Game package model for the gamekit build tool
///
/// This crate represents an on-disk game package (`manifest.json`,
/// resources, scripts, translations) and the module tooling around its
/// scripts: scanning `import`/`from` statements into resolved records and
/// masking them, together with `#` directives, from a standard script
/// parser.
///
/// ## Library Usage
///
/// ```rust,ignore
/// use gamekit_pkg::{find_package_root, parse_imports, Package};
///
/// if let Some(root) = find_package_root(start_dir) {
///     let package = Package::open(&root)?;
///     for script in package.scripts()? {
///         let imports = package.script_imports(&script.path)?;
///     }
/// }
/// ```
///
/// ## CLI
///
/// ```sh
/// gamekit init <dir>                    # Create a package with a populated manifest
/// gamekit info [dir]                    # Show package identity and contents
/// gamekit imports <file> [--base a.b]   # List resolved import records
/// gamekit sanitize <file>               # Print masked source
/// ```
///

pub mod config;
pub mod engine;
pub mod errors;
pub mod imports;
pub mod listing;
pub mod manifest;
pub mod package;
pub mod sanitize;
pub mod translations;

pub use config::LayoutConfig;
pub use engine::ScriptEngine;
pub use errors::PackageError;
pub use imports::{parse_imports, parse_imports_strict, resolve_path, ImportKind, ImportRecord};
pub use listing::{list_entries, DirEntry, EntryStream};
pub use manifest::{apply_defaults, default_manifest, Manifest, ManifestStore, PopulateOptions, Studio};
pub use package::{find_package_root, init_package, is_package, Package, PackagePaths};
pub use sanitize::{sanitize, unsanitize};
