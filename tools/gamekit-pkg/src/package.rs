///
/// # Package Facade
///
/// A package is a directory holding `manifest.json`. `PackagePaths` checks
/// that gate and computes the fixed layout once:
///
/// ```text
/// <root>/
///   manifest.json
///   shared/            scripts
///   resources/         images, sounds, config
///   resources/lang/    <code>.json translations
///   icons/             images
/// ```
///
/// `Package` adds the manifest and the layout config on top and exposes
/// listings, translations, import scanning and the sanitize, transform,
/// unsanitize pipeline for scripts.
///
/// A directory with a broken `manifest.json` still yields `PackagePaths`;
/// only `Package::from_paths` fails, with `PackageError::ManifestParse`.
///

use std::path::{Path, PathBuf};

use crate::config::LayoutConfig;
use crate::engine::ScriptEngine;
use crate::errors::PackageError;
use crate::imports::{parse_imports, ImportRecord};
use crate::listing::{list_entries, DirEntry};
use crate::manifest::{write_atomic_sync, Manifest, ManifestStore, PopulateOptions, MANIFEST_FILE};
use crate::sanitize::{sanitize, unsanitize};
use crate::translations::{list_languages, read_translation, write_translation, Translation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePaths {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub shared: PathBuf,
    pub resources: PathBuf,
    pub icons: PathBuf,
    pub lang: PathBuf,
}

impl PackagePaths {
    pub fn new(root: &Path) -> Result<Self, PackageError> {
        if !is_package(root) {
            return Err(PackageError::NotAPackage {
                path: root.to_path_buf(),
            });
        }

        let resources = root.join("resources");
        Ok(Self {
            root: root.to_path_buf(),
            manifest: root.join(MANIFEST_FILE),
            shared: root.join("shared"),
            lang: resources.join("lang"),
            resources,
            icons: root.join("icons"),
        })
    }
}

pub fn is_package(dir: &Path) -> bool {
    dir.is_dir() && dir.join(MANIFEST_FILE).is_file()
}

pub fn find_package_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;

    loop {
        if is_package(current) {
            return Some(current.to_path_buf());
        }

        current = current.parent()?;
    }
}

#[derive(Debug)]
pub struct Package {
    paths: PackagePaths,
    layout: LayoutConfig,
    manifest: ManifestStore,
}

impl Package {
    pub fn open(root: &Path) -> Result<Self, PackageError> {
        Self::from_paths(PackagePaths::new(root)?, LayoutConfig::default())
    }

    pub fn from_paths(paths: PackagePaths, layout: LayoutConfig) -> Result<Self, PackageError> {
        let manifest = ManifestStore::read(&paths.manifest)?;
        Ok(Self {
            paths,
            layout,
            manifest,
        })
    }

    /// `shortName` when set, otherwise `appID`.
    pub fn id(&self) -> &str {
        let manifest = self.manifest.manifest();
        match manifest.short_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &manifest.app_id,
        }
    }

    pub fn paths(&self) -> &PackagePaths {
        &self.paths
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn manifest(&self) -> &Manifest {
        self.manifest.manifest()
    }

    pub fn manifest_store(&self) -> &ManifestStore {
        &self.manifest
    }

    pub fn manifest_store_mut(&mut self) -> &mut ManifestStore {
        &mut self.manifest
    }

    pub fn populate_manifest(&mut self, options: &PopulateOptions) -> Result<&Manifest, PackageError> {
        self.manifest.populate(options)
    }

    pub fn scripts(&self) -> Result<Vec<DirEntry>, PackageError> {
        list_entries(&self.paths.shared, &self.layout.script_extensions).collect_sorted()
    }

    pub fn resources(&self) -> Result<Vec<DirEntry>, PackageError> {
        list_entries(&self.paths.resources, &self.layout.resource_extensions()).collect_sorted()
    }

    pub fn images(&self) -> Result<Vec<DirEntry>, PackageError> {
        list_entries(&self.paths.resources, &self.layout.image_extensions).collect_sorted()
    }

    pub fn sounds(&self) -> Result<Vec<DirEntry>, PackageError> {
        list_entries(&self.paths.resources, &self.layout.sound_extensions).collect_sorted()
    }

    /// Config files under `resources/`, translation files excluded.
    pub fn config_files(&self) -> Result<Vec<DirEntry>, PackageError> {
        let entries =
            list_entries(&self.paths.resources, &self.layout.config_extensions).collect_sorted()?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.path.starts_with(&self.paths.lang))
            .collect())
    }

    pub fn icons(&self) -> Result<Vec<DirEntry>, PackageError> {
        list_entries(&self.paths.icons, &self.layout.image_extensions).collect_sorted()
    }

    pub fn languages(&self) -> Result<Vec<String>, PackageError> {
        list_languages(&self.paths.lang)
    }

    pub fn translation(&self, code: &str) -> Result<Translation, PackageError> {
        read_translation(&self.paths.lang, code)
    }

    pub fn write_translation(&self, code: &str, strings: &Translation) -> Result<(), PackageError> {
        write_translation(&self.paths.lang, code, strings)
    }

    /// Dotted module path of a script relative to `shared/`, without its
    /// extension: `shared/ui/View.js` is `ui.View`. Scripts outside
    /// `shared/` fall back to their file stem.
    pub fn script_module_path(&self, script: &Path) -> String {
        let relative = script.strip_prefix(&self.paths.shared).unwrap_or_else(|_| {
            Path::new(script.file_name().unwrap_or(script.as_os_str()))
        });

        relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn script_imports(&self, script: &Path) -> Result<Vec<ImportRecord>, PackageError> {
        let code = std::fs::read_to_string(script).map_err(PackageError::io(script))?;
        Ok(parse_imports(&code, &self.script_module_path(script)))
    }

    /// Reads a script, runs it through `engine` and returns the restored
    /// source, or `None` when the engine failed.
    fn transform_script<E: ScriptEngine>(
        &self,
        script: &Path,
        engine: &mut E,
    ) -> Result<(String, Option<String>), PackageError> {
        let code = std::fs::read_to_string(script).map_err(PackageError::io(script))?;

        match engine.transform(&sanitize(&code)) {
            Ok(regenerated) => {
                let restored = unsanitize(&regenerated);
                Ok((code, Some(restored)))
            }
            Err(e) => {
                tracing::warn!(script = %script.display(), error = %e, "script transform failed, keeping original source");
                Ok((code, None))
            }
        }
    }

    /// Runs a script through `engine` and returns the restored source.
    /// An engine failure returns the file contents unchanged.
    pub fn walk_script<E: ScriptEngine>(
        &self,
        script: &Path,
        engine: &mut E,
    ) -> Result<String, PackageError> {
        let (code, restored) = self.transform_script(script, engine)?;
        Ok(restored.unwrap_or(code))
    }

    /// Like `walk_script`, then overwrites the script. The file is not
    /// touched when the engine fails.
    pub fn rewrite_script<E: ScriptEngine>(
        &self,
        script: &Path,
        engine: &mut E,
    ) -> Result<String, PackageError> {
        match self.transform_script(script, engine)? {
            (_, Some(restored)) => {
                write_atomic_sync(script, restored.as_bytes())?;
                tracing::debug!(script = %script.display(), "rewrote script");
                Ok(restored)
            }
            (code, None) => Ok(code),
        }
    }
}

/// Creates `dir` as a new package with a populated manifest and empty
/// `shared/` and `resources/` folders.
pub fn init_package(dir: &Path, options: &PopulateOptions) -> Result<Package, PackageError> {
    std::fs::create_dir_all(dir).map_err(PackageError::io(dir))?;

    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        return Err(PackageError::AlreadyInitialized {
            path: manifest_path,
        });
    }

    write_atomic_sync(&manifest_path, b"{}")?;
    for folder in ["shared", "resources"] {
        let path = dir.join(folder);
        std::fs::create_dir_all(&path).map_err(PackageError::io(&path))?;
    }

    let mut package = Package::open(dir)?;
    package.populate_manifest(options)?;
    Ok(package)
}
