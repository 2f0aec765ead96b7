///
/// # Manifest Model
///
/// This module provides the typed model of a package's `manifest.json` and
/// the `ManifestStore` that owns it on disk.
///
/// ## Example manifest.json
///
/// ```json
/// {
/// 	"appID": "2f6fd7a4-3c2b-4d1e-9a57-8d8f1a0c5b11",
/// 	"shortName": "tetris",
/// 	"title": "Tetris",
/// 	"studio": {
/// 		"name": "Your Studio Name",
/// 		"domain": "studio.example.com",
/// 		"stagingDomain": "staging.example.com"
/// 	},
/// 	"supportedOrientations": ["portrait", "landscape"]
/// }
/// ```
///
/// ## Identity
///
/// `appID` is assigned once. A manifest read without a non-empty string
/// `appID` gets a fresh UUID and is written back before `read` returns,
/// so every later read sees the same identifier.
///
/// ## Open Schema
///
/// Keys the model does not name are kept in `extra` in file order and
/// written back untouched. A conventional key whose value does not fit its
/// typed field (`"title": 5`, `"title": null`, a `studio` with a `null`
/// member) stays in `extra` as raw JSON as well, so reading never fails on
/// valid JSON objects and nothing is lost on write-back.
///
/// ## Persistence
///
/// Every save replaces the in-memory manifest first and then writes
/// tab-indented JSON through a temporary file that is renamed over
/// `manifest.json`. There is no locking: with interleaved writers the last
/// rename wins.
///

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::PackageError;

pub const MANIFEST_FILE: &str = "manifest.json";

pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Studio {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(rename = "stagingDomain", default, skip_serializing_if = "Option::is_none")]
    pub staging_domain: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

const APP_ID: &str = "appID";
const SHORT_NAME: &str = "shortName";
const TITLE: &str = "title";
const STUDIO: &str = "studio";
const SUPPORTED_ORIENTATIONS: &str = "supportedOrientations";
const DEFAULT_LANG_KEY: &str = "defaultLang";
const ADDONS: &str = "addons";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    pub app_id: String,
    pub short_name: Option<String>,
    pub title: Option<String>,
    pub studio: Option<Studio>,
    pub supported_orientations: Option<Vec<String>>,
    pub default_lang: Option<String>,
    pub addons: Option<IndexMap<String, Value>>,
    pub extra: IndexMap<String, Value>,
}

/// Moves `key` out of `map` only when it converts to `T` and back without
/// loss; anything else (wrong type, `null`, dropped fields) stays raw.
fn take_typed<T>(map: &mut IndexMap<String, Value>, key: &str) -> Option<T>
where
    T: DeserializeOwned + Serialize,
{
    let raw = map.get(key)?;
    let typed: T = serde_json::from_value(raw.clone()).ok()?;
    if serde_json::to_value(&typed).ok().as_ref() != Some(raw) {
        return None;
    }
    map.shift_remove(key);
    Some(typed)
}

impl Manifest {
    /// Splits an arbitrary JSON object into the known keys and `extra`.
    /// A non-string `appID` is dropped so it can be healed.
    pub fn from_map(mut map: IndexMap<String, Value>) -> Self {
        let app_id = match map.shift_remove(APP_ID) {
            Some(Value::String(id)) => id,
            _ => String::new(),
        };

        Manifest {
            app_id,
            short_name: take_typed(&mut map, SHORT_NAME),
            title: take_typed(&mut map, TITLE),
            studio: take_typed(&mut map, STUDIO),
            supported_orientations: take_typed(&mut map, SUPPORTED_ORIENTATIONS),
            default_lang: take_typed(&mut map, DEFAULT_LANG_KEY),
            addons: take_typed(&mut map, ADDONS),
            extra: map,
        }
    }

    /// Whether `key` is written from a typed field rather than from `extra`.
    fn is_typed(&self, key: &str) -> bool {
        match key {
            APP_ID => true,
            SHORT_NAME => self.short_name.is_some(),
            TITLE => self.title.is_some(),
            STUDIO => self.studio.is_some(),
            SUPPORTED_ORIENTATIONS => self.supported_orientations.is_some(),
            DEFAULT_LANG_KEY => self.default_lang.is_some(),
            ADDONS => self.addons.is_some(),
            _ => false,
        }
    }

    pub fn has_valid_app_id(&self) -> bool {
        !self.app_id.is_empty()
    }

    pub fn default_lang(&self) -> &str {
        self.default_lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn addons(&self) -> IndexMap<String, Value> {
        self.addons.clone().unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IndexMap::<String, Value>::deserialize(deserializer).map(Manifest::from_map)
    }
}

impl Serialize for Manifest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(APP_ID, &self.app_id)?;
        if let Some(short_name) = &self.short_name {
            map.serialize_entry(SHORT_NAME, short_name)?;
        }
        if let Some(title) = &self.title {
            map.serialize_entry(TITLE, title)?;
        }
        if let Some(studio) = &self.studio {
            map.serialize_entry(STUDIO, studio)?;
        }
        if let Some(orientations) = &self.supported_orientations {
            map.serialize_entry(SUPPORTED_ORIENTATIONS, orientations)?;
        }
        if let Some(lang) = &self.default_lang {
            map.serialize_entry(DEFAULT_LANG_KEY, lang)?;
        }
        if let Some(addons) = &self.addons {
            map.serialize_entry(ADDONS, addons)?;
        }
        for (key, value) in &self.extra {
            if !self.is_typed(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PopulateOptions {
    pub short_name: Option<String>,
    pub title: Option<String>,
}

pub fn new_app_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn default_manifest(options: &PopulateOptions) -> Manifest {
    Manifest {
        app_id: new_app_id(),
        short_name: options.short_name.clone(),
        title: options.title.clone(),
        studio: Some(Studio {
            name: Some("Your Studio Name".to_string()),
            domain: Some("studio.example.com".to_string()),
            staging_domain: Some("staging.example.com".to_string()),
            extra: IndexMap::new(),
        }),
        supported_orientations: Some(vec!["portrait".to_string(), "landscape".to_string()]),
        default_lang: None,
        addons: None,
        extra: IndexMap::new(),
    }
}

/// Existing value for `key`, typed or raw, wins over the default.
fn overlay<T>(
    existing: Option<T>,
    default: Option<T>,
    key: &str,
    existing_extra: &IndexMap<String, Value>,
) -> Option<T> {
    match existing {
        Some(value) => Some(value),
        None if existing_extra.contains_key(key) => None,
        None => default,
    }
}

/// Merges `existing` over `defaults` key by key; existing keys always win.
pub fn apply_defaults(existing: Manifest, defaults: Manifest) -> Manifest {
    let app_id = if existing.has_valid_app_id() {
        existing.app_id
    } else {
        defaults.app_id
    };

    let raw = &existing.extra;
    let short_name = overlay(existing.short_name, defaults.short_name, SHORT_NAME, raw);
    let title = overlay(existing.title, defaults.title, TITLE, raw);
    let studio = overlay(existing.studio, defaults.studio, STUDIO, raw);
    let supported_orientations = overlay(
        existing.supported_orientations,
        defaults.supported_orientations,
        SUPPORTED_ORIENTATIONS,
        raw,
    );
    let default_lang = overlay(existing.default_lang, defaults.default_lang, DEFAULT_LANG_KEY, raw);
    let addons = overlay(existing.addons, defaults.addons, ADDONS, raw);

    let mut extra = defaults.extra;
    for (key, value) in existing.extra {
        extra.insert(key, value);
    }

    Manifest {
        app_id,
        short_name,
        title,
        studio,
        supported_orientations,
        default_lang,
        addons,
        extra,
    }
}

pub fn parse_manifest_str(content: &str) -> Result<Manifest, serde_json::Error> {
    serde_json::from_str(content)
}

/// Serializes with tab indentation, the format of every file this crate writes.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, PackageError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| MANIFEST_FILE.to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

pub(crate) fn write_atomic_sync(path: &Path, bytes: &[u8]) -> Result<(), PackageError> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes).map_err(PackageError::io(&tmp))?;
    std::fs::rename(&tmp, path).map_err(PackageError::io(path))
}

async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), PackageError> {
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, bytes).await.map_err(PackageError::io(&tmp))?;
    tokio::fs::rename(&tmp, path).await.map_err(PackageError::io(path))
}

#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    manifest: Manifest,
}

impl ManifestStore {
    /// Reads `path`, healing a missing or invalid `appID` with a synchronous
    /// write-back before returning.
    pub fn read(path: &Path) -> Result<Self, PackageError> {
        let contents = std::fs::read_to_string(path).map_err(PackageError::io(path))?;

        let manifest = parse_manifest_str(&contents).map_err(|e| PackageError::ManifestParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
            contents: contents.clone(),
        })?;

        tracing::debug!(path = %path.display(), "read manifest");

        let mut store = Self {
            path: path.to_path_buf(),
            manifest,
        };

        if !store.manifest.has_valid_app_id() {
            let mut healed = store.manifest.clone();
            healed.app_id = new_app_id();
            tracing::info!(path = %path.display(), app_id = %healed.app_id, "assigned missing appID");
            store.save_sync(healed)?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Lays the current manifest over a fresh default skeleton and persists it.
    pub fn populate(&mut self, options: &PopulateOptions) -> Result<&Manifest, PackageError> {
        let merged = apply_defaults(self.manifest.clone(), default_manifest(options));
        self.save_sync(merged)?;
        Ok(&self.manifest)
    }

    pub async fn save(&mut self, data: Manifest) -> Result<(), PackageError> {
        let bytes = to_pretty_json(&data)?;
        self.manifest = data;
        write_atomic(&self.path, bytes).await?;
        tracing::debug!(path = %self.path.display(), "saved manifest");
        Ok(())
    }

    pub fn save_sync(&mut self, data: Manifest) -> Result<(), PackageError> {
        let bytes = to_pretty_json(&data)?;
        self.manifest = data;
        write_atomic_sync(&self.path, &bytes)?;
        tracing::debug!(path = %self.path.display(), "saved manifest");
        Ok(())
    }

    pub fn get_key(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(&self.manifest) {
            Ok(Value::Object(map)) => map.get(key).cloned(),
            _ => None,
        }
    }

    pub fn get_key_or(&self, key: &str, default: Value) -> Value {
        self.get_key(key).unwrap_or(default)
    }
}
