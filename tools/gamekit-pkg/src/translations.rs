///
/// # Translations
///
/// One JSON object per language under `resources/lang/`, named
/// `<code>.json`, mapping string keys to translated strings.
///

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::errors::PackageError;
use crate::listing::list_entries;
use crate::manifest::{to_pretty_json, write_atomic_sync};

pub type Translation = IndexMap<String, String>;

fn language_file(lang_dir: &Path, code: &str) -> PathBuf {
    lang_dir.join(format!("{}.json", code))
}

pub fn list_languages(lang_dir: &Path) -> Result<Vec<String>, PackageError> {
    let entries = list_entries(lang_dir, &["json".to_string()]).collect_sorted()?;
    Ok(entries
        .into_iter()
        .filter(|e| !e.name.contains('/'))
        .filter_map(|e| {
            e.path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .collect())
}

pub fn read_translation(lang_dir: &Path, code: &str) -> Result<Translation, PackageError> {
    let path = language_file(lang_dir, code);
    let contents = std::fs::read_to_string(&path).map_err(PackageError::io(&path))?;
    serde_json::from_str(&contents).map_err(|e| PackageError::TranslationParse {
        path,
        reason: e.to_string(),
        contents,
    })
}

pub fn write_translation(
    lang_dir: &Path,
    code: &str,
    strings: &Translation,
) -> Result<(), PackageError> {
    std::fs::create_dir_all(lang_dir).map_err(PackageError::io(lang_dir))?;
    let bytes = to_pretty_json(strings)?;
    write_atomic_sync(&language_file(lang_dir, code), &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_list_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let lang_dir = temp_dir.path().join("resources").join("lang");

        let mut en = Translation::new();
        en.insert("START".to_string(), "Start".to_string());
        en.insert("QUIT".to_string(), "Quit".to_string());
        write_translation(&lang_dir, "en", &en).unwrap();

        let mut fr = Translation::new();
        fr.insert("START".to_string(), "Commencer".to_string());
        write_translation(&lang_dir, "fr", &fr).unwrap();

        assert_eq!(list_languages(&lang_dir).unwrap(), vec!["en", "fr"]);
        assert_eq!(read_translation(&lang_dir, "en").unwrap(), en);

        let text = fs::read_to_string(lang_dir.join("en.json")).unwrap();
        assert!(text.starts_with("{\n\t\"START\""));
    }

    #[test]
    fn test_missing_lang_dir_lists_nothing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_languages(&temp_dir.path().join("lang")).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_translation() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("de.json"), "[1, 2]").unwrap();

        match read_translation(temp_dir.path(), "de") {
            Err(PackageError::TranslationParse { contents, .. }) => assert_eq!(contents, "[1, 2]"),
            other => panic!("Expected TranslationParse error, got {:?}", other),
        }
    }
}
