pub mod raw;

use std::fs;
use std::path::{Path, PathBuf};

use relative_path::RelativePath;

use crate::model::EditorState;
pub use raw::{RawContent, RawError, convert_from_raw, convert_to_raw};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Raw(#[from] RawError),
    #[error("Invalid documents directory: {0}")]
    InvalidRoot(String),
}

/// Serialize a snapshot as pretty-printed raw JSON
pub fn to_json(state: &EditorState) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(&convert_to_raw(state))?)
}

/// Parse raw JSON into a snapshot
pub fn from_json(json: &str) -> Result<EditorState, StorageError> {
    let raw: RawContent = serde_json::from_str(json)?;
    Ok(convert_from_raw(raw)?)
}

/// Saves and loads documents as JSON files under a root directory
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `state` to `name`, creating parent directories as needed
    pub fn save(&self, name: &RelativePath, state: &EditorState) -> Result<(), StorageError> {
        let path = name.to_path(&self.root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, to_json(state)?)?;
        log::info!("Saved {} blocks to {}", state.blocks().len(), path.display());
        Ok(())
    }

    /// Load `name`, or `None` if nothing has been saved there yet
    pub fn load(&self, name: &RelativePath) -> Result<Option<EditorState>, StorageError> {
        let path = name.to_path(&self.root);
        if !path.exists() {
            log::info!("No saved document at {}", path.display());
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        from_json(&json).map(Some)
    }
}

pub fn validate_root(path: &Path) -> Result<(), StorageError> {
    if !path.exists() || !path.is_dir() {
        return Err(StorageError::InvalidRoot(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, BlockType, InlineStyle};
    use crate::tests::{create_test_documents_dir, create_test_file};
    use pretty_assertions::assert_eq;

    fn styled_state() -> EditorState {
        EditorState::from_blocks(vec![
            Block::new("h", "Title").with_type(BlockType::HeaderOne),
            Block::new("p", "some code").with_style(5, 9, InlineStyle::Code),
        ])
        .unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = create_test_documents_dir();
        let store = DocumentStore::new(dir.path());
        let name = RelativePath::new("editorContent.json");

        store.save(name, &styled_state()).unwrap();
        let loaded = store.load(name).unwrap().unwrap();

        assert_eq!(loaded.blocks(), styled_state().blocks());
    }

    #[test]
    fn test_load_missing_document_is_none() {
        let dir = create_test_documents_dir();
        let store = DocumentStore::new(dir.path());
        let loaded = store.load(RelativePath::new("missing.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = create_test_documents_dir();
        let store = DocumentStore::new(dir.path());
        let name = RelativePath::new("drafts/2024/note.json");

        store.save(name, &styled_state()).unwrap();

        assert!(dir.path().join("drafts").join("2024").is_dir());
        assert!(store.load(name).unwrap().is_some());
    }

    #[test]
    fn test_save_overwrites_existing() {
        let dir = create_test_documents_dir();
        let store = DocumentStore::new(dir.path());
        let name = RelativePath::new("doc.json");

        store.save(name, &styled_state()).unwrap();
        store.save(name, &EditorState::new()).unwrap();

        let loaded = store.load(name).unwrap().unwrap();
        assert_eq!(loaded.blocks().len(), 1);
        assert!(loaded.blocks()[0].is_empty());
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = create_test_documents_dir();
        create_test_file(&dir, "broken.json", "{ not json");
        let store = DocumentStore::new(dir.path());

        let result = store.load(RelativePath::new("broken.json"));
        assert!(matches!(result, Err(StorageError::Json(_))));
    }

    #[test]
    fn test_load_invalid_document() {
        let dir = create_test_documents_dir();
        create_test_file(
            &dir,
            "bad.json",
            r#"{"blocks":[{"key":"a","text":"x","type":"unstyled",
                "inlineStyleRanges":[{"offset":0,"length":9,"style":"BOLD"}]}]}"#,
        );
        let store = DocumentStore::new(dir.path());

        let result = store.load(RelativePath::new("bad.json"));
        assert!(matches!(result, Err(StorageError::Raw(_))));
    }

    #[test]
    fn test_save_into_missing_root_fails() {
        let dir = create_test_documents_dir();
        create_test_file(&dir, "file", "x");
        // A path below a regular file cannot be created
        let store = DocumentStore::new(dir.path().join("file"));
        let result = store.save(RelativePath::new("doc.json"), &EditorState::new());
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn test_validate_root() {
        let dir = create_test_documents_dir();
        assert!(validate_root(dir.path()).is_ok());
        assert!(matches!(
            validate_root(Path::new("/nonexistent/path")),
            Err(StorageError::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_json_helpers_round_trip() {
        let json = to_json(&styled_state()).unwrap();
        assert!(json.contains("\"header-one\""));
        let state = from_json(&json).unwrap();
        assert_eq!(state.blocks(), styled_state().blocks());
    }
}
