use crate::richtext::element::Element;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Which element list of a document an operation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Zone {
    Header,
    #[default]
    Main,
    Footer,
}

/// Serialized form of a document: three independent element lists
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFile {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<Element>,
    pub main: Vec<Element>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footer: Vec<Element>,
}

impl DocumentFile {
    pub fn zone(&self, zone: Zone) -> &Vec<Element> {
        match zone {
            Zone::Header => &self.header,
            Zone::Main => &self.main,
            Zone::Footer => &self.footer,
        }
    }

    pub fn zone_mut(&mut self, zone: Zone) -> &mut Vec<Element> {
        match zone {
            Zone::Header => &mut self.header,
            Zone::Main => &mut self.main,
            Zone::Footer => &mut self.footer,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub path: PathBuf,
    pub data: DocumentFile,
}

pub struct DocumentStore {
    base_path: PathBuf,
}

impl DocumentStore {
    pub fn new(base_path: PathBuf) -> Self {
        DocumentStore { base_path }
    }

    /// Load a document by name (with or without .toml extension)
    /// If the file doesn't exist, an empty document is returned that will be
    /// created on first save
    pub fn load(&self, name: &str) -> Result<Document, String> {
        let mut path = self.base_path.join(name);

        if path.extension().is_none() {
            path.set_extension("toml");
        }

        let data = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read '{}': {}", name, e))?;
            toml::from_str(&content).map_err(|e| format!("Failed to parse '{}': {}", name, e))?
        } else {
            DocumentFile::default()
        };

        Ok(Document {
            name: name.to_string(),
            path,
            data,
        })
    }

    /// Save document content
    /// Creates parent directories if they don't exist
    pub fn save(&self, doc: &Document) -> Result<(), String> {
        if let Some(parent) = doc.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create directories for '{}': {}", doc.name, e))?;
        }

        let content = toml::to_string_pretty(&doc.data)
            .map_err(|e| format!("Failed to serialize '{}': {}", doc.name, e))?;
        fs::write(&doc.path, content).map_err(|e| format!("Failed to save '{}': {}", doc.name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ControlOptions;
    use crate::richtext::control_document::build_select_control;
    use crate::richtext::element::{Control, ElementStyle, ValueSet};
    use std::env;

    #[test]
    fn test_load_non_existent_file() {
        let temp_dir = env::temp_dir().join("piki-controls-test-load");
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).unwrap();

        let store = DocumentStore::new(temp_dir.clone());
        let doc = store.load("form").unwrap();

        assert!(doc.data.main.is_empty());
        assert_eq!(doc.name, "form");
        assert_eq!(doc.path, temp_dir.join("form.toml"));

        fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = env::temp_dir().join("piki-controls-test-save");
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).unwrap();

        let store = DocumentStore::new(temp_dir.clone());
        let mut doc = store.load("nested/dir/form").unwrap();
        let control = Control::select(vec![ValueSet::new("A", "Alpha")]).with_code("A");
        doc.data.main.push(Element::line_break());
        doc.data.main.extend(build_select_control(
            "c1",
            control,
            ElementStyle {
                bold: Some(true),
                ..Default::default()
            },
            &ControlOptions::default(),
        ));
        doc.data.header.push(Element::text("h"));

        store.save(&doc).unwrap();
        assert!(doc.path.exists());

        let loaded = store.load("nested/dir/form").unwrap();
        assert_eq!(loaded.data, doc.data);
        assert_eq!(loaded.data.zone(Zone::Header).len(), 1);
        assert!(loaded.data.zone(Zone::Footer).is_empty());

        fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp_dir = env::temp_dir().join("piki-controls-test-parse");
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).unwrap();
        fs::write(temp_dir.join("broken.toml"), "main = 3").unwrap();

        let store = DocumentStore::new(temp_dir.clone());
        let err = store.load("broken").unwrap_err();
        assert!(err.starts_with("Failed to parse 'broken'"));

        fs::remove_dir_all(&temp_dir).ok();
    }
}
