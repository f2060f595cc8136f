//! Dataset file access — reads and writes the post corpus as JSON.
//!
//! Two on-disk shapes are accepted: the structured form
//! `{"dataset_info": {...}, "posts": [...]}` and a bare list of posts.
//! The dataset is a snapshot: it is loaded once and never mutated in place.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

pub mod models;

pub use models::{
    count_lines, Dataset, DatasetInfo, DatasetLayout, Engagement, Language, LengthBucket, Post,
    PostMetadata,
};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write dataset {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported dataset shape: expected a post list or an object with 'posts'")]
    UnsupportedShape,
}

impl Dataset {
    /// Parses a dataset from a JSON value in either supported shape.
    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        match value {
            Value::Array(_) => Ok(Dataset {
                posts: serde_json::from_value(value)?,
                layout: DatasetLayout::BareList,
                ..Dataset::default()
            }),
            Value::Object(mut object) if object.contains_key("posts") => {
                let posts = object.remove("posts").unwrap_or(Value::Array(Vec::new()));
                let info = match object.remove("dataset_info") {
                    Some(info) => serde_json::from_value(info)?,
                    None => DatasetInfo::default(),
                };
                Ok(Dataset {
                    info,
                    posts: serde_json::from_value(posts)?,
                    extra: object,
                    layout: DatasetLayout::Structured,
                })
            }
            _ => Err(DatasetError::UnsupportedShape),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Serializes back into the shape the dataset was read from.
    pub fn to_value(&self) -> Result<Value, DatasetError> {
        let posts = serde_json::to_value(&self.posts)?;
        match self.layout {
            DatasetLayout::BareList => Ok(posts),
            DatasetLayout::Structured => {
                let mut object = Map::new();
                object.insert("dataset_info".to_string(), serde_json::to_value(&self.info)?);
                object.insert("posts".to_string(), posts);
                for (key, value) in &self.extra {
                    object.insert(key.clone(), value.clone());
                }
                Ok(Value::Object(object))
            }
        }
    }
}

/// Loads a dataset file. Missing or malformed files are fatal to the caller.
pub fn load(path: &Path) -> Result<Dataset, DatasetError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = Dataset::from_json_str(&raw)?;
    info!("Loaded {} posts from {}", dataset.posts.len(), path.display());
    Ok(dataset)
}

/// Writes a dataset as pretty-printed JSON, creating parent directories.
pub fn save(path: &Path, dataset: &Dataset) -> Result<(), DatasetError> {
    let write_err = |source| DatasetError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(&dataset.to_value()?)?;
    std::fs::write(path, json).map_err(write_err)?;
    info!("Wrote {} posts to {}", dataset.posts.len(), path.display());
    Ok(())
}
