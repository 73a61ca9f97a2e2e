use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model;

#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed document: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub(crate) enum SaveError {
    #[error("serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// On-disk shape: the level tree flattened to `[id, level]` pairs, plus the
/// navigation state. The id allocator is not stored; it is rebuilt on load.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedDiagram {
    levels: Vec<(u64, model::Level)>,
    current_level_id: u64,
    level_stack: Vec<u64>,
}

impl From<&model::Diagram> for PersistedDiagram {
    fn from(diagram: &model::Diagram) -> Self {
        Self {
            levels: diagram
                .levels
                .iter()
                .map(|l| (l.id, l.clone()))
                .collect(),
            current_level_id: diagram.current_level_id,
            level_stack: diagram.level_stack.clone(),
        }
    }
}

impl PersistedDiagram {
    fn into_diagram(self) -> Result<model::Diagram, LoadError> {
        let mut levels = Vec::with_capacity(self.levels.len());
        for (id, level) in self.levels {
            if id != level.id {
                return Err(LoadError::Malformed(format!(
                    "level entry {id} carries body with id {}",
                    level.id
                )));
            }
            if levels.iter().any(|l: &model::Level| l.id == id) {
                return Err(LoadError::Malformed(format!("duplicate level id {id}")));
            }
            levels.push(level);
        }
        let exists = |id: u64| levels.iter().any(|l| l.id == id);
        if !exists(model::ROOT_LEVEL_ID) {
            return Err(LoadError::Malformed(
                "root level is missing".to_string(),
            ));
        }
        if !exists(self.current_level_id) {
            return Err(LoadError::Malformed(format!(
                "current level {} does not exist",
                self.current_level_id
            )));
        }
        for id in &self.level_stack {
            if !exists(*id) {
                return Err(LoadError::Malformed(format!(
                    "stack references missing level {id}"
                )));
            }
        }
        if self.level_stack.contains(&self.current_level_id) {
            return Err(LoadError::Malformed(
                "current level appears in its own ancestor stack".to_string(),
            ));
        }
        let mut diagram = model::Diagram {
            levels,
            current_level_id: self.current_level_id,
            level_stack: self.level_stack,
            next_id: 1,
        };
        diagram.next_id = diagram.max_used_id() + 1;
        Ok(diagram)
    }
}

pub(crate) fn to_json(diagram: &model::Diagram) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&PersistedDiagram::from(diagram))
}

pub(crate) fn from_json(json: &str) -> Result<model::Diagram, LoadError> {
    serde_json::from_str::<PersistedDiagram>(json)?.into_diagram()
}

pub(crate) fn save_to_file(path: &str, diagram: &model::Diagram) -> Result<(), SaveError> {
    let json = to_json(diagram)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub(crate) fn load_from_file(path: &str) -> Result<model::Diagram, LoadError> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}
