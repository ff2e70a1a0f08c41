use bevy::prelude::Entity;
use thiserror::Error;

use super::parts::WindowPart;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("unknown window type `{0}`")]
    UnknownType(String),
    #[error("window {window} is missing its {part}")]
    MissingComponent { window: Entity, part: WindowPart },
    #[error("entity {0} is not a live window")]
    NoSuchWindow(Entity),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowCatalogError {
    #[error("failed to parse window type catalog: {0}")]
    Parse(String),
}
