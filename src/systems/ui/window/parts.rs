use std::fmt;

use bevy::prelude::*;
use enum_map::{Enum, EnumMap};

use super::{
    error::WindowError, WindowArea, WindowCloseButton, WindowCollider, WindowTitleLabel,
};

/// The sub-components a window needs to operate.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowPart {
    Collider,
    Area,
    TitleLabel,
    CloseButton,
}

impl fmt::Display for WindowPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collider => "collider",
            Self::Area => "area",
            Self::TitleLabel => "title label",
            Self::CloseButton => "close button",
        };
        f.write_str(name)
    }
}

/// Entities holding each part, as found by the last gather. Collider and area
/// live on the window itself; the label and button are descendants.
#[derive(Component, Debug, Default, Clone)]
pub struct WindowParts(EnumMap<WindowPart, Option<Entity>>);

impl WindowParts {
    pub fn get(&self, part: WindowPart) -> Option<Entity> {
        self.0[part]
    }

    pub fn require(&self, window: Entity, part: WindowPart) -> Result<Entity, WindowError> {
        self.0[part].ok_or(WindowError::MissingComponent { window, part })
    }

    pub fn missing(&self) -> impl Iterator<Item = WindowPart> + '_ {
        self.0
            .iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(part, _)| part)
    }

    /// Looks every part up without failing. Absent parts are logged in enum
    /// order and left empty until something tries to use them.
    pub fn gather(world: &World, window: Entity) -> Self {
        let parts = Self(EnumMap::from_fn(|part| match part {
            WindowPart::Collider => world.get::<WindowCollider>(window).map(|_| window),
            WindowPart::Area => world.get::<WindowArea>(window).map(|_| window),
            WindowPart::TitleLabel => first_in_hierarchy(world, window, |entity| {
                world.get::<WindowTitleLabel>(entity).is_some()
                    && world.get::<Text2d>(entity).is_some()
            }),
            WindowPart::CloseButton => first_in_hierarchy(world, window, |entity| {
                world.get::<WindowCloseButton>(entity).is_some()
            }),
        }));
        for part in parts.missing() {
            warn!("window {window} is missing its {part}");
        }
        parts
    }
}

/// Depth-first search of `root` and its descendants, `root` included.
fn first_in_hierarchy(
    world: &World,
    root: Entity,
    predicate: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    let mut pending = vec![root];
    while let Some(entity) = pending.pop() {
        if predicate(entity) {
            return Some(entity);
        }
        if let Some(children) = world.get::<Children>(entity) {
            pending.extend(children.to_vec().into_iter().rev());
        }
    }
    None
}
