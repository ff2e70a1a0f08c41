use bevy::prelude::*;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{
    error::WindowCatalogError, parts::WindowPart, Window, WindowArea, WindowCloseButton,
    WindowCollider, WindowTitleLabel, CLOSE_BUTTON_SIZE, TITLE_BAR_SIZE,
};

const WINDOW_TYPES_JSON: &str = include_str!("./content/window_types.json");
const TITLE_FONT_SIZE: f32 = 14.0;

static WINDOW_TYPE_CATALOG: Lazy<Result<WindowTypeCatalog, WindowCatalogError>> =
    Lazy::new(|| WindowTypeCatalog::parse(WINDOW_TYPES_JSON));

/// Template a window entity tree is instantiated from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowPrefab {
    pub size: [f32; 2],
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_true")]
    pub closable: bool,
    #[serde(default = "default_true")]
    pub draggable: bool,
    #[serde(default = "default_body_color")]
    pub body_color: [f32; 3],
    #[serde(default = "default_title_bar_color")]
    pub title_bar_color: [f32; 3],
    #[serde(default = "default_true")]
    pub collider: bool,
    #[serde(default = "default_true")]
    pub title_label: bool,
    #[serde(default = "default_true")]
    pub close_button: bool,
}

impl Default for WindowPrefab {
    fn default() -> Self {
        Self {
            size: [320.0, 180.0],
            title: default_title(),
            closable: true,
            draggable: true,
            body_color: default_body_color(),
            title_bar_color: default_title_bar_color(),
            collider: true,
            title_label: true,
            close_button: true,
        }
    }
}

impl WindowPrefab {
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            size: [width, height],
            ..default()
        }
    }

    /// Leaves `part` out of the instantiated tree. The area is always present.
    pub fn without(mut self, part: WindowPart) -> Self {
        match part {
            WindowPart::Collider => self.collider = false,
            WindowPart::TitleLabel => self.title_label = false,
            WindowPart::CloseButton => self.close_button = false,
            WindowPart::Area => {}
        }
        self
    }

    pub fn size(&self) -> Vec2 {
        Vec2::from_array(self.size)
    }

    /// Spawns a fresh, uninitialized window. The pivot is the top-left corner
    /// of the window, so chrome hangs to the right of and below the origin.
    pub fn instantiate(&self, world: &mut World) -> Entity {
        let size = self.size();
        let title_bar_center = Vec2::new(size.x * 0.5, -TITLE_BAR_SIZE * 0.5);

        let mut root = world.spawn((
            Name::new("window"),
            Window::new(self.title.clone(), self.closable, self.draggable),
            WindowArea { size },
            Transform::default(),
            Visibility::default(),
        ));
        if self.collider {
            root.insert(WindowCollider::default());
        }

        root.with_children(|parent| {
            parent.spawn((
                Name::new("window_body"),
                Sprite::from_color(srgb(self.body_color), size),
                Transform::from_xyz(size.x * 0.5, -size.y * 0.5, 0.0),
            ));
            parent.spawn((
                Name::new("window_title_bar"),
                Sprite::from_color(
                    srgb(self.title_bar_color),
                    Vec2::new(size.x, TITLE_BAR_SIZE),
                ),
                Transform::from_translation(title_bar_center.extend(0.1)),
            ));
            if self.title_label {
                parent.spawn((
                    Name::new("window_title"),
                    WindowTitleLabel,
                    Text2d::new(self.title.clone()),
                    TextFont {
                        font_size: TITLE_FONT_SIZE,
                        ..default()
                    },
                    Transform::from_translation(title_bar_center.extend(0.2)),
                ));
            }
            if self.close_button {
                parent.spawn((
                    Name::new("window_close_button"),
                    WindowCloseButton::default(),
                    Sprite::from_color(
                        WindowCloseButton::ENABLED_COLOR,
                        Vec2::splat(CLOSE_BUTTON_SIZE),
                    ),
                    Transform::from_xyz(
                        size.x - TITLE_BAR_SIZE * 0.5,
                        -TITLE_BAR_SIZE * 0.5,
                        0.2,
                    ),
                ));
            }
        });

        root.id()
    }
}

/// A declared (type name, prefab) association.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowTypeElement {
    pub name: String,
    pub prefab: WindowPrefab,
}

impl WindowTypeElement {
    pub fn new(name: impl Into<String>, prefab: WindowPrefab) -> Self {
        Self {
            name: name.into(),
            prefab,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowTypeCatalog {
    pub version: u32,
    pub types: Vec<WindowTypeElement>,
}

impl WindowTypeCatalog {
    pub fn parse(json: &str) -> Result<Self, WindowCatalogError> {
        serde_json::from_str(json).map_err(|error| WindowCatalogError::Parse(error.to_string()))
    }

    /// The catalog bundled with the binary, parsed once.
    pub fn embedded() -> Result<&'static Self, WindowCatalogError> {
        WINDOW_TYPE_CATALOG.as_ref().map_err(Clone::clone)
    }
}

fn srgb([red, green, blue]: [f32; 3]) -> Color {
    Color::srgb(red, green, blue)
}

fn default_title() -> String {
    String::from("New window")
}

fn default_true() -> bool {
    true
}

fn default_body_color() -> [f32; 3] {
    [0.12, 0.12, 0.14]
}

fn default_title_bar_color() -> [f32; 3] {
    [0.25, 0.25, 0.3]
}
