use bevy::{prelude::*, window::PrimaryWindow};

pub struct ResizePlugin;
impl Plugin for ResizePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScreenBounds>()
            .add_systems(PreUpdate, ScreenBounds::track_primary_window);
    }
}

/// Size of the primary window in logical pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl ScreenBounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Top-left corner in bottom-left-origin screen space.
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(0.0, self.height)
    }

    /// The screen rectangle shrunk by `inset` on every edge. A screen smaller
    /// than `2 * inset` yields an empty rectangle rather than a flipped one.
    pub fn inset(&self, inset: f32) -> Rect {
        Rect {
            min: Vec2::splat(inset),
            max: Vec2::new(self.width - inset, self.height - inset),
        }
    }

    /// Half-open containment: the min edges are inside, the max edges are not.
    pub fn contains_half_open(rect: Rect, point: Vec2) -> bool {
        point.x >= rect.min.x
            && point.x < rect.max.x
            && point.y >= rect.min.y
            && point.y < rect.max.y
    }

    fn track_primary_window(
        window: Query<
            &bevy::window::Window,
            (With<PrimaryWindow>, Changed<bevy::window::Window>),
        >,
        mut screen: ResMut<ScreenBounds>,
    ) {
        let Ok(window) = window.single() else {
            return;
        };
        let resized = Self::new(window.width(), window.height());
        if *screen != resized {
            debug!("screen resized to {}x{}", resized.width, resized.height);
            *screen = resized;
        }
    }
}
