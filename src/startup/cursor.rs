use bevy::{prelude::*, window::PrimaryWindow};

pub struct CursorPlugin;
impl Plugin for CursorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Pointer>()
            .add_systems(PreUpdate, Pointer::update_position);
    }
}

/// Pointer position in screen space: pixels, origin at the bottom-left corner
/// of the primary window, y pointing up.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub position: Option<Vec2>,
}

impl Pointer {
    pub fn at(position: Vec2) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// Winit reports the cursor from the top-left corner with y pointing down.
    pub fn from_window_cursor(cursor: Vec2, window_height: f32) -> Vec2 {
        Vec2::new(cursor.x, window_height - cursor.y)
    }

    fn update_position(
        window: Query<&bevy::window::Window, With<PrimaryWindow>>,
        mut pointer: ResMut<Pointer>,
    ) {
        let Ok(window) = window.single() else {
            return;
        };
        let position = window
            .cursor_position()
            .map(|cursor| Self::from_window_cursor(cursor, window.height()));
        if pointer.position != position {
            pointer.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_cursor_is_flipped_to_bottom_left_origin() {
        let flipped = Pointer::from_window_cursor(Vec2::new(40.0, 100.0), 720.0);
        assert_eq!(flipped, Vec2::new(40.0, 620.0));
    }
}
