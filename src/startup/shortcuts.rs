use bevy::prelude::*;

use crate::systems::ui::window::{WindowCommandsExt, WindowStack};

pub fn spawn_on_keys(keyboard_input: Res<ButtonInput<KeyCode>>, mut commands: Commands) {
    if keyboard_input.just_pressed(KeyCode::KeyN) {
        commands.create_window("Dialog", "dialog");
    }
    if keyboard_input.just_pressed(KeyCode::KeyI) {
        commands.create_window("Inspector", "inspector");
    }
}

/// Escape closes whichever window is on top.
pub fn close_topmost_on_esc(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    stack: Res<WindowStack>,
    mut commands: Commands,
) {
    if !keyboard_input.just_pressed(KeyCode::Escape) {
        return;
    }
    if let Some(window) = stack.topmost() {
        commands.close_window(window);
    }
}
