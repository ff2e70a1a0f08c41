use bevy::prelude::*;

use crate::systems::{
    resize::ResizePlugin,
    ui::window::{WindowCommandsExt, WindowUiPlugin},
};

pub mod cursor;
pub mod shortcuts;

use cursor::CursorPlugin;

pub struct StartupPlugin;
impl Plugin for StartupPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((CursorPlugin, ResizePlugin, WindowUiPlugin))
            .add_systems(Startup, setup)
            .add_systems(
                Update,
                (shortcuts::spawn_on_keys, shortcuts::close_topmost_on_esc),
            );
    }
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
    commands.create_window("Welcome", "dialog");
    commands.create_window("Console", "console");
    commands.create_window("Notice", "notice");
}
