use bevy::prelude::*;

use window_ui::startup::StartupPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(bevy::window::Window {
                title: String::from("Windows"),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(StartupPlugin)
        .run();
}
