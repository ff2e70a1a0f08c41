//! In-game windows for Bevy: draggable, closable panels spawned from named
//! prefabs and tracked by a [`WindowsManager`](systems::ui::window::WindowsManager).

pub mod startup;
pub mod systems;
