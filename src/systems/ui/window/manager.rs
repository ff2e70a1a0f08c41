use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use super::{
    error::WindowError,
    prefab::{WindowPrefab, WindowTypeCatalog, WindowTypeElement},
    stack::WindowStack,
    Window, WindowCloseListener, WindowCollider, WindowDrag, WindowEventArgs,
};
use crate::{startup::cursor::Pointer, systems::resize::ScreenBounds};

/// Diagonal step between consecutive spawn positions.
const SPAWN_OFFSET: f32 = 30.0;
/// Distance from the right and bottom edges at which spawning starts over.
const SPAWN_MARGIN: f32 = 400.0;

/// Scene node every window is parented under. Its transform maps screen space
/// onto a 2D camera centered on the world origin.
#[derive(Component, Debug, Clone, Copy)]
pub struct WindowsRoot;

#[derive(Resource, Debug)]
pub struct WindowsManager {
    root: Entity,
    declared_types: Vec<WindowTypeElement>,
    prefabs: HashMap<String, WindowPrefab>,
    windows: HashSet<Entity>,
    spawn_cursor: Option<Vec2>,
}

impl FromWorld for WindowsManager {
    fn from_world(world: &mut World) -> Self {
        let declared_types = match WindowTypeCatalog::embedded() {
            Ok(catalog) => catalog.types.clone(),
            Err(error) => {
                warn!("{error}; starting without declared window types");
                Vec::new()
            }
        };

        let on_closed = world.register_system(Self::on_window_closed);
        let root = world
            .spawn((
                Name::new("windows_root"),
                WindowsRoot,
                WindowCloseListener(on_closed),
                Transform::default(),
                Visibility::default(),
            ))
            .id();

        Self::new(root, declared_types)
    }
}

impl WindowsManager {
    /// `root` doubles as the manager's close-listener entity, so it should
    /// carry a [`WindowCloseListener`] running [`WindowsManager::on_window_closed`].
    pub fn new(root: Entity, declared_types: Vec<WindowTypeElement>) -> Self {
        let mut manager = Self {
            root,
            declared_types,
            prefabs: HashMap::new(),
            windows: HashSet::new(),
            spawn_cursor: None,
        };
        manager.rebuild_type_map();
        manager
    }

    pub fn root(&self) -> Entity {
        self.root
    }

    pub fn declared_types(&self) -> &[WindowTypeElement] {
        &self.declared_types
    }

    pub fn set_declared_types(&mut self, declared_types: Vec<WindowTypeElement>) {
        self.declared_types = declared_types;
        self.rebuild_type_map();
    }

    /// Rebuilds the name → prefab map from scratch. For repeated names the
    /// first declaration wins.
    pub fn rebuild_type_map(&mut self) {
        self.prefabs.clear();
        for element in &self.declared_types {
            if self.prefabs.contains_key(&element.name) {
                debug!("ignoring duplicate window type `{}`", element.name);
                continue;
            }
            self.prefabs
                .insert(element.name.clone(), element.prefab.clone());
        }
    }

    pub fn prefab(&self, type_name: &str) -> Result<&WindowPrefab, WindowError> {
        self.prefabs
            .get(type_name)
            .ok_or_else(|| WindowError::UnknownType(type_name.to_string()))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.prefabs.keys().map(String::as_str)
    }

    pub fn windows(&self) -> impl Iterator<Item = Entity> + '_ {
        self.windows.iter().copied()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn contains(&self, window: Entity) -> bool {
        self.windows.contains(&window)
    }

    /// Where the next window will be placed, once the first one exists.
    pub fn spawn_cursor(&self) -> Option<Vec2> {
        self.spawn_cursor
    }

    /// Returns the position for the window being spawned and steps the cursor
    /// down and to the right. Once it nears the right or bottom edge the cursor
    /// resets to the screen origin, the bottom-left corner.
    pub fn advance_spawn_cursor(&mut self, screen: &ScreenBounds) -> Vec2 {
        let current = self.spawn_cursor.unwrap_or_else(|| screen.top_left());
        let mut next = current + Vec2::new(SPAWN_OFFSET, -SPAWN_OFFSET);
        if next.x > screen.width - SPAWN_MARGIN || next.y < SPAWN_MARGIN {
            next = Vec2::ZERO;
        }
        self.spawn_cursor = Some(next);
        current
    }

    /// Drops a window from the live set. Returns whether it was there.
    pub fn forget(&mut self, window: Entity) -> bool {
        self.windows.remove(&window)
    }

    /// Among live windows accepted by `hit`, the one with the greatest
    /// sibling index.
    pub fn topmost_at(
        &self,
        stack: &WindowStack,
        hit: impl Fn(Entity) -> bool,
    ) -> Option<Entity> {
        let mut selected: Option<(usize, Entity)> = None;
        for window in self.windows() {
            if !hit(window) {
                continue;
            }
            let Some(index) = stack.sibling_index(window) else {
                continue;
            };
            if selected.is_none_or(|(top_index, _)| index > top_index) {
                selected = Some((index, window));
            }
        }
        selected.map(|(_, window)| window)
    }

    /// Instantiates the prefab declared for `type_name`, places it at the
    /// spawn cursor and starts tracking it.
    pub fn create_window(
        world: &mut World,
        title: &str,
        type_name: &str,
    ) -> Result<Entity, WindowError> {
        let (prefab, root) = {
            let manager = world.resource::<WindowsManager>();
            (manager.prefab(type_name)?.clone(), manager.root)
        };

        let window = prefab.instantiate(world);
        if let Err(error) = Self::install(world, window, root, title) {
            world.despawn(window);
            return Err(error);
        }
        info!("created `{type_name}` window {window} titled \"{title}\"");
        Ok(window)
    }

    fn install(
        world: &mut World,
        window: Entity,
        root: Entity,
        title: &str,
    ) -> Result<(), WindowError> {
        Window::initialize(world, window)?;

        let screen = world
            .get_resource::<ScreenBounds>()
            .copied()
            .unwrap_or_default();
        let spawn_position = world
            .resource_mut::<WindowsManager>()
            .advance_spawn_cursor(&screen);
        Window::move_by(world, window, spawn_position)?;
        Window::set_title(world, window, title)?;

        world.entity_mut(root).add_child(window);
        world.get_resource_or_init::<WindowStack>().push(window);
        world.resource_mut::<WindowsManager>().windows.insert(window);
        Window::add_listener(world, window, root)
    }

    pub fn on_window_closed(
        In(args): In<WindowEventArgs>,
        mut manager: ResMut<WindowsManager>,
    ) {
        if manager.forget(args.target) {
            debug!("window {} left the live set", args.target);
        }
    }

    /* ─────────────────────────  SYSTEMS  ───────────────────────── */

    /// Press: the topmost live window whose collider holds the pointer starts
    /// dragging. Release: every live window stops.
    pub(super) fn route_pointer_input(
        mouse_input: Res<ButtonInput<MouseButton>>,
        pointer: Res<Pointer>,
        manager: Res<WindowsManager>,
        mut stack: ResMut<WindowStack>,
        colliders: Query<(&Transform, &WindowCollider)>,
        mut drags: Query<(Entity, &mut WindowDrag)>,
    ) {
        if mouse_input.just_pressed(MouseButton::Left) {
            if let Some(position) = pointer.position {
                let selected = manager.topmost_at(&stack, |window| {
                    colliders.get(window).is_ok_and(|(transform, collider)| {
                        collider.contains(transform.translation.truncate(), position)
                    })
                });
                if let Some(selected) = selected {
                    Window::hand_drag_to(drags.iter_mut(), selected, position);
                    stack.raise(selected);
                }
            }
        }

        if mouse_input.just_released(MouseButton::Left) {
            for window in manager.windows() {
                if let Ok((_, mut drag)) = drags.get_mut(window) {
                    drag.end();
                }
            }
        }
    }

    /// Drops windows that were despawned without going through close.
    pub(super) fn prune_despawned(
        mut manager: ResMut<WindowsManager>,
        mut stack: ResMut<WindowStack>,
        windows: Query<(), With<Window>>,
    ) {
        let stale: Vec<Entity> = manager
            .windows()
            .filter(|&window| !windows.contains(window))
            .collect();
        for window in stale {
            warn!("window {window} was despawned without closing");
            manager.forget(window);
        }
        if stack.iter().any(|entity| !windows.contains(entity)) {
            stack.retain(|&entity| windows.contains(entity));
        }
    }

    pub(super) fn anchor_root(
        screen: Res<ScreenBounds>,
        manager: Res<WindowsManager>,
        mut roots: Query<&mut Transform, With<WindowsRoot>>,
    ) {
        let Ok(mut transform) = roots.get_mut(manager.root) else {
            return;
        };
        let origin = -screen.size() * 0.5;
        transform.translation.x = origin.x;
        transform.translation.y = origin.y;
    }
}

/// Deferred window operations for systems without world access. Failures are
/// logged rather than returned.
pub trait WindowCommandsExt {
    fn create_window(&mut self, title: impl Into<String>, type_name: impl Into<String>);
    fn close_window(&mut self, window: Entity);
}

impl WindowCommandsExt for Commands<'_, '_> {
    fn create_window(&mut self, title: impl Into<String>, type_name: impl Into<String>) {
        let title = title.into();
        let type_name = type_name.into();
        self.queue(move |world: &mut World| {
            if let Err(error) = WindowsManager::create_window(world, &title, &type_name) {
                warn!("failed to create `{type_name}` window: {error}");
            }
        });
    }

    fn close_window(&mut self, window: Entity) {
        self.queue(move |world: &mut World| {
            if let Err(error) = Window::close(world, window) {
                warn!("failed to close window {window}: {error}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(types: Vec<WindowTypeElement>) -> WindowsManager {
        let mut world = World::new();
        WindowsManager::new(world.spawn_empty().id(), types)
    }

    #[test]
    fn first_declaration_of_a_name_wins() {
        let manager = manager_with(vec![
            WindowTypeElement::new("dialog", WindowPrefab::sized(100.0, 100.0)),
            WindowTypeElement::new("dialog", WindowPrefab::sized(999.0, 999.0)),
            WindowTypeElement::new("tool", WindowPrefab::sized(50.0, 50.0)),
        ]);

        let dialog = manager.prefab("dialog").expect("dialog is declared");
        assert_eq!(dialog.size(), Vec2::new(100.0, 100.0));
        assert_eq!(manager.type_names().count(), 2);
        assert_eq!(manager.declared_types().len(), 3);
    }

    #[test]
    fn rebuilding_twice_gives_the_same_map() {
        let mut manager = manager_with(vec![
            WindowTypeElement::new("a", WindowPrefab::sized(1.0, 1.0)),
            WindowTypeElement::new("b", WindowPrefab::sized(2.0, 2.0)),
            WindowTypeElement::new("a", WindowPrefab::sized(3.0, 3.0)),
        ]);
        let before = manager.prefabs.clone();
        manager.rebuild_type_map();
        manager.rebuild_type_map();
        assert_eq!(manager.prefabs, before);
    }

    #[test]
    fn replacing_declared_types_drops_stale_names() {
        let mut manager = manager_with(vec![WindowTypeElement::new(
            "old",
            WindowPrefab::default(),
        )]);
        manager.set_declared_types(vec![WindowTypeElement::new(
            "new",
            WindowPrefab::default(),
        )]);
        assert!(manager.prefab("new").is_ok());
        assert_eq!(
            manager.prefab("old").expect_err("old type was replaced"),
            WindowError::UnknownType(String::from("old"))
        );
    }

    #[test]
    fn spawn_cursor_steps_diagonally_from_the_top_left() {
        let mut manager = manager_with(vec![]);
        let screen = ScreenBounds::new(1920.0, 1080.0);

        let positions: Vec<Vec2> = (0..4)
            .map(|_| manager.advance_spawn_cursor(&screen))
            .collect();

        for (n, position) in positions.iter().enumerate() {
            let expected =
                screen.top_left() + n as f32 * Vec2::new(SPAWN_OFFSET, -SPAWN_OFFSET);
            assert_eq!(*position, expected);
        }
        assert_eq!(
            manager.spawn_cursor(),
            Some(screen.top_left() + 4.0 * Vec2::new(SPAWN_OFFSET, -SPAWN_OFFSET))
        );
    }

    #[test]
    fn spawn_cursor_wraps_once_it_would_cross_the_margin() {
        let mut manager = manager_with(vec![]);
        // Four steps land exactly on the bottom margin; the fifth would cross it.
        let screen = ScreenBounds::new(1920.0, 520.0);

        let positions: Vec<Vec2> = (0..6)
            .map(|_| manager.advance_spawn_cursor(&screen))
            .collect();

        assert_eq!(positions[4], Vec2::new(120.0, 400.0));
        assert_eq!(positions[5], Vec2::ZERO);
        // The origin sits below the margin, so the cursor stays there.
        assert_eq!(manager.spawn_cursor(), Some(Vec2::ZERO));
        assert_eq!(manager.advance_spawn_cursor(&screen), Vec2::ZERO);
    }

    #[test]
    fn spawn_cursor_wraps_near_the_right_edge() {
        let mut manager = manager_with(vec![]);
        let screen = ScreenBounds::new(460.0, 2000.0);

        assert_eq!(manager.advance_spawn_cursor(&screen), screen.top_left());
        assert_eq!(manager.advance_spawn_cursor(&screen), Vec2::new(30.0, 1970.0));
        // The right margin sits at x = 60, so stepping past it starts over.
        assert_eq!(manager.advance_spawn_cursor(&screen), Vec2::new(60.0, 1940.0));
        assert_eq!(manager.advance_spawn_cursor(&screen), Vec2::ZERO);
    }

    #[test]
    fn unknown_type_lookup_is_typed() {
        let manager = manager_with(vec![]);
        assert_eq!(
            manager.prefab("missing").expect_err("nothing is declared"),
            WindowError::UnknownType(String::from("missing"))
        );
    }
}
