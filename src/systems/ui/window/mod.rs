//! Draggable, closable panels spawned from prefabs.
//!
//! Windows live in screen space (pixels, bottom-left origin) as children of
//! the [`WindowsManager`] root. Each window's pivot is its top-left corner.

use bevy::{ecs::system::SystemId, prelude::*};
use smallvec::SmallVec;

mod error;
mod manager;
mod parts;
mod prefab;
mod stack;

pub use error::{WindowCatalogError, WindowError};
pub use manager::{WindowCommandsExt, WindowsManager, WindowsRoot};
pub use parts::{WindowPart, WindowParts};
pub use prefab::{WindowPrefab, WindowTypeCatalog, WindowTypeElement};
pub use stack::WindowStack;

use crate::{startup::cursor::Pointer, systems::resize::ScreenBounds};

/* ─────────────────────────  PLUGIN  ───────────────────────── */

pub struct WindowUiPlugin;
impl Plugin for WindowUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<Pointer>()
            .init_resource::<ScreenBounds>()
            .init_resource::<WindowStack>()
            .init_resource::<WindowsManager>()
            .configure_sets(
                Update,
                (
                    WindowSystem::Input,
                    WindowSystem::Drag.after(WindowSystem::Input),
                    WindowSystem::Layout.after(WindowSystem::Drag),
                ),
            )
            .add_systems(
                Update,
                (
                    WindowsManager::route_pointer_input,
                    Window::click_close_buttons,
                )
                    .chain()
                    .in_set(WindowSystem::Input),
            )
            .add_systems(Update, Window::follow_pointer.in_set(WindowSystem::Drag))
            .add_systems(
                Update,
                (
                    WindowsManager::prune_despawned,
                    WindowsManager::anchor_root.run_if(resource_changed::<ScreenBounds>),
                    WindowStack::apply_depth.run_if(resource_changed::<WindowStack>),
                )
                    .chain()
                    .in_set(WindowSystem::Layout),
            );
    }
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum WindowSystem {
    Input,
    Drag,
    Layout,
}

/// Height of the title bar, which is also the window's grab region and the
/// inset of the screen area a drag may follow the pointer through.
pub const TITLE_BAR_SIZE: f32 = 20.0;
pub const CLOSE_BUTTON_SIZE: f32 = 14.0;

/* ─────────────────────────  DATA  ───────────────────────── */

#[derive(Component, Debug, Clone, PartialEq)]
#[require(Transform, Visibility, WindowDrag, WindowListeners)]
pub struct Window {
    pub title: String,
    pub closable: bool,
    pub draggable: bool,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            title: String::from("New window"),
            closable: true,
            draggable: true,
        }
    }
}

#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub enum WindowDrag {
    #[default]
    Idle,
    Dragging {
        last_pointer: Vec2,
    },
}

impl WindowDrag {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    fn begin(&mut self, pointer: Vec2) {
        *self = Self::Dragging {
            last_pointer: pointer,
        };
    }

    fn end(&mut self) {
        if self.is_dragging() {
            *self = Self::Idle;
        }
    }
}

/// Content size of the window.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct WindowArea {
    pub size: Vec2,
}

/// Grab rectangle, relative to the window pivot.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct WindowCollider {
    pub size: Vec2,
    pub offset: Vec2,
}

impl WindowCollider {
    /// The title bar strip: full window width, hanging down from the pivot.
    pub fn title_bar(width: f32) -> Self {
        let size = Vec2::new(width, TITLE_BAR_SIZE);
        Self {
            size,
            offset: Vec2::new(size.x, -size.y) * 0.5,
        }
    }

    pub fn contains(&self, window_position: Vec2, point: Vec2) -> bool {
        let center = window_position + self.offset;
        (point - center).abs().cmple(self.size * 0.5).all()
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct WindowTitleLabel;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct WindowCloseButton {
    pub interactable: bool,
    wired: bool,
    armed: bool,
}

impl Default for WindowCloseButton {
    fn default() -> Self {
        Self {
            interactable: true,
            wired: false,
            armed: false,
        }
    }
}

impl WindowCloseButton {
    pub const ENABLED_COLOR: Color = Color::srgb(0.75, 0.2, 0.2);
    pub const DISABLED_COLOR: Color = Color::srgb(0.35, 0.35, 0.35);

    /// Whether clicking the button closes its window.
    pub fn is_wired(&self) -> bool {
        self.wired
    }

    fn contains(center: Vec2, point: Vec2) -> bool {
        (point - center).abs().cmple(Vec2::splat(CLOSE_BUTTON_SIZE * 0.5)).all()
    }
}

/// Entities notified when the window closes, in registration order. The
/// window does not own them; despawned listeners are skipped.
#[derive(Component, Debug, Default, Clone)]
pub struct WindowListeners(SmallVec<[Entity; 2]>);

impl WindowListeners {
    pub fn insert(&mut self, listener: Entity) -> bool {
        if self.0.contains(&listener) {
            return false;
        }
        self.0.push(listener);
        true
    }

    pub fn remove(&mut self, listener: Entity) -> bool {
        let Some(index) = self.0.iter().position(|&entry| entry == listener) else {
            return false;
        };
        self.0.remove(index);
        true
    }

    pub fn contains(&self, listener: Entity) -> bool {
        self.0.contains(&listener)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEventArgs {
    pub target: Entity,
}

/// Makes an entity a close listener: the system runs once per notification.
#[derive(Component, Debug, Clone, Copy)]
pub struct WindowCloseListener(pub SystemId<In<WindowEventArgs>>);

/* ─────────────────────────  OPERATIONS  ───────────────────────── */

impl Window {
    pub fn new(title: impl Into<String>, closable: bool, draggable: bool) -> Self {
        Self {
            title: title.into(),
            closable,
            draggable,
        }
    }

    fn window_mut(world: &mut World, window: Entity) -> Result<Mut<'_, Window>, WindowError> {
        world
            .get_mut::<Window>(window)
            .ok_or(WindowError::NoSuchWindow(window))
    }

    fn parts(world: &World, window: Entity) -> Result<WindowParts, WindowError> {
        if world.get::<Window>(window).is_none() {
            return Err(WindowError::NoSuchWindow(window));
        }
        Ok(world.get::<WindowParts>(window).cloned().unwrap_or_default())
    }

    pub fn position(world: &World, window: Entity) -> Option<Vec2> {
        world.get::<Window>(window)?;
        world
            .get::<Transform>(window)
            .map(|transform| transform.translation.truncate())
    }

    /// Gathers parts, applies title, closable and collider size, then wires
    /// the close button.
    pub fn initialize(world: &mut World, window: Entity) -> Result<(), WindowError> {
        Self::reconfigure(world, window)?;
        Self::wire_close_button(world, window)
    }

    /// Re-applies the current configuration after it was edited in place.
    /// Unlike [`Window::initialize`] this never wires the close button.
    pub fn reconfigure(world: &mut World, window: Entity) -> Result<(), WindowError> {
        let (title, closable) = {
            let config = world
                .get::<Window>(window)
                .ok_or(WindowError::NoSuchWindow(window))?;
            (config.title.clone(), config.closable)
        };
        let parts = WindowParts::gather(world, window);
        world.entity_mut(window).insert(parts);

        Self::set_title(world, window, title)?;
        Self::set_closable(world, window, closable)?;
        Self::fit_collider(world, window)
    }

    pub fn set_title(
        world: &mut World,
        window: Entity,
        title: impl Into<String>,
    ) -> Result<(), WindowError> {
        let title = title.into();
        Self::window_mut(world, window)?.title = title.clone();

        let part = WindowPart::TitleLabel;
        let label = Self::parts(world, window)?.require(window, part)?;
        let mut text = world
            .get_mut::<Text2d>(label)
            .ok_or(WindowError::MissingComponent { window, part })?;
        text.0 = title;
        Ok(())
    }

    pub fn set_closable(
        world: &mut World,
        window: Entity,
        closable: bool,
    ) -> Result<(), WindowError> {
        Self::window_mut(world, window)?.closable = closable;

        let part = WindowPart::CloseButton;
        let button = Self::parts(world, window)?.require(window, part)?;
        world
            .get_mut::<WindowCloseButton>(button)
            .ok_or(WindowError::MissingComponent { window, part })?
            .interactable = closable;
        if let Some(mut sprite) = world.get_mut::<Sprite>(button) {
            sprite.color = if closable {
                WindowCloseButton::ENABLED_COLOR
            } else {
                WindowCloseButton::DISABLED_COLOR
            };
        }
        Ok(())
    }

    fn fit_collider(world: &mut World, window: Entity) -> Result<(), WindowError> {
        let parts = Self::parts(world, window)?;
        let area = parts.require(window, WindowPart::Area)?;
        let collider = parts.require(window, WindowPart::Collider)?;

        let width = world
            .get::<WindowArea>(area)
            .map(|area| area.size.x)
            .ok_or(WindowError::MissingComponent {
                window,
                part: WindowPart::Area,
            })?;
        *world
            .get_mut::<WindowCollider>(collider)
            .ok_or(WindowError::MissingComponent {
                window,
                part: WindowPart::Collider,
            })? = WindowCollider::title_bar(width);
        Ok(())
    }

    fn wire_close_button(world: &mut World, window: Entity) -> Result<(), WindowError> {
        let part = WindowPart::CloseButton;
        let button = Self::parts(world, window)?.require(window, part)?;
        world
            .get_mut::<WindowCloseButton>(button)
            .ok_or(WindowError::MissingComponent { window, part })?
            .wired = true;
        Ok(())
    }

    /// Notifies every listener while the window still exists, then despawns it.
    pub fn close(world: &mut World, window: Entity) -> Result<(), WindowError> {
        if world.get::<Window>(window).is_none() {
            return Err(WindowError::NoSuchWindow(window));
        }
        let listeners: SmallVec<[Entity; 2]> = world
            .get::<WindowListeners>(window)
            .map(|listeners| listeners.0.clone())
            .unwrap_or_default();

        let args = WindowEventArgs { target: window };
        for listener in listeners {
            let Some(&WindowCloseListener(callback)) = world.get::<WindowCloseListener>(listener)
            else {
                debug!("skipping close listener {listener} of window {window}: it is gone");
                continue;
            };
            if let Err(error) = world.run_system_with(callback, args) {
                warn!("close listener {listener} failed for window {window}: {error:?}");
            }
        }

        world.despawn(window);
        if let Some(mut stack) = world.get_resource_mut::<WindowStack>() {
            stack.remove(window);
        }
        info!("closed window {window}");
        Ok(())
    }

    pub fn move_by(world: &mut World, window: Entity, delta: Vec2) -> Result<(), WindowError> {
        if world.get::<Window>(window).is_none() {
            return Err(WindowError::NoSuchWindow(window));
        }
        let mut transform = world
            .get_mut::<Transform>(window)
            .ok_or(WindowError::NoSuchWindow(window))?;
        transform.translation += delta.extend(0.0);
        Ok(())
    }

    /// Starts following the pointer from `pointer` and raises the window to
    /// the top of the stack. Any other window being dragged is released, so
    /// at most one window drags at a time.
    pub fn begin_drag(
        world: &mut World,
        window: Entity,
        pointer: Vec2,
    ) -> Result<(), WindowError> {
        if world.get::<Window>(window).is_none() {
            return Err(WindowError::NoSuchWindow(window));
        }
        let mut drags = world.query::<(Entity, &mut WindowDrag)>();
        Self::hand_drag_to(drags.iter_mut(world), window, pointer);
        world.get_resource_or_init::<WindowStack>().raise(window);
        Ok(())
    }

    pub fn end_drag(world: &mut World, window: Entity) -> Result<(), WindowError> {
        world
            .get_mut::<WindowDrag>(window)
            .ok_or(WindowError::NoSuchWindow(window))?
            .end();
        Ok(())
    }

    fn hand_drag_to<'a>(
        drags: impl Iterator<Item = (Entity, Mut<'a, WindowDrag>)>,
        target: Entity,
        pointer: Vec2,
    ) {
        for (entity, mut drag) in drags {
            if entity == target {
                drag.begin(pointer);
            } else {
                drag.end();
            }
        }
    }

    pub fn add_listener(
        world: &mut World,
        window: Entity,
        listener: Entity,
    ) -> Result<(), WindowError> {
        world
            .get_mut::<WindowListeners>(window)
            .ok_or(WindowError::NoSuchWindow(window))?
            .insert(listener);
        Ok(())
    }

    pub fn remove_listener(
        world: &mut World,
        window: Entity,
        listener: Entity,
    ) -> Result<(), WindowError> {
        world
            .get_mut::<WindowListeners>(window)
            .ok_or(WindowError::NoSuchWindow(window))?
            .remove(listener);
        Ok(())
    }

    /// Spawns a listener entity that runs `system` for every close it is
    /// notified of.
    pub fn register_close_listener<M>(
        world: &mut World,
        system: impl IntoSystem<In<WindowEventArgs>, (), M> + 'static,
    ) -> Entity {
        let callback = world.register_system(system);
        world
            .spawn((Name::new("window_close_listener"), WindowCloseListener(callback)))
            .id()
    }

    /* ─────────────────────────  SYSTEMS  ───────────────────────── */

    /// Moves dragged windows by the pointer's travel since the last frame.
    /// Outside the safe area the window holds still and the reference point
    /// is not refreshed, so coming back in jumps by the full distance.
    fn follow_pointer(
        pointer: Res<Pointer>,
        screen: Res<ScreenBounds>,
        mut windows: Query<(&Window, &mut WindowDrag, &mut Transform)>,
    ) {
        let Some(position) = pointer.position else {
            return;
        };
        let safe_area = screen.inset(TITLE_BAR_SIZE);

        for (window, mut drag, mut transform) in &mut windows {
            if !window.draggable {
                continue;
            }
            let WindowDrag::Dragging { last_pointer } = *drag else {
                continue;
            };
            if !ScreenBounds::contains_half_open(safe_area, position) {
                continue;
            }
            let delta = position - last_pointer;
            if delta == Vec2::ZERO {
                continue;
            }
            drag.begin(position);
            transform.translation += delta.extend(0.0);
        }
    }

    /// A click is a press and a release both over the close button of the
    /// topmost window under the pointer. Buttons are assumed to be direct
    /// children of their window.
    fn click_close_buttons(
        mut commands: Commands,
        mouse_input: Res<ButtonInput<MouseButton>>,
        pointer: Res<Pointer>,
        manager: Res<WindowsManager>,
        stack: Res<WindowStack>,
        windows: Query<
            (&Transform, Option<&WindowCollider>, Option<&WindowParts>),
            With<Window>,
        >,
        mut buttons: Query<(&mut WindowCloseButton, &Transform)>,
    ) {
        let pressed = mouse_input.just_pressed(MouseButton::Left);
        let released = mouse_input.just_released(MouseButton::Left);
        if !pressed && !released {
            return;
        }

        let topmost = pointer.position.and_then(|position| {
            manager.topmost_at(&stack, |window| {
                windows
                    .get(window)
                    .is_ok_and(|(transform, collider, _)| {
                        collider.is_some_and(|collider| {
                            collider.contains(transform.translation.truncate(), position)
                        })
                    })
            })
        });

        for window in manager.windows() {
            let Ok((window_transform, _, parts)) = windows.get(window) else {
                continue;
            };
            let Some(button_entity) = parts.and_then(|parts| parts.get(WindowPart::CloseButton))
            else {
                continue;
            };
            let Ok((mut button, button_transform)) = buttons.get_mut(button_entity) else {
                continue;
            };

            let center = (window_transform.translation + button_transform.translation).truncate();
            let over = topmost == Some(window)
                && pointer
                    .position
                    .is_some_and(|position| WindowCloseButton::contains(center, position));

            if pressed {
                button.armed = over && button.interactable;
            }
            if released {
                let clicked = button.armed && over && button.interactable && button.is_wired();
                button.armed = false;
                if clicked {
                    commands.close_window(window);
                }
            }
        }
    }
}
