use bevy::prelude::*;

use super::Window;

const WINDOW_Z_STEP: f32 = 10.0;

/// Sibling order of the windows under the manager's root, back to front.
/// The last entry renders on top and wins hit-test ties.
#[derive(Resource, Default, Debug)]
pub struct WindowStack {
    order: Vec<Entity>,
}

impl WindowStack {
    /// Appends as the last sibling. Re-pushing an entity moves it to the top.
    pub fn push(&mut self, entity: Entity) {
        self.remove(entity);
        self.order.push(entity);
    }

    pub fn raise(&mut self, entity: Entity) {
        if self.order.last() == Some(&entity) {
            return;
        }
        self.push(entity);
    }

    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.order.len();
        self.order.retain(|&candidate| candidate != entity);
        self.order.len() != before
    }

    pub fn sibling_index(&self, entity: Entity) -> Option<usize> {
        self.order.iter().position(|&candidate| candidate == entity)
    }

    pub fn topmost(&self) -> Option<Entity> {
        self.order.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn retain(&mut self, keep: impl FnMut(&Entity) -> bool) {
        self.order.retain(keep);
    }

    /// Renders sibling order as depth so later siblings draw in front.
    pub(super) fn apply_depth(
        stack: Res<WindowStack>,
        mut windows: Query<&mut Transform, With<Window>>,
    ) {
        for (index, entity) in stack.iter().enumerate() {
            let Ok(mut transform) = windows.get_mut(entity) else {
                continue;
            };
            let z = index as f32 * WINDOW_Z_STEP;
            if transform.translation.z != z {
                transform.translation.z = z;
            }
        }
    }
}
