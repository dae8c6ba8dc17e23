use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::render_utils::{circle_visible, screen_to_world};
use super::super::viewport::{MAX_ZOOM, MIN_ZOOM};
use super::super::{DragState, SceneGraph, ViewModel};

/// Seconds a released node stays pinned before the simulation takes over.
const RELEASE_SETTLE_SECONDS: f64 = 0.25;
/// Alpha target held while a drag is active, keeping neighbors responsive.
const DRAG_ALPHA_TARGET: f32 = 0.3;

impl SceneGraph {
    /// Begin a primary drag gesture. A pin still held by the outgoing
    /// `Dragging`/`Releasing` state is released first, so a gesture started
    /// inside the settle window cannot orphan it.
    pub(in crate::app) fn start_drag(&mut self, hovered: Option<usize>) {
        if let DragState::Dragging { index } | DragState::Releasing { index, .. } = self.drag
            && let Some(node) = self.nodes.get_mut(index)
        {
            node.pin = None;
        }

        match hovered {
            Some(index) => {
                let world = self.nodes[index].world_pos;
                self.nodes[index].pin = Some(world);
                self.nodes[index].velocity = Vec2::ZERO;
                self.drag = DragState::Dragging { index };
                self.alpha_target = DRAG_ALPHA_TARGET;
                self.reheat(DRAG_ALPHA_TARGET);
            }
            None => {
                self.drag = DragState::Idle;
                self.alpha_target = 0.0;
            }
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }
        self.cancel_view_animation();

        // Zoom around the pointer so the world point under the cursor
        // stays fixed.
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// Primary-button drags move a node when the gesture started on one,
    /// otherwise they pan. Middle and secondary drags always pan.
    pub(in crate::app) fn handle_graph_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.cancel_view_animation();
            self.pan += response.drag_delta();
            return;
        }

        let now = ui.input(|input| input.time);
        let pointer = ui.input(|input| input.pointer.interact_pos());
        let pan = self.pan;
        let zoom = self.zoom;

        let mut pan_delta = None;
        if let Some(scene) = self.scene.as_mut() {
            if response.drag_started_by(egui::PointerButton::Primary) {
                scene.start_drag(hovered);
            }

            if response.dragged_by(egui::PointerButton::Primary) {
                match scene.drag {
                    DragState::Dragging { index } => {
                        if let Some(pointer) = pointer {
                            let world = screen_to_world(rect, pan, zoom, pointer);
                            scene.nodes[index].pin = Some(world);
                            scene.nodes[index].world_pos = world;
                        }
                    }
                    _ => pan_delta = Some(response.drag_delta()),
                }
            }

            if response.drag_stopped_by(egui::PointerButton::Primary)
                && let DragState::Dragging { index } = scene.drag
            {
                scene.drag = DragState::Releasing {
                    index,
                    until: now + RELEASE_SETTLE_SECONDS,
                };
                scene.alpha_target = 0.0;
            }
        } else if response.dragged_by(egui::PointerButton::Primary) {
            pan_delta = Some(response.drag_delta());
        }

        if let Some(delta) = pan_delta {
            self.cancel_view_animation();
            self.pan += delta;
        }
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        (0..screen_positions.len())
            .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
            .filter_map(|index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Click on a node selects it; click on empty canvas clears the
    /// selection.
    pub(in crate::app) fn apply_graph_selection(&mut self, selected: Option<String>) {
        self.selected = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::scene_chain;

    #[test]
    fn starting_a_canvas_drag_releases_the_settling_pin() {
        let mut scene = scene_chain(&["a", "b", "c"]);
        scene.start_drag(Some(0));
        scene.drag = DragState::Releasing {
            index: 0,
            until: 10.0,
        };
        scene.alpha_target = 0.0;

        scene.start_drag(None);

        assert_eq!(scene.drag, DragState::Idle);
        assert_eq!(scene.nodes[0].pin, None);
    }

    #[test]
    fn starting_a_drag_on_another_node_moves_the_pin() {
        let mut scene = scene_chain(&["a", "b", "c"]);
        scene.start_drag(Some(0));
        scene.drag = DragState::Releasing {
            index: 0,
            until: 10.0,
        };
        scene.alpha_target = 0.0;

        scene.start_drag(Some(2));

        assert_eq!(scene.drag, DragState::Dragging { index: 2 });
        assert_eq!(scene.nodes[0].pin, None);
        assert_eq!(scene.nodes[2].pin, Some(scene.nodes[2].world_pos));
        assert_eq!(scene.alpha_target, DRAG_ALPHA_TARGET);
    }

    #[test]
    fn settle_pin_does_not_survive_into_the_simulation() {
        let mut scene = scene_chain(&["a", "b"]);
        scene.start_drag(Some(0));
        scene.drag = DragState::Releasing {
            index: 0,
            until: 10.0,
        };
        scene.start_drag(None);

        let before = scene.nodes[0].world_pos;
        scene.reheat(1.0);
        for _ in 0..20 {
            scene.step_physics(800.0);
        }
        assert_ne!(scene.nodes[0].world_pos, before, "node stayed snapped");
    }
}
