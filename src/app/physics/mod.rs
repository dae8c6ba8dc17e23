mod forces;
mod quadtree;

use eframe::egui::Vec2;

use quadtree::QuadNode;

use super::SceneGraph;

/// Simulation stops once alpha decays below this floor.
pub(in crate::app) const ALPHA_MIN: f32 = 0.001;
/// Per-tick interpolation toward the alpha target, tuned so a fresh scene
/// settles in roughly 300 ticks.
const ALPHA_DECAY: f32 = 0.0228;
/// Velocity carried over between ticks.
const VELOCITY_RETENTION: f32 = 0.6;

impl SceneGraph {
    pub(in crate::app) fn physics_active(&self) -> bool {
        self.alpha >= ALPHA_MIN || self.alpha_target >= ALPHA_MIN
    }

    /// Reheat the simulation, e.g. after the scene membership changes or a
    /// drag starts.
    pub(in crate::app) fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha);
    }

    /// One simulation tick. Accumulates field forces into scratch buffers,
    /// integrates velocities scaled by the cooling alpha, then resolves
    /// overlaps positionally.
    pub(in crate::app) fn step_physics(&mut self, canvas_height: f32) {
        if self.nodes.is_empty() || !self.physics_active() {
            return;
        }

        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;

        let scratch = &mut self.physics_scratch;
        scratch.forces.clear();
        scratch.forces.resize(self.nodes.len(), Vec2::ZERO);
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.world_pos));
        scratch.charges.clear();
        scratch
            .charges
            .extend(self.nodes.iter().map(|node| node.charge));

        forces::apply_springs(&self.nodes, &self.edges, &mut scratch.forces);
        if let Some(tree) = QuadNode::build(&scratch.positions, &scratch.charges) {
            forces::apply_repulsion(
                &scratch.positions,
                &scratch.charges,
                &tree,
                &mut scratch.forces,
            );
        }
        forces::apply_centering(&self.nodes, &mut scratch.forces);
        forces::apply_vertical_bias(&self.nodes, canvas_height, &mut scratch.forces);

        let alpha = self.alpha;
        for (node, force) in self.nodes.iter_mut().zip(scratch.forces.iter()) {
            if let Some(pin) = node.pin {
                node.world_pos = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity = (node.velocity + *force * alpha) * VELOCITY_RETENTION;
            node.world_pos += node.velocity;
        }

        forces::resolve_collisions(&mut self.nodes);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::app::test_support::{scene_chain, scene_grid};

    const CANVAS_HEIGHT: f32 = 800.0;

    #[test]
    fn empty_scene_tick_is_a_no_op() {
        let mut scene = scene_grid(0);
        scene.step_physics(CANVAS_HEIGHT);
        assert!(scene.nodes.is_empty());
    }

    #[test]
    fn cooling_reaches_rest_within_bounded_ticks() {
        let mut scene = scene_grid(50);
        scene.alpha = 1.0;
        scene.alpha_target = 0.0;

        let mut ticks = 0;
        while scene.physics_active() {
            scene.step_physics(CANVAS_HEIGHT);
            ticks += 1;
            assert!(ticks < 400, "simulation failed to settle");
        }

        // Alpha interpolation alone dictates the schedule, so the count is
        // independent of the force magnitudes.
        assert!((250..400).contains(&ticks), "settled after {ticks} ticks");
        for node in &scene.nodes {
            assert!(node.world_pos.x.is_finite());
            assert!(node.world_pos.y.is_finite());
        }
    }

    #[test]
    fn nonzero_alpha_target_keeps_the_simulation_warm() {
        let mut scene = scene_grid(10);
        scene.alpha = 1.0;
        scene.alpha_target = 0.3;

        for _ in 0..500 {
            scene.step_physics(CANVAS_HEIGHT);
        }
        assert!(scene.physics_active());
        assert!(scene.alpha > 0.29);
    }

    #[test]
    fn pinned_node_ignores_forces() {
        let mut scene = scene_chain(&["a", "b", "c"]);
        let pin = vec2(123.0, -45.0);
        scene.nodes[1].pin = Some(pin);
        scene.nodes[1].world_pos = pin;
        scene.alpha = 1.0;
        scene.alpha_target = 0.3;

        for _ in 0..50 {
            scene.step_physics(CANVAS_HEIGHT);
        }

        assert_eq!(scene.nodes[1].world_pos, pin);
        assert_ne!(scene.nodes[0].world_pos, scene.nodes[2].world_pos);
    }

    #[test]
    fn springs_pull_a_long_edge_toward_rest_length() {
        let mut scene = scene_chain(&["a", "b"]);
        scene.nodes[0].world_pos = vec2(-400.0, 0.0);
        scene.nodes[1].world_pos = vec2(400.0, 0.0);
        scene.alpha = 1.0;
        scene.alpha_target = 0.0;

        while scene.physics_active() {
            scene.step_physics(CANVAS_HEIGHT);
        }

        let distance = (scene.nodes[0].world_pos - scene.nodes[1].world_pos).length();
        assert!(distance < 800.0, "edge never contracted: {distance}");
    }

    #[test]
    fn collision_separates_overlapping_nodes() {
        let mut scene = scene_chain(&["a", "b"]);
        scene.edges.clear();
        scene.nodes[0].world_pos = vec2(0.0, 0.0);
        scene.nodes[1].world_pos = vec2(2.0, 0.0);
        scene.alpha = 1.0;
        scene.alpha_target = 0.0;

        scene.step_physics(CANVAS_HEIGHT);

        let distance = (scene.nodes[0].world_pos - scene.nodes[1].world_pos).length();
        let min_distance = scene.nodes[0].collide_radius + scene.nodes[1].collide_radius;
        assert!(
            distance >= min_distance - 1.0,
            "still overlapping: {distance}"
        );
    }
}
