use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;
use crate::app::{SceneEdge, SceneNode};

/// Squared Barnes-Hut opening criterion, (side / distance)² < theta².
const THETA_SQUARED: f32 = 0.81;
const SPRING_STRENGTH: f32 = 0.9;
const CENTER_STRENGTH: f32 = 0.04;
const VERTICAL_STRENGTH: f32 = 0.1;
const MIN_DISTANCE: f32 = 1.0;

/// Spring force along each edge toward its class-specific rest length.
/// Both endpoints receive half the correction, so an edge between a pinned
/// and a free node still converges.
pub(super) fn apply_springs(nodes: &[SceneNode], edges: &[SceneEdge], forces: &mut [Vec2]) {
    for edge in edges {
        let delta = nodes[edge.target].world_pos - nodes[edge.source].world_pos;
        let distance = delta.length().max(MIN_DISTANCE);
        let rest = edge.relation_class.spring_distance();
        let correction = delta * ((distance - rest) / distance * SPRING_STRENGTH * 0.5);

        forces[edge.source] += correction;
        forces[edge.target] -= correction;
    }
}

/// Charge repulsion approximated with the quadtree. Distant cells act as a
/// single body at their charge-weighted barycenter.
pub(super) fn apply_repulsion(
    positions: &[Vec2],
    charges: &[f32],
    tree: &QuadNode,
    forces: &mut [Vec2],
) {
    for (index, force) in forces.iter_mut().enumerate() {
        *force += repulsion_at(index, positions, charges, tree);
    }
}

fn repulsion_at(index: usize, positions: &[Vec2], charges: &[f32], node: &QuadNode) -> Vec2 {
    let position = positions[index];

    if node.is_leaf() {
        let mut force = Vec2::ZERO;
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let delta = position - positions[other];
            let distance_squared = delta.length_sq().max(MIN_DISTANCE);
            force += delta * (-charges[other] / distance_squared);
        }
        return force;
    }

    let delta = position - node.barycenter;
    let distance_squared = delta.length_sq().max(MIN_DISTANCE);
    let side = node.bounds.side_length();
    let far_enough = side * side < THETA_SQUARED * distance_squared;

    if far_enough && !node.bounds.contains(position) {
        return delta * (-node.charge_sum / distance_squared);
    }

    let mut force = Vec2::ZERO;
    for child in node.children.iter().flatten() {
        force += repulsion_at(index, positions, charges, child);
    }
    force
}

/// Weak pull toward the world origin so disconnected components do not
/// drift out of reach.
pub(super) fn apply_centering(nodes: &[SceneNode], forces: &mut [Vec2]) {
    for (node, force) in nodes.iter().zip(forces.iter_mut()) {
        *force -= node.world_pos * CENTER_STRENGTH;
    }
}

/// Vertical band placement by taxonomy depth: the root sits high, deeper
/// generations settle lower, and nodes with no known depth gravitate to
/// the middle. Fractions are of the canvas height around the origin.
pub(super) fn apply_vertical_bias(nodes: &[SceneNode], canvas_height: f32, forces: &mut [Vec2]) {
    for (node, force) in nodes.iter().zip(forces.iter_mut()) {
        let fraction = match node.depth {
            Some(0) => 0.2,
            Some(1) => 0.4,
            Some(_) => 0.6,
            None => 0.5,
        };
        let target_y = (fraction - 0.5) * canvas_height;
        force.y += (target_y - node.world_pos.y) * VERTICAL_STRENGTH;
    }
}

/// Pairwise overlap resolution. Unlike the field forces this moves
/// positions directly, which keeps dense clusters readable even as the
/// simulation cools.
pub(super) fn resolve_collisions(nodes: &mut [SceneNode]) {
    for a in 0..nodes.len() {
        for b in (a + 1)..nodes.len() {
            let delta = nodes[b].world_pos - nodes[a].world_pos;
            let min_distance = nodes[a].collide_radius + nodes[b].collide_radius;
            let distance_squared = delta.length_sq();
            if distance_squared >= min_distance * min_distance {
                continue;
            }

            let distance = distance_squared.sqrt().max(MIN_DISTANCE);
            let direction = if distance_squared > 0.0 {
                delta / distance
            } else {
                let (x, y) = crate::util::stable_pair(&nodes[b].id);
                vec2(x, y).normalized()
            };
            let overlap = min_distance - distance;

            let a_pinned = nodes[a].pin.is_some();
            let b_pinned = nodes[b].pin.is_some();
            match (a_pinned, b_pinned) {
                (true, true) => {}
                (true, false) => nodes[b].world_pos += direction * overlap,
                (false, true) => nodes[a].world_pos -= direction * overlap,
                (false, false) => {
                    nodes[a].world_pos -= direction * (overlap * 0.5);
                    nodes[b].world_pos += direction * (overlap * 0.5);
                }
            }
        }
    }
}
