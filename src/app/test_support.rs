use eframe::egui::{Vec2, vec2};

use super::{SceneEdge, SceneGraph, SceneNode};
use crate::ontology::{NodeKind, RelationClass};

pub(crate) fn test_node(id: &str) -> SceneNode {
    SceneNode {
        id: id.to_owned(),
        label: id.to_owned(),
        kind: NodeKind::Class,
        content: None,
        is_proposed: false,
        is_new: false,
        is_hub: false,
        depth: None,
        charge: -400.0,
        collide_radius: 70.0,
        hit_radius: 60.0,
        world_pos: Vec2::ZERO,
        velocity: Vec2::ZERO,
        pin: None,
    }
}

pub(crate) fn test_edge(source: usize, target: usize, relation: &str) -> SceneEdge {
    SceneEdge {
        source,
        target,
        relation: relation.to_owned(),
        relation_class: RelationClass::of(relation),
        attributes: Vec::new(),
        is_proposed: false,
    }
}

/// Nodes connected in a line, positioned left to right.
pub(crate) fn scene_chain(ids: &[&str]) -> SceneGraph {
    let nodes = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let mut node = test_node(id);
            node.world_pos = vec2(i as f32 * 90.0, 0.0);
            node
        })
        .collect::<Vec<_>>();
    let edges = (1..ids.len())
        .map(|i| test_edge(i - 1, i, "is_a"))
        .collect();

    SceneGraph::from_parts(nodes, edges)
}

/// A square-ish grid of nodes chained row by row.
pub(crate) fn scene_grid(count: usize) -> SceneGraph {
    let columns = (count as f32).sqrt().ceil().max(1.0) as usize;
    let nodes = (0..count)
        .map(|i| {
            let mut node = test_node(&format!("node_{i}"));
            node.world_pos = vec2(
                (i % columns) as f32 * 100.0,
                (i / columns) as f32 * 100.0,
            );
            node
        })
        .collect::<Vec<_>>();
    let edges = (1..count).map(|i| test_edge(i - 1, i, "is_a")).collect();

    SceneGraph::from_parts(nodes, edges)
}
