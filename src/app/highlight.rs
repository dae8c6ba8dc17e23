use std::collections::HashSet;

use super::SceneGraph;

/// Index sets driving the selection emphasis: the selected node, its
/// direct neighbors, and every incident edge. Everything outside these
/// sets is dimmed while a selection is active.
pub(in crate::app) struct Highlight {
    pub(in crate::app) selected: usize,
    pub(in crate::app) nodes: HashSet<usize>,
    pub(in crate::app) edges: HashSet<usize>,
}

impl Highlight {
    pub(in crate::app) fn contains_node(&self, index: usize) -> bool {
        self.nodes.contains(&index)
    }

    pub(in crate::app) fn contains_edge(&self, index: usize) -> bool {
        self.edges.contains(&index)
    }
}

impl SceneGraph {
    /// Resolve the highlight sets for a selected node id. Returns `None`
    /// when the id is not in the current scene, e.g. after a skip removed
    /// the staged node the selection pointed at.
    pub(in crate::app) fn highlight_for(&self, selected_id: &str) -> Option<Highlight> {
        let selected = *self.index_by_id.get(selected_id)?;

        let mut nodes = HashSet::from([selected]);
        nodes.extend(self.adjacency[selected].iter().copied());

        let edges = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| edge.touches(selected).then_some(index))
            .collect();

        Some(Highlight {
            selected,
            nodes,
            edges,
        })
    }
}
