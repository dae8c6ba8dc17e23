use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::app::{
    DragState, PhysicsScratch, SceneEdge, SceneGraph, SceneNode, ViewModel, ViewScratch,
};
use crate::ontology::{NodeKind, Ontology, ProposedElement, RelationClass};
use crate::util::stable_pair;

/// Spawn scatter for nodes with no placed neighbor to anchor on.
const INITIAL_SCATTER: f32 = 60.0;
/// Offset from the anchoring neighbor for freshly proposed nodes.
const NEIGHBOR_SCATTER: f32 = 40.0;
/// Reheat level after a membership change, enough to work new nodes in
/// without collapsing the settled layout.
const REBUILD_ALPHA: f32 = 0.8;

impl SceneGraph {
    pub(in crate::app) fn from_parts(nodes: Vec<SceneNode>, edges: Vec<SceneEdge>) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            adjacency[edge.source].push(edge.target);
            adjacency[edge.target].push(edge.source);
        }

        let root_index = nodes.iter().position(|node| node.is_hub);

        Self {
            nodes,
            edges,
            index_by_id,
            adjacency,
            root_index,
            alpha: 1.0,
            alpha_target: 0.0,
            drag: DragState::Idle,
            physics_scratch: PhysicsScratch::default(),
            view_scratch: ViewScratch::default(),
        }
    }
}

impl ViewModel {
    /// Rebuild the scene from the confirmed graph plus staged proposals.
    /// Prior node positions, velocities and an in-flight drag survive the
    /// rebuild keyed by node id.
    pub(in crate::app) fn rebuild_scene_if_dirty(&mut self) {
        if !self.scene_dirty {
            return;
        }
        self.scene_dirty = false;
        self.scene_revision += 1;
        self.search_match_cache = None;

        let prior = self.scene.take();
        self.scene = Some(build_scene(&self.ontology, &self.staged, prior));
    }
}

pub(in crate::app) fn build_scene(
    ontology: &Ontology,
    staged: &[ProposedElement],
    prior: Option<SceneGraph>,
) -> SceneGraph {
    let depths = ontology.depth_from_root();
    let mut nodes = Vec::with_capacity(ontology.nodes.len() + staged.len());
    let mut index_by_id = HashMap::new();

    for node in &ontology.nodes {
        let is_hub = node.id == ontology.root_id;
        index_by_id.insert(node.id.clone(), nodes.len());
        nodes.push(scene_node(
            &node.id,
            &node.label,
            node.kind,
            node.content.clone(),
            node.is_proposed,
            node.is_new,
            is_hub,
            depths.get(&node.id).copied(),
        ));
    }

    // Node proposals never override an existing node, not even one staged
    // earlier in the same unit.
    for element in staged {
        let Some((proposed, kind)) = element.as_node() else {
            continue;
        };
        if index_by_id.contains_key(&proposed.id) {
            continue;
        }

        let depth = proposed
            .parent
            .as_ref()
            .and_then(|parent| depths.get(parent))
            .map(|parent_depth| parent_depth + 1);
        index_by_id.insert(proposed.id.clone(), nodes.len());
        nodes.push(scene_node(
            &proposed.id,
            &proposed.label,
            kind,
            proposed.content.clone(),
            true,
            false,
            false,
            depth,
        ));
    }

    // Edges are kept verbatim, duplicates included; only an edge with a
    // missing endpoint is dropped.
    let mut edges = Vec::new();
    for link in &ontology.links {
        if let Some(&source) = index_by_id.get(&link.source)
            && let Some(&target) = index_by_id.get(&link.target)
        {
            edges.push(SceneEdge {
                source,
                target,
                relation: link.relation.clone(),
                relation_class: RelationClass::of(&link.relation),
                attributes: link.attributes.clone(),
                is_proposed: link.is_proposed,
            });
        }
    }
    for element in staged {
        let ProposedElement::Edge {
            from,
            to,
            label,
            attributes,
        } = element
        else {
            continue;
        };
        if let Some(&source) = index_by_id.get(from)
            && let Some(&target) = index_by_id.get(to)
        {
            edges.push(SceneEdge {
                source,
                target,
                relation: label.clone(),
                relation_class: RelationClass::of(label),
                attributes: attributes.clone(),
                is_proposed: true,
            });
        }
    }

    let mut scene = SceneGraph::from_parts(nodes, edges);
    carry_over(&mut scene, prior);
    scene
}

/// Transplant simulation state from the previous scene revision.
fn carry_over(scene: &mut SceneGraph, prior: Option<SceneGraph>) {
    let Some(prior) = prior else {
        for node in &mut scene.nodes {
            node.world_pos = spawn_position(&node.id);
        }
        return;
    };

    let mut placed = vec![false; scene.nodes.len()];
    for (index, node) in scene.nodes.iter_mut().enumerate() {
        if let Some(&prior_index) = prior.index_by_id.get(&node.id) {
            let prior_node = &prior.nodes[prior_index];
            node.world_pos = prior_node.world_pos;
            node.velocity = prior_node.velocity;
            placed[index] = true;
        }
    }

    // New nodes spawn beside an already placed neighbor so they get pulled
    // into the right cluster instead of flying in from the origin.
    for index in 0..scene.nodes.len() {
        if placed[index] {
            continue;
        }

        let anchor = scene.edges.iter().find_map(|edge| {
            let other = if edge.source == index {
                edge.target
            } else if edge.target == index {
                edge.source
            } else {
                return None;
            };
            placed[other].then(|| scene.nodes[other].world_pos)
        });

        scene.nodes[index].world_pos = match anchor {
            Some(anchor) => {
                let (x, y) = stable_pair(&scene.nodes[index].id);
                anchor + vec2(x, y) * NEIGHBOR_SCATTER
            }
            None => spawn_position(&scene.nodes[index].id),
        };
    }

    // A drag keyed to a node that survived the rebuild keeps going; if the
    // node vanished the gesture simply ends.
    if let Some(dragged_id) = prior.dragged_id()
        && let Some(&index) = scene.index_by_id.get(dragged_id)
    {
        let prior_index = prior.index_by_id[dragged_id];
        scene.nodes[index].pin = prior.nodes[prior_index].pin;
        scene.drag = match prior.drag {
            DragState::Idle => DragState::Idle,
            DragState::Dragging { .. } => DragState::Dragging { index },
            DragState::Releasing { until, .. } => DragState::Releasing { index, until },
        };
        scene.alpha_target = prior.alpha_target;
    }

    scene.alpha = prior.alpha.max(REBUILD_ALPHA);
}

fn spawn_position(id: &str) -> Vec2 {
    let (x, y) = stable_pair(id);
    vec2(x, y) * INITIAL_SCATTER
}

#[expect(clippy::too_many_arguments)]
fn scene_node(
    id: &str,
    label: &str,
    kind: NodeKind,
    content: Option<String>,
    is_proposed: bool,
    is_new: bool,
    is_hub: bool,
    depth: Option<usize>,
) -> SceneNode {
    let charge = if is_hub {
        -600.0
    } else {
        match kind {
            NodeKind::Question | NodeKind::Answer => -200.0,
            NodeKind::Person => -300.0,
            NodeKind::Class | NodeKind::Instance => -400.0,
        }
    };
    let collide_radius = if is_hub {
        80.0
    } else if kind.is_round() {
        50.0
    } else {
        70.0
    };
    let hit_radius = if kind.is_round() {
        30.0
    } else if is_hub {
        70.0
    } else {
        60.0
    };

    SceneNode {
        id: id.to_owned(),
        label: label.to_owned(),
        kind,
        content,
        is_proposed,
        is_new,
        is_hub,
        depth,
        charge,
        collide_radius,
        hit_radius,
        world_pos: Vec2::ZERO,
        velocity: Vec2::ZERO,
        pin: None,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::ontology::{OntologyLink, OntologyNode, OntologySeed, ProposedNode};

    fn class(id: &str, parent: Option<&str>) -> OntologyNode {
        OntologyNode {
            id: id.to_owned(),
            label: id.to_owned(),
            kind: NodeKind::Class,
            parent: parent.map(str::to_owned),
            is_new: false,
            is_proposed: false,
            content: None,
        }
    }

    fn link(source: &str, target: &str, relation: &str) -> OntologyLink {
        OntologyLink {
            source: source.to_owned(),
            target: target.to_owned(),
            relation: relation.to_owned(),
            attributes: Vec::new(),
            is_proposed: false,
        }
    }

    fn proposal(id: &str, parent: Option<&str>) -> ProposedElement {
        ProposedElement::Class(ProposedNode {
            id: id.to_owned(),
            label: id.to_uppercase(),
            parent: parent.map(str::to_owned),
            content: None,
        })
    }

    fn small_ontology() -> Ontology {
        Ontology::from_seed(OntologySeed {
            nodes: vec![
                class("entity", None),
                class("anlage", Some("entity")),
                class("kunde", Some("entity")),
            ],
            links: vec![
                link("anlage", "entity", "is_a"),
                link("kunde", "entity", "is_a"),
            ],
        })
    }

    #[test]
    fn confirmed_node_wins_over_staged_proposal() {
        let ontology = small_ontology();
        let staged = vec![proposal("kunde", Some("entity"))];

        let scene = build_scene(&ontology, &staged, None);

        let index = scene.index_by_id["kunde"];
        assert_eq!(scene.nodes[index].label, "kunde");
        assert!(!scene.nodes[index].is_proposed);
        assert_eq!(scene.nodes.len(), 3);
    }

    #[test]
    fn first_staged_proposal_wins_among_duplicates() {
        let ontology = small_ontology();
        let staged = vec![
            proposal("komponente", Some("entity")),
            ProposedElement::Class(ProposedNode {
                id: "komponente".to_owned(),
                label: "Later duplicate".to_owned(),
                parent: None,
                content: None,
            }),
        ];

        let scene = build_scene(&ontology, &staged, None);

        let index = scene.index_by_id["komponente"];
        assert_eq!(scene.nodes[index].label, "KOMPONENTE");
        assert!(scene.nodes[index].is_proposed);
        assert_eq!(scene.nodes.len(), 4);
    }

    fn scene_fingerprint(
        scene: &SceneGraph,
    ) -> (
        Vec<(String, bool, bool, bool, Option<usize>)>,
        Vec<(usize, usize, String, bool)>,
    ) {
        let nodes = scene
            .nodes
            .iter()
            .map(|node| {
                (
                    node.id.clone(),
                    node.is_proposed,
                    node.is_new,
                    node.is_hub,
                    node.depth,
                )
            })
            .collect();
        let edges = scene
            .edges
            .iter()
            .map(|edge| {
                (
                    edge.source,
                    edge.target,
                    edge.relation.clone(),
                    edge.is_proposed,
                )
            })
            .collect();
        (nodes, edges)
    }

    #[test]
    fn rebuilding_from_the_same_input_is_idempotent() {
        let ontology = small_ontology();
        let staged = vec![
            proposal("komponente", Some("anlage")),
            ProposedElement::Edge {
                from: "komponente".to_owned(),
                to: "anlage".to_owned(),
                label: "is_a".to_owned(),
                attributes: Vec::new(),
            },
        ];

        let first = build_scene(&ontology, &staged, None);
        let second = build_scene(&ontology, &staged, None);

        assert_eq!(scene_fingerprint(&first), scene_fingerprint(&second));
        assert_eq!(first.index_by_id, second.index_by_id);
    }

    #[test]
    fn confirmed_nodes_precede_staged_proposals_in_input_order() {
        let ontology = small_ontology();
        let staged = vec![
            proposal("zelle", Some("entity")),
            proposal("bauteil", Some("entity")),
        ];

        let scene = build_scene(&ontology, &staged, None);

        let ids = scene
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["entity", "anlage", "kunde", "zelle", "bauteil"]);
    }

    #[test]
    fn edge_with_missing_endpoint_is_dropped() {
        let mut ontology = small_ontology();
        ontology.links.push(link("anlage", "ghost", "is_a"));
        let staged = vec![ProposedElement::Edge {
            from: "kunde".to_owned(),
            to: "also_missing".to_owned(),
            label: "besitzt".to_owned(),
            attributes: Vec::new(),
        }];

        let scene = build_scene(&ontology, &staged, None);
        assert_eq!(scene.edges.len(), 2);
    }

    #[test]
    fn duplicate_edges_are_kept() {
        let mut ontology = small_ontology();
        ontology.links.push(link("anlage", "entity", "is_a"));

        let scene = build_scene(&ontology, &[], None);
        let parallel = scene
            .edges
            .iter()
            .filter(|edge| {
                edge.source == scene.index_by_id["anlage"]
                    && edge.target == scene.index_by_id["entity"]
            })
            .count();
        assert_eq!(parallel, 2);
    }

    #[test]
    fn positions_survive_a_rebuild() {
        let ontology = small_ontology();
        let mut scene = build_scene(&ontology, &[], None);
        let index = scene.index_by_id["anlage"];
        scene.nodes[index].world_pos = vec2(250.0, -80.0);
        scene.nodes[index].velocity = vec2(1.0, 2.0);

        let staged = vec![proposal("komponente", Some("anlage"))];
        let rebuilt = build_scene(&ontology, &staged, Some(scene));

        let index = rebuilt.index_by_id["anlage"];
        assert_eq!(rebuilt.nodes[index].world_pos, vec2(250.0, -80.0));
        assert_eq!(rebuilt.nodes[index].velocity, vec2(1.0, 2.0));
        assert!(rebuilt.alpha >= REBUILD_ALPHA);
    }

    #[test]
    fn new_node_spawns_beside_a_placed_neighbor() {
        let ontology = small_ontology();
        let mut scene = build_scene(&ontology, &[], None);
        let anchor_index = scene.index_by_id["anlage"];
        let anchor_pos = vec2(500.0, 300.0);
        scene.nodes[anchor_index].world_pos = anchor_pos;

        let staged = vec![
            proposal("komponente", Some("anlage")),
            ProposedElement::Edge {
                from: "komponente".to_owned(),
                to: "anlage".to_owned(),
                label: "is_a".to_owned(),
                attributes: Vec::new(),
            },
        ];
        let rebuilt = build_scene(&ontology, &staged, Some(scene));

        let index = rebuilt.index_by_id["komponente"];
        let distance = (rebuilt.nodes[index].world_pos - anchor_pos).length();
        assert!(
            distance <= NEIGHBOR_SCATTER * 1.5,
            "spawned too far: {distance}"
        );
    }

    #[test]
    fn drag_follows_the_node_across_rebuilds() {
        let ontology = small_ontology();
        let mut scene = build_scene(&ontology, &[], None);
        let index = scene.index_by_id["kunde"];
        scene.nodes[index].pin = Some(vec2(10.0, 20.0));
        scene.drag = DragState::Dragging { index };
        scene.alpha_target = 0.3;

        let staged = vec![proposal("komponente", Some("entity"))];
        let rebuilt = build_scene(&ontology, &staged, Some(scene));

        let index = rebuilt.index_by_id["kunde"];
        assert_eq!(rebuilt.drag, DragState::Dragging { index });
        assert_eq!(rebuilt.nodes[index].pin, Some(vec2(10.0, 20.0)));
        assert_eq!(rebuilt.alpha_target, 0.3);
    }

    #[test]
    fn proposed_depth_derives_from_the_parent() {
        let ontology = small_ontology();
        let staged = vec![proposal("komponente", Some("anlage"))];

        let scene = build_scene(&ontology, &staged, None);
        let index = scene.index_by_id["komponente"];
        assert_eq!(scene.nodes[index].depth, Some(2));
    }

    proptest! {
        #[test]
        fn every_kept_edge_has_valid_endpoints(
            raw_links in prop::collection::vec(("[a-f]{1,2}", "[a-f]{1,2}"), 0..24)
        ) {
            let mut ontology = small_ontology();
            for (source, target) in raw_links {
                ontology.links.push(link(&source, &target, "verwandt_mit"));
            }

            let scene = build_scene(&ontology, &[], None);
            for edge in &scene.edges {
                prop_assert!(edge.source < scene.nodes.len());
                prop_assert!(edge.target < scene.nodes.len());
            }
        }
    }
}
