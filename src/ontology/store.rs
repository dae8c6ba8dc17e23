use std::collections::{HashMap, VecDeque};

use super::model::{
    NodeKind, OntologyLink, OntologyNode, OntologySeed, ProposedElement, RelationClass,
};

/// The confirmed graph: every node and link the user has accepted so far.
/// Proposed elements never live here; they are staged separately and only
/// promoted through [`Ontology::confirm`].
#[derive(Clone, Debug)]
pub struct Ontology {
    pub root_id: String,
    pub nodes: Vec<OntologyNode>,
    pub links: Vec<OntologyLink>,
}

impl Ontology {
    pub fn from_seed(seed: OntologySeed) -> Self {
        let root_id = seed
            .nodes
            .iter()
            .find(|node| node.parent.is_none())
            .or(seed.nodes.first())
            .map(|node| node.id.clone())
            .unwrap_or_default();

        Self {
            root_id,
            nodes: seed.nodes,
            links: seed.links,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&OntologyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Promote staged elements into the permanent graph. Node proposals
    /// become confirmed nodes (`is_proposed` cleared, `is_new` set) unless
    /// their id already exists; class proposals with a parent also gain an
    /// `is_a` link. Edge proposals are appended verbatim.
    pub fn confirm(&mut self, proposals: &[ProposedElement]) {
        for element in proposals {
            match element {
                ProposedElement::Edge {
                    from,
                    to,
                    label,
                    attributes,
                } => {
                    self.links.push(OntologyLink {
                        source: from.clone(),
                        target: to.clone(),
                        relation: label.clone(),
                        attributes: attributes.clone(),
                        is_proposed: false,
                    });
                }
                _ => {
                    let Some((proposed, kind)) = element.as_node() else {
                        continue;
                    };
                    if self.contains(&proposed.id) {
                        continue;
                    }

                    self.nodes.push(OntologyNode {
                        id: proposed.id.clone(),
                        label: proposed.label.clone(),
                        kind,
                        parent: proposed.parent.clone(),
                        is_new: true,
                        is_proposed: false,
                        content: proposed.content.clone(),
                    });

                    if kind == NodeKind::Class
                        && let Some(parent) = &proposed.parent
                    {
                        self.links.push(OntologyLink {
                            source: proposed.id.clone(),
                            target: parent.clone(),
                            relation: "is_a".to_owned(),
                            attributes: Vec::new(),
                            is_proposed: false,
                        });
                    }
                }
            }
        }
    }

    /// Hierarchy depth per node id, measured in taxonomic hops from the
    /// root. Both explicit `parent` fields and `is_a`/`instance_of` links
    /// count as parent edges. Nodes unreachable from the root are absent.
    pub fn depth_from_root(&self) -> HashMap<String, usize> {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for node in &self.nodes {
            if let Some(parent) = &node.parent {
                children
                    .entry(parent.as_str())
                    .or_default()
                    .push(node.id.as_str());
            }
        }
        for link in &self.links {
            if RelationClass::of(&link.relation) == RelationClass::Taxonomic {
                children
                    .entry(link.target.as_str())
                    .or_default()
                    .push(link.source.as_str());
            }
        }

        let mut depth = HashMap::new();
        if self.root_id.is_empty() {
            return depth;
        }

        depth.insert(self.root_id.clone(), 0usize);
        let mut queue = VecDeque::from([self.root_id.as_str()]);
        while let Some(current) = queue.pop_front() {
            let next_depth = depth[current] + 1;
            let Some(child_ids) = children.get(current) else {
                continue;
            };
            for &child in child_ids {
                if !depth.contains_key(child) {
                    depth.insert(child.to_owned(), next_depth);
                    queue.push_back(child);
                }
            }
        }

        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::dataset::sample_dataset;
    use crate::ontology::model::ProposedNode;

    fn sample_ontology() -> Ontology {
        Ontology::from_seed(sample_dataset().expect("sample parses").ontology)
    }

    #[test]
    fn root_is_the_parentless_node() {
        let ontology = sample_ontology();
        assert_eq!(ontology.root_id, "entity");
        assert_eq!(ontology.nodes.len(), 4);
        assert_eq!(ontology.links.len(), 3);
    }

    #[test]
    fn confirm_promotes_node_proposals_exactly_once() {
        let mut ontology = sample_ontology();
        let nodes_before = ontology.nodes.len();

        let proposals = vec![
            ProposedElement::Class(ProposedNode {
                id: "komponente".to_owned(),
                label: "Komponente".to_owned(),
                parent: Some("entity".to_owned()),
                content: None,
            }),
            ProposedElement::Instance(ProposedNode {
                id: "x500".to_owned(),
                label: "Anlage X500".to_owned(),
                parent: None,
                content: None,
            }),
            // Duplicate of a confirmed node: must be dropped.
            ProposedElement::Class(ProposedNode {
                id: "kunde".to_owned(),
                label: "Different".to_owned(),
                parent: None,
                content: None,
            }),
            ProposedElement::Edge {
                from: "x500".to_owned(),
                to: "anlage".to_owned(),
                label: "instance_of".to_owned(),
                attributes: Vec::new(),
            },
        ];

        ontology.confirm(&proposals);

        assert_eq!(ontology.nodes.len(), nodes_before + 2);
        let komponente = ontology.node("komponente").expect("promoted");
        assert!(komponente.is_new);
        assert!(!komponente.is_proposed);
        // Confirmed node wins over the colliding proposal.
        assert_eq!(ontology.node("kunde").expect("kept").label, "Kunde");
        // Class proposal with a parent gains an is_a link, plus the edge proposal.
        assert!(ontology.links.iter().any(|link| {
            link.source == "komponente" && link.target == "entity" && link.relation == "is_a"
        }));
        assert!(ontology
            .links
            .iter()
            .any(|link| link.source == "x500" && link.relation == "instance_of"));
    }

    #[test]
    fn skip_leaves_the_ontology_untouched() {
        let ontology = sample_ontology();
        // Skipping is modeled by simply not calling confirm; the staged
        // proposals are dropped by the caller. The confirmed graph must be
        // exactly the seed.
        assert_eq!(ontology.nodes.len(), 4);
        assert_eq!(ontology.links.len(), 3);
        assert!(ontology.nodes.iter().all(|node| !node.is_proposed));
    }

    #[test]
    fn depth_follows_taxonomic_links() {
        let mut ontology = sample_ontology();
        ontology.confirm(&[
            ProposedElement::Instance(ProposedNode {
                id: "x500".to_owned(),
                label: "Anlage X500".to_owned(),
                parent: None,
                content: None,
            }),
            ProposedElement::Edge {
                from: "x500".to_owned(),
                to: "anlage".to_owned(),
                label: "instance_of".to_owned(),
                attributes: Vec::new(),
            },
        ]);

        let depth = ontology.depth_from_root();
        assert_eq!(depth.get("entity"), Some(&0));
        assert_eq!(depth.get("anlage"), Some(&1));
        assert_eq!(depth.get("kunde"), Some(&1));
        assert_eq!(depth.get("x500"), Some(&2));
    }
}
