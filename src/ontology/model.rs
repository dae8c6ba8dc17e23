use serde::Deserialize;

/// Closed set of node categories. Every rendering and layout policy
/// (shape, palette, charge, collision radius) dispatches exhaustively
/// over this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Instance,
    Question,
    Answer,
    Person,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Instance => "instance",
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Person => "person",
        }
    }

    /// Question/answer fragments render as circles, everything else as
    /// rounded rectangles.
    pub fn is_round(self) -> bool {
        matches!(self, Self::Question | Self::Answer)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct OntologyNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_proposed: bool,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OntologyLink {
    pub source: String,
    pub target: String,
    pub relation: String,
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
    #[serde(default)]
    pub is_proposed: bool,
}

/// Coarse grouping of relation labels. Controls spring length and edge
/// styling; free-form predicates fall into `Predicate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationClass {
    /// `is_a` / `instance_of` taxonomy edges.
    Taxonomic,
    /// Q&A relevance edges.
    Informational,
    /// Any other predicate.
    Predicate,
}

impl RelationClass {
    pub fn of(relation: &str) -> Self {
        match relation {
            "is_a" | "instance_of" => Self::Taxonomic,
            "is_relevant_for" => Self::Informational,
            _ => Self::Predicate,
        }
    }

    /// Preferred spring separation in world units.
    pub fn spring_distance(self) -> f32 {
        match self {
            Self::Informational => 80.0,
            Self::Predicate => 100.0,
            Self::Taxonomic => 120.0,
        }
    }
}

/// A node-shaped proposal staged by the extraction step.
#[derive(Clone, Debug, Deserialize)]
pub struct ProposedNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A staged candidate element awaiting user confirmation. Node-shaped
/// variants carry the node fields; `Edge` carries endpoints by id.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposedElement {
    Class(ProposedNode),
    Instance(ProposedNode),
    Person(ProposedNode),
    Question(ProposedNode),
    Answer(ProposedNode),
    Edge {
        from: String,
        to: String,
        label: String,
        #[serde(default)]
        attributes: Vec<(String, String)>,
    },
}

impl ProposedElement {
    pub fn as_node(&self) -> Option<(&ProposedNode, NodeKind)> {
        match self {
            Self::Class(node) => Some((node, NodeKind::Class)),
            Self::Instance(node) => Some((node, NodeKind::Instance)),
            Self::Person(node) => Some((node, NodeKind::Person)),
            Self::Question(node) => Some((node, NodeKind::Question)),
            Self::Answer(node) => Some((node, NodeKind::Answer)),
            Self::Edge { .. } => None,
        }
    }
}

/// One extracted question/answer unit plus the graph elements the
/// extraction step proposes for it.
#[derive(Clone, Debug, Deserialize)]
pub struct QaUnit {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub proposals: Vec<ProposedElement>,
}

impl QaUnit {
    /// The full staged element list for this unit: a synthesized question
    /// node and answer node, followed by the data-driven domain proposals.
    /// The synthesized ids (`q_<id>` / `a_<id>`) are what the stored
    /// relevance edges reference.
    pub fn proposed_elements(&self) -> Vec<ProposedElement> {
        let mut elements = vec![
            ProposedElement::Question(ProposedNode {
                id: format!("q_{}", self.id),
                label: "Q".to_owned(),
                parent: None,
                content: Some(self.question.clone()),
            }),
            ProposedElement::Answer(ProposedNode {
                id: format!("a_{}", self.id),
                label: "A".to_owned(),
                parent: None,
                content: Some(self.answer.clone()),
            }),
        ];
        elements.extend(self.proposals.iter().cloned());
        elements
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct OntologySeed {
    pub nodes: Vec<OntologyNode>,
    pub links: Vec<OntologyLink>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Dataset {
    pub ontology: OntologySeed,
    pub qas: Vec<QaUnit>,
}
