pub mod dataset;
mod model;
mod store;

pub use dataset::load_dataset;
pub use model::{
    Dataset, NodeKind, OntologyLink, OntologyNode, OntologySeed, ProposedElement, ProposedNode,
    QaUnit, RelationClass,
};
pub use store::Ontology;
