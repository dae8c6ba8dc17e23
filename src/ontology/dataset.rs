use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};

use super::model::Dataset;

/// Maintenance-knowledge demo dataset ported from the Wagner maintenance
/// report walkthrough: a four-class starting ontology and five extracted
/// Q&A units with their proposed graph elements.
const SAMPLE_DATA: &str = include_str!("sample_data.json");

pub fn sample_dataset() -> Result<Dataset> {
    parse_dataset(SAMPLE_DATA).context("embedded sample dataset is invalid")
}

pub fn load_dataset(path: Option<&Path>) -> Result<Dataset> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("could not read dataset file {}", path.display()))?;
            parse_dataset(&raw)
                .with_context(|| format!("invalid dataset in {}", path.display()))
        }
        None => sample_dataset(),
    }
}

fn parse_dataset(raw: &str) -> Result<Dataset> {
    let dataset: Dataset = serde_json::from_str(raw).context("invalid dataset JSON")?;
    ensure!(
        !dataset.ontology.nodes.is_empty(),
        "dataset has no ontology nodes"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_sample_parses() {
        let dataset = sample_dataset().expect("sample parses");
        assert_eq!(dataset.ontology.nodes.len(), 4);
        assert_eq!(dataset.ontology.links.len(), 3);
        assert_eq!(dataset.qas.len(), 5);
        // Every QA carries at least one relevance edge back to the graph.
        for qa in &dataset.qas {
            assert!(!qa.proposals.is_empty(), "qa {} has no proposals", qa.id);
        }
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_dataset("{ not json").is_err());
        assert!(parse_dataset(r#"{"ontology":{"nodes":[],"links":[]},"qas":[]}"#).is_err());
    }
}
