//! Template-gap detection: `X · CONNECTOR · Y?` (`spec.md` §4.C).

use crate::leap::connector::{normalize, Connector};
use crate::model::NodeId;
use crate::storage::Graph;

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateGap {
    pub subject: NodeId,
    pub connector_text: String,
    pub connector: Connector,
    pub object: Option<NodeId>,
}

/// Scan whitespace-tokenized query terms for a canonical connector with a
/// known subject, in either declarative (`X CONNECTOR Y`) or interrogative
/// (`CONNECTOR X Y`) order. Returns the first match; `None` means no gap was
/// found (`has_gap = false`).
pub fn detect_gap(graph: &Graph, tokens: &[String]) -> Option<TemplateGap> {
    for i in 0..tokens.len() {
        let Some(connector) = normalize(&tokens[i]) else { continue };

        if i > 0 {
            if let Some(subject) = graph.find_payload(&tokens[i - 1]) {
                let object = tokens.get(i + 1).and_then(|t| graph.find_payload(t));
                return Some(TemplateGap { subject, connector_text: tokens[i].clone(), connector, object });
            }
        }
        if let Some(subject_tok) = tokens.get(i + 1) {
            if let Some(subject) = graph.find_payload(subject_tok) {
                let object = tokens.get(i + 2).and_then(|t| graph.find_payload(t));
                return Some(TemplateGap { subject, connector_text: tokens[i].clone(), connector, object });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Modality, NodeKind};

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_lowercase).collect()
    }

    #[test]
    fn detects_subject_connector_object() {
        let mut g = Graph::new();
        g.create_or_touch("foxes", NodeKind::Instance, Modality::Text);
        g.create_or_touch("mammals", NodeKind::Concept, Modality::Text);

        let gap = detect_gap(&g, &words("are foxes mammals")).unwrap();
        assert_eq!(gap.connector, Connector::Be);
        assert!(gap.object.is_some());
    }

    #[test]
    fn unknown_subject_yields_no_gap() {
        let g = Graph::new();
        assert!(detect_gap(&g, &words("are foxes mammals")).is_none());
    }

    #[test]
    fn missing_object_is_still_a_gap() {
        let mut g = Graph::new();
        g.create_or_touch("foxes", NodeKind::Instance, Modality::Text);

        let gap = detect_gap(&g, &words("foxes are")).unwrap();
        assert!(gap.object.is_none());
    }
}
