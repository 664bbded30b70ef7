//! Sensory ingest: tokenization and cross-modal edge creation (`spec.md` §6).

use crate::leap::{normalize as normalize_connector, Connector};
use crate::model::{EdgeKind, Modality, NodeId, NodeKind, Relation};
use crate::storage::Graph;

pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '\''))
        .map(|t| t.to_lowercase())
        .filter(|t| t.len() >= 2)
        .collect()
}

/// Pattern relation for `X {is|are} Y`, `X {has|have} Y`, etc., keyed by the
/// connector the pattern pivots on.
fn pattern_relation(connector: Connector) -> Relation {
    connector.semantic_relation()
}

/// Tokenize on whitespace/punctuation, lowercase, drop tokens shorter than
/// 2 chars; create or touch a node per word, temporal-next edges between
/// consecutive words, and a semantic relation edge for any recognized
/// `X CONNECTOR Y` triple.
pub fn teach_text(graph: &mut Graph, utf8: &str) -> Vec<NodeId> {
    let tokens = tokenize(utf8);
    let handles: Vec<NodeId> = tokens
        .iter()
        .map(|t| match normalize_connector(t) {
            // Key connector nodes by their canonical form so "is"/"are"/"was"/"were"
            // all land on the same node and crowd support aggregates onto it.
            Some(connector) => graph.create_or_touch(connector.canonical_str(), NodeKind::Connector, Modality::Text),
            None => graph.create_or_touch(t, NodeKind::Instance, Modality::Text),
        })
        .collect();

    for pair in handles.windows(2) {
        graph.connect(pair[0], pair[1], Relation::TemporalNext, 0.5, EdgeKind::Exact);
    }

    for i in 1..tokens.len().saturating_sub(1) {
        if let Some(connector) = normalize_connector(&tokens[i]) {
            graph.connect(handles[i - 1], handles[i + 1], pattern_relation(connector), 0.6, EdgeKind::Exact);
            // The object of a copula names the generalization ("mammals" in
            // "dogs are mammals"), never a concrete instance — promote it so
            // crowd aggregation can tell subject from target by node kind.
            if let Some(n) = graph.node_mut(handles[i + 1]) {
                if n.kind == NodeKind::Instance {
                    n.kind = NodeKind::Concept;
                }
            }
        }
    }

    handles
}

/// Create an audio-token node for `label` and bind it bidirectionally to the
/// matching text node, if one already exists.
pub fn teach_audio(graph: &mut Graph, label: &str) -> NodeId {
    let node = graph.create_or_touch(label, NodeKind::AudioToken, Modality::Audio);
    bind_cross_modal(graph, node, label);
    node
}

/// Create an image-percept node for `label`. `_emb` is the caller-supplied
/// perceptual embedding; storing it is the embedding bridge's job once the
/// node is touched again through `think`.
pub fn teach_image(graph: &mut Graph, _emb: &[f32], label: &str) -> NodeId {
    let node = graph.create_or_touch(label, NodeKind::ImagePercept, Modality::Image);
    bind_cross_modal(graph, node, label);
    node
}

/// Create a motor node for `action` and weight the cross-modal edge to its
/// text label (if any) by `value`.
pub fn teach_motor(graph: &mut Graph, action: &str, value: f32) -> NodeId {
    let node = graph.create_or_touch(action, NodeKind::Speech, Modality::Motor);
    if let Some(text) = graph.find_payload(action) {
        let id = graph.connect(node, text, Relation::CrossModal, value.clamp(0.0, 1.0), EdgeKind::Exact);
        if let Some(e) = graph.edge_mut(id) {
            e.cross_modal = true;
        }
    }
    node
}

/// Bind `text`, `audio` nodes plus has/is-a edges to a shared concept node
/// labeled `label`.
pub fn teach_multimodal_pair(graph: &mut Graph, text: &str, audio: &str, label: &str) -> NodeId {
    let text_handles = teach_text(graph, text);
    let audio_node = teach_audio(graph, audio);
    let concept = graph.create_or_touch(label, NodeKind::Concept, Modality::Abstract);

    for &t in &text_handles {
        let id = graph.connect(t, concept, Relation::IsA, 0.5, EdgeKind::Exact);
        if let Some(e) = graph.edge_mut(id) {
            e.cross_modal = true;
        }
    }
    let id = graph.connect(audio_node, concept, Relation::Has, 0.5, EdgeKind::Exact);
    if let Some(e) = graph.edge_mut(id) {
        e.cross_modal = true;
    }
    concept
}

fn bind_cross_modal(graph: &mut Graph, node: NodeId, label: &str) {
    if let Some(text) = graph.find_payload(label) {
        if text == node {
            return;
        }
        let id = graph.connect(node, text, Relation::CrossModal, 0.5, EdgeKind::Exact);
        if let Some(e) = graph.edge_mut(id) {
            e.cross_modal = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teach_text_creates_temporal_chain() {
        let mut g = Graph::new();
        let handles = teach_text(&mut g, "dogs are mammals");
        assert_eq!(handles.len(), 3);
        let edge = g.find_edge(handles[0], handles[1], Relation::TemporalNext);
        assert!(edge.is_some());
    }

    #[test]
    fn teach_text_creates_pattern_edge_for_be() {
        let mut g = Graph::new();
        let handles = teach_text(&mut g, "dogs are mammals");
        let edge = g.find_edge(handles[0], handles[2], Relation::IsA);
        assert!(edge.is_some());
    }

    #[test]
    fn repeated_ingest_doubles_edge_count_not_duplicates() {
        let mut g = Graph::new();
        teach_text(&mut g, "dogs are mammals");
        teach_text(&mut g, "dogs are mammals");
        let handles: Vec<NodeId> = ["dogs", "be", "mammals"].iter().map(|t| g.find_payload(t).unwrap()).collect();
        let edge = g.find_edge(handles[0], handles[1], Relation::TemporalNext).unwrap();
        assert_eq!(g.edge(edge).unwrap().count, 2);
    }

    #[test]
    fn teach_audio_binds_to_existing_text_node() {
        let mut g = Graph::new();
        teach_text(&mut g, "bark sound");
        let audio = teach_audio(&mut g, "bark");
        let text = g.find_payload("bark").unwrap();
        assert!(g.find_edge(audio, text, Relation::CrossModal).is_some());
    }

    #[test]
    fn teach_multimodal_pair_links_text_and_audio_to_concept() {
        let mut g = Graph::new();
        let concept = teach_multimodal_pair(&mut g, "a dog barks", "bark", "dog-concept");
        // EXACT auto-inserts the reverse of each forward edge into `concept`,
        // so its outgoing set is the reverse IsA to "dog"/"barks" plus the
        // reverse Has to the audio node — all cross-modal.
        let edges: Vec<_> = g.outgoing_edges(concept).collect();
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.cross_modal));
        let dog = g.find_payload("dog").unwrap();
        assert!(g.find_edge(dog, concept, Relation::IsA).is_some());
    }
}
