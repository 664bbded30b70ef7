//! Crowd aggregation and the LEAP creation policy (`spec.md` §4.C).
//!
//! Crowd evidence rides the temporal-next backbone every ingested sentence
//! leaves behind: `subject -[temporal-next]-> connector -[temporal-next]->
//! target`. The LEAP edge created on success carries the connector's own
//! semantic relation (is-a / has / can), not temporal-next.

use hashbrown::HashMap;

use crate::config::Config;
use crate::leap::gap::TemplateGap;
use crate::model::{EdgeId, EdgeKind, NodeId, NodeKind, Relation};
use crate::storage::Graph;
use crate::telemetry::{Event, RejectReason, Telemetry};

/// One row of the crowd table: a candidate target with its accumulated
/// support, distinct-subject count, and a small example list.
#[derive(Debug, Clone)]
pub struct CrowdRow {
    pub target: NodeId,
    pub support: f32,
    pub distinct: usize,
    pub examples: Vec<NodeId>,
}

/// For connector node `connector`, enumerate every EXACT temporal-next edge
/// `S -> connector` with `S` of kind `Instance`, then every EXACT
/// temporal-next edge `connector -> T` with `T` *not* of kind `Instance`,
/// and accumulate support per `T`.
///
/// EXACT edges are always inserted with an equal-weight reverse, so a scan
/// around `connector` cannot tell a genuine `subject -> connector` leg from
/// the auto-inserted reverse of `connector -> target`. Subjects and targets
/// are disambiguated by node kind instead: a crowd subject is a concrete
/// instance (`dogs`, `cats`), a crowd target is the generalization it names
/// (`mammals`) — never both in the same row.
///
/// Support for a target `T` is `connector -> T`'s own `count`: the number of
/// times that connector-target pair has been ingested, which already
/// accumulates once per subject's sentence (three "X are mammals" sentences
/// drive the `are -> mammals` edge's count to 3). Summing that edge's
/// *weight* once per subject instead would undercount — EXACT edges start
/// at the fixed baseline weight (0.5) regardless of how many subjects
/// corroborate them, so weight alone cannot tell three subjects from one.
/// `distinct` is the number of unique subjects observed feeding into
/// `connector` at all, since the temporal-next backbone has no finer
/// per-target subject attribution than that.
pub fn aggregate(graph: &Graph, connector: NodeId) -> Vec<CrowdRow> {
    let mut subjects: Vec<NodeId> = graph
        .edges()
        .iter()
        .filter(|e| {
            e.kind == EdgeKind::Exact
                && e.relation == Relation::TemporalNext
                && e.b == connector
                && e.w > 0.0
                && graph.node(e.a).map(|n| n.kind == NodeKind::Instance).unwrap_or(false)
        })
        .map(|e| e.a)
        .collect();
    subjects.sort();
    subjects.dedup();

    let mut rows: HashMap<NodeId, (f32, Vec<NodeId>)> = HashMap::new();
    for edge in graph.outgoing_edges(connector) {
        if edge.kind != EdgeKind::Exact || edge.relation != Relation::TemporalNext || edge.w <= 0.0 {
            continue;
        }
        if graph.node(edge.b).map(|n| n.kind == NodeKind::Instance).unwrap_or(true) {
            continue;
        }
        rows.insert(edge.b, (edge.count as f32, subjects.clone()));
    }

    let mut out: Vec<CrowdRow> = rows
        .into_iter()
        .map(|(target, (support, mut examples))| {
            let distinct = examples.len();
            examples.truncate(5);
            CrowdRow { target, support, distinct, examples }
        })
        .collect();
    out.sort_by(|a, b| b.support.partial_cmp(&a.support).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Apply the creation policy to a template gap, emitting the appropriate
/// telemetry event either way. Returns the new LEAP edge id on success.
pub fn try_create(graph: &mut Graph, telemetry: &Telemetry, cfg: &Config, gap: &TemplateGap, connector_node: NodeId) -> Option<EdgeId> {
    let relation = gap.connector.semantic_relation();
    let table = aggregate(graph, connector_node);
    let best = table.first();
    let second = table.get(1);

    let Some(best) = best else {
        telemetry.emit(&Event::LeapReject { reason: RejectReason::InsufficientSupport, subject: Some(gap.subject.0) });
        return None;
    };

    if best.support < cfg.th_support {
        telemetry.emit(&Event::LeapReject { reason: RejectReason::InsufficientSupport, subject: Some(gap.subject.0) });
        return None;
    }
    if best.distinct < cfg.th_diversity {
        telemetry.emit(&Event::LeapReject { reason: RejectReason::LowDiversity, subject: Some(gap.subject.0) });
        return None;
    }
    if let Some(second) = second {
        if best.support < second.support + cfg.th_margin {
            telemetry.emit(&Event::LeapReject { reason: RejectReason::LowMargin, subject: Some(gap.subject.0) });
            return None;
        }
    }

    // Conflict rule: abort if subject already has a strong EXACT edge via
    // this relation to a different target.
    for edge in graph.outgoing_edges(gap.subject) {
        if edge.kind == EdgeKind::Exact && edge.relation == relation && edge.b != best.target && edge.w >= cfg.abstain_margin
        {
            telemetry.emit(&Event::LeapReject { reason: RejectReason::ConflictWithExact, subject: Some(gap.subject.0) });
            return None;
        }
    }

    let w = (best.support / 10.0).min(0.8);
    let id = graph.connect(gap.subject, best.target, relation, w, EdgeKind::Leap);
    if let Some(e) = graph.edge_mut(id) {
        e.leap_score = best.support;
    }
    telemetry.emit(&Event::LeapCreate {
        subject: gap.subject.0,
        target: best.target.0,
        support: best.support,
        diversity: best.distinct,
    });
    Some(id)
}
