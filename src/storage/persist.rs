//! Binary persistence: little-endian node/edge records, adjacency rebuilt
//! on load. Matches the layout in `spec.md` §4.A exactly.
//!
//! Failure semantics (§7): a missing file starts the caller with an empty
//! graph and a warning, never a hard error. A malformed header (counts
//! that overrun the actual byte stream) aborts the load and leaves the
//! caller's existing graph untouched. Truncated trailing bytes — a
//! partial record at EOF — are discarded with a warning rather than
//! failing the whole load.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Edge, EdgeId, EdgeKind, Modality, Node, NodeId, NodeKind, Relation};

use super::Graph;

/// Load a graph from `path`. Missing file => empty graph + warning.
pub fn load(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(?path, "persistence file not found, starting empty");
            return Ok(Graph::new());
        }
        Err(e) => return Err(Error::Io(e)),
    };
    decode(&bytes)
}

/// Save a graph to `path` as a single binary artifact.
pub fn save(graph: &Graph, path: impl AsRef<Path>) -> Result<()> {
    let bytes = encode(graph);
    std::fs::write(path, bytes)?;
    Ok(())
}

fn encode(graph: &Graph) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(graph.node_count() as u32).to_le_bytes());
    out.extend_from_slice(&(graph.edge_count() as u32).to_le_bytes());

    for n in graph.nodes() {
        out.extend_from_slice(&(n.kind as u32).to_le_bytes());
        out.extend_from_slice(&(n.modality as u32).to_le_bytes());
        out.extend_from_slice(&n.weight.to_le_bytes());
        out.extend_from_slice(&1.0f32.to_le_bytes()); // modality_weight (reserved)
        out.extend_from_slice(&0.0f32.to_le_bytes()); // cross_modal_coherence (reserved)
        out.extend_from_slice(&n.created_at.to_le_bytes());
        out.extend_from_slice(&n.last_touched.to_le_bytes());
        out.extend_from_slice(&(n.usage_count as i32).to_le_bytes());
        let payload = n.payload.as_bytes();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
    }

    for e in graph.edges() {
        out.extend_from_slice(&(e.a.0 as i32).to_le_bytes());
        out.extend_from_slice(&(e.b.0 as i32).to_le_bytes());
        out.push(e.kind as u8);
        out.extend_from_slice(&(e.relation as u32).to_le_bytes());
        out.extend_from_slice(&e.w.to_le_bytes());
        out.extend_from_slice(&e.w_core.to_le_bytes());
        out.extend_from_slice(&e.w_ctx.to_le_bytes());
        out.extend_from_slice(&e.count.to_le_bytes());
        out.extend_from_slice(&e.successes.to_le_bytes());
        out.extend_from_slice(&e.failures.to_le_bytes());
        out.extend_from_slice(&e.leap_score.to_le_bytes());
        out.extend_from_slice(&e.last_touched.to_le_bytes());
        out.push(e.cross_modal as u8);
        out.extend_from_slice(&e.cross_modal_bonus.to_le_bytes());
    }

    out
}

/// Fixed-size portion of one node record after the variable-length payload.
const NODE_FIXED_LEN: usize = 4 + 4 + 4 + 4 + 4 + 8 + 8 + 4 + 4;
const EDGE_LEN: usize = 4 + 4 + 1 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 8 + 1 + 4;

fn decode(bytes: &[u8]) -> Result<Graph> {
    let mut cursor = Cursor::new(bytes);
    let node_count = cursor.u32()? as usize;
    let edge_count = cursor.u32()? as usize;

    // A malformed header declares more records than the byte stream could
    // ever hold even at the fixed-length minimum per record (ignoring
    // variable-length payloads, which only add bytes). That's distinct from
    // a genuinely truncated trailing record, tolerated below — abort here
    // with no partial graph observable by the caller.
    let min_required = node_count.saturating_mul(NODE_FIXED_LEN).saturating_add(edge_count.saturating_mul(EDGE_LEN));
    if cursor.remaining() < min_required {
        return Err(Error::Malformed(format!(
            "header declares {node_count} nodes / {edge_count} edges, more than the {} remaining bytes could hold",
            cursor.remaining()
        )));
    }

    let mut graph = Graph::new();

    for i in 0..node_count {
        // A truncated trailing record: stop here, keep what we have.
        if cursor.remaining() < NODE_FIXED_LEN {
            tracing::warn!(recovered = i, expected = node_count, "truncated node record, discarding tail");
            return Ok(graph);
        }
        let kind = NodeKind::from_u32(cursor.u32()?);
        let modality = Modality::from_u32(cursor.u32()?);
        let weight = cursor.f32()?;
        let _modality_weight = cursor.f32()?;
        let _cross_modal_coherence = cursor.f32()?;
        let created_at = cursor.i64()?;
        let last_touched = cursor.i64()?;
        let usage_count = cursor.i32()?;
        let len = cursor.u32()? as usize;

        if cursor.remaining() < len {
            tracing::warn!(recovered = i, "truncated node payload, discarding tail");
            return Ok(graph);
        }
        let payload = cursor.take_string(len)?;

        let id = NodeId(graph.node_count() as u32);
        let mut node = Node::new(id, payload, kind, modality, created_at);
        node.weight = weight;
        node.last_touched = last_touched;
        node.usage_count = usage_count.max(0) as u32;
        graph.push_node_raw(node);
    }

    for i in 0..edge_count {
        if cursor.remaining() < EDGE_LEN {
            tracing::warn!(recovered = i, expected = edge_count, "truncated edge record, discarding tail");
            return Ok(graph);
        }
        let a = NodeId(cursor.i32()? as u32);
        let b = NodeId(cursor.i32()? as u32);
        let kind = if cursor.u8()? == 0 { EdgeKind::Exact } else { EdgeKind::Leap };
        let relation = Relation::from_u32(cursor.u32()?);
        let w = cursor.f32()?;
        let w_core = cursor.f32()?;
        let w_ctx = cursor.f32()?;
        let count = cursor.u32()?;
        let successes = cursor.u32()?;
        let failures = cursor.u32()?;
        let leap_score = cursor.f32()?;
        let last_touched = cursor.i64()?;
        let cross_modal = cursor.u8()? != 0;
        let cross_modal_bonus = cursor.f32()?;

        let id = EdgeId(graph.edge_count() as u32);
        let mut edge = Edge::new(id, a, b, relation, kind, w, last_touched);
        edge.w = w;
        edge.w_core = w_core;
        edge.w_ctx = w_ctx;
        edge.count = count;
        edge.successes = successes;
        edge.failures = failures;
        edge.leap_score = leap_score;
        edge.cross_modal = cross_modal;
        edge.cross_modal_bonus = cross_modal_bonus;
        graph.push_edge_raw(edge);
    }

    Ok(graph)
}

/// A parallel file holding the node/token embedding tables (§6):
/// `u32 count, u32 dim`, then per-entry a length-prefixed key and `dim` f32s.
pub fn save_embeddings<W: Write>(
    writer: &mut W,
    dim: usize,
    entries: impl Iterator<Item = (String, Vec<f32>)>,
) -> Result<()> {
    let entries: Vec<_> = entries.collect();
    writer.write_all(&(entries.len() as u32).to_le_bytes())?;
    writer.write_all(&(dim as u32).to_le_bytes())?;
    for (key, vec) in entries {
        let kb = key.as_bytes();
        writer.write_all(&(kb.len() as u32).to_le_bytes())?;
        writer.write_all(kb)?;
        for v in vec {
            writer.write_all(&v.to_le_bytes())?;
        }
    }
    Ok(())
}

pub fn load_embeddings<R: Read>(reader: &mut R) -> Result<(usize, Vec<(String, Vec<f32>)>)> {
    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;
    let count = u32::from_le_bytes(header[0..4].try_into().unwrap()) as usize;
    let dim = u32::from_le_bytes(header[4..8].try_into().unwrap()) as usize;

    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let mut len_buf = [0u8; 4];
        if reader.read_exact(&mut len_buf).is_err() {
            break;
        }
        let len = u32::from_le_bytes(len_buf) as usize;
        let mut key_buf = vec![0u8; len];
        if reader.read_exact(&mut key_buf).is_err() {
            break;
        }
        let key = String::from_utf8_lossy(&key_buf).into_owned();
        let mut vec = Vec::with_capacity(dim);
        let mut ok = true;
        for _ in 0..dim {
            let mut fb = [0u8; 4];
            if reader.read_exact(&mut fb).is_err() {
                ok = false;
                break;
            }
            vec.push(f32::from_le_bytes(fb));
        }
        if !ok {
            break;
        }
        out.push((key, vec));
    }
    Ok((dim, out))
}

// ============================================================================
// Minimal byte cursor — avoids pulling in a binary-serialization crate for
// a format this small and fully specified.
// ============================================================================

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::Malformed("unexpected end of persistence data".into()));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn take_string(&mut self, len: usize) -> Result<String> {
        let slice = self.take(len)?;
        Ok(String::from_utf8_lossy(slice).into_owned())
    }
}
