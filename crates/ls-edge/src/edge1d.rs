use ls_core::Error;
use serde::Serialize;

use crate::marks::EdgeMark;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind {
    /// `0 -> 1` in scan order.
    Left,
    /// `1 -> 0` in scan order.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaskEdge {
    pub x: f64,
    pub idx: usize,
    pub kind: EdgeKind,
}

/// Left and right edge positions of one mask, each list in scan order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaskEdges {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl MaskEdges {
    pub fn is_balanced(&self) -> bool {
        self.left.len() == self.right.len()
    }

    /// Pairs the i-th left edge with the i-th right edge.
    ///
    /// Unequal edge counts produce no marks at all.
    pub fn marks(&self) -> Vec<EdgeMark> {
        if !self.is_balanced() {
            return Vec::new();
        }
        self.left
            .iter()
            .zip(self.right.iter())
            .map(|(&l, &r)| EdgeMark::new(l, r))
            .collect()
    }
}

/// Every transition of `mask`, located halfway between the samples on either
/// side of it.
pub fn scan_transitions(mask: &[u8], x: &[f64]) -> Result<Vec<MaskEdge>, Error> {
    if mask.len() != x.len() {
        return Err(Error::MaskLengthMismatch {
            mask_len: mask.len(),
            x_len: x.len(),
        });
    }

    let mut edges = Vec::new();
    for i in 1..mask.len() {
        let kind = match (mask[i - 1], mask[i]) {
            (0, 1) => EdgeKind::Left,
            (1, 0) => EdgeKind::Right,
            _ => continue,
        };
        edges.push(MaskEdge {
            x: 0.5 * (x[i - 1] + x[i]),
            idx: i,
            kind,
        });
    }

    Ok(edges)
}

pub fn detect_mask_edges(mask: &[u8], x: &[f64]) -> Result<MaskEdges, Error> {
    let mut out = MaskEdges::default();
    for edge in scan_transitions(mask, x)? {
        match edge.kind {
            EdgeKind::Left => out.left.push(edge.x),
            EdgeKind::Right => out.right.push(edge.x),
        }
    }
    Ok(out)
}

pub fn detect_marks(mask: &[u8], x: &[f64]) -> Result<Vec<EdgeMark>, Error> {
    Ok(detect_mask_edges(mask, x)?.marks())
}
