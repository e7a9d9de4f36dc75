//! An [`AigEdge`] points at an [`AigNode`] by id and can be complemented
//! (indicates the presence of an inverter on the wire).
//!
//! [`AigNode`]: crate::AigNode

use std::ops::Not;

use crate::NodeId;

/// A directed edge refering to an AIG node.
///
/// The edge can carry an inverter according to the value of `complement`.
/// Edges are plain `(id, phase)` pairs: the owning [`Aig`] arena resolves
/// ids to nodes, so edges stay `Copy` and never dangle on their own.
///
/// The AIGER literal of an edge is `2 * id + complement`:
///
/// ```rust
/// use fraig::AigEdge;
/// let e = AigEdge::new(3, true);
/// assert_eq!(e.literal(), 7);
/// assert_eq!(AigEdge::from_literal(7), e);
/// assert_eq!(!e, AigEdge::new(3, false));
/// ```
///
/// [`Aig`]: crate::Aig
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AigEdge {
    /// The id of the node the edge is refering to.
    pub id: NodeId,
    /// Set to true if the signal should be inverted.
    pub complement: bool,
}

impl Not for AigEdge {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl AigEdge {
    pub fn new(id: NodeId, complement: bool) -> Self {
        AigEdge { id, complement }
    }

    /// Decodes an AIGER literal (`2 * id + complement`).
    pub fn from_literal(lit: u64) -> Self {
        AigEdge {
            id: lit >> 1,
            complement: lit & 1 != 0,
        }
    }

    /// The AIGER literal of this edge.
    pub fn literal(&self) -> u64 {
        2 * self.id + self.complement as u64
    }

    pub fn is_cst_false(&self) -> bool {
        self.id == 0 && !self.complement
    }

    pub fn is_cst_true(&self) -> bool {
        self.id == 0 && self.complement
    }

    pub fn is_complement_of(&self, other: &AigEdge) -> bool {
        self.id == other.id && self.complement != other.complement
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_roundtrip() {
        assert_eq!(AigEdge::from_literal(0), AigEdge::new(0, false));
        assert_eq!(AigEdge::from_literal(1), AigEdge::new(0, true));
        assert_eq!(AigEdge::from_literal(42), AigEdge::new(21, false));
        assert_eq!(AigEdge::new(21, true).literal(), 43);
    }

    #[test]
    fn edge_not() {
        let e = AigEdge::new(5, false);
        assert_eq!(!e, AigEdge::new(5, true));
        assert_eq!(!!e, e);
        assert!(e.is_complement_of(&!e));
        assert!(!e.is_complement_of(&AigEdge::new(6, true)));
    }

    #[test]
    fn constants() {
        assert!(AigEdge::from_literal(0).is_cst_false());
        assert!(AigEdge::from_literal(1).is_cst_true());
        assert!(!AigEdge::from_literal(2).is_cst_false());
    }

    #[test]
    fn literal_order_is_id_then_phase() {
        let mut edges = vec![
            AigEdge::new(3, true),
            AigEdge::new(2, false),
            AigEdge::new(3, false),
        ];
        edges.sort();
        let lits: Vec<u64> = edges.iter().map(|e| e.literal()).collect();
        assert_eq!(lits, vec![4, 6, 7]);
    }
}
