//! Module defining the [`Aig`] arena, as well as [`AigNode`], [`AigEdge`] and the
//! invariant-preserving mutators every pass is built on.
//!
//! The optimization passes themselves live in [`crate::strash`], [`crate::opt`],
//! [`crate::sim`], [`crate::fec`] and [`crate::fraig`].

pub mod edge;
pub mod error;
mod integrity;
pub mod node;
mod parser;
pub(crate) mod writer;

use std::collections::HashSet;
use std::path::Path;

use log::debug;

pub use edge::AigEdge;
pub use error::{AigError, ParserError, Result};
pub use node::{AigNode, GateKind, NodeId};

use crate::fec::FecGroup;

/// A whole AIG.
///
/// Nodes live in a sparse id-indexed arena: slot `i` of `nodes` holds the gate
/// with id `i`, or `None` if that id was removed or never defined. Ids are
/// stable until the gate is removed and are never reused for a different
/// logical node, so an [`AigEdge`] never silently changes meaning.
///
/// Gates are created while loading a circuit and at no other time: the passes
/// only merge and remove existing ones. The sole structural-mutation primitive
/// they use is [`Aig::merge`].
///
/// ```rust
/// use fraig::Aig;
/// // A single AND of two inputs: !(a & b) on the output.
/// let src = "aag 3 2 0 1 1\n2\n4\n7\n6 2 4\n";
/// let aig = Aig::from_str(src).unwrap();
/// assert_eq!(aig.summary(), (2, 1, 1));
/// ```
#[derive(Debug, Clone)]
pub struct Aig {
    /// Sparse id → gate map. Slot 0 always holds the constant-zero gate.
    nodes: Vec<Option<AigNode>>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    /// Maximum variable id declared by the loaded circuit.
    /// PO gates get ids `max_var + 1 + ordinal`.
    max_var: u64,
    /// Last computed topological order (ids, fanins before consumers).
    /// Dirty after any structural mutation until [`Aig::rebuild_topo`] runs.
    topo: Vec<NodeId>,
    /// Gates with an undefined gate somewhere in their fanins.
    floating: Vec<NodeId>,
    /// PI/AND gates whose output drives nothing.
    unused: Vec<NodeId>,
    /// Current functional-equivalence candidate groups.
    pub(crate) groups: Vec<FecGroup>,
}

impl Aig {
    /// Create an empty AIG holding only the constant-zero gate.
    ///
    /// `max_var` is the maximum variable id the circuit may declare
    /// (the `M` field of an AIGER header).
    pub(crate) fn new(max_var: u64, n_outputs: usize) -> Result<Self> {
        let mut nodes = Vec::new();
        nodes.resize_with(max_var as usize + 1 + n_outputs + 1, || None);
        nodes[0] = Some(AigNode::new(0, GateKind::Const0)?);
        Ok(Aig {
            nodes,
            inputs: Vec::new(),
            outputs: Vec::new(),
            max_var,
            topo: Vec::new(),
            floating: Vec::new(),
            unused: Vec::new(),
            groups: Vec::new(),
        })
    }

    /// Loads an AIG from an ASCII AIGER (`.aag`) file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        parser::parse_aag_from_file(path.as_ref())
    }

    /// Loads an AIG from an ASCII AIGER (`.aag`) string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        parser::parse_aag(s)
    }

    /// Retrieves a node from its id.
    pub fn get_node(&self, id: NodeId) -> Option<&AigNode> {
        self.nodes.get(id as usize)?.as_ref()
    }

    pub(crate) fn get_node_mut(&mut self, id: NodeId) -> Option<&mut AigNode> {
        self.nodes.get_mut(id as usize)?.as_mut()
    }

    /// Like [`Aig::get_node`] but missing ids are an error.
    pub(crate) fn node(&self, id: NodeId) -> Result<&AigNode> {
        self.get_node(id).ok_or(AigError::GateDoesNotExist(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut AigNode> {
        self.get_node_mut(id).ok_or(AigError::GateDoesNotExist(id))
    }

    /// Registers a brand new gate in the arena.
    /// Fails if a gate with the same id already exists.
    pub(crate) fn add_node(&mut self, id: NodeId, kind: GateKind) -> Result<()> {
        let node = AigNode::new(id, kind)?;
        if id as usize >= self.nodes.len() {
            self.nodes.resize_with(id as usize + 1, || None);
        }
        let slot = &mut self.nodes[id as usize];
        if slot.is_some() && !(id == 0 && kind == GateKind::Const0) {
            return Err(AigError::DuplicateId(id));
        }
        *slot = Some(node);
        match kind {
            GateKind::Input => self.inputs.push(id),
            GateKind::Output => self.outputs.push(id),
            _ => (),
        }
        Ok(())
    }

    /// Retrieves inputs id, in declaration order.
    pub fn get_inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Retrieves outputs id, in declaration order.
    pub fn get_outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Maximum variable id declared by the loaded circuit.
    pub fn max_var(&self) -> u64 {
        self.max_var
    }

    /// The last computed topological order (fanins before consumers).
    pub fn topological_order(&self) -> &[NodeId] {
        &self.topo
    }

    /// Gates with an undefined gate somewhere in their fanins.
    pub fn floating_gates(&self) -> &[NodeId] {
        &self.floating
    }

    /// PI/AND gates whose output drives nothing.
    pub fn unused_gates(&self) -> &[NodeId] {
        &self.unused
    }

    /// Live gate counts `(inputs, outputs, ands)`.
    pub fn summary(&self) -> (usize, usize, usize) {
        let ands = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| n.is_and())
            .count();
        (self.inputs.len(), self.outputs.len(), ands)
    }

    /// Iterates over all live gates, by increasing id.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &AigNode> {
        self.nodes.iter().flatten()
    }

    pub(crate) fn iter_nodes_mut(&mut self) -> impl Iterator<Item = &mut AigNode> {
        self.nodes.iter_mut().flatten()
    }

    /// Sets fanin slot `slot` of `gate` to `edge` and registers the matching
    /// fanout back-reference on the target.
    ///
    /// Fails with [`AigError::InvalidFaninSlot`] if the slot is out of range
    /// for the gate's kind.
    pub(crate) fn link(&mut self, gate: NodeId, slot: usize, edge: AigEdge) -> Result<()> {
        self.node(edge.id)?;
        self.node_mut(gate)?.set_fanin(slot, edge)?;
        self.node_mut(edge.id)?.add_fanout(gate, edge.complement);
        Ok(())
    }

    /// Merges `del` into `target` and deletes `del`. Spec of the protocol:
    ///
    /// - every fanin of `del` drops its fanout back-reference to `del`;
    /// - every fanout entry `(g, p)` of `del` redirects exactly one matching
    ///   fanin slot of `g` to `target`, with phase `p` when `prop_phase` is
    ///   `None` or `p XOR q` for `Some(q)`, and registers the corresponding
    ///   fanout on `target`;
    /// - `del` is removed from the arena.
    ///
    /// Safe when `target` is itself a fanin of `del`: the redirected phase is
    /// computed from the fanout entry alone, so detachment order does not
    /// matter.
    pub(crate) fn merge(
        &mut self,
        del: NodeId,
        target: NodeId,
        prop_phase: Option<bool>,
    ) -> Result<()> {
        if del == target {
            return Err(AigError::InvalidState(format!(
                "merging gate {} into itself",
                del
            )));
        }
        self.node(target)?;
        let fanins = self.node(del)?.fanins().to_vec();
        for fanin in fanins {
            self.node_mut(fanin.id)?.remove_fanout(del);
        }
        let fanouts = std::mem::take(&mut self.node_mut(del)?.fanouts);
        for out in fanouts {
            let phase = match prop_phase {
                None => out.complement,
                Some(q) => out.complement != q,
            };
            let edge = AigEdge::new(target, phase);
            self.node_mut(out.id)?
                .redirect_fanin(del, out.complement, edge)?;
            self.node_mut(target)?.add_fanout(out.id, phase);
        }
        self.remove_node(del)
    }

    /// Removes a gate from the arena. The gate must already be fully
    /// detached (no fanouts, and its fanins must not back-reference it).
    pub(crate) fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if node.is_const0() {
            return Err(AigError::InvalidState(
                "removing the constant-zero gate".to_string(),
            ));
        }
        if !node.fanouts().is_empty() {
            return Err(AigError::InvalidState(format!(
                "removing gate {} which still drives {} edge(s)",
                id,
                node.fanouts().len()
            )));
        }
        let (is_input, is_output) = (node.is_input(), node.is_output());
        if is_input {
            self.inputs.retain(|&i| i != id);
        }
        if is_output {
            self.outputs.retain(|&o| o != id);
        }
        debug!("removing gate {}", id);
        self.nodes[id as usize] = None;
        Ok(())
    }

    /// Drops a gate without the detachment checks. Sweep only: the caller
    /// guarantees every surviving back-reference gets rebuilt right after.
    pub(crate) fn drop_node(&mut self, id: NodeId) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        let (is_input, is_output) = (node.is_input(), node.is_output());
        if is_input {
            self.inputs.retain(|&i| i != id);
        }
        if is_output {
            self.outputs.retain(|&o| o != id);
        }
        self.nodes[id as usize] = None;
    }

    /// Recomputes the topological order from the PO list.
    ///
    /// Iterative post-order DFS over fanin edges; errors on a cycle (which
    /// would mean the arena is corrupted). Side effects: assigns
    /// [`AigNode::topo_index`] on every reached gate and clears it on the
    /// rest, which is how dead-gate detection piggybacks on this traversal.
    pub fn rebuild_topo(&mut self) -> Result<()> {
        let mut sort: Vec<NodeId> = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut done: HashSet<NodeId> = HashSet::new();

        for root in self.outputs.clone() {
            let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
            while let Some((id, last_time)) = stack.pop() {
                if last_time {
                    done.insert(id);
                    sort.push(id);
                    continue;
                }
                if done.contains(&id) {
                    continue;
                }
                if seen.contains(&id) {
                    return Err(AigError::InvalidState("found a cycle".to_string()));
                }
                seen.insert(id);
                stack.push((id, true));
                for fanin in self.node(id)?.fanins() {
                    if !done.contains(&fanin.id) {
                        stack.push((fanin.id, false));
                    }
                }
            }
        }

        for node in self.nodes.iter_mut().flatten() {
            node.topo_index = None;
        }
        for (i, &id) in sort.iter().enumerate() {
            // Reached gates are live by construction of the DFS.
            self.node_mut(id)?.topo_index = Some(i);
        }
        self.topo = sort;
        Ok(())
    }

    /// Rebuilds every fanout list from scratch out of the fanin slots.
    /// Used after a sweep, which invalidates back-references wholesale.
    pub(crate) fn rebuild_fanouts(&mut self) -> Result<()> {
        for node in self.nodes.iter_mut().flatten() {
            node.fanouts.clear();
        }
        let ids: Vec<NodeId> = self.iter_nodes().map(|n| n.id()).collect();
        for id in ids {
            for fanin in self.node(id)?.fanins().to_vec() {
                self.node_mut(fanin.id)?.add_fanout(id, fanin.complement);
            }
        }
        Ok(())
    }

    /// Recomputes the floating list: gates with an `Undef` fanin.
    pub(crate) fn rebuild_floating(&mut self) {
        let mut floating = Vec::new();
        for node in self.nodes.iter().flatten() {
            let has_undef = node.fanins().iter().any(|e| {
                self.get_node(e.id)
                    .map(|n| n.is_undef())
                    .unwrap_or(false)
            });
            if has_undef {
                floating.push(node.id());
            }
        }
        floating.sort_unstable();
        self.floating = floating;
    }

    /// Recomputes the unused list: PI/AND gates with an empty fanout.
    pub(crate) fn rebuild_unused(&mut self) {
        let mut unused = Vec::new();
        for node in self.nodes.iter().flatten() {
            if (node.is_input() || node.is_and()) && node.fanouts().is_empty() {
                unused.push(node.id());
            }
        }
        unused.sort_unstable();
        self.unused = unused;
    }

    /// Recomputes everything derived from structure after a mutation pass:
    /// topological order, fanout-based lists and FEC group membership.
    pub(crate) fn refresh_lists(&mut self) -> Result<()> {
        self.rebuild_topo()?;
        self.rebuild_floating();
        self.rebuild_unused();
        self.prune_groups();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // !(a & b) driving the single PO.
    const AND2: &str = "aag 3 2 0 1 1\n2\n4\n7\n6 2 4\n";

    #[test]
    fn load_and_query() {
        let aig = Aig::from_str(AND2).unwrap();
        assert_eq!(aig.summary(), (2, 1, 1));
        assert_eq!(aig.get_inputs(), &[1, 2]);
        // The PO gate gets id max_var + 1.
        assert_eq!(aig.get_outputs(), &[4]);
        let po = aig.node(4).unwrap();
        assert_eq!(po.fanins(), &[AigEdge::new(3, true)]);
        assert!(aig.get_node(17).is_none());
    }

    #[test]
    fn topo_order_respects_fanins() {
        let aig = Aig::from_str(AND2).unwrap();
        let topo = aig.topological_order();
        let pos = |id| topo.iter().position(|&x| x == id).unwrap();
        assert!(pos(1) < pos(3));
        assert!(pos(2) < pos(3));
        assert!(pos(3) < pos(4));
        assert_eq!(aig.node(3).unwrap().topo_index(), Some(pos(3)));
    }

    #[test]
    fn merge_redirects_fanouts() {
        // Two structurally identical ANDs, one PO on each.
        let src = "aag 4 2 0 2 2\n2\n4\n6\n8\n6 2 4\n8 2 4\n";
        let mut aig = Aig::from_str(src).unwrap();
        aig.merge(4, 3, None).unwrap();
        assert!(aig.get_node(4).is_none());
        // Both POs now read gate 3.
        for &po in aig.get_outputs() {
            assert_eq!(aig.node(po).unwrap().fanin(0).unwrap().id, 3);
        }
        assert_eq!(aig.node(3).unwrap().fanouts().len(), 2);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn merge_with_phase() {
        let src = "aag 4 2 0 1 2\n2\n4\n8\n6 2 4\n8 6 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        // Pretend gate 4 proved equal to !gate 3.
        // Gate 4's consumer, the PO, must read gate 3 inverted.
        aig.merge(4, 3, Some(true)).unwrap();
        let po = aig.get_outputs()[0];
        assert_eq!(aig.node(po).unwrap().fanin(0).unwrap(), AigEdge::new(3, true));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn merge_detaches_fanin_backrefs() {
        let src = "aag 4 2 0 1 2\n2\n4\n8\n6 2 4\n8 6 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        // Gate 4 reads gates 3 and 1. After merging 4 away, neither may
        // still list 4 as a fanout.
        aig.merge(4, 0, Some(false)).unwrap();
        assert!(aig.node(3).unwrap().fanouts().iter().all(|e| e.id != 4));
        assert!(aig.node(1).unwrap().fanouts().iter().all(|e| e.id != 4));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn merge_into_own_fanin() {
        // Gate 4 = gate 3 & PI 1; merge 4 into its own fanin 3.
        let src = "aag 4 2 0 1 2\n2\n4\n8\n6 2 4\n8 6 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        aig.merge(4, 3, Some(false)).unwrap();
        let po = aig.get_outputs()[0];
        assert_eq!(aig.node(po).unwrap().fanin(0).unwrap(), AigEdge::new(3, false));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn remove_detached_input_updates_lists() {
        // PI 2 drives nothing; removing it must shrink the input list.
        let src = "aag 3 2 0 1 1\n2\n4\n6\n6 2 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        aig.remove_node(2).unwrap();
        assert_eq!(aig.get_inputs(), &[1]);
        assert!(aig.get_node(2).is_none());
        aig.check_integrity().unwrap();
    }

    #[test]
    fn remove_live_gate_is_an_error() {
        let mut aig = Aig::from_str(AND2).unwrap();
        assert!(aig.remove_node(3).is_err());
        assert!(aig.remove_node(0).is_err());
        assert!(matches!(
            aig.remove_node(42),
            Err(AigError::GateDoesNotExist(42))
        ));
    }

    #[test]
    fn floating_and_unused_lists() {
        // Gate 3 reads undefined gate 5; PI 2 drives nothing.
        let src = "aag 5 2 0 1 1\n2\n4\n6\n6 2 10\n";
        let aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.floating_gates(), &[3]);
        assert_eq!(aig.unused_gates(), &[2]);
        assert!(aig.node(5).unwrap().is_undef());
    }
}
