use super::{AigEdge, AigError, Result};

/// A node id.
///
/// The constant-zero gate has id 0 by convention. Ids are unique among live
/// gates and are never reused for a different logical node.
pub type NodeId = u64;

/// The kind of an AIG node.
///
/// Behavior differences between kinds are small table lookups (fanin arity,
/// print format), so a tagged kind on a common node struct is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// The constant low/false signal (id 0).
    Const0,
    /// A primary input.
    Input,
    /// A primary output (one fanin, no fanouts).
    Output,
    /// An AND gate with two fanins.
    And,
    /// A placeholder standing in for a referenced-but-undefined id.
    /// It has no fanins and simulates as constant 0.
    Undef,
}

impl GateKind {
    /// Number of fanin slots for this kind.
    pub fn fanin_arity(self) -> usize {
        match self {
            GateKind::Const0 | GateKind::Input | GateKind::Undef => 0,
            GateKind::Output => 1,
            GateKind::And => 2,
        }
    }

    pub fn type_str(self) -> &'static str {
        match self {
            GateKind::Const0 => "CONST",
            GateKind::Input => "PI",
            GateKind::Output => "PO",
            GateKind::And => "AIG",
            GateKind::Undef => "UNDEF",
        }
    }
}

/// An AIG node.
///
/// Nodes live in the [`Aig`] arena and refer to each other by id through
/// [`AigEdge`]s. `fanouts` are observational back-references only: they are
/// never an ownership relation, and the arena rebuilds them wholesale when a
/// sweep invalidates them.
///
/// [`Aig`]: crate::Aig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AigNode {
    id: NodeId,
    kind: GateKind,
    /// Fanin slots, length fixed by the kind's arity.
    fanins: Vec<AigEdge>,
    /// Back-references: one `(consumer id, phase)` entry per fanin slot of
    /// a consumer refering to this node.
    pub(crate) fanouts: Vec<AigEdge>,
    /// Optional display name (PIs and POs only).
    symbol: Option<String>,
    /// 64-bit simulation value for the non-inverted phase.
    pub(crate) signature: u64,
    /// Position in the last output-driven topological pass, or `None` if the
    /// gate was not reached by it.
    pub(crate) topo_index: Option<usize>,
    /// Back-reference to the FEC group containing this gate, assigned lazily
    /// for reporting. `None` means "known distinct".
    pub(crate) group: Option<usize>,
}

impl AigNode {
    pub(crate) fn new(id: NodeId, kind: GateKind) -> Result<Self> {
        if id == 0 && kind != GateKind::Const0 {
            return Err(AigError::IdZeroButNotConst);
        }
        if id != 0 && kind == GateKind::Const0 {
            return Err(AigError::InvalidState(format!(
                "constant-zero gate must have id 0, got {}",
                id
            )));
        }
        // Fanin slots start out pointing at the constant gate and are linked
        // to their real targets by the loader.
        let fanins = vec![AigEdge::new(0, false); kind.fanin_arity()];
        Ok(AigNode {
            id,
            kind,
            fanins,
            fanouts: Vec::new(),
            symbol: None,
            signature: 0,
            topo_index: None,
            group: None,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn is_const0(&self) -> bool {
        self.kind == GateKind::Const0
    }

    pub fn is_input(&self) -> bool {
        self.kind == GateKind::Input
    }

    pub fn is_output(&self) -> bool {
        self.kind == GateKind::Output
    }

    pub fn is_and(&self) -> bool {
        self.kind == GateKind::And
    }

    pub fn is_undef(&self) -> bool {
        self.kind == GateKind::Undef
    }

    pub fn fanins(&self) -> &[AigEdge] {
        &self.fanins
    }

    pub fn fanin(&self, slot: usize) -> Result<AigEdge> {
        self.fanins
            .get(slot)
            .copied()
            .ok_or(AigError::InvalidFaninSlot(self.id, slot))
    }

    pub fn fanouts(&self) -> &[AigEdge] {
        &self.fanouts
    }

    pub(crate) fn set_fanin(&mut self, slot: usize, edge: AigEdge) -> Result<()> {
        if slot >= self.fanins.len() {
            return Err(AigError::InvalidFaninSlot(self.id, slot));
        }
        self.fanins[slot] = edge;
        Ok(())
    }

    /// Rewrites the first fanin slot matching `(old_id, old_phase)`.
    /// Exactly one slot per fanout entry: a consumer using the deleted gate
    /// on both slots is redirected one slot at a time.
    pub(crate) fn redirect_fanin(
        &mut self,
        old_id: NodeId,
        old_phase: bool,
        edge: AigEdge,
    ) -> Result<()> {
        let old = AigEdge::new(old_id, old_phase);
        for slot in self.fanins.iter_mut() {
            if *slot == old {
                *slot = edge;
                return Ok(());
            }
        }
        Err(AigError::InvalidState(format!(
            "gate {} has no fanin ({}, {})",
            self.id, old_id, old_phase
        )))
    }

    pub(crate) fn add_fanout(&mut self, consumer: NodeId, complement: bool) {
        self.fanouts.push(AigEdge::new(consumer, complement));
    }

    /// Deletes all fanout entries refering to `consumer`
    /// (used when a fanin edge is retired).
    pub(crate) fn remove_fanout(&mut self, consumer: NodeId) {
        self.fanouts.retain(|e| e.id != consumer);
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn set_symbol(&mut self, name: String) {
        self.symbol = Some(name);
    }

    /// The simulation value of this gate at the given phase.
    /// Phase 1 is the bitwise complement of the stored signature.
    pub fn signal(&self, phase: bool) -> u64 {
        if phase {
            !self.signature
        } else {
            self.signature
        }
    }

    /// Position in the last topological pass, or `None` if unreached.
    pub fn topo_index(&self) -> Option<usize> {
        self.topo_index
    }

    /// Index of the FEC group containing this gate, or `None` when the gate
    /// is known distinct from everything else.
    pub fn group(&self) -> Option<usize> {
        self.group
    }
}
