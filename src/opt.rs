//! Local optimization: dead-gate sweeping and trivial-pattern rewriting.

use log::debug;

use crate::aig::{Aig, AigEdge, writer::pretty_edge};
use crate::{NodeId, Result};

impl Aig {
    /// Removes every gate not reached by the last topological pass.
    ///
    /// PIs and the constant gate are kept even when nothing reads them. Dead
    /// gates have no reachable consumer by definition, so they are dropped
    /// directly rather than merged; back-reference lists are rebuilt
    /// wholesale afterwards. The topological order itself is untouched (dead
    /// gates were not part of it).
    pub fn sweep(&mut self) -> Result<usize> {
        let dead: Vec<NodeId> = self
            .iter_nodes()
            .filter(|n| n.topo_index().is_none() && !n.is_input() && !n.is_const0())
            .map(|n| n.id())
            .collect();

        for &id in &dead {
            debug!("sweeping: {} removed", id);
            self.drop_node(id);
        }
        if !dead.is_empty() {
            self.rebuild_fanouts()?;
            self.rebuild_floating();
            self.rebuild_unused();
            self.prune_groups();
        }
        Ok(dead.len())
    }

    /// Rewrites every reachable AND gate whose fanins trivially collapse.
    ///
    /// The four cases, complete for a 2-input AND with a constant or
    /// repeated input:
    ///
    /// | fanins | result |
    /// |---|---|
    /// | `x & x` | `x` |
    /// | `x & !x` | constant 0 |
    /// | `x & 0` | constant 0 |
    /// | `x & 1` | `x` |
    ///
    /// Gates are visited in topological order so a collapse propagates to
    /// its consumers within the same pass.
    pub fn optimize(&mut self) -> Result<usize> {
        let mut merged = 0usize;

        for id in self.topological_order().to_vec() {
            let Some(node) = self.get_node(id) else {
                continue;
            };
            if !node.is_and() {
                continue;
            }
            let (f0, f1) = (node.fanin(0)?, node.fanin(1)?);

            let target = if f0.is_cst_true() {
                Some(f1)
            } else if f1.is_cst_true() {
                Some(f0)
            } else if f0.is_cst_false() || f1.is_cst_false() {
                Some(AigEdge::new(0, false))
            } else if f0 == f1 {
                Some(f0)
            } else if f0.is_complement_of(&f1) {
                Some(AigEdge::new(0, false))
            } else {
                None
            };

            if let Some(edge) = target {
                debug!("simplifying: {} merging {}", pretty_edge(edge), id);
                self.merge(id, edge.id, Some(edge.complement))?;
                merged += 1;
            }
        }

        if merged > 0 {
            self.refresh_lists()?;
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, AigEdge};

    #[test]
    fn sweep_removes_unreached_gates() {
        // Gates 4 and 5 feed nothing reachable; PI 2 stays although unused.
        let src = "aag 5 2 0 1 3\n2\n4\n6\n6 2 2\n8 2 4\n10 8 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.sweep().unwrap(), 2);
        assert_eq!(aig.summary(), (2, 1, 1));
        assert!(aig.get_node(4).is_none());
        assert!(aig.get_node(5).is_none());
        assert_eq!(aig.unused_gates(), &[2]);
        aig.check_integrity().unwrap();
        // Nothing left to sweep.
        assert_eq!(aig.sweep().unwrap(), 0);
    }

    #[test]
    fn sweep_removes_unreached_undefs() {
        // Gate 4 reads undefined gate 5; both unreachable from the output.
        let src = "aag 5 2 0 1 2\n2\n4\n6\n6 2 4\n8 10 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.sweep().unwrap(), 2);
        assert!(aig.get_node(5).is_none());
        assert!(aig.floating_gates().is_empty());
        aig.check_integrity().unwrap();
    }

    #[test]
    fn optimize_identical_fanins() {
        // Gate 3 = 1 & 1 collapses to PI 1.
        let src = "aag 3 1 0 1 1\n2\n6\n6 2 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.optimize().unwrap(), 1);
        let po = aig.get_outputs()[0];
        assert_eq!(
            aig.node(po).unwrap().fanin(0).unwrap(),
            AigEdge::new(1, false)
        );
        aig.check_integrity().unwrap();
    }

    #[test]
    fn optimize_inverted_fanins_to_const() {
        // Gate 3 = 1 & !1 is constant 0; PO0 reads it directly, PO1 inverted.
        let src = "aag 3 1 0 2 1\n2\n6\n7\n6 2 3\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.optimize().unwrap(), 1);
        let po0 = aig.get_outputs()[0];
        let po1 = aig.get_outputs()[1];
        assert_eq!(
            aig.node(po0).unwrap().fanin(0).unwrap(),
            AigEdge::new(0, false)
        );
        assert_eq!(
            aig.node(po1).unwrap().fanin(0).unwrap(),
            AigEdge::new(0, true)
        );
        aig.check_integrity().unwrap();

        // Exhaustive over the single PI: PO0 is all-zero on every pattern.
        aig.set_input_signatures(&[0b10]).unwrap();
        aig.simulate().unwrap();
        assert_eq!(aig.node(po0).unwrap().signal(false), 0);
        assert_eq!(aig.node(po1).unwrap().signal(false), !0u64);
    }

    #[test]
    fn optimize_constant_fanins() {
        // Gate 3 = 1 & const1 keeps PI 1; gate 4 = 2 & const0 dies.
        let src = "aag 4 2 0 2 2\n2\n4\n6\n8\n6 2 1\n8 4 0\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.optimize().unwrap(), 2);
        let po0 = aig.get_outputs()[0];
        let po1 = aig.get_outputs()[1];
        assert_eq!(
            aig.node(po0).unwrap().fanin(0).unwrap(),
            AigEdge::new(1, false)
        );
        assert_eq!(
            aig.node(po1).unwrap().fanin(0).unwrap(),
            AigEdge::new(0, false)
        );
        aig.check_integrity().unwrap();
    }

    #[test]
    fn optimize_cascades() {
        // Gate 3 = 1 & !1 -> const0; gate 4 = 3 & 2 then sees a constant
        // fanin and dies in the same pass.
        let src = "aag 4 2 0 1 2\n2\n4\n8\n6 2 3\n8 6 4\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.optimize().unwrap(), 2);
        assert_eq!(aig.summary(), (2, 1, 0));
        let po = aig.get_outputs()[0];
        assert_eq!(
            aig.node(po).unwrap().fanin(0).unwrap(),
            AigEdge::new(0, false)
        );
        // Fixed point: nothing more to simplify.
        assert_eq!(aig.optimize().unwrap(), 0);
        aig.check_integrity().unwrap();
    }
}
