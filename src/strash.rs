//! Structural hashing: merges AND gates with identical fanin pairs.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::aig::{Aig, writer::pretty_edge};
use crate::{NodeId, Result};

impl Aig {
    /// One structural-hashing pass over the live AND gates.
    ///
    /// Gates are visited fanins-first; each gate is keyed by its two fanin
    /// literals ordered larger-first, so the two commuted orderings of the
    /// same pair hash identically. A gate whose key was already seen is
    /// merged into the earlier gate with no phase adjustment (the key only
    /// pairs structurally identical nodes, never complemented ones).
    ///
    /// The walk covers gates outside the output cone too, seeded in
    /// increasing id order, so of two identical gates the earlier-defined
    /// one survives even when only the later one drives an output.
    ///
    /// Visiting fanins before consumers makes the pass cascade: once two
    /// gates merge, their consumers' keys collide in the same sweep. Running
    /// it twice in a row never merges anything the second time.
    pub fn strash(&mut self) -> Result<usize> {
        let mut seen: HashMap<(u64, u64), u64> = HashMap::new();
        let mut merged = 0usize;

        for id in self.strash_order()? {
            let Some(node) = self.get_node(id) else {
                continue;
            };
            if !node.is_and() {
                continue;
            }
            let (f0, f1) = (node.fanin(0)?, node.fanin(1)?);
            let key = if f0.literal() >= f1.literal() {
                (f0.literal(), f1.literal())
            } else {
                (f1.literal(), f0.literal())
            };
            match seen.get(&key) {
                None => {
                    seen.insert(key, id);
                }
                Some(&earlier) => {
                    debug!(
                        "strashing: {} merging {} (fanins {} {})",
                        earlier,
                        id,
                        pretty_edge(f0),
                        pretty_edge(f1)
                    );
                    self.merge(id, earlier, None)?;
                    merged += 1;
                }
            }
        }

        if merged > 0 {
            self.refresh_lists()?;
        }
        Ok(merged)
    }

    /// Fanins-before-consumers order over every live gate, not just the
    /// output cone. Post-order DFS seeded from each id in increasing order.
    fn strash_order(&self) -> Result<Vec<NodeId>> {
        let mut sort: Vec<NodeId> = Vec::new();
        let mut done: HashSet<NodeId> = HashSet::new();
        let roots: Vec<NodeId> = self.iter_nodes().map(|n| n.id()).collect();
        for root in roots {
            let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
            while let Some((id, last_time)) = stack.pop() {
                if last_time {
                    sort.push(id);
                    continue;
                }
                if !done.insert(id) {
                    continue;
                }
                stack.push((id, true));
                for fanin in self.node(id)?.fanins() {
                    if !done.contains(&fanin.id) {
                        stack.push((fanin.id, false));
                    }
                }
            }
        }
        Ok(sort)
    }
}

#[cfg(test)]
mod test {
    use crate::Aig;

    #[test]
    fn commuted_pair_merges() {
        // Gate 3 = 1 & 2, gate 4 = 2 & 1, output on gate 4 only. Gate 3 is
        // outside the output cone but earlier-defined: it must survive, with
        // the output redirected onto it.
        let src = "aag 4 2 0 1 2\n2\n4\n8\n6 2 4\n8 4 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.strash().unwrap(), 1);
        assert_eq!(aig.summary(), (2, 1, 1));
        assert!(aig.get_node(4).is_none());
        // The output now reads gate 3, same phase.
        let po = aig.get_outputs()[0];
        let fanin = aig.node(po).unwrap().fanin(0).unwrap();
        assert_eq!((fanin.id, fanin.complement), (3, false));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn duplicate_outside_output_cone_merges_too() {
        // Gate 4 = 2 & 1 duplicates gate 3 but drives nothing reachable.
        let src = "aag 4 2 0 1 2\n2\n4\n6\n6 2 4\n8 4 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.strash().unwrap(), 1);
        assert!(aig.get_node(4).is_none());
        assert_eq!(aig.summary(), (2, 1, 1));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn complemented_pair_does_not_merge() {
        // Gate 4 reads !1 where gate 3 reads 1: different functions.
        let src = "aag 4 2 0 2 2\n2\n4\n6\n8\n6 2 4\n8 3 4\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.strash().unwrap(), 0);
        assert_eq!(aig.summary(), (2, 2, 2));
    }

    #[test]
    fn merges_cascade_through_consumers() {
        // 3 = 1&2, 4 = 2&1, 5 = 3&1, 6 = 4&1. After 4 -> 3, gates 5 and 6
        // become structurally identical and merge in the same pass.
        let src = "aag 6 2 0 2 4\n2\n4\n10\n12\n6 2 4\n8 4 2\n10 6 2\n12 8 2\n";
        let mut aig = Aig::from_str(src).unwrap();
        assert_eq!(aig.strash().unwrap(), 2);
        assert_eq!(aig.summary(), (2, 2, 2));
        assert_eq!(aig.strash().unwrap(), 0);
        aig.check_integrity().unwrap();
    }
}
