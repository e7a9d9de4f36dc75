use std::collections::HashMap;

use crate::{Aig, AigEdge, AigError, NodeId, Result};

impl Aig {
    /// Checking if the AIG structure is correct.
    /// This function was written for debug purposes, as the library is supposed to maintain
    /// integrity of the AIG at any moment. It verifies:
    /// - ids match arena slots, and only the constant-zero gate has id 0;
    /// - every gate carries exactly the fanin arity of its kind;
    /// - every fanin edge refers to a live gate;
    /// - the fanin and fanout relations are mutually consistent (each fanout
    ///   entry `(g, p)` on `t` matches one fanin slot `(t, p)` of `g`, and
    ///   vice versa, counted with multiplicity);
    /// - the input/output lists agree with gate kinds;
    /// - the graph is acyclic.
    pub fn check_integrity(&self) -> Result<()> {
        for node in self.iter_nodes() {
            let id = node.id();
            if (id == 0) != node.is_const0() {
                return Err(AigError::InvalidState(format!(
                    "gate {} is {} at the constant slot",
                    id,
                    node.kind().type_str()
                )));
            }
            if node.fanins().len() != node.kind().fanin_arity() {
                return Err(AigError::InvalidState(format!(
                    "gate {} has {} fanins, its kind takes {}",
                    id,
                    node.fanins().len(),
                    node.kind().fanin_arity()
                )));
            }
            for fanin in node.fanins() {
                self.node(fanin.id).map_err(|_| {
                    AigError::InvalidState(format!(
                        "gate {} has a fanin edge to {} which is not in the AIG anymore",
                        id, fanin.id
                    ))
                })?;
            }
            if node.is_output() && !node.fanouts().is_empty() {
                return Err(AigError::InvalidState(format!(
                    "output gate {} has fanouts",
                    id
                )));
            }
        }

        self.check_backrefs()?;

        for &id in self.get_inputs() {
            if !self.node(id)?.is_input() {
                return Err(AigError::InvalidState(format!(
                    "gate {} is on the input list but is not an input",
                    id
                )));
            }
        }
        for &id in self.get_outputs() {
            if !self.node(id)?.is_output() {
                return Err(AigError::InvalidState(format!(
                    "gate {} is on the output list but is not an output",
                    id
                )));
            }
        }

        // Checks for acyclicity (non-mutating twin of the topological pass).
        let mut seen = std::collections::HashSet::new();
        let mut done = std::collections::HashSet::new();
        for &root in self.get_outputs() {
            let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
            while let Some((id, last_time)) = stack.pop() {
                if last_time {
                    done.insert(id);
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

        Ok(())
    }

    /// Fanin/fanout mutual consistency, both directions with multiplicity.
    fn check_backrefs(&self) -> Result<()> {
        let mut from_fanins: HashMap<(NodeId, AigEdge), usize> = HashMap::new();
        let mut from_fanouts: HashMap<(NodeId, AigEdge), usize> = HashMap::new();

        for node in self.iter_nodes() {
            for &fanin in node.fanins() {
                *from_fanins
                    .entry((fanin.id, AigEdge::new(node.id(), fanin.complement)))
                    .or_insert(0) += 1;
            }
            for &out in node.fanouts() {
                *from_fanouts.entry((node.id(), out)).or_insert(0) += 1;
            }
        }

        if from_fanins != from_fanouts {
            return Err(AigError::InvalidState(
                "fanin and fanout relations disagree".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::Aig;

    #[test]
    fn fresh_load_passes() {
        let src = "aag 5 2 0 1 2\n2\n4\n10\n6 2 4\n10 6 2\n";
        let aig = Aig::from_str(src).unwrap();
        aig.check_integrity().unwrap();
    }

    #[test]
    fn dangling_fanout_is_caught() {
        let src = "aag 3 2 0 1 1\n2\n4\n6\n6 2 4\n";
        let mut aig = Aig::from_str(src).unwrap();
        aig.node_mut(1).unwrap().add_fanout(3, true);
        assert!(aig.check_integrity().is_err());
    }

    #[test]
    fn input_list_mismatch_is_caught() {
        let src = "aag 3 2 0 1 1\n2\n4\n6\n6 2 4\n";
        let mut aig = Aig::from_str(src).unwrap();
        // An and gate on the input list.
        aig.inputs.push(3);
        assert!(aig.check_integrity().is_err());
    }
}
