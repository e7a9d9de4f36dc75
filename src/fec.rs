//! Functional-equivalence-class (FEC) bookkeeping.
//!
//! A group is a set of signed gate references conjectured equivalent by
//! simulation: members carry a phase relative to the group's first member,
//! which is always kept at phase 0. Only the constant gate and AND gates are
//! candidates. Groups of size one are never materialized.

use std::collections::HashMap;

use crate::{Aig, AigEdge, Result};

/// One candidate-equivalence group, members phased relative to the first.
pub type FecGroup = Vec<AigEdge>;

impl Aig {
    /// Resets the partition to a single "all possibly equivalent" group:
    /// the constant gate plus every reachable AND gate, phase 0.
    pub fn init_fec(&mut self) {
        let mut group: FecGroup = vec![AigEdge::new(0, false)];
        for &id in self.topological_order() {
            if self.get_node(id).map(|n| n.is_and()).unwrap_or(false) {
                group.push(AigEdge::new(id, false));
            }
        }
        self.groups = vec![group];
    }

    /// Refines the partition against the current signatures.
    ///
    /// Each group is bucketed by raw (phase 0) signature; a member whose
    /// complemented signature matches an existing bucket joins it with phase
    /// 1 relative to the bucket's representative. Buckets of size one are
    /// dropped. Returns whether anything changed (a split, or a member whose
    /// relative phase moved), which callers use to detect convergence.
    pub fn identify_fec(&mut self) -> Result<bool> {
        let mut changed_any = false;
        let mut next: Vec<FecGroup> = Vec::new();

        for group in std::mem::take(&mut self.groups) {
            let mut buckets: HashMap<u64, FecGroup> = HashMap::new();
            let mut order: Vec<u64> = Vec::new();
            let mut changed = false;
            for member in &group {
                let sig = self.node(member.id)?.signal(false);
                if let Some(bucket) = buckets.get_mut(&sig) {
                    bucket.push(AigEdge::new(member.id, false));
                    changed |= member.complement;
                } else if let Some(bucket) = buckets.get_mut(&!sig) {
                    bucket.push(AigEdge::new(member.id, true));
                    changed |= !member.complement;
                } else {
                    // A bucket's representative is always phase 0.
                    buckets.insert(sig, vec![AigEdge::new(member.id, false)]);
                    changed |= member.complement;
                    order.push(sig);
                }
            }
            if changed || buckets.len() > 1 {
                changed_any = true;
                for key in order {
                    // unwrap is fine, every recorded key has a bucket
                    let bucket = buckets.remove(&key).unwrap();
                    if bucket.len() > 1 {
                        next.push(bucket);
                    }
                }
            } else {
                next.push(group);
            }
        }

        self.groups = next;
        Ok(changed_any)
    }

    /// Drops members whose gate no longer exists or was not reached by the
    /// current topological pass, then groups that fall to size one.
    pub fn prune_groups(&mut self) {
        let mut kept = Vec::new();
        for mut group in std::mem::take(&mut self.groups) {
            group.retain(|m| {
                self.get_node(m.id)
                    .map(|n| n.topo_index().is_some())
                    .unwrap_or(false)
            });
            if group.len() > 1 {
                normalize(&mut group);
                kept.push(group);
            }
        }
        self.groups = kept;
    }

    /// Orders members by topological index and groups by (size, first id),
    /// the pair-proving schedule of the fraig driver.
    ///
    /// A member outside the current topological order (the constant gate
    /// when nothing reads it) sorts first.
    pub fn sort_fec_for_fraig(&mut self) -> Result<()> {
        let mut keyed: Vec<(usize, FecGroup)> = Vec::new();
        for mut group in std::mem::take(&mut self.groups) {
            if group.len() <= 1 {
                continue;
            }
            let mut order: Vec<(usize, AigEdge)> = Vec::with_capacity(group.len());
            for member in group.drain(..) {
                let topo = self.node(member.id)?.topo_index().unwrap_or(0);
                order.push((topo, member));
            }
            order.sort_by_key(|&(topo, _)| topo);
            let mut group: FecGroup = order.into_iter().map(|(_, m)| m).collect();
            normalize(&mut group);
            keyed.push((group.len(), group));
        }
        keyed.sort_by_key(|(len, group)| (*len, group.first().map(|m| m.id).unwrap_or(0)));
        self.groups = keyed.into_iter().map(|(_, g)| g).collect();
        Ok(())
    }

    /// Orders members by literal and groups by first-member id, the stable
    /// order used by reports.
    pub fn sort_fec_for_report(&mut self) {
        self.groups.retain(|g| g.len() > 1);
        for group in &mut self.groups {
            group.sort();
            normalize(group);
        }
        self.groups
            .sort_by_key(|g| g.first().map(|m| m.id).unwrap_or(0));
    }

    /// The current groups.
    pub fn fec_groups(&self) -> &[FecGroup] {
        &self.groups
    }

    /// Writes the group back-reference on every member gate (and clears it
    /// everywhere else) so per-gate reports can name their FEC partners.
    pub fn assign_group_refs(&mut self) -> Result<()> {
        let assignments: Vec<(u64, usize)> = self
            .groups
            .iter()
            .enumerate()
            .flat_map(|(gi, g)| g.iter().map(move |m| (m.id, gi)))
            .collect();
        for node in self.iter_nodes_mut() {
            node.group = None;
        }
        for (id, gi) in assignments {
            self.node_mut(id)?.group = Some(gi);
        }
        Ok(())
    }
}

/// Flips every phase when the first member carries phase 1, so the
/// representative is always in phase 0. Phases are relative, flipping the
/// whole group preserves meaning.
fn normalize(group: &mut FecGroup) {
    if group.first().map(|m| m.complement).unwrap_or(false) {
        for member in group.iter_mut() {
            member.complement = !member.complement;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Aig;

    // Gate 3 = a & b, gate 4 = !3 & !3 (the complement of gate 3),
    // gate 5 = b & a (equal to gate 3), outputs on 4 and 5.
    const SRC: &str = "aag 5 2 0 2 3\n2\n4\n8\n10\n6 2 4\n8 7 7\n10 4 2\n";

    fn simulated(patterns: &[u64; 2]) -> Aig {
        let mut aig = Aig::from_str(SRC).unwrap();
        aig.set_input_signatures(patterns).unwrap();
        aig.simulate().unwrap();
        aig
    }

    #[test]
    fn init_covers_const_and_reachable_ands() {
        let aig = {
            let mut aig = Aig::from_str(SRC).unwrap();
            aig.init_fec();
            aig
        };
        let group = &aig.fec_groups()[0];
        let mut ids: Vec<u64> = group.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 3, 4, 5]);
        assert!(group.iter().all(|m| !m.complement));
    }

    #[test]
    fn identify_splits_and_phases() {
        let mut aig = simulated(&[0b1100, 0b1010]);
        aig.init_fec();
        assert!(aig.identify_fec().unwrap());
        aig.sort_fec_for_report();

        // The constant is distinguished from everything; gates 3 and 5 agree
        // in phase, gate 4 joins them complemented.
        assert_eq!(aig.fec_groups().len(), 1);
        let group = &aig.fec_groups()[0];
        assert_eq!(
            group.as_slice(),
            &[
                AigEdge::new(3, false),
                AigEdge::new(4, true),
                AigEdge::new(5, false)
            ]
        );

        // A second refinement with the same signatures is a no-op.
        assert!(!aig.identify_fec().unwrap());
    }

    #[test]
    fn all_zero_signatures_keep_const_grouped() {
        let mut aig = simulated(&[0, 0]);
        aig.init_fec();
        // a = b = 0: gates 3 and 5 are 0, gate 4 is all ones.
        assert!(aig.identify_fec().unwrap());
        aig.sort_fec_for_report();
        let group = &aig.fec_groups()[0];
        assert_eq!(
            group.as_slice(),
            &[
                AigEdge::new(0, false),
                AigEdge::new(3, false),
                AigEdge::new(4, true),
                AigEdge::new(5, false)
            ]
        );
    }

    #[test]
    fn prune_drops_dead_members_and_small_groups() {
        let mut aig = simulated(&[0b1100, 0b1010]);
        aig.init_fec();
        aig.identify_fec().unwrap();
        // Merge gate 5 away; the group keeps 3 and 4.
        aig.merge(5, 3, None).unwrap();
        aig.rebuild_topo().unwrap();
        aig.prune_groups();
        assert_eq!(aig.fec_groups().len(), 1);
        assert_eq!(aig.fec_groups()[0].len(), 2);

        // Merging gate 4 too leaves a singleton, dropped entirely.
        aig.merge(4, 3, Some(true)).unwrap();
        aig.rebuild_topo().unwrap();
        aig.prune_groups();
        assert!(aig.fec_groups().is_empty());
    }

    #[test]
    fn group_refs_follow_membership() {
        let mut aig = simulated(&[0b1100, 0b1010]);
        aig.init_fec();
        aig.identify_fec().unwrap();
        aig.assign_group_refs().unwrap();
        assert_eq!(aig.node(3).unwrap().group(), aig.node(4).unwrap().group());
        assert!(aig.node(3).unwrap().group().is_some());
        assert_eq!(aig.node(1).unwrap().group(), None);
    }
}
