//! SAT-backed functional reduction.
//!
//! The driver alternates two phases over the FEC partition produced by
//! simulation: PROVE walks candidate pairs and asks the SAT engine whether
//! each is truly equivalent, merging on UNSAT; REFINE folds the SAT
//! counterexamples back in as fresh simulation patterns and resplits. The
//! loop ends when a full PROVE sweep resolves every remaining pair.

use std::io::Write;

use log::{debug, info};
use rand::Rng;
use varisat::Lit;

use crate::aig::writer::pretty_edge;
use crate::sat::SatSolver;
use crate::{Aig, AigError, Result};

/// Tuning knobs for [`Aig::fraig`].
#[derive(Debug, Clone, Copy)]
pub struct FraigOptions {
    /// SAT counterexamples collected before a PROVE sweep stops early and
    /// goes back to simulation. Clamped to `1..=64`.
    pub patterns_per_round: usize,
}

impl Default for FraigOptions {
    fn default() -> Self {
        FraigOptions {
            patterns_per_round: 5,
        }
    }
}

impl Aig {
    /// Collapses the FEC partition into one representative per proven class.
    ///
    /// Operates on the groups left by a prior [`Aig::random_sim`] or
    /// [`Aig::file_sim`]; with no groups it is a no-op. On return every
    /// surviving pair of gates is proven distinct, merges are applied, and
    /// the FEC bookkeeping is left consistent for reporting.
    pub fn fraig(
        &mut self,
        opts: &FraigOptions,
        rng: &mut impl Rng,
        mut sim_log: Option<&mut dyn Write>,
    ) -> Result<()> {
        let cap = opts.patterns_per_round.clamp(1, 64);
        let mut sat = SatSolver::new();
        let vars = self.gen_proof_model(&mut sat)?;
        let pis = self.get_inputs().to_vec();

        self.sort_fec_for_fraig()?;
        let mut patterns: Vec<u64> = vec![0; pis.len()];
        let mut collected: usize;

        loop {
            // PROVE: walk pairs (j, k) in sorted group order.
            patterns.iter_mut().for_each(|p| *p = 0);
            collected = 0;
            let mut finished = false;
            'sweep: for gi in 0..self.groups.len() {
                let group = self.groups[gi].clone();
                for j in 0..group.len() {
                    for k in j + 1..group.len() {
                        if gi == self.groups.len() - 1
                            && j == group.len() - 2
                            && k == group.len() - 1
                        {
                            finished = true;
                        }
                        let (m0, m1) = (group[j], group[k]);
                        if self.get_node(m0.id).is_none() || self.get_node(m1.id).is_none() {
                            // Merged away earlier in this sweep.
                            continue;
                        }
                        let v0 = proof_var(&vars, m0.id)?;
                        let v1 = proof_var(&vars, m1.id)?;
                        let miter = sat.new_var();
                        sat.add_xor(miter, v0, m0.complement, v1, m1.complement);
                        if sat.solve_assuming(miter)? {
                            // Distinguished: keep the witness as a pattern.
                            for (i, &pi) in pis.iter().enumerate() {
                                let bit = proof_var(&vars, pi).map(|v| sat.value(v))? as u64;
                                patterns[i] = (patterns[i] << 1) | bit;
                            }
                            collected += 1;
                            if collected == cap {
                                break 'sweep;
                            }
                        } else {
                            debug!("fraig: {} merging {}", pretty_edge(m0), pretty_edge(m1));
                            self.merge(m1.id, m0.id, Some(m0.complement != m1.complement))?;
                        }
                    }
                }
            }

            if collected < cap || finished {
                break;
            }

            // REFINE: pad the witnesses to a 64-pattern batch and resplit.
            self.rebuild_topo()?;
            self.prune_groups();
            for sig in patterns.iter_mut() {
                for _ in cap..64 {
                    *sig = (*sig << 1) | rng.r#gen::<bool>() as u64;
                }
            }
            self.set_input_signatures(&patterns)?;
            self.simulate()?;
            if let Some(log) = sim_log.as_deref_mut() {
                self.write_sim_batch(log, cap)?;
            }
            self.identify_fec()?;
            self.sort_fec_for_fraig()?;
        }

        self.refresh_lists()?;

        // Leftover witnesses: one last simulation so the groups reported to
        // the user reflect everything that was learned.
        if collected > 0 {
            for sig in patterns.iter_mut() {
                *sig <<= 64 - collected;
            }
            self.set_input_signatures(&patterns)?;
            self.simulate()?;
            if let Some(log) = sim_log.as_deref_mut() {
                self.write_sim_batch(log, collected)?;
            }
            self.identify_fec()?;
            self.sort_fec_for_report();
        }
        info!("fraig done, {} and gates left", self.summary().2);
        Ok(())
    }

    /// Encodes the whole reachable graph into the solver, once per session.
    ///
    /// The constant gate's variable is forced false and so are undefined
    /// gates' (they simulate as constant 0, the proof model must agree).
    /// Each AND gate is constrained to the phased AND of its fanins; a PO
    /// aliases its fanin's variable.
    fn gen_proof_model(&self, sat: &mut SatSolver) -> Result<Vec<Option<Lit>>> {
        let mut vars: Vec<Option<Lit>> = vec![None; self.max_var() as usize + 1 + self.get_outputs().len() + 1];

        let v0 = sat.new_var();
        sat.add_false(v0);
        vars[0] = Some(v0);
        for &pi in self.get_inputs() {
            vars[pi as usize] = Some(sat.new_var());
        }
        for &id in self.topological_order() {
            let node = self.node(id)?;
            if node.is_and() {
                let (f0, f1) = (node.fanin(0)?, node.fanin(1)?);
                let v = sat.new_var();
                sat.add_and(
                    v,
                    proof_var(&vars, f0.id)?,
                    f0.complement,
                    proof_var(&vars, f1.id)?,
                    f1.complement,
                );
                vars[id as usize] = Some(v);
            } else if node.is_output() {
                vars[id as usize] = vars[node.fanin(0)?.id as usize];
            } else if node.is_undef() {
                let v = sat.new_var();
                sat.add_false(v);
                vars[id as usize] = Some(v);
            }
        }
        Ok(vars)
    }
}

fn proof_var(vars: &[Option<Lit>], id: u64) -> Result<Lit> {
    vars.get(id as usize).copied().flatten().ok_or_else(|| {
        AigError::InvalidState(format!("gate {} has no proof variable", id))
    })
}
