//! Bit-parallel simulation.
//!
//! A 64-bit signature per gate carries 64 independent input assignments at
//! once; the first pattern of a batch sits in the most significant bit.

use std::io::Write;

use log::info;
use rand::Rng;
use thiserror::Error;

use crate::{Aig, Result};

/// Error returned when external simulation-pattern input is malformed.
///
/// Recoverable: the graph is untouched, only the FEC bookkeeping for the
/// aborted run is discarded.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("pattern ({pattern}) length ({got}) does not match the number of inputs ({expected}) in a circuit")]
    PatternLength {
        pattern: String,
        got: usize,
        expected: usize,
    },

    #[error("pattern ({pattern}) contains a non-0/1 character ('{ch}')")]
    PatternChar { pattern: String, ch: char },
}

impl Aig {
    /// Assigns one 64-pattern signature to every PI, in declaration order.
    pub(crate) fn set_input_signatures(&mut self, sigs: &[u64]) -> Result<()> {
        if sigs.len() != self.get_inputs().len() {
            return Err(crate::AigError::InvalidState(format!(
                "{} signatures for {} inputs",
                sigs.len(),
                self.get_inputs().len()
            )));
        }
        for (&id, &sig) in self.get_inputs().to_vec().iter().zip(sigs) {
            self.node_mut(id)?.signature = sig;
        }
        Ok(())
    }

    /// Propagates the PI signatures through the reachable gates.
    ///
    /// Pure forward propagation in topological order: an AND's signature is
    /// the bitwise AND of its phased fanin signatures, a PO copies its phased
    /// fanin, an undefined gate simulates as constant 0 (policy, not an
    /// error). Must run after any structural change invalidates signatures
    /// and before the FEC partition reads them.
    pub fn simulate(&mut self) -> Result<()> {
        self.node_mut(0)?.signature = 0;
        for id in self.topological_order().to_vec() {
            let node = self.node(id)?;
            if node.is_and() {
                let (f0, f1) = (node.fanin(0)?, node.fanin(1)?);
                let w0 = self.node(f0.id)?.signal(f0.complement);
                let w1 = self.node(f1.id)?.signal(f1.complement);
                self.node_mut(id)?.signature = w0 & w1;
            } else if node.is_output() {
                let f0 = node.fanin(0)?;
                let w0 = self.node(f0.id)?.signal(f0.complement);
                self.node_mut(id)?.signature = w0;
            } else if node.is_undef() {
                self.node_mut(id)?.signature = 0;
            }
        }
        Ok(())
    }

    /// Random simulation until the FEC partition stops splitting.
    ///
    /// Runs 64-pattern random batches, refining the partition after each;
    /// stops once `2 * #PIs + 1` consecutive batches produce no new split.
    /// Returns the number of patterns simulated.
    pub fn random_sim(
        &mut self,
        rng: &mut impl Rng,
        mut sim_log: Option<&mut dyn Write>,
    ) -> Result<u64> {
        self.init_fec();
        let n_pis = self.get_inputs().len();
        let mut num = 0u64;
        let mut no_new = 0usize;
        loop {
            let sigs: Vec<u64> = (0..n_pis).map(|_| rng.r#gen()).collect();
            self.set_input_signatures(&sigs)?;
            self.simulate()?;
            num += 64;
            if let Some(log) = sim_log.as_deref_mut() {
                self.write_sim_batch(log, 64)?;
            }
            if !self.identify_fec()? {
                no_new += 1;
            }
            if no_new > n_pis * 2 {
                break;
            }
        }
        info!("{} patterns simulated", num);
        self.sort_fec_for_report();
        Ok(num)
    }

    /// Simulation from externally supplied patterns, one whitespace-separated
    /// string of `0`/`1` per pattern, one character per PI.
    ///
    /// Patterns run in batches of 64 with the final partial batch zero
    /// padded. A malformed pattern aborts the run: prior FEC state is
    /// cleared, the graph is left intact and the error is reported.
    /// Returns the number of patterns simulated.
    pub fn file_sim(
        &mut self,
        patterns: &str,
        mut sim_log: Option<&mut dyn Write>,
    ) -> Result<u64> {
        self.init_fec();
        let n_pis = self.get_inputs().len();
        let mut num = 0u64;
        let mut sigs = vec![0u64; n_pis];
        let mut in_batch = 0usize;

        for pat in patterns.split_whitespace() {
            if pat.len() != n_pis {
                self.groups.clear();
                return Err(SimError::PatternLength {
                    pattern: pat.to_string(),
                    got: pat.len(),
                    expected: n_pis,
                }
                .into());
            }
            for (j, ch) in pat.chars().enumerate() {
                let bit = match ch {
                    '0' => 0u64,
                    '1' => 1u64,
                    _ => {
                        self.groups.clear();
                        return Err(SimError::PatternChar {
                            pattern: pat.to_string(),
                            ch,
                        }
                        .into());
                    }
                };
                sigs[j] |= bit << (63 - in_batch);
            }
            in_batch += 1;
            num += 1;
            if in_batch == 64 {
                self.set_input_signatures(&sigs)?;
                self.simulate()?;
                if let Some(log) = sim_log.as_deref_mut() {
                    self.write_sim_batch(log, 64)?;
                }
                self.identify_fec()?;
                sigs.iter_mut().for_each(|s| *s = 0);
                in_batch = 0;
            }
        }
        if in_batch > 0 {
            self.set_input_signatures(&sigs)?;
            self.simulate()?;
            if let Some(log) = sim_log.as_deref_mut() {
                self.write_sim_batch(log, in_batch)?;
            }
            self.identify_fec()?;
        }

        info!("{} patterns simulated", num);
        self.sort_fec_for_report();
        Ok(num)
    }

    /// Writes `num` lines of `pattern poresponse` for the current batch,
    /// first simulated pattern first (most significant bit).
    pub(crate) fn write_sim_batch(&self, w: &mut dyn Write, num: usize) -> Result<()> {
        for i in (64 - num..64).rev() {
            let mut line = String::new();
            for &id in self.get_inputs() {
                let bit = (self.node(id)?.signal(false) >> i) & 1;
                line.push(if bit == 1 { '1' } else { '0' });
            }
            line.push(' ');
            for &id in self.get_outputs() {
                let bit = (self.node(id)?.signal(false) >> i) & 1;
                line.push(if bit == 1 { '1' } else { '0' });
            }
            writeln!(w, "{}", line)?;
        }
        Ok(())
    }
}
