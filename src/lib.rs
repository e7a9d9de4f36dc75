//! Functionally reduced And-Inverter Graphs.
//!
//! Load a combinational circuit from an ASCII AIGER file, then collapse it
//! with [`Aig::strash`], [`Aig::sweep`], [`Aig::optimize`] and the
//! simulation/SAT pipeline of [`Aig::random_sim`] and [`Aig::fraig`].
//!
//! ```rust
//! use fraig::{Aig, FraigOptions};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! // Two outputs computing the same function through different structure.
//! let src = "aag 4 2 0 2 2\n2\n4\n6\n8\n6 2 4\n8 6 2\n";
//! let mut aig = Aig::from_str(src).unwrap();
//! let mut rng = StdRng::seed_from_u64(0);
//! aig.random_sim(&mut rng, None).unwrap();
//! aig.fraig(&FraigOptions::default(), &mut rng, None).unwrap();
//! assert_eq!(aig.summary().2, 1);
//! ```

pub mod aig;
pub mod fec;
pub mod fraig;
pub mod sat;
pub mod sim;

mod opt;
mod strash;

// Re-exporting symbols and modules.
pub use aig::{Aig, AigEdge, AigError, AigNode, GateKind, NodeId, ParserError, Result};
pub use fec::FecGroup;
pub use fraig::FraigOptions;
pub use sim::SimError;
