use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};

use fraig::{Aig, FraigOptions, Result};

/// AIG optimizer: structural hashing, local rewriting, bit-parallel
/// simulation and SAT-backed functional reduction over ASCII AIGER files.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input circuit (.aag)
    input: PathBuf,

    /// Remove gates unreachable from the outputs
    #[arg(long)]
    sweep: bool,

    /// Rewrite and gates with trivially collapsing fanins
    #[arg(long)]
    optimize: bool,

    /// Merge structurally identical and gates
    #[arg(long)]
    strash: bool,

    /// Random simulation (builds the candidate-equivalence partition)
    #[arg(long)]
    random_sim: bool,

    /// Simulate the patterns in this file instead of random ones
    #[arg(long, value_name = "FILE", conflicts_with = "random_sim")]
    sim_file: Option<PathBuf>,

    /// Log simulated patterns and output responses to this file
    #[arg(long, value_name = "FILE")]
    sim_log: Option<PathBuf>,

    /// Prove and merge the candidate equivalences left by simulation
    #[arg(long)]
    fraig: bool,

    /// SAT counterexamples per fraig round
    #[arg(long, default_value_t = 5)]
    patterns_per_round: usize,

    /// Seed for the random generator (fresh entropy when absent)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the netlist in topological order
    #[arg(long)]
    netlist: bool,

    /// Print the candidate-equivalence groups
    #[arg(long)]
    report_fec: bool,

    /// Print a detailed report on this gate (fanins, fanouts, FEC partners)
    #[arg(long, value_name = "GATE")]
    report_gate: Option<u64>,

    /// Print the fan-in cone of a gate, LEVEL edges deep
    #[arg(long, num_args = 2, value_names = ["GATE", "LEVEL"])]
    report_fanin: Option<Vec<u64>>,

    /// Print the fan-out cone of a gate, LEVEL edges deep
    #[arg(long, num_args = 2, value_names = ["GATE", "LEVEL"])]
    report_fanout: Option<Vec<u64>>,

    /// Write the fan-in cone of this gate as a standalone circuit to stdout
    #[arg(long, value_name = "GATE")]
    write_gate: Option<u64>,

    /// Write the resulting circuit to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn run(args: &Args) -> Result<()> {
    let mut aig = Aig::from_file(&args.input)?;
    let (i, o, a) = aig.summary();
    log::info!("loaded {} ({} PI, {} PO, {} AIG)", args.input.display(), i, o, a);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut sim_log: Option<BufWriter<File>> = match &args.sim_log {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    if args.sweep {
        aig.sweep()?;
    }
    if args.optimize {
        aig.optimize()?;
    }
    if args.strash {
        aig.strash()?;
    }

    let mut simulated = false;
    if let Some(path) = &args.sim_file {
        let patterns = fs::read_to_string(path)?;
        aig.file_sim(&patterns, sim_log.as_mut().map(|w| w as &mut dyn Write))?;
        simulated = true;
    } else if args.random_sim {
        aig.random_sim(&mut rng, sim_log.as_mut().map(|w| w as &mut dyn Write))?;
        simulated = true;
    }

    if args.fraig {
        if !simulated {
            // Fraig consumes the partition a simulation leaves behind.
            aig.random_sim(&mut rng, sim_log.as_mut().map(|w| w as &mut dyn Write))?;
        }
        let opts = FraigOptions {
            patterns_per_round: args.patterns_per_round,
        };
        aig.fraig(&opts, &mut rng, sim_log.as_mut().map(|w| w as &mut dyn Write))?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.netlist {
        aig.write_netlist(&mut out)?;
    }
    if args.report_fec {
        aig.sort_fec_for_report();
        aig.assign_group_refs()?;
        aig.write_fec_pairs(&mut out)?;
    }
    if let Some(gate) = args.report_gate {
        aig.assign_group_refs()?;
        aig.write_gate_report(&mut out, gate)?;
    }
    if let Some(spec) = &args.report_fanin {
        aig.write_fanin_report(&mut out, spec[0], spec[1] as usize)?;
    }
    if let Some(spec) = &args.report_fanout {
        aig.write_fanout_report(&mut out, spec[0], spec[1] as usize)?;
    }
    if let Some(gate) = args.write_gate {
        aig.write_cone(&mut out, gate)?;
    }
    if let Some(path) = &args.output {
        let mut w = BufWriter::new(File::create(path)?);
        aig.write_aag(&mut w)?;
        w.flush()?;
    }

    let (i, o, a) = aig.summary();
    writeln!(out, "PI {} / PO {} / AIG {}", i, o, a)?;
    if !aig.floating_gates().is_empty() {
        writeln!(out, "floating: {:?}", aig.floating_gates())?;
    }
    if !aig.unused_gates().is_empty() {
        writeln!(out, "unused: {:?}", aig.unused_gates())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
