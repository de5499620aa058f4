use clap::Parser;

use mig_rs::cleanup::cleanup_dangling;
use mig_rs::mig::Mig;
use mig_rs::network::{Network, NetworkMut};
use mig_rs::refactor::{refactor, RefactorParams};
use mig_rs::signal::Signal;
use mig_rs::simulation::simulate;
use mig_rs::window_resub::{window_mig_enumerative_resub, WindowResubParams};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of primary inputs.
    #[arg(long, value_name = "INT", default_value = "10")]
    pis: usize,

    /// Number of random gates to generate.
    #[arg(long, value_name = "INT", default_value = "1000")]
    gates: usize,

    /// Number of primary outputs.
    #[arg(long, value_name = "INT", default_value = "16")]
    pos: usize,

    /// Random seed.
    #[arg(long, value_name = "INT", default_value = "42")]
    seed: u64,

    /// Maximum number of cut leaves.
    #[arg(long, value_name = "INT", default_value = "8")]
    max_pis: usize,

    /// Log every processed node.
    #[arg(long)]
    progress: bool,

    /// Follow refactoring with windowed resubstitution.
    #[arg(long)]
    resub: bool,
}

/// Random network with plenty of absorbable structure (`a & (a & b)` and friends).
fn random_mig(args: &Cli) -> Mig {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut mig = Mig::new();
    let mut pool: Vec<Signal> = (0..args.pis).map(|_| mig.create_pi()).collect();

    for _ in 0..args.gates {
        let pick = |rng: &mut ChaCha8Rng| pool[rng.random_range(0..pool.len())] ^ rng.random_bool(0.3);
        let a = pick(&mut rng);
        let b = pick(&mut rng);
        let c = pick(&mut rng);
        let f = match rng.random_range(0..4) {
            0 => mig.create_maj(a, b, c),
            1 => {
                let g = mig.create_and(a, b);
                mig.create_and(g, a)
            }
            2 => {
                let g = mig.create_or(a, b);
                mig.create_or(b, g)
            }
            _ => mig.create_and(a, b),
        };
        if !f.is_const() {
            pool.push(f);
        }
    }

    for s in pool.iter().rev().take(args.pos) {
        mig.create_po(*s);
    }
    mig
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let mig = cleanup_dangling(&random_mig(&args));
    println!(
        "Generated network: {} PIs, {} POs, {} gates",
        mig.num_pis(),
        mig.num_pos(),
        mig.num_gates()
    );
    let expected = simulate(&mig);

    let mut mig = mig;
    let params = RefactorParams {
        max_pis: args.max_pis,
        progress: args.progress,
        verbose: true,
        ..Default::default()
    };
    let stats = refactor(&mut mig, &params);
    println!(
        "After refactoring: {} gates ({} dead), {} replacements, estimated gain {}",
        mig.num_gates(),
        mig.num_dead(),
        stats.num_replacements,
        stats.estimated_gain
    );

    if args.resub {
        let params = WindowResubParams {
            max_pis: args.max_pis,
            progress: args.progress,
            verbose: true,
            ..Default::default()
        };
        let stats = window_mig_enumerative_resub(&mut mig, &params);
        println!(
            "After resubstitution: {} gates ({} dead), {} replacements, estimated gain {}",
            mig.num_gates(),
            mig.num_dead(),
            stats.num_replacements,
            stats.estimated_gain
        );
    }

    let mig = cleanup_dangling(&mig);
    println!("After cleanup: {} nodes, {} gates", mig.size(), mig.num_gates());

    if simulate(&mig) != expected {
        color_eyre::eyre::bail!("Refactored network is not equivalent to the generated one");
    }
    println!("Equivalence check passed");

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
