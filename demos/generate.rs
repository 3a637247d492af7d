use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use xeger_rs::config::{CompileOptions, MinimizationAlgorithm};
use xeger_rs::Xeger;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    Hopcroft,
    Brzozowski,
    Huffman,
}

impl From<Algorithm> for MinimizationAlgorithm {
    fn from(a: Algorithm) -> Self {
        match a {
            Algorithm::Hopcroft => MinimizationAlgorithm::Hopcroft,
            Algorithm::Brzozowski => MinimizationAlgorithm::Brzozowski,
            Algorithm::Huffman => MinimizationAlgorithm::Huffman,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Regular expression to generate strings for.
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// Number of strings to generate.
    #[arg(short, long, value_name = "INT", default_value = "10")]
    count: usize,

    /// Random seed.
    #[arg(long, value_name = "INT", default_value = "42")]
    seed: u64,

    /// Minimization algorithm.
    #[arg(long, value_enum, default_value = "hopcroft")]
    algorithm: Algorithm,

    /// Print the automaton in DOT format instead of generating strings.
    #[arg(long)]
    dot: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    let args = Cli::parse();
    info!("args = {:?}", args);

    let options = CompileOptions::default().with_minimization(args.algorithm.into());
    let xeger = Xeger::with_options(&args.pattern, &options)?;
    let a = xeger.automaton();
    info!(
        "compiled '{}' into {} states and {} transitions in {:.3} s",
        xeger.pattern(),
        a.number_of_states(),
        a.number_of_transitions(),
        time_total.elapsed().as_secs_f64()
    );

    if args.dot {
        print!("{}", a.to_dot()?);
        return Ok(());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    for _ in 0..args.count {
        println!("{}", xeger.generate(&mut rng)?);
    }

    info!("All done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
