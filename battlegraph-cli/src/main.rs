mod config;
mod input;
mod output;
mod simulate;

use battlegraph_core::{ChooserKind, Session};
use clap::Parser;
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::input::{Choice, first_duplicate, parse_choice, parse_items_from_str};

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "battlegraph", version, about = "Order items by choosing the better one of each pair")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run an interactive tournament; answers are read from stdin
    Battle(BattleArgs),
    /// Measure how many decisions each chooser needs against a hidden order
    Simulate(SimulateArgs),
    /// Create a default config file at ~/.config/battlegraph/config.toml
    Init,
}

#[derive(Parser)]
struct BattleArgs {
    /// File with one item per line, or a JSON array of strings
    #[arg(long)]
    items: Option<PathBuf>,

    /// Inline item (repeatable)
    #[arg(long = "item")]
    inline_items: Vec<String>,

    /// Pair selection strategy
    #[arg(long)]
    chooser: Option<ChooserKind>,

    /// Seed for randomized choosers
    #[arg(long)]
    seed: Option<u64>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    /// Log closure updates and selection timing to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/battlegraph/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Number of items in each simulated tournament
    #[arg(short = 'n', long, default_value_t = 30)]
    item_count: usize,

    /// Chooser to simulate (repeatable; default: all)
    #[arg(long = "chooser")]
    choosers: Vec<ChooserKind>,

    /// Tournaments per chooser
    #[arg(long)]
    trials: Option<usize>,

    /// Base seed; trial t uses seed + t
    #[arg(long)]
    seed: Option<u64>,

    /// Tournaments run in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    /// Log per-chooser progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/battlegraph/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Route `tracing` output to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load items from the --items file and --item flags.
fn load_items(args: &BattleArgs) -> Vec<String> {
    let mut items = Vec::new();

    if let Some(ref path) = args.items {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| bail(format!("Failed to read items file {}: {e}", path.display())));
        items = parse_items_from_str(&content);
    }

    items.extend(args.inline_items.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));

    if items.len() < 2 {
        bail(format!("Need at least 2 items to compare, got {}. Use --items <file> or --item <name>.", items.len()));
    }
    if let Some(dup) = first_duplicate(&items) {
        bail(format!("Item \"{dup}\" is listed more than once"));
    }
    items
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Battle(args) => {
            init_logging(args.verbose);
            run_battle(args);
        }
        Commands::Simulate(args) => {
            init_logging(args.verbose);
            run_simulate(args).await;
        }
        Commands::Init => {
            let path = config::write_template();
            println!("Created config at {}", path.display());
            println!("Edit it to set your default chooser, seed, etc.");
        }
    }
}

fn run_battle(args: BattleArgs) {
    let settings = Settings::resolve(
        args.config.as_deref(),
        Settings { chooser: args.chooser, seed: args.seed, ..Settings::default() },
    );
    let kind = settings.chooser();
    let items = load_items(&args);

    let mut session = Session::new(items, kind.build(settings.seed)).unwrap_or_else(|e| bail(e));

    eprintln!(
        "Comparing {} items ({} pairs) with the {} chooser. Answer 1 or 2, q to stop.",
        session.registry().count(),
        session.remaining_count(),
        kind,
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'battle: loop {
        let (first, second) = match session.select_next() {
            Ok(pair) => pair,
            Err(e) if e.is_finished() => break,
            Err(e) => bail(e),
        };

        loop {
            eprint!("[{} left] 1) {}   2) {}  > ", session.remaining_count(), first, second);
            let _ = io::stderr().flush();

            let line = match lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => bail(format!("Failed to read from stdin: {e}")),
                None => {
                    eprintln!("\nInput closed, stopping early.");
                    break 'battle;
                }
            };

            let (winner, loser) = match parse_choice(&line) {
                Choice::First => (&first, &second),
                Choice::Second => (&second, &first),
                Choice::Quit => break 'battle,
                Choice::Invalid => {
                    eprintln!("Please answer 1, 2 or q.");
                    continue;
                }
            };

            match session.record_decision(winner, loser) {
                Ok(_) => {}
                Err(e) if e.is_cycle() => {
                    eprintln!("Warning: this choice conflicts with an earlier one and was ignored.");
                }
                Err(e) => bail(e),
            }
            break;
        }
    }

    let standings = session.standings();
    if args.json {
        output::print_json(&standings, session.decisions(), session.remaining_count());
    } else {
        output::print_table(&standings, session.decisions(), session.remaining_count());
    }
}

async fn run_simulate(args: SimulateArgs) {
    if args.item_count < 2 {
        bail(format!("Need at least 2 items to simulate, got {}", args.item_count));
    }

    let settings = Settings::resolve(
        args.config.as_deref(),
        Settings { seed: args.seed, trials: args.trials, concurrency: args.concurrency, chooser: None },
    );

    let kinds: Vec<ChooserKind> = if args.choosers.is_empty() {
        ChooserKind::ALL.to_vec()
    } else {
        args.choosers.clone()
    };
    let trials = settings.trials();
    if trials == 0 {
        bail("--trials must be at least 1");
    }
    let seed = settings.seed.unwrap_or_else(|| rand::rng().random());

    tracing::info!(items = args.item_count, trials, seed, "starting simulation");

    let reports = simulate::run_simulation(&kinds, args.item_count, trials, seed, settings.concurrency()).await;

    if args.json {
        output::print_simulation_json(&reports);
    } else {
        output::print_simulation_table(&reports, args.item_count, trials);
    }
}
