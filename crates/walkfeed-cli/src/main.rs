use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use walkfeed_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "walkfeed", version, about = "Walk to feed your virtual pet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pet's current state as JSON
    Status,
    /// Apply decay ticks by hand
    Tick {
        /// Number of ticks to apply
        #[arg(long, default_value = "1")]
        count: u64,
        /// Decay per tick (defaults to economy.decay_per_tick)
        #[arg(long)]
        amount: Option<f64>,
    },
    /// Step readings
    Steps {
        #[command(subcommand)]
        action: commands::steps::StepsAction,
    },
    /// Spend hunger points on a catalog item
    Feed {
        /// Item name, e.g. "apple"
        item: String,
    },
    /// List the food catalog
    Catalog,
    /// Bring a dead pet back (starts onboarding over)
    Reset,
    /// Pet onboarding
    Pet {
        #[command(subcommand)]
        action: commands::pet::PetAction,
    },
    /// Step statistics and goals
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run a live session reading commands from stdin
    Run {
        /// Also print every decay tick
        #[arg(long)]
        verbose: bool,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let level = Config::load_or_default().logging.level;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Status => commands::status::status(),
        Commands::Tick { count, amount } => commands::status::tick(count, amount),
        Commands::Steps { action } => commands::steps::run(action),
        Commands::Feed { item } => commands::feed::feed(&item),
        Commands::Catalog => commands::feed::catalog(),
        Commands::Reset => commands::feed::reset(),
        Commands::Pet { action } => commands::pet::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Run { verbose } => commands::run::run(verbose),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "walkfeed", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
