use std::path::PathBuf;

use clap::{Parser, Subcommand};
use seatgrid_core::SeatgridConfig;
use seatgrid_state::TermStore;

mod commands;

use commands::Format;

const DEFAULT_LOG_FILTER: &str = "warn,seatgrid=info,seatgrid_alloc=info,seatgrid_state=info";

#[derive(Parser)]
#[command(
    name = "seatgrid",
    about = "SeatGrid — preference-based course seat assignment",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(short, long, global = true, default_value = "seatgrid.toml")]
    config: PathBuf,
    /// Term store path. Overrides SEATGRID_DB and [store].path.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a term dataset (TOML: [term], [[courses]], [[selections]])
    Import {
        /// Dataset file
        file: PathBuf,
    },
    /// Submit a student's choice for one rank
    Select {
        term: String,
        user: String,
        course: String,
        /// Preference rank, 1 to 3
        rank: u32,
    },
    /// Assign students of a term to courses and store the result.
    ///
    /// Students are visited in a shuffled order; each takes their best-ranked
    /// course with a free seat. The shuffle seed is printed so a run can be
    /// repeated with --seed.
    Optimize {
        term: String,
        /// Fixed shuffle seed (overrides [allocation].seed)
        #[arg(long)]
        seed: Option<u64>,
        /// Compute and report without replacing stored assignments
        #[arg(long)]
        dry_run: bool,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
    /// List stored assignments of a term
    Assignments {
        term: String,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Show requests against capacity for each course of a term
    Demand {
        term: String,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = SeatgridConfig::load_or_default(&cli.config)?.with_env_overrides();
    if let Some(db) = cli.db {
        config.store.path = db;
    }

    // RUST_LOG, when set, replaces the defaults; [logging].filter adds to either.
    let mut filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER)?,
    };
    if let Some(extra) = &config.logging.filter {
        filter = filter.add_directive(extra.parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = TermStore::open(&config.store.path)?;

    match cli.command {
        Commands::Import { file } => commands::import::import(&store, &file),
        Commands::Select {
            term,
            user,
            course,
            rank,
        } => commands::select::select(&store, &term, &user, &course, rank),
        Commands::Optimize {
            term,
            seed,
            dry_run,
            format,
        } => {
            let opts = commands::optimize::OptimizeOptions {
                seed: seed.or(config.allocation.seed),
                strict: config.allocation.strict,
                dry_run,
                format,
            };
            commands::optimize::optimize(&store, &term, &opts)
        }
        Commands::Assignments { term, format } => {
            commands::assignments::list(&store, &term, format)
        }
        Commands::Demand { term, format } => commands::demand::show(&store, &term, format),
    }
}
