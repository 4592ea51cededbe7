use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "studyroom", version, about = "Studyroom CLI")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Subject management
    Subject {
        #[command(subcommand)]
        action: commands::subject::SubjectAction,
    },
    /// Study statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Mark or unmark a day as studied
    Studied {
        /// Day to mark (defaults to today)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        /// Remove the mark instead of setting it
        #[arg(long)]
        clear: bool,
    },
    /// Attach a note to a session
    Note {
        session_id: String,
        text: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Backup and restore
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Subject { action } => commands::subject::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Studied { date, clear } => commands::subject::mark_studied(date, clear),
        Commands::Note { session_id, text } => commands::subject::annotate(&session_id, &text),
        Commands::Config { action } => commands::config::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "studyroom", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
