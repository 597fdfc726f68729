use std::path::PathBuf;

use calcdesk::core::Calculator;
use calcdesk::games::{Crossword, Difficulty, JsonFileStore, MemoryStore, PuzzleLibrary, StatsStore};
use calcdesk::{Error, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calcdesk")]
#[command(about = "Everyday finance and health calculators plus a finance crossword")]
struct Cli {
    /// Where crossword statistics are kept
    #[arg(long, env = "CALCDESK_STATS_FILE", default_value = "calcdesk-stats.json")]
    stats_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web page and JSON API
    Serve {
        #[arg(short, long, env = "CALCDESK_PORT", default_value_t = 8080)]
        port: u16,

        /// Keep stats in memory only
        #[arg(long)]
        no_persist: bool,
    },

    /// Evaluate one calculator and print the result as JSON
    Calc {
        /// Calculator slug, e.g. "sip" or "debt-to-income"
        calculator: String,

        /// Input record as JSON; missing fields use defaults
        #[arg(short, long)]
        input: Option<String>,
    },

    /// List calculator slugs
    List,

    /// Print an empty crossword grid with its clues
    Crossword {
        #[arg(default_value = "easy")]
        difficulty: String,
    },

    /// Show lifetime crossword statistics
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("calcdesk=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { port, no_persist } => {
            let store: Box<dyn StatsStore> = if no_persist {
                Box::new(MemoryStore::default())
            } else {
                tracing::info!(path = %cli.stats_file.display(), "crossword stats file");
                Box::new(JsonFileStore::new(&cli.stats_file))
            };
            calcdesk::api::run_http_server(port, store)
                .await
                .map_err(Error::Server)?;
        }

        Commands::Calc { calculator, input } => {
            let calculator: Calculator = calculator.parse()?;
            let payload = match input {
                Some(json) => serde_json::from_str(&json)
                    .map_err(|e| Error::invalid_payload("--input", e))?,
                None => serde_json::Value::Object(Default::default()),
            };
            let result = calculator.evaluate_json(payload)?;
            let pretty = serde_json::to_string_pretty(&result)
                .map_err(|e| Error::invalid_payload("result", e))?;
            println!("{pretty}");
        }

        Commands::List => {
            for calculator in Calculator::ALL {
                println!("{:<18} {}", calculator.slug(), calculator.title());
            }
        }

        Commands::Crossword { difficulty } => {
            let difficulty: Difficulty = difficulty.parse()?;
            let library = PuzzleLibrary::builtin()?;
            let game = Crossword::new(library.get(difficulty));
            println!("{} ({difficulty})\n", game.puzzle().title());
            print!("{}", game.render());
        }

        Commands::Stats => {
            let stats = JsonFileStore::new(&cli.stats_file).load()?;
            println!("Completed puzzles: {}", stats.completed);
            println!("Words solved:      {}", stats.total_words);
            match stats.best_time {
                Some(best) => println!("Best time:         {}", clock(best)),
                None => println!("Best time:         -"),
            }
            if let Some(average) = stats.average_time() {
                println!("Average time:      {}", clock(average.round() as u64));
            }
            for (difficulty, count) in &stats.by_difficulty {
                println!("  {:<8} {count}", difficulty.as_str());
            }
        }
    }
    Ok(())
}

fn clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
