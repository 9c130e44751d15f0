//! Salestrend CLI - summarize retail transaction exports
//!
//! # Main Commands
//!
//! ```bash
//! salestrend analyze Customer_Behavior.xlsx             # Full report (text)
//! salestrend analyze sales.csv --min-purchases 20 --json
//! salestrend serve                                      # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! salestrend parse sales.csv       # Loaded records as JSON
//! salestrend cleanse sales.csv     # Records left after cleansing, as JSON
//! salestrend answers               # Conceptual question answers
//! ```

use clap::{Parser, Subcommand};
use salestrend::api::logs::LOG_BROADCASTER;
use salestrend::report::render_answers;
use salestrend::transform::pipeline::{format_delimiter, DEFAULT_MIN_PURCHASES, DEFAULT_TOP_N};
use salestrend::{
    analyze_file, answer_table, cleanse_dataset, load_path, AnalysisOptions, ParsedSource,
    ServerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salestrend")]
#[command(about = "Loyalty, revenue, demand and purchase-pattern summaries from sales exports", long_about = None)]
struct Cli {
    /// Don't echo pipeline logs to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print the report
    Analyze {
        /// Input .csv or .xlsx file
        input: PathBuf,

        /// Minimum purchases for a loyal customer
        #[arg(long, default_value_t = DEFAULT_MIN_PURCHASES, allow_negative_numbers = true)]
        min_purchases: i64,

        /// Number of high-demand products
        #[arg(long, default_value_t = DEFAULT_TOP_N, allow_negative_numbers = true)]
        top_n: i64,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a file and output its records as JSON
    Parse {
        /// Input .csv or .xlsx file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load and cleanse a file, output the kept records as JSON
    Cleanse {
        /// Input .csv or .xlsx file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the conceptual question answers
    Answers,

    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides SALESTREND_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if cli.quiet {
        LOG_BROADCASTER.set_echo(false);
    }

    let result = match cli.command {
        Commands::Analyze {
            input,
            min_purchases,
            top_n,
            json,
            output,
        } => cmd_analyze(
            &input,
            AnalysisOptions {
                min_purchases,
                top_n,
            },
            json,
            output.as_deref(),
        ),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Cleanse { input, output } => cmd_cleanse(&input, output.as_deref()),

        Commands::Answers => cmd_answers(),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_analyze(
    input: &Path,
    options: AnalysisOptions,
    json: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Analyzing: {}", input.display());

    let run = analyze_file(input, &options)?;
    eprintln!(
        "   Rows: {} loaded, {} kept after cleansing",
        run.source.row_count, run.cleanse.kept_rows
    );

    let content = if json {
        serde_json::to_string_pretty(&run.report)?
    } else {
        run.report.render_text()
    };
    write_output(&content, output)?;

    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading: {}", input.display());

    let parsed = load_path(input)?;
    print_source_info(&parsed);

    let json = serde_json::to_string_pretty(&parsed.dataset)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_cleanse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🧹 Cleansing: {}", input.display());

    let parsed = load_path(input)?;
    print_source_info(&parsed);

    let (cleansed, stats) = cleanse_dataset(&parsed.dataset);
    eprintln!("   Kept: {}", stats.kept_rows);
    eprintln!("   Dropped (no CustomerID): {}", stats.missing_customer);
    eprintln!("   Dropped (non-positive Quantity/UnitPrice): {}", stats.non_positive);

    let json = serde_json::to_string_pretty(&cleansed)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_answers() -> Result<(), Box<dyn std::error::Error>> {
    println!("Conceptual Questions Answers:");
    print!("{}", render_answers(&answer_table()));
    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config = config.with_port(port);
    }
    salestrend::server::start_server(config).await?;
    Ok(())
}

fn print_source_info(parsed: &ParsedSource) {
    eprintln!("   Format: {}", parsed.format);
    if let Some(ref encoding) = parsed.encoding {
        eprintln!("   Encoding: {}", encoding);
    }
    if let Some(delimiter) = parsed.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(delimiter));
    }
    eprintln!("   Columns: {}", parsed.headers.join(", "));
    eprintln!("✅ Loaded {} records", parsed.row_count);
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
