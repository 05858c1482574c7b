//! Movies CLI - serve the movies API or run its CSV tools offline
//!
//! # Commands
//!
//! ```bash
//! movies serve                        # Start HTTP server (port 3000)
//! movies import movies.csv            # Import a CSV into the seed data, print the report
//! movies export --name the            # Export the seed data as CSV
//! movies validate movies.csv          # Check a CSV without importing it
//! ```

use clap::{Parser, Subcommand};
use movies::{
    check_upload, export_csv, import_csv, import::validate_row, parse_bytes, MovieFilter,
    MovieStore, ServerConfig, UploadLimits, UploadedFile,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "movies")]
#[command(about = "In-memory movies API with CSV import and export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: MOVIES_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Largest accepted CSV upload in bytes
        #[arg(long)]
        max_upload_bytes: Option<usize>,

        /// Reject unknown keys when adding a movie
        #[arg(long)]
        forbid_unknown_fields: bool,

        /// Start without the seed movies
        #[arg(long)]
        empty: bool,
    },

    /// Import a CSV file into the seed data and print the report
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Output file for the JSON report (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the seed data as CSV
    Export {
        /// Keep titles containing this text (case-insensitive)
        #[arg(short, long)]
        name: Option<String>,

        /// Keep movies released in or after this year
        #[arg(long)]
        min_year: Option<i32>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a CSV file without importing it
    Validate {
        /// Input CSV file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            max_upload_bytes,
            forbid_unknown_fields,
            empty,
        } => {
            let mut config = ServerConfig::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(max) = max_upload_bytes {
                config.max_upload_bytes = max;
            }
            config.forbid_unknown_fields |= forbid_unknown_fields;
            if empty {
                config.seed = false;
            }
            cmd_serve(config).await
        }

        Commands::Import { input, output } => cmd_import(&input, output.as_deref()),

        Commands::Export {
            name,
            min_year,
            output,
        } => cmd_export(name, min_year, output.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    movies::server::start_server(config).await
}

fn cmd_import(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let file = read_upload(input)?;
    check_upload(Some(&file), &UploadLimits::default())?;

    let mut store = MovieStore::seeded();
    let report = import_csv(&mut store, &file.bytes)?;

    eprintln!("   {}", report.summary());
    for failed in &report.errors {
        eprintln!("   ❌ Row {}: {}", failed.row, failed.errors.join("; "));
    }

    write_output(&serde_json::to_string_pretty(&report)?, output)
}

fn cmd_export(
    name: Option<String>,
    min_year: Option<i32>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = MovieFilter {
        name: name.filter(|n| !n.trim().is_empty()),
        min_year,
    };
    let store = MovieStore::seeded();
    let csv = export_csv(store.list(), &filter)?;
    eprintln!("📦 Exported {} movies", csv.lines().count().saturating_sub(1));
    write_output(&csv, output)
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let file = read_upload(input)?;
    check_upload(Some(&file), &UploadLimits::default())?;
    let parsed = parse_bytes(&file.bytes)?;
    eprintln!("   Encoding: {}", parsed.encoding);

    let mut valid = 0;
    let mut invalid = 0;
    for row in &parsed.rows {
        match validate_row(row) {
            Ok(_) => valid += 1,
            Err(errors) => {
                invalid += 1;
                eprintln!("\n❌ Row {} invalid:", row.row);
                for err in errors {
                    eprintln!("   - {}", err);
                }
            }
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Load a file from disk the way the HTTP import receives it.
fn read_upload(path: &Path) -> Result<UploadedFile, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadedFile::new(file_name, bytes))
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
