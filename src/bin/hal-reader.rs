//! HAL Reader CLI
//!
//! Command-line interface for inspecting HAL+JSON documents.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hal_reader::{read_response_auto, HalResource, JsonLoader, LoadError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hal-reader")]
#[command(about = "Decompose HAL+JSON documents into links, properties and embedded resources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decomposed resource as JSON
    Inspect {
        /// Document source: file path or URL (http:// or https://)
        source: String,

        /// Load UUID, RFC 3339 date-time and URL strings as typed values
        #[arg(long)]
        typed_strings: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List links, one per line: relation, href and title separated by tabs
    Links {
        /// Document source: file path or URL (http:// or https://)
        source: String,

        /// Only list links for this relation
        #[arg(long)]
        rel: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            source,
            typed_strings,
            pretty,
            output,
        } => run_inspect(&source, typed_strings, pretty, output),

        Commands::Links { source, rel } => run_links(&source, rel.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn load_resource(source: &str, typed_strings: bool) -> Result<HalResource, u8> {
    let body = read_response_auto(source).map_err(report)?;

    let mut resource = HalResource::new(JsonLoader::new().detect_typed_strings(typed_strings));
    resource.load(&body).map_err(report)?;
    Ok(resource)
}

fn report(e: LoadError) -> u8 {
    eprintln!("Error: {}", e);
    e.exit_code() as u8
}

fn run_inspect(
    source: &str,
    typed_strings: bool,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    let resource = load_resource(source, typed_strings)?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&resource)
    } else {
        serde_json::to_string(&resource)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_links(source: &str, rel: Option<&str>) -> Result<(), u8> {
    let resource = load_resource(source, false)?;

    let selected = resource
        .links()
        .iter()
        .filter(|(relation, _)| rel.map_or(true, |r| r == relation.as_str()));

    for (relation, links) in selected {
        for link in links {
            match link.title() {
                Some(title) => println!("{}\t{}\t{}", relation, link.href(), title),
                None => println!("{}\t{}", relation, link.href()),
            }
        }
    }

    Ok(())
}
