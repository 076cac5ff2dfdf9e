use clap::{Parser, Subcommand};
use lab_core::{check_critical, to_internal_format};
use lab_types::{codes, LabOrder};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lab")]
#[command(about = "HL7 v2 lab message tools (offline)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an ORU^R01 file and print the result as JSON
    Parse {
        /// Path to the HL7 message
        file: PathBuf,
    },
    /// Generate an ORM^O01 message from an order JSON file
    Generate {
        /// Path to the order JSON (camelCase fields)
        order: PathBuf,
        /// Message control id (defaults to a time-based id)
        #[arg(long)]
        control_id: Option<String>,
    },
    /// Check an ORU^R01 file for critical values; exits with status 2 if any are found
    Critical {
        /// Path to the HL7 message
        file: PathBuf,
    },
    /// Print an ORU^R01 file in the internal persistence format
    Internal {
        /// Path to the HL7 message
        file: PathBuf,
    },
    /// List orderable tests with LOINC codes, critical bounds and internal field names
    Catalogue,
}

fn bound(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Header plus one row per catalogued test.
fn catalogue_lines() -> Vec<String> {
    let header = format!(
        "{:<6} {:<28} {:<13} {:<8} {:>8} {:>8}  {}",
        "CODE", "NAME", "CATEGORY", "LOINC", "CRIT_LO", "CRIT_HI", "FIELD"
    );
    let rows = codes::catalogue().iter().map(|test| {
        let threshold = codes::critical_threshold(test.code);
        format!(
            "{:<6} {:<28} {:<13} {:<8} {:>8} {:>8}  {}",
            test.code,
            test.name,
            test.category,
            test.loinc,
            bound(threshold.and_then(|t| t.low)),
            bound(threshold.and_then(|t| t.high)),
            codes::internal_field(test.code).unwrap_or("-"),
        )
    });
    std::iter::once(header).chain(rows).collect()
}

fn read_result(path: &Path) -> Result<lab_types::LabResult, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(hl7::parse_oru_text(&raw)?)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Parse { file }) => {
            let result = read_result(&file)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Some(Commands::Generate { order, control_id }) => {
            let json = std::fs::read_to_string(&order)?;
            let order: LabOrder = serde_json::from_str(&json)?;
            let message = match control_id {
                Some(id) => hl7::generate_orm_with_control_id(&order, &id),
                None => hl7::generate_orm(&order),
            };
            // Segments are CR-terminated on the wire; show one per line.
            for segment in message.split('\r') {
                println!("{segment}");
            }
        }
        Some(Commands::Critical { file }) => {
            let result = read_result(&file)?;
            let report = check_critical(&result);
            println!("{report}");
            if report.has_critical {
                return Ok(ExitCode::from(2));
            }
        }
        Some(Commands::Internal { file }) => {
            let record = to_internal_format(&read_result(&file)?);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Some(Commands::Catalogue) => {
            for line in catalogue_lines() {
                println!("{line}");
            }
        }
        None => {
            println!("Use 'lab --help' for commands");
        }
    }

    Ok(ExitCode::SUCCESS)
}
