//! `prx`: patient record transcoder CLI.
//!
//! Drives the transcoding engine from the command line: `convert` for a
//! single payload, `batch` for JSON-lines record streams. Logging lives
//! here, at the binary boundary; the engine itself is silent.

use clap::{Parser, Subcommand};
use prx_core::{BatchTranscoder, Record, TranscoderConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "prx")]
#[command(about = "Transcode patient records between FHIR, HL7 v2 and HL7 v3")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcode a single payload
    Convert {
        /// Input format: fhir, hl7 or hl7v3
        #[arg(long = "input-type")]
        input_type: String,
        /// Output format: fhir, hl7 or hl7v3
        #[arg(long = "output-type")]
        output_type: String,
        /// Payload file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Transcode a stream of JSON-lines records
    Batch {
        /// Input format: fhir, hl7 or hl7v3
        #[arg(long = "input-type")]
        input_type: String,
        /// Output format: fhir, hl7 or hl7v3
        #[arg(long = "output-type")]
        output_type: String,
        /// Records file, one JSON object per line (stdin when omitted)
        file: Option<PathBuf>,
    },
}

/// One incoming record on the `batch` wire.
#[derive(Deserialize)]
struct RecordLine {
    #[serde(default)]
    position: String,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    payload: String,
}

/// One outgoing result on the `batch` wire.
#[derive(Serialize)]
struct ResultLine {
    position: String,
    metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("prx=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input_type,
            output_type,
            file,
        } => convert(&input_type, &output_type, file),
        Commands::Batch {
            input_type,
            output_type,
            file,
        } => batch(&input_type, &output_type, file),
    }
}

fn read_input(file: Option<PathBuf>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn convert(input_type: &str, output_type: &str, file: Option<PathBuf>) -> anyhow::Result<()> {
    let config = TranscoderConfig::new(input_type, output_type)?;
    let payload = read_input(file)?;

    let output = config.path().convert(&payload)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

fn batch(input_type: &str, output_type: &str, file: Option<PathBuf>) -> anyhow::Result<()> {
    let config = TranscoderConfig::new(input_type, output_type)?;
    let transcoder = BatchTranscoder::new(config);
    let input = read_input(file)?;

    let mut records = Vec::new();
    let mut envelopes = Vec::new();
    for line in input.as_slice().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: RecordLine = serde_json::from_str(&line)?;
        records.push(Record {
            position: parsed.position.clone().into_bytes(),
            metadata: parsed.metadata.clone(),
            payload: parsed.payload.into_bytes(),
        });
        envelopes.push((parsed.position, parsed.metadata));
    }

    let results = transcoder.process(records);

    let mut stdout = std::io::stdout().lock();
    for ((position, metadata), result) in envelopes.into_iter().zip(results) {
        let line = match result {
            Ok(record) => ResultLine {
                position,
                metadata,
                payload: Some(String::from_utf8_lossy(&record.payload).into_owned()),
                error: None,
            },
            Err(err) => {
                tracing::warn!(position = %position, error = %err, "record failed to transcode");
                ResultLine {
                    position,
                    metadata,
                    payload: None,
                    error: Some(err.to_string()),
                }
            }
        };
        serde_json::to_writer(&mut stdout, &line)?;
        stdout.write_all(b"\n")?;
    }

    Ok(())
}
