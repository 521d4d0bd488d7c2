#![forbid(unsafe_code)]

//! paysig CLI: sign payment records and verify signed documents.

use clap::{Parser, Subcommand};
use paysig::c14n::C14nMode;
use paysig::crypto::AlgorithmRegistry;
use paysig::Config;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "paysig",
    about = "Enveloped XML signatures for payment records",
    version
)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Private key (PEM), overrides the configuration
    #[arg(short = 'k', long, global = true, env = "PAYSIG_PRIVATE_KEY")]
    key: Option<PathBuf>,

    /// Certificate or public key (PEM), overrides the configuration
    #[arg(long, global = true, env = "PAYSIG_CERTIFICATE")]
    cert: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a JSON payment record
    Sign {
        /// Record file (JSON object)
        record: PathBuf,

        /// Name of the root element
        #[arg(long, default_value = "Payment")]
        root: String,

        /// Reference id placed on the root element
        #[arg(long)]
        id: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a signed document and print the result as JSON
    Verify {
        /// Signed XML file
        file: PathBuf,
    },

    /// Print a document with insignificant whitespace removed
    Normalize {
        /// XML file
        file: PathBuf,
    },

    /// List supported algorithms
    Info,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Paysig(#[from] paysig::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: not a JSON record: {source}", path.display())]
    Record {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode result: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::Paysig(e) => e.code(),
            Self::Io { .. } => "IO_ERROR",
            Self::Record { .. } => "INVALID_RECORD",
            Self::Encode(_) => "OUTPUT_ERROR",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Sign {
            record,
            root,
            id,
            output,
        } => cmd_sign(&cli, record, root, id.as_deref(), output.as_deref()),
        Commands::Verify { file } => cmd_verify(&cli, file),
        Commands::Normalize { file } => cmd_normalize(file),
        Commands::Info => cmd_info(),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error [{}]: {e}", e.code());
            process::exit(2);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Configuration file, then environment, then flags.
fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env();
    if let Some(key) = &cli.key {
        config.credentials.private_key = Some(key.clone());
    }
    if let Some(cert) = &cli.cert {
        config.credentials.certificate = Some(cert.clone());
    }
    Ok(config)
}

fn cmd_sign(
    cli: &Cli,
    record_path: &Path,
    root: &str,
    id: Option<&str>,
    output: Option<&Path>,
) -> Result<bool, CliError> {
    let signer = load_config(cli)?.signer()?;
    let text = read_file(record_path)?;
    let record: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| CliError::Record {
            path: record_path.to_path_buf(),
            source,
        })?;

    tracing::debug!(record = %record_path.display(), "signing");
    let signed = signer.sign(&record, root, id)?;
    write_output(output, signed.as_bytes())?;
    Ok(true)
}

fn cmd_verify(cli: &Cli, file: &Path) -> Result<bool, CliError> {
    let verifier = load_config(cli)?.verifier()?;
    let xml = read_file(file)?;

    tracing::debug!(file = %file.display(), "verifying");
    let result = verifier.verify(&xml)?;
    let mut json = serde_json::to_string_pretty(&result).map_err(CliError::Encode)?;
    json.push('\n');
    write_output(None, json.as_bytes())?;
    Ok(result.is_valid)
}

fn cmd_normalize(file: &Path) -> Result<bool, CliError> {
    let xml = read_file(file)?;
    let mut normalized = paysig::xml::normalize(&xml);
    normalized.push('\n');
    write_output(None, normalized.as_bytes())?;
    Ok(true)
}

fn cmd_info() -> Result<bool, CliError> {
    println!("paysig: enveloped XML signatures for payment records");
    println!();
    println!("Canonicalization:");
    for mode in C14nMode::ALL {
        println!("  {}", mode.uri());
    }
    println!();
    println!("Digest algorithms:");
    for uri in AlgorithmRegistry::digest_uris() {
        println!("  {uri}");
    }
    println!();
    println!("Signature algorithms (RSA PKCS#1 v1.5):");
    for uri in AlgorithmRegistry::signature_uris() {
        println!("  {uri}");
    }
    println!();
    println!("Transforms:");
    println!("  {}", paysig::core::algorithm::ENVELOPED_SIGNATURE);
    println!("  canonicalization URIs above");
    println!();
    println!("Key formats:");
    println!("  PKCS#8 / PKCS#1 private keys, X.509 certificates, SPKI public keys (PEM)");
    Ok(true)
}

// ── Utility functions ────────────────────────────────────────────────

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<(), CliError> {
    match path {
        Some(p) => std::fs::write(p, data).map_err(|source| CliError::Io {
            path: p.to_path_buf(),
            source,
        }),
        None => std::io::stdout()
            .write_all(data)
            .map_err(|source| CliError::Io {
                path: PathBuf::from("<stdout>"),
                source,
            }),
    }
}
