//! biblio-oai CLI - Inspect and export OpenAIRE records
//!
//! ```bash
//! biblio-oai list                       # OAI identifiers of funded publications
//! biblio-oai record 1234                # One oai_dc record
//! biblio-oai export -o records.xml      # Every record
//! biblio-oai stats                      # Index sizes and access summary (JSON)
//! ```
//!
//! Input location, cache file and domain come from `BIBLIO_*` variables
//! (or `.env`) unless given as flags. Logs go to stderr, `RUST_LOG`
//! controls the level.

use biblio_oai::{
    HttpProber, OfflineProber, Probe, Provider, ProviderConfig, ProviderError, Session,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "biblio-oai")]
#[command(about = "Expose funded bibliography records as OpenAIRE Dublin Core", long_about = None)]
struct Cli {
    /// Directory with the XML exports
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Access decision cache file
    #[arg(short, long, global = true)]
    cache: Option<PathBuf>,

    /// Domain used in OAI identifiers
    #[arg(short, long, global = true)]
    domain: Option<String>,

    /// Never probe URLs over the network
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List OAI identifiers
    List,

    /// Print one oai_dc record
    Record {
        /// OAI identifier or bare publication id
        identifier: String,
    },

    /// Render every record
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show index sizes and the access summary as JSON
    Stats,
}

impl Cli {
    fn config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::from_env();
        if let Some(ref input) = self.input {
            config.input_dir = input.clone();
        }
        if let Some(ref cache) = self.cache {
            config.cache_path = cache.clone();
        }
        if let Some(ref domain) = self.domain {
            config.domain_name = domain.clone();
        }
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    if let Err(e) = run(cli.command, &config, cli.offline) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &ProviderConfig, offline: bool) -> Result<(), Box<dyn std::error::Error>> {
    let prober: Box<dyn Probe> = if offline {
        Box::new(OfflineProber)
    } else {
        Box::new(HttpProber::new(&config.user_agent, config.probe_timeout())?)
    };
    let session = Session::open(config, prober)?;

    match command {
        Commands::List => cmd_list(session),
        Commands::Record { identifier } => cmd_record(session, &identifier),
        Commands::Export { output } => cmd_export(session, output.as_deref()),
        Commands::Stats => cmd_stats(session, config),
    }
}

fn cmd_list(session: Session) -> Result<(), Box<dyn std::error::Error>> {
    let (identifiers, _) = session.run(|provider| Ok::<_, ProviderError>(provider.list_identifiers()))?;
    for id in &identifiers {
        println!("{}", id);
    }
    eprintln!("📋 {} identifiers", identifiers.len());
    Ok(())
}

fn cmd_record(session: Session, identifier: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (record, _) = session.run(|provider| {
        let oai_id = qualify(provider, identifier);
        provider.get_record(&oai_id, "oai_dc")
    })?;

    match record {
        Some(xml) => {
            print!("{}", xml);
            Ok(())
        }
        None => Err(format!("Record {} could not be rendered (see log)", identifier).into()),
    }
}

fn cmd_export(session: Session, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (records, report) = session.run(|provider| {
        let mut records = Vec::new();
        for id in provider.list_identifiers() {
            if let Some(xml) = provider.get_record(&id, "oai_dc")? {
                records.push(xml);
            }
        }
        Ok::<_, ProviderError>(records)
    })?;

    let content = records.concat();
    match output {
        Some(path) => {
            fs::write(path, &content)?;
            eprintln!("💾 Output written to: {}", path.display());
        }
        None => print!("{}", content),
    }

    eprintln!("\n📊 Results: {} rendered, {} dropped", report.rendered, report.dropped);
    eprintln!(
        "   Access: {} cached, {} attachment, {} trusted host, {} probed, {} closed by default",
        report.access.cached,
        report.access.attachment,
        report.access.trusted_host,
        report.access.probe,
        report.access.default_closed
    );
    Ok(())
}

fn cmd_stats(session: Session, config: &ProviderConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (_, report) = session.run(|_| Ok::<_, ProviderError>(()))?;
    let stats = serde_json::json!({
        "input_dir": config.input_dir,
        "cache_path": config.cache_path,
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Accept bare publication ids as well as OAI identifiers.
fn qualify(provider: &Provider, identifier: &str) -> String {
    match provider.local_id(identifier) {
        Some(_) => identifier.to_string(),
        None => provider.make_identifier(identifier),
    }
}
