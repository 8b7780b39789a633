use anyhow::{bail, Context};
use clap::Parser;
use reprint_fetch::logging::{self, LogFormat};
use reprint_fetch::{input, Config, ConfigOverrides, Orchestrator, PdbjClient, PdbjQuery, Pmid};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "reprint-fetch")]
#[command(version, about = "Fetch PDF reprints for PubMed identifiers")]
struct Args {
    /// Comma separated PMIDs
    #[arg(long, value_name = "LIST")]
    pmids: Option<String>,

    /// File with one PMID per line, or a CSV with a `pmid` column
    #[arg(long, value_name = "FILE")]
    pmids_file: Option<PathBuf>,

    /// Take the PMIDs of PDB primary citations from PDBj
    #[arg(long)]
    pdbj: bool,

    /// Earliest deposition date for --pdbj (YYYY-MM-DD)
    #[arg(long, requires = "pdbj")]
    min_date: Option<String>,

    /// Latest deposition date for --pdbj (YYYY-MM-DD)
    #[arg(long, requires = "pdbj")]
    max_date: Option<String>,

    /// Reuse the cached PDBj result when present
    #[arg(long, requires = "pdbj")]
    use_cache: bool,

    /// Output directory for reprints
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// File receiving the PMIDs that could not be fetched
    #[arg(short, long)]
    errors: Option<PathBuf>,

    /// Attempts per PMID on transient network errors
    #[arg(long)]
    max_tries: Option<u32>,

    /// PMIDs processed at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Also run the rarely needed publisher finders
    #[arg(long)]
    extended_finders: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_directory: self.out.clone(),
            errors_file: self.errors.clone(),
            max_tries: self.max_tries,
            concurrency: self.concurrency,
            request_timeout_secs: self.timeout_secs,
            user_agent: None,
            extended_finders: self.extended_finders.then_some(true),
            verbose: self.verbose.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    config
        .apply_overrides(&args.overrides())
        .context("Invalid command line options")?;
    logging::init(config.verbose, args.log_format);

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let pmids = collect_pmids(&args, &config).await?;
    if pmids.is_empty() {
        warn!("No PMIDs to fetch");
    }

    let orchestrator =
        Orchestrator::from_config(&config).context("Failed to create HTTP client")?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with the reprints fetched so far");
            signal_token.cancel();
        }
    });

    let report = orchestrator.run(&pmids, shutdown).await;

    let errors_file = &config.download.errors_file;
    report
        .write_errors_file(errors_file)
        .await
        .with_context(|| format!("Failed to write {}", errors_file.display()))?;
    info!(
        "{} unfetched PMIDs written to {}",
        report.failed_count(),
        errors_file.display()
    );

    Ok(())
}

async fn collect_pmids(args: &Args, config: &Config) -> anyhow::Result<Vec<Pmid>> {
    if args.pmids.is_none() && args.pmids_file.is_none() && !args.pdbj {
        bail!("Nothing to fetch: pass --pmids, --pmids-file or --pdbj");
    }

    let mut pmids = Vec::new();
    if let Some(list) = &args.pmids {
        pmids.extend(input::parse_pmid_list(list));
    }
    if let Some(path) = &args.pmids_file {
        pmids.extend(
            input::read_pmids_file(path)
                .with_context(|| format!("Failed to read PMIDs from {}", path.display()))?,
        );
    }
    if args.pdbj {
        let query = PdbjQuery::new(args.min_date.as_deref(), args.max_date.as_deref())?;
        let client = PdbjClient::new(&config.pdbj, &config.http)?;
        let file = client
            .fetch_pmids(&query, args.use_cache)
            .await
            .context("PDBj query failed")?;
        pmids.extend(input::read_pmids_file(&file)?);
    }

    let pmids = input::dedup(pmids);
    info!("{} PMIDs to fetch", pmids.len());
    Ok(pmids)
}
