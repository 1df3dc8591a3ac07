use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use refsync_lib::attachment::AttachmentFetcher;
use refsync_lib::audit;
use refsync_lib::config::Config;
use refsync_lib::library::zotero::ZoteroClient;
use refsync_lib::library::Library;
use refsync_lib::sync::SyncContext;
use refsync_lib::vault::VaultLayout;

#[derive(Parser)]
#[command(name = "refsync", version, about = "Keep a reference vault in step with a Zotero library")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add headers, download PDFs and embed them in reference notes
    Sync(RunArgs),
    /// Report notes with missing or invalid headers without changing anything
    Audit(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Config file (defaults to ./refsync.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vault root directory
    #[arg(long)]
    vault: Option<PathBuf>,

    /// References folder inside the vault
    #[arg(long)]
    references: Option<String>,

    /// JSON export of Zotero items to use instead of the web API
    #[arg(long)]
    library: Option<PathBuf>,
}

impl RunArgs {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::discover(self.config.as_deref())?;
        if let Some(vault) = &self.vault {
            config.vault.path = Some(vault.clone());
        }
        if let Some(references) = &self.references {
            config.vault.references = references.clone();
        }
        if let Some(library) = &self.library {
            config.library.export_path = Some(library.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

/// Stand-in used when only an export is configured: every download fails
/// with a clear message and the run carries on.
struct NoRemoteLibrary;

impl AttachmentFetcher for NoRemoteLibrary {
    fn dump(
        &self,
        _attachment_key: &str,
        _file_name: &str,
        _target_dir: &Path,
    ) -> refsync_lib::Result<PathBuf> {
        Err(refsync_lib::Error::Config(
            "zotero.library_id is not set; cannot download attachments".to_string(),
        ))
    }
}

fn load_library(config: &Config, client: Option<&ZoteroClient>) -> Result<Library> {
    if let Some(path) = &config.library.export_path {
        return Library::load_export(path)
            .with_context(|| format!("loading library export {}", path.display()));
    }
    let client = client.context("no library source configured")?;
    let items = client.fetch_items().context("fetching items from Zotero")?;
    Ok(Library::from_items(&items)?)
}

fn run_sync(args: &RunArgs) -> Result<bool> {
    let config = args.resolve_config()?;
    let layout = VaultLayout::new(
        config.vault.path.as_deref().context("vault.path is not set")?,
        &config.vault.references,
    );

    let client = match &config.zotero.library_id {
        Some(_) => Some(ZoteroClient::from_config(&config.zotero)?),
        None => None,
    };
    let library = load_library(&config, client.as_ref())?;
    log::info!(
        "Library has {} records ({} with citekeys) and {} attachments",
        library.records.len(),
        library.matchable_count(),
        library.attachments.len()
    );

    let md_files = layout.list_notes().context("listing notes")?;
    let known_pdfs = layout.list_pdfs().context("listing PDFs")?;

    let fetcher: &dyn AttachmentFetcher = match &client {
        Some(c) => c,
        None => &NoRemoteLibrary,
    };
    let context = SyncContext::new(&library, fetcher, &layout.references_dir);
    let report = context.process_markdown_files(&md_files, known_pdfs);

    println!("{}", report);
    Ok(report.failed() == 0)
}

fn run_audit(args: &RunArgs) -> Result<bool> {
    let config = args.resolve_config()?;
    let layout = VaultLayout::new(
        config.vault.path.as_deref().context("vault.path is not set")?,
        &config.vault.references,
    );
    let client = match (&config.library.export_path, &config.zotero.library_id) {
        (None, Some(_)) => Some(ZoteroClient::from_config(&config.zotero)?),
        _ => None,
    };
    let library = load_library(&config, client.as_ref())?;
    let md_files = layout.list_notes().context("listing notes")?;

    let findings = audit::audit_notes(&layout.references_dir, &md_files, &library);
    for finding in &findings {
        println!("{}: {}", finding.file_name, finding.issue);
    }
    println!("{} notes checked, {} problems", md_files.len(), findings.len());
    Ok(findings.is_empty())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match &cli.command {
        Command::Sync(args) => run_sync(args),
        Command::Audit(args) => run_audit(args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}
