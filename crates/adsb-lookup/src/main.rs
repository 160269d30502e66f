//! `adsb-lookup` - CLI and server for the aircraft lookup API
//!
//! This binary runs the HTTP lookup service and queries it (or the dataset
//! directly) from the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use adsb_lookup::cli::{
    Cli, Command, ConfigCommand, DetailCommand, MetaCommand, OutputFormat, RemoteArgs,
    SearchCommand, ServeCommand,
};
use adsb_lookup::config::DatasetFormat;
use adsb_lookup::server::{self, AppState};
use adsb_lookup::source::open_source;
use adsb_lookup::{
    init_logging, load_with_timeout, AircraftRecord, ApiClient, Cardinality, Config, Dataset,
    DatasetProvider, Detail, RecordSource, Telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity(), cli.log_format.into());

    // Validation reports on the file it is pointed at without loading the
    // default configuration first.
    if let Command::Config(ConfigCommand::Validate { file }) = cli.command {
        return Ok(handle_validate(file.or(cli.config)));
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd).await.map(|()| ExitCode::SUCCESS),
        Command::Search(cmd) => handle_search(&config, &cmd).await,
        Command::Detail(cmd) => handle_detail(&config, &cmd).await,
        Command::Meta(cmd) => handle_meta(&config, &cmd).await.map(|()| ExitCode::SUCCESS),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(path) = cmd.dataset {
        config.dataset.path = path;
        config.dataset.format = DatasetFormat::Auto;
    }
    let addr = config.bind_addr(cmd.bind.as_deref())?;

    let source: Arc<dyn RecordSource> = Arc::from(open_source(&config.dataset));
    let timeout = config.dataset.load_timeout();
    let provider = if config.dataset.reload_per_request {
        info!("Reloading {} on every request", source.describe());
        DatasetProvider::per_request(source, timeout)
    } else {
        DatasetProvider::cached(source, timeout)
            .await
            .context("loading dataset")?
    };

    let telemetry = Telemetry::new(config.telemetry.clone());
    if telemetry.forwards() {
        info!("Forwarding events to Splunk HEC");
    }

    let state = AppState::new(provider, telemetry, &config.server);
    server::serve(state, addr).await?;
    Ok(())
}

/// Load the configured dataset in-process for `--offline` commands.
async fn offline_dataset(config: &Config) -> anyhow::Result<Dataset> {
    let source: Arc<dyn RecordSource> = Arc::from(open_source(&config.dataset));
    let dataset = load_with_timeout(source, config.dataset.load_timeout())
        .await
        .context("loading dataset")?;
    Ok(dataset)
}

fn api_client(config: &Config, remote: &RemoteArgs) -> anyhow::Result<ApiClient> {
    let base = config.api_base(remote.api_base.as_deref())?;
    Ok(ApiClient::new(base, config.client.timeout())?)
}

async fn handle_search(config: &Config, cmd: &SearchCommand) -> anyhow::Result<ExitCode> {
    let query = cmd.query();
    let records = if cmd.remote.offline {
        let dataset = offline_dataset(config).await?;
        let limit = config.server.effective_limit(cmd.limit);
        dataset
            .search(&query)
            .into_iter()
            .take(limit)
            .cloned()
            .collect()
    } else {
        let client = api_client(config, &cmd.remote)?;
        client
            .search(&query, cmd.limit)
            .await
            .with_context(|| format!("searching {}", client.base()))?
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Table => print_table(&records),
        OutputFormat::Plain => {
            for record in &records {
                println!("{}", plain_line(record));
            }
        }
    }

    if records.is_empty() && !matches!(cmd.format, OutputFormat::Json) {
        println!("No aircraft found.");
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_detail(config: &Config, cmd: &DetailCommand) -> anyhow::Result<ExitCode> {
    let query = cmd.query();
    let detail = if cmd.remote.offline {
        offline_dataset(config).await?.detail(&query)
    } else {
        let client = api_client(config, &cmd.remote)?;
        client
            .detail_for(&query)
            .await
            .with_context(|| format!("looking up detail on {}", client.base()))?
    };

    if detail.is_ambiguous() {
        warn!(
            "{} records match; showing the first in dataset order",
            detail.matches
        );
    }

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
        OutputFormat::Plain | OutputFormat::Table => print_detail(&detail),
    }

    Ok(if detail.cardinality == Cardinality::NotFound {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn handle_meta(config: &Config, cmd: &MetaCommand) -> anyhow::Result<()> {
    let (rows, updated, fingerprint, source) = if cmd.remote.offline {
        let dataset = offline_dataset(config).await?;
        (
            dataset.len(),
            dataset.loaded_at().to_rfc3339(),
            Some(dataset.fingerprint().to_string()),
            Some(dataset.source().to_string()),
        )
    } else {
        let client = api_client(config, &cmd.remote)?;
        let meta = client
            .meta()
            .await
            .with_context(|| format!("fetching metadata from {}", client.base()))?;
        (meta.rows, meta.data_last_updated, meta.fingerprint, meta.source)
    };

    if cmd.json {
        let value = serde_json::json!({
            "rows": rows,
            "data_last_updated": updated,
            "fingerprint": fingerprint,
            "source": source,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Rows:          {rows}");
        println!("Last updated:  {updated}");
        if let Some(source) = source {
            println!("Source:        {source}");
        }
        if let Some(fingerprint) = fingerprint {
            println!("Fingerprint:   {fingerprint}");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind:               {}", config.server.bind);
                println!("  Default limit:      {}", config.server.default_limit);
                println!("  Max limit:          {}", config.server.max_limit);
                println!("  CORS any origin:    {}", config.server.cors_allow_any_origin);
                println!();
                println!("[Dataset]");
                println!("  Path:               {}", config.dataset.path.display());
                println!("  Format:             {:?}", config.dataset.resolved_format());
                println!("  Load timeout (ms):  {}", config.dataset.load_timeout_ms);
                println!("  Reload per request: {}", config.dataset.reload_per_request);
                println!();
                println!("[Telemetry]");
                println!("  HEC forwarding:     {}", config.telemetry.hec_enabled());
                println!("  Sourcetype:         {}", config.telemetry.sourcetype);
                println!("  App version:        {}", config.telemetry.app_version);
                println!();
                println!("[Client]");
                println!(
                    "  API base:           {}",
                    config.api_base(None).unwrap_or_else(|e| e.to_string())
                );
                println!("  Timeout (ms):       {}", config.client.timeout_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => return Ok(handle_validate(file)),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_validate(file: Option<std::path::PathBuf>) -> ExitCode {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => {
            println!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Configuration error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn plain_line(record: &AircraftRecord) -> String {
    format!(
        "{} {}",
        record.label(),
        record.tail.as_deref().unwrap_or("-")
    )
}

fn print_table(records: &[AircraftRecord]) {
    if records.is_empty() {
        return;
    }
    println!(
        "{:<10} {:<10} {:<8} {:>10} {:>11} {:>9} {:>8}  {}",
        "CALLSIGN", "TAIL", "ICAO24", "LAT", "LON", "ALT(m)", "VEL(m/s)", "LAST SEEN"
    );
    for record in records {
        let (lat, lon) = record.position.map_or_else(
            || ("-".to_string(), "-".to_string()),
            |p| (format!("{:.4}", p.latitude), format!("{:.4}", p.longitude)),
        );
        println!(
            "{:<10} {:<10} {:<8} {:>10} {:>11} {:>9} {:>8}  {}",
            record.callsign,
            record.tail.as_deref().unwrap_or("-"),
            record.icao24.as_deref().unwrap_or("-"),
            lat,
            lon,
            fmt_number(record.altitude_m),
            fmt_number(record.velocity_ms),
            record.last_seen_utc.as_deref().unwrap_or("-"),
        );
    }
}

fn print_detail(detail: &Detail) {
    let Some(record) = &detail.record else {
        println!("Aircraft not found (it may have left the dataset).");
        return;
    };

    println!("Callsign:    {}", record.callsign);
    println!("Tail:        {}", record.tail.as_deref().unwrap_or("-"));
    println!("ICAO24:      {}", record.icao24.as_deref().unwrap_or("-"));
    match record.position {
        Some(p) => println!("Position:    {:.5}, {:.5}", p.latitude, p.longitude),
        None => println!("Position:    unknown"),
    }
    println!("Altitude:    {} m", fmt_number(record.altitude_m));
    println!("Velocity:    {} m/s", fmt_number(record.velocity_ms));
    println!(
        "Last seen:   {}",
        record.last_seen_utc.as_deref().unwrap_or("-")
    );
    if detail.is_ambiguous() {
        println!("Matches:     {} (showing first)", detail.matches);
    }
}

fn fmt_number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}
