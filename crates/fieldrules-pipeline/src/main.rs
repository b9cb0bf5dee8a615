//! fieldrules
//!
//! Runs the client export job through the rule engine, checks rule
//! configurations, and applies rules to single values.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fieldrules_core::FieldValue;
use fieldrules_engine::{FileRuleSource, RuleEngine, RuleSet};
use fieldrules_pipeline::{
    BatchJob, ClientRuleProcessor, CsvSink, JsonLinesSource, LogFormat, PipelineConfig,
};
use fieldrules_telemetry::RuleMetrics;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "fieldrules")]
#[command(about = "Field-level transformation and validation rules for batch exports", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FIELDRULES_CONFIG", default_value = "fieldrules.yaml")]
    config: PathBuf,

    /// Rule configuration, overrides `rules_path`
    #[arg(short, long, env = "FIELDRULES_RULES")]
    rules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process client rows into CSV
    Run {
        /// Newline-delimited JSON input, overrides `input_path`
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// CSV output, overrides `output_path`
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Records per chunk, overrides `chunk_size`
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Write rule metrics in Prometheus text format when the job ends
        #[arg(long)]
        prometheus_out: Option<PathBuf>,
    },

    /// Load the rules and list them per field
    Check,

    /// Apply the rules for one field to one value
    Apply {
        /// Field name
        field: String,

        /// Value; omit to apply to null
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(rules) = &cli.rules {
        config.rules_path = rules.clone();
    }

    init_tracing(cli.verbose, config.log_format);

    match cli.command {
        Command::Run {
            input,
            output,
            chunk_size,
            prometheus_out,
        } => {
            if let Some(input) = input {
                config.input_path = Some(input);
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            run(config, prometheus_out).await
        }
        Command::Check => check(&config),
        Command::Apply { field, value } => {
            let engine = RuleEngine::new(FileRuleSource::new(&config.rules_path));
            let value = value.map_or(FieldValue::Null, FieldValue::from);
            match engine.apply_rules(&field, value) {
                Some(result) => println!("{}", result),
                None => println!("null"),
            }
            Ok(())
        }
    }
}

async fn run(config: PipelineConfig, prometheus_out: Option<PathBuf>) -> Result<()> {
    let input = config
        .input_path
        .clone()
        .context("No input file; set input_path or pass --input")?;

    let metrics = match &prometheus_out {
        Some(_) => Some(init_metrics()?),
        None => None,
    };

    info!(rules = %config.rules_path.display(), "Starting fieldrules job");
    let engine = Arc::new(RuleEngine::new(FileRuleSource::new(&config.rules_path)));
    let job = BatchJob::new(ClientRuleProcessor::new(Arc::clone(&engine)), config.chunk_size)?;

    let stop = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(Arc::clone(&stop));
    #[cfg(unix)]
    spawn_reload_on_hangup(Arc::clone(&engine))?;

    let output = config.output_path.clone();
    let report = tokio::task::spawn_blocking(move || {
        let mut source = JsonLinesSource::open(&input)?;
        let mut sink = CsvSink::create(&output)?;
        job.run(&mut source, &mut sink, &stop)
    })
    .await
    .context("Job task panicked")??;

    println!("{}", serde_json::to_string(&report)?);

    if let (Some(path), Some(handle)) = (prometheus_out, metrics) {
        std::fs::write(&path, handle.render())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Metrics written");
    }

    let mut rule_metrics: Vec<RuleMetrics> = engine.rule_metrics().into_values().collect();
    rule_metrics.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
    for metrics in rule_metrics {
        info!(
            rule = %metrics.rule_id,
            executions = metrics.execution_count,
            avg_us = metrics.average_execution_time_us,
            "Rule metrics"
        );
    }

    Ok(())
}

fn check(config: &PipelineConfig) -> Result<()> {
    let source = FileRuleSource::new(&config.rules_path);
    let rule_set = RuleSet::load(&source)
        .with_context(|| format!("Failed to load {}", config.rules_path.display()))?;

    println!("{} rules from {}", rule_set.len(), config.rules_path.display());

    let mut fields: Vec<&str> = rule_set.fields().collect();
    fields.sort_unstable();
    for field in fields {
        println!("{}:", field);
        for rule in rule_set.rules_for_field(field) {
            println!("  {:>5}  {:<10} {}", rule.priority, rule.kind(), rule.id);
        }
    }

    let disabled: Vec<&str> = rule_set
        .rules()
        .iter()
        .filter(|rule| !rule.enabled)
        .map(|rule| rule.id.as_str())
        .collect();
    if !disabled.is_empty() {
        println!("disabled: {}", disabled.join(", "));
    }

    Ok(())
}

/// Stop the job between chunks on Ctrl-C
fn spawn_interrupt_handler(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping after the current chunk");
                stop.store(true, Ordering::SeqCst);
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });
}

/// Reload the rules on every SIGHUP
#[cfg(unix)]
fn spawn_reload_on_hangup(engine: Arc<RuleEngine>) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup =
        signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading rules");
            let engine = Arc::clone(&engine);
            match tokio::task::spawn_blocking(move || engine.reload_rules()).await {
                Ok(Ok(summary)) => info!(rules = summary.current, "Reload complete"),
                // already logged by the engine
                Ok(Err(_)) => {}
                Err(e) => error!(error = %e, "Reload task failed"),
            }
        }
    });

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("fieldrules=debug")
    } else {
        EnvFilter::try_from_env("FIELDRULES_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("fieldrules=info"))
    };

    let json = format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .init();
}

/// Install the Prometheus recorder that rule metrics are forwarded to
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "fieldrules_rule_executions_total",
        "Rule executions by rule id"
    );
    metrics::describe_histogram!(
        "fieldrules_rule_latency_us",
        metrics::Unit::Microseconds,
        "Rule execution latency in microseconds by rule id"
    );

    Ok(handle)
}
