// # r53ddns - Route 53 dynamic DNS updater
//
// One-shot command: detect the caller's addresses, compare them with what
// the hosted zone publishes for one name, submit at most one change batch,
// wait for it to propagate, exit.
//
// This binary is a thin integration layer. It is responsible for:
// 1. Parsing arguments (flags may also come from `R53DDNS_*` variables)
// 2. Installing the console and file log sinks
// 3. Building the IP sources, resolver and provider
// 4. Running the reconciler once and mapping its result to an exit code
//
// All reconciliation logic lives in r53ddns-core.
//
// ## Example
//
// ```bash
// # auto-detect both families
// r53ddns Z0123456789ABC home.example.com
//
// # fixed IPv4, skip IPv6
// r53ddns Z0123456789ABC home.example.com 203.0.113.9 disable
//
// # show what would change without writing
// r53ddns --dry-run Z0123456789ABC home.example.com
// ```

use anyhow::{Context, Result};
use clap::Parser;
use r53ddns_core::{
    DesiredSpec, DesiredState, Family, ReconcileConfig, ReconcileReport, Reconciler,
};
use r53ddns_ip_http::{DEFAULT_IPV4_URL, HttpIpSource};
use r53ddns_ip_iface::InterfaceIpSource;
use r53ddns_provider_route53::{Route53Provider, StaticCredentials};
use r53ddns_resolver::NameserverResolver;
use std::fs::{File, OpenOptions};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

/// Default log file, appended to on every run
const DEFAULT_LOG_FILE: &str = "/tmp/dyndns_route53.log";

/// Exit codes for the possible run results
///
/// - 0: Records up to date, or a change was accepted
/// - 1: Bad arguments, configuration, or address detection failure
/// - 2: The provider rejected the zone lookup, a record read, or the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunExitCode {
    Success = 0,
    ConfigError = 1,
    ProviderError = 2,
}

impl From<RunExitCode> for ExitCode {
    fn from(code: RunExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keep a Route 53 A/AAAA record pair in line with this host's addresses
#[derive(Parser, Debug)]
#[command(name = "r53ddns", version, about, long_about = None)]
struct Cli {
    /// Hosted zone id (e.g. Z0123456789ABC)
    #[arg(env = "R53DDNS_HOSTED_ZONE")]
    hosted_zone: String,

    /// Record name to keep updated (e.g. home.example.com)
    #[arg(env = "R53DDNS_DOMAIN_NAME")]
    domain_name: String,

    /// IPv4 address to publish, or "disable"; detected when omitted
    #[arg(env = "R53DDNS_IPV4")]
    ipv4: Option<String>,

    /// IPv6 address to publish, or "disable"; detected when omitted
    #[arg(env = "R53DDNS_IPV6")]
    ipv6: Option<String>,

    /// AWS access key id overriding the default credential chain
    #[arg(long, env = "R53DDNS_AWS_ACCESS_KEY_ID", requires = "aws_secret_access_key")]
    aws_access_key_id: Option<String>,

    /// AWS secret access key overriding the default credential chain
    #[arg(
        long,
        env = "R53DDNS_AWS_SECRET_ACCESS_KEY",
        requires = "aws_access_key_id",
        hide_env_values = true
    )]
    aws_secret_access_key: Option<String>,

    /// File the log is appended to
    #[arg(long, env = "R53DDNS_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "R53DDNS_LOG_LEVEL", default_value = "debug")]
    log_level: LevelFilter,

    /// Nameserver for the pre-check lookup; repeat to give several
    #[arg(long = "nameserver", env = "R53DDNS_NAMESERVERS", value_delimiter = ',')]
    nameservers: Vec<IpAddr>,

    /// Seconds between change status reads
    #[arg(long, env = "R53DDNS_POLL_INTERVAL_SECS", default_value_t = 10)]
    poll_interval_secs: u64,

    /// Stop waiting after this many status reads (default: wait until done)
    #[arg(long, env = "R53DDNS_MAX_POLL_ATTEMPTS")]
    max_poll_attempts: Option<u32>,

    /// Service answering with the caller's public IPv4 address
    #[arg(long, env = "R53DDNS_IPV4_URL", default_value = DEFAULT_IPV4_URL)]
    ipv4_url: String,

    /// Only consider this interface for IPv6 detection
    #[arg(long, env = "R53DDNS_INTERFACE")]
    interface: Option<String>,

    /// TTL for records created where none existed
    #[arg(long, env = "R53DDNS_DEFAULT_TTL", default_value_t = 300)]
    default_ttl: u32,

    /// Read everything, log the batch, write nothing
    #[arg(long, env = "R53DDNS_DRY_RUN")]
    dry_run: bool,
}

impl Cli {
    fn reconcile_config(&self) -> ReconcileConfig {
        let mut config = ReconcileConfig::new(&self.hosted_zone, &self.domain_name)
            .with_poll_interval_secs(self.poll_interval_secs)
            .with_max_poll_attempts(self.max_poll_attempts)
            .with_default_ttl(self.default_ttl);

        if !self.nameservers.is_empty() {
            config = config.with_nameservers(self.nameservers.clone());
        }

        config
    }

    fn credentials(&self) -> Option<StaticCredentials> {
        match (&self.aws_access_key_id, &self.aws_secret_access_key) {
            (Some(key), Some(secret)) => Some(StaticCredentials {
                access_key_id: key.clone(),
                secret_access_key: secret.clone(),
            }),
            _ => None,
        }
    }
}

/// Open the log file for appending, creating it if needed
fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Install the stdout and file sinks
///
/// The returned guard flushes the file writer when dropped and must live
/// until the process exits.
fn init_logging(path: &Path, level: LevelFilter) -> Result<WorkerGuard> {
    let (file_writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stdout).with_filter(level))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(level),
        )
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(guard)
}

/// Map a failed run to its exit code
fn exit_code_for(err: &anyhow::Error) -> RunExitCode {
    match err.downcast_ref::<r53ddns_core::Error>() {
        Some(e) if e.is_fatal_provider() => RunExitCode::ProviderError,
        _ => RunExitCode::ConfigError,
    }
}

fn main() -> ExitCode {
    // clap's own exit status for usage errors is 2, which is reserved for
    // provider rejections here
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                RunExitCode::ConfigError.into()
            } else {
                RunExitCode::Success.into()
            };
        }
    };

    let _guard = match init_logging(&cli.log_file, cli.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup error: {:#}", e);
            return RunExitCode::ConfigError.into();
        }
    };

    // Every step is awaited in order; a single thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RunExitCode::ConfigError.into();
        }
    };

    let code = rt.block_on(async {
        match run(cli).await {
            Ok(report) => {
                log_report(&report);
                RunExitCode::Success
            }
            Err(e) => {
                error!("{:#}", e);
                exit_code_for(&e)
            }
        }
    });

    code.into()
}

/// Detect desired state, wire the collaborators, reconcile once
async fn run(cli: Cli) -> Result<ReconcileReport> {
    let config = cli.reconcile_config();
    config.validate()?;

    info!(
        "Starting r53ddns for {} in zone {}",
        config.domain_name, config.hosted_zone
    );

    let ipv4_spec = DesiredSpec::parse(Family::V4, cli.ipv4.as_deref())?;
    let ipv6_spec = DesiredSpec::parse(Family::V6, cli.ipv6.as_deref())?;

    let ipv4_source = HttpIpSource::new(&cli.ipv4_url, Some(Family::V4))?;
    let ipv6_source = InterfaceIpSource::new(cli.interface.clone(), Family::V6);
    let desired = DesiredState::detect(ipv4_spec, ipv6_spec, &ipv4_source, &ipv6_source).await?;

    let resolver = NameserverResolver::new(&config.nameservers)?;
    let provider = Route53Provider::from_env(cli.credentials(), cli.dry_run).await;

    let reconciler = Reconciler::new(Box::new(provider), Box::new(resolver), config)?;
    let report = reconciler.run(&desired).await?;

    Ok(report)
}

fn log_report(report: &ReconcileReport) {
    match &report.commit {
        None => info!("Records up to date, nothing submitted"),
        Some(commit) if commit.is_in_sync() => info!(
            "Change {} in sync after {} status read(s)",
            commit.change_id, commit.polls
        ),
        Some(commit) => warn!(
            "Change {} submitted, last status {} after {} status read(s)",
            commit.change_id, commit.status, commit.polls
        ),
    }
}
