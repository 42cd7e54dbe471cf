mod api;
mod config;
mod dashboard;
mod error;
mod sync;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dashboard::{Dashboard, DashboardEvent, NoticeLevel};
use sync::RefreshScheduler;

#[derive(Parser, Debug)]
#[command(name = "kubedash")]
#[command(about = "Headless data-sync client for a Kubernetes metrics dashboard")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/kubedash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// API base URL override
  #[arg(short, long)]
  base_url: Option<String>,

  /// Namespace to watch
  #[arg(short, long)]
  namespace: Option<String>,

  /// Seconds between automatic refresh cycles
  #[arg(short, long)]
  period: Option<u64>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Poll the API and stream dashboard updates (default)
  Watch {
    /// Run a single refresh cycle and exit
    #[arg(long)]
    once: bool,
  },
  /// One-off cluster health check
  Health,
  /// Tail a pod's logs
  Logs {
    pod: String,
    #[arg(long, default_value_t = 100)]
    tail: u32,
  },
  /// List deployments in the namespace
  Deployments,
  /// List services in the namespace
  Services,
  /// Scan a container image for vulnerabilities
  Scan { image: String },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .init();

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }
  if let Some(namespace) = args.namespace {
    config.namespace = namespace;
  }
  if let Some(period) = args.period {
    config.refresh.period_secs = period;
  }

  let (mut dash, events) = Dashboard::new(&config)?;

  match args.command.unwrap_or(Command::Watch { once: false }) {
    Command::Watch { once } => watch(&config, &mut dash, events, once).await?,
    Command::Health => {
      let health = dash.health().await?;
      if health.is_ok() {
        println!("cluster healthy");
      } else {
        println!("cluster status: {}", health.status);
      }
    }
    Command::Logs { pod, tail } => {
      let logs = dash.pod_logs(&pod, tail).await?;
      if let Some(err) = logs.error {
        error!(pod, "backend error: {err}");
      } else if logs.logs.is_empty() {
        println!("no logs available for this pod");
      } else {
        println!("{}", logs.logs.join("\n"));
      }
    }
    Command::Deployments => {
      for dep in dash.deployments().await? {
        let state = if dep.is_ready() { "Ready" } else { "Updating" };
        println!(
          "{}\treplicas {}/{}\t{}\t{}",
          dep.name, dep.ready_replicas, dep.replicas, dep.strategy, state
        );
      }
    }
    Command::Services => {
      for svc in dash.services().await? {
        let ports: Vec<String> = svc
          .ports
          .iter()
          .map(|p| format!("{}/{}", p.port, p.protocol))
          .collect();
        println!(
          "{}\t{}\t{}\t{}",
          svc.name,
          svc.service_type,
          svc.cluster_ip,
          ports.join(", ")
        );
      }
    }
    Command::Scan { image } => {
      info!(image, "scanning image");
      let outcome = dash.scan_image(&image).await?;
      if let Some(err) = outcome.error {
        error!("scan error: {err}");
      } else if let Some(results) = outcome.scan_results {
        println!("{}", serde_json::to_string_pretty(&results)?);
      } else {
        println!("scan returned no results");
      }
    }
  }

  Ok(())
}

/// Run refresh cycles until interrupted, streaming updates to the log.
async fn watch(
  config: &config::Config,
  dash: &mut Dashboard,
  mut events: tokio::sync::mpsc::UnboundedReceiver<DashboardEvent>,
  once: bool,
) -> Result<()> {
  // First update happens immediately, like loading the dashboard page.
  dash.run_cycle().await;

  if once {
    while let Ok(event) = events.try_recv() {
      render(event);
    }
    return Ok(());
  }

  let (mut scheduler, mut triggers) = RefreshScheduler::new(
    Duration::from_secs(config.refresh.period_secs),
    Duration::from_millis(config.refresh.manual_cooldown_ms),
  );
  scheduler.enable_auto();
  info!(period_secs = config.refresh.period_secs, "auto-refresh enabled");

  loop {
    tokio::select! {
      Some(_trigger) = triggers.recv() => {
        dash.run_cycle().await;
        tracing::debug!(
          cpu_window = dash.snapshot(sync::SeriesKey::Cpu).len(),
          "chart windows updated"
        );
      }
      Some(event) = events.recv() => render(event),
      _ = tokio::signal::ctrl_c() => break,
    }
  }

  scheduler.teardown();
  Ok(())
}

/// Stand-in for the browser rendering layer: log what would be drawn.
fn render(event: DashboardEvent) {
  match event {
    DashboardEvent::SystemInfo(info) => info!(
      cpu = info.cpu_percent,
      memory = info.memory_usage.percent,
      disk = info.disk_usage.percent,
      "system metrics"
    ),
    DashboardEvent::Namespaces(namespaces) => {
      info!(count = namespaces.len(), "namespaces refreshed")
    }
    DashboardEvent::KubernetesInfo(k8s) => info!(
      deployments = k8s.num_deployments,
      pods = k8s.num_pods,
      services = k8s.num_services,
      "namespace resources"
    ),
    DashboardEvent::PodStatuses { tally, .. } => info!(
      running = tally.running,
      pending = tally.pending,
      failed = tally.failed,
      total = tally.total(),
      "pod statuses"
    ),
    DashboardEvent::Notice { message, level } => match level {
      NoticeLevel::Error => error!("{message}"),
      NoticeLevel::Warning => warn!("{message}"),
      NoticeLevel::Info | NoticeLevel::Success => info!("{message}"),
    },
  }
}
