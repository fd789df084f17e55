use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use host_monitoring::{
    actors::{collector::CollectorHandle, evaluator::EvaluatorHandle},
    alerts::{AlertStore, BroadcastSink, NotificationSink, RuleEngine, WebhookSink},
    collectors::{
        docker::DockerCollector, network::NetworkCollector, rtsp::RtspCollector,
        storage::StorageCollector, system::SystemCollector,
    },
    config::{Config, read_config_file},
    hub::MonitorHub,
    storage::MemoryBackend,
    util::get_default_config_path,
};
use tracing::{debug, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short, long, default_value_t = get_default_config_path())]
    file: String,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("host_monitoring", LevelFilter::TRACE),
        ("healthd", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    let hub = build_hub(&config)?;
    let handles = dispatch_monitors(&config, hub);

    info!(
        "monitoring {} ({})",
        handles.hub.identity().display_name,
        handles.hub.identity().id
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    for collector in &handles.collectors {
        collector.shutdown().await;
    }
    handles.evaluator.shutdown().await;

    Ok(())
}

fn build_hub(config: &Config) -> anyhow::Result<MonitorHub> {
    let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(BroadcastSink::new(64))];

    if let Some(webhook) = &config.webhook {
        debug!("alert webhook configured: {}", webhook.url);
        sinks.push(Arc::new(WebhookSink::new(&webhook.url)));
    }

    let backend = Arc::new(MemoryBackend::new(config.retention.max_records));
    let alerts = Arc::new(AlertStore::new(config.retention.alert_history, sinks));

    Ok(MonitorHub::new(config.host.identity(), backend, alerts)?)
}

struct Handles {
    hub: MonitorHub,
    collectors: Vec<CollectorHandle>,
    evaluator: EvaluatorHandle,
}

fn dispatch_monitors(config: &Config, hub: MonitorHub) -> Handles {
    let schedule = &config.schedule;
    let mut collectors = vec![];

    collectors.push(CollectorHandle::spawn(
        Box::new(SystemCollector::new(hub.identity().clone())),
        hub.clone(),
        Duration::from_secs(schedule.system_secs),
    ));

    collectors.push(CollectorHandle::spawn(
        Box::new(StorageCollector::new()),
        hub.clone(),
        Duration::from_secs(schedule.storage_secs),
    ));

    collectors.push(CollectorHandle::spawn(
        Box::new(NetworkCollector::new()),
        hub.clone(),
        Duration::from_secs(schedule.network_secs),
    ));

    if config.docker.enabled {
        collectors.push(CollectorHandle::spawn(
            Box::new(DockerCollector::new()),
            hub.clone(),
            Duration::from_secs(schedule.docker_secs),
        ));
    } else {
        debug!("docker collection disabled");
    }

    if config.rtsp.streams.is_empty() {
        debug!("no rtsp streams configured");
    } else {
        collectors.push(CollectorHandle::spawn(
            Box::new(RtspCollector::new(&config.rtsp)),
            hub.clone(),
            Duration::from_secs(schedule.rtsp_secs),
        ));
    }

    let evaluator = EvaluatorHandle::spawn(
        RuleEngine::with_thresholds(&config.thresholds),
        hub.clone(),
        Duration::from_secs(schedule.alerts_secs),
    );

    Handles {
        hub,
        collectors,
        evaluator,
    }
}
