//! OSO Confluent Deployment Validator
//!
//! Command-line entry point. Validates deployment manifests, resolves
//! role-binding scopes to CRN patterns, and runs health and RBAC checks
//! against a live Confluent Cloud environment.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use confluent_deployment_validator::{
    api::{ConfluentApi, Credentials},
    checks::HealthChecker,
    manifest::DeploymentManifest,
    metrics,
    rbac::{self, ApiProbeExecutor},
    report::{self, RbacReport},
    validators,
};

/// Default metrics port for watch mode
const METRICS_PORT: u16 = 8080;

#[derive(Parser)]
#[command(
    name = "confluent-deployment-validator",
    about = "Validate Confluent Cloud deployments against a declarative manifest",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a deployment manifest
    Validate {
        /// Path to the deployment manifest (YAML)
        #[arg(long)]
        manifest: PathBuf,
    },

    /// Resolve role-binding scopes to CRN patterns
    Resolve {
        /// Path to the deployment manifest (YAML)
        #[arg(long)]
        manifest: PathBuf,

        /// Write resolved bindings as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run health checks against the live environment
    HealthCheck {
        /// Path to the deployment manifest (YAML)
        #[arg(long)]
        manifest: PathBuf,

        /// Write the health report as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Keep running, re-checking on an interval
        #[arg(long)]
        watch: bool,

        /// Interval between watch-mode runs, in seconds
        #[arg(long, default_value_t = 300)]
        interval: u64,

        /// Metrics server port in watch mode
        #[arg(long, default_value_t = METRICS_PORT)]
        metrics_port: u16,
    },

    /// Run RBAC permission probes against the live environment
    RbacTest {
        /// Path to the deployment manifest (YAML)
        #[arg(long)]
        manifest: PathBuf,

        /// Write the RBAC report as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { manifest } => {
            let manifest = DeploymentManifest::load(&manifest)?;
            match validators::validate(&manifest) {
                Ok(()) => {
                    let bindings = validators::resolve_bindings(&manifest)?;
                    info!(
                        "Manifest is valid: {} topics, {} connectors, {} role bindings (fingerprint {})",
                        manifest.topics.len(),
                        manifest.connectors.len(),
                        bindings.len(),
                        manifest.fingerprint()
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("Manifest validation failed: {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Resolve { manifest, output } => {
            let manifest = DeploymentManifest::load(&manifest)?;
            let bindings = validators::resolve_bindings(&manifest)?;

            let json = serde_json::to_string_pretty(&bindings)?;
            match output {
                Some(path) => {
                    report::write_json(&path, &bindings)?;
                    info!("Resolved bindings written to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::HealthCheck {
            manifest,
            output,
            watch,
            interval,
            metrics_port,
        } => {
            let manifest = DeploymentManifest::load(&manifest)?;
            validators::validate(&manifest)?;

            let api = ConfluentApi::new(Credentials::from_env()?)?;

            if watch {
                run_watch(api, manifest, interval, metrics_port).await?;
                return Ok(ExitCode::SUCCESS);
            }

            let summary = HealthChecker::new(&api, &manifest).run().await;
            if let Some(path) = &output {
                report::write_json(path, &summary)?;
                info!("Health report written to {}", path.display());
            }

            print_health_summary(&summary);
            Ok(ExitCode::from(summary.overall_status.exit_code() as u8))
        }

        Command::RbacTest { manifest, output } => {
            let manifest = DeploymentManifest::load(&manifest)?;
            validators::validate(&manifest)?;

            let plan = rbac::standard_plan(&manifest);
            info!("Running {} RBAC permission probes", plan.len());

            let executor = ApiProbeExecutor::new(&manifest);
            let outcomes = rbac::run_plan(&executor, &plan).await;
            let rbac_report = RbacReport::build(&manifest, outcomes);

            if let Some(path) = &output {
                report::write_json(path, &rbac_report)?;
                info!("RBAC report written to {}", path.display());
            }

            for finding in &rbac_report.security_findings {
                error!("{:?}: {} - {}", finding.severity, finding.finding, finding.details);
            }

            if rbac_report.summary.all_passed() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Continuous health checking with a metrics endpoint
async fn run_watch(
    api: ConfluentApi,
    manifest: DeploymentManifest,
    interval: u64,
    metrics_port: u16,
) -> anyhow::Result<()> {
    info!(
        "Watching environment {} every {}s",
        manifest.environment.name, interval
    );

    let metrics_handle = tokio::spawn(metrics::serve(metrics_port));
    info!("Metrics server starting on port {}", metrics_port);

    let check_loop = async {
        loop {
            let summary = HealthChecker::new(&api, &manifest).run().await;
            info!(
                "Deployment status: {:?} ({} checks)",
                summary.overall_status,
                summary.checks.len()
            );
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    };

    tokio::select! {
        _ = check_loop => {}
        _ = metrics_handle => {
            error!("Metrics server exited unexpectedly");
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, stopping watch");
        }
    }

    Ok(())
}

fn print_health_summary(summary: &confluent_deployment_validator::checks::HealthSummary) {
    println!("\nHealth Check Summary for {}:", summary.environment);
    println!("Overall Status: {:?}", summary.overall_status);
    println!("Total Checks: {}", summary.checks.len());

    for check in &summary.checks {
        println!("  [{:?}] {}: {}", check.status, check.name, check.message);
    }

    println!("Execution Time: {:.2} seconds", summary.execution_time_seconds);
}

/// Initialize tracing subscriber
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,confluent_deployment_validator=debug,hyper=warn,reqwest=warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
