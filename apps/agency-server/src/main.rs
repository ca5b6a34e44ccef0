#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Insurance agency API server.
//!
//! Configuration is read from an optional YAML file, then from
//! `AGENCY__`-prefixed environment variables (`AGENCY__AUTH__JWT_SECRET`,
//! `AGENCY__DATABASE__URL`, ...), later sources winning.

use std::path::{Path, PathBuf};

use agency::AppConfig;
use agency::config::LoggingConfig;
use agency::infra::storage::migrations::Migrator;
use agency_db::connect_db;
use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use sea_orm_migration::MigratorTrait;
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_PREFIX: &str = "AGENCY__";

#[derive(Parser, Debug)]
#[command(name = "agency-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration (secrets redacted) and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    init_logging(&config.logging);
    run(&config).await
}

/// File first, environment on top.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::new();
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("config file {} does not exist", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("invalid configuration")
}

fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if cfg.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: &AppConfig) -> Result<()> {
    let db = connect_db(&config.database)
        .await
        .context("failed to connect to database")?;
    tracing::info!("connected to database");

    if config.database.run_migrations {
        Migrator::up(db.conn(), None)
            .await
            .context("failed to run migrations")?;
        tracing::info!("database schema is up to date");
    }

    let services = agency::build_services(db.clone(), config).context("invalid auth config")?;

    if let Some(admin) = &config.auth.bootstrap_admin {
        services
            .auth
            .bootstrap_admin(&admin.email, admin.password.expose_secret())
            .await
            .context("failed to create bootstrap admin")?;
    }

    let app = agency::build_router(services, config);
    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(bind_addr = %config.server.bind_addr, "agency-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped, closing database");
    db.close().await.context("failed to close database")?;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn yaml_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  bind_addr: \"0.0.0.0:8080\"\npagination:\n  max_limit: 50\nauth:\n  jwt_secret: \"file-secret-0123456789\""
        )
        .unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.pagination.max_limit, 50);
        assert_eq!(cfg.auth.jwt_secret.expose_secret(), "file-secret-0123456789");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/agency.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 8080").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn printed_config_hides_secrets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "auth:\n  jwt_secret: \"do-not-print-this-secret\"").unwrap();
        let cfg = load_config(Some(file.path())).unwrap();
        let printed = serde_json::to_string_pretty(&cfg).unwrap();
        assert!(!printed.contains("do-not-print-this-secret"));
    }
}
