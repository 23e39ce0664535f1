//! `run` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{CameraKind, FrameSource, RelayConfig};
use frame_source::{open_camera, CameraSource};
use telemetry::TelemetryRelay;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::load_config;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::server::{self, AppState};

/// Execute the `run` command
pub async fn run_server(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config_loader::ConfigLoader::validate(&config)
        .context("Configuration invalid after applying CLI overrides")?;

    info!(
        bind = %config.server.bind,
        camera = ?config.camera.kind,
        fps = config.stream.fps,
        telemetry = %config.telemetry.address(),
        telemetry_enabled = config.telemetry.enabled,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let camera = start_camera(&config);
    let relay = Arc::new(TelemetryRelay::connect_optional(&config.telemetry).await);

    let state = AppState::new(camera.clone(), Arc::clone(&relay));
    let router = server::build_router(state, &config.server);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .map_err(|e| CliError::bind(config.server.bind.clone(), e))?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    let served = server::serve(listener, router, shutdown_signal()).await;

    info!("Shutting down");
    relay.close().await;
    if let Some(camera) = camera {
        camera.stop();
    }

    served.context("HTTP server failed")?;
    info!("Stereo relay finished");
    Ok(())
}

fn apply_overrides(config: &mut RelayConfig, args: &RunArgs) {
    if let Some(ref bind) = args.bind {
        info!(bind = %bind, "Overriding bind address from CLI");
        config.server.bind = bind.clone();
    }
    if let Some(ref dir) = args.static_dir {
        config.server.static_dir = Some(dir.clone());
    }
    if let Some(camera) = args.camera {
        config.camera.kind = camera.into();
    }
    if let Some(fps) = args.fps {
        config.stream.fps = fps;
    }
    if let Some(ref host) = args.telemetry_host {
        config.telemetry.host = host.clone();
    }
    if let Some(port) = args.telemetry_port {
        config.telemetry.port = port;
    }
    if args.no_telemetry {
        config.telemetry.enabled = false;
    }
}

/// Open the camera; failure leaves the server running without video
fn start_camera(config: &RelayConfig) -> Option<Arc<CameraSource>> {
    match open_camera(&config.camera) {
        Ok(Some(camera)) => {
            info!(
                source = %camera.name(),
                width = config.camera.width,
                height = config.camera.height,
                "Camera ready"
            );
            Some(Arc::new(camera))
        }
        Ok(None) => {
            warn!("No camera configured, running without video");
            None
        }
        Err(e) => {
            warn!(error = %e, "Camera initialization failed, running in degraded mode");
            None
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal");
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &RelayConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Server:");
    println!("  Bind: {}", config.server.bind);
    println!("  CORS: {}", config.server.cors);
    if let Some(ref dir) = config.server.static_dir {
        println!("  Static: {}", dir.display());
    }

    println!("\nCamera:");
    match config.camera.kind {
        CameraKind::Disabled => println!("  Disabled (degraded mode)"),
        kind => println!(
            "  {:?} {}x{}",
            kind, config.camera.width, config.camera.height
        ),
    }

    println!("\nStream:");
    println!(
        "  {} fps, time base {}, pts step {}",
        config.stream.fps,
        config.stream.time_base(),
        config.stream.pts_step()
    );

    println!("\nTelemetry:");
    if config.telemetry.enabled {
        println!("  Sink: {}", config.telemetry.address());
    } else {
        println!("  Disabled");
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CameraArg;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            bind: None,
            static_dir: None,
            camera: None,
            fps: None,
            telemetry_host: None,
            telemetry_port: None,
            no_telemetry: false,
            dry_run: false,
            metrics_port: 0,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = RelayConfig::default();
        let args = RunArgs {
            bind: Some("127.0.0.1:7000".into()),
            camera: Some(CameraArg::Disabled),
            fps: Some(15),
            telemetry_port: Some(9999),
            no_telemetry: true,
            ..args()
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.server.bind, "127.0.0.1:7000");
        assert_eq!(config.camera.kind, CameraKind::Disabled);
        assert_eq!(config.stream.fps, 15);
        assert_eq!(config.telemetry.port, 9999);
        assert!(!config.telemetry.enabled);
    }

    #[test]
    fn test_disabled_camera_starts_degraded() {
        let mut config = RelayConfig::default();
        config.camera.kind = CameraKind::Disabled;
        assert!(start_camera(&config).is_none());
    }

    #[test]
    fn test_synthetic_camera_starts() {
        let mut config = RelayConfig::default();
        config.camera.width = 64;
        config.camera.height = 48;
        let camera = start_camera(&config).unwrap();
        assert_eq!(camera.output_size(), (64, 48));
        camera.stop();
    }

    #[tokio::test]
    async fn test_dry_run_exits_without_serving() {
        let args = RunArgs {
            dry_run: true,
            ..args()
        };
        run_server(&args).await.unwrap();
    }
}
