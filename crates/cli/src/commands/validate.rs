//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{CameraKind, RelayConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    bind: String,
    camera: String,
    resolution: String,
    fps: u32,
    pts_step: u64,
    telemetry: Option<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    bind: config.server.bind.clone(),
                    camera: format!("{:?}", config.camera.kind),
                    resolution: format!("{}x{}", config.camera.width, config.camera.height),
                    fps: config.stream.fps,
                    pts_step: config.stream.pts_step(),
                    telemetry: config
                        .telemetry
                        .enabled
                        .then(|| config.telemetry.address()),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &RelayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.camera.kind == CameraKind::Disabled {
        warnings.push("Camera disabled - server will run without video".to_string());
    }

    if !config.telemetry.enabled {
        warnings.push("Telemetry disabled - pose messages will be dropped".to_string());
    }

    if let Some(ref dir) = config.server.static_dir {
        if !dir.is_dir() {
            warnings.push(format!(
                "server.static_dir '{}' is not a directory",
                dir.display()
            ));
        }
    }

    if config.camera.kind == CameraKind::Synthetic && config.camera.calibration.is_none() {
        warnings.push("No calibration configured - synthetic defaults will be reported".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Bind: {}", summary.bind);
            println!("  Camera: {} ({})", summary.camera, summary.resolution);
            println!("  Stream: {} fps, pts step {}", summary.fps, summary.pts_step);
            match summary.telemetry {
                Some(ref addr) => println!("  Telemetry: {}", addr),
                None => println!("  Telemetry: disabled"),
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_valid_config_with_warnings() {
        let file = write_config("[camera]\nkind = \"disabled\"\n\n[telemetry]\nenabled = false\n");
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });

        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(result.summary.unwrap().telemetry.is_none());
    }

    #[test]
    fn test_invalid_fps() {
        let file = write_config("[stream]\nfps = 0\n");
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        });

        assert!(!result.valid);
        assert!(result.error.unwrap().contains("fps"));
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&ValidateArgs {
            config: "/nonexistent/relay.toml".into(),
            json: false,
        });
        assert!(!result.valid);
    }
}
