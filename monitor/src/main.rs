//! statscreen: drives a small system monitor display.
//!
//! Reads a theme, samples the configured sensors on the theme's intervals
//! and writes every draw call as a JSON line on stdout.

mod backend;
mod json_renderer;
mod scheduler;

use anyhow::{Context, Result};
use clap::Parser;
use json_renderer::JsonRenderer;
use scheduler::Scheduler;
use statscreen_core::presenters::date;
use statscreen_core::{GlobalConfig, NetInterfaces, PresenterContext, SensorBackend, Theme};
use std::io;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "statscreen")]
#[command(about = "Themeable system monitor for small displays")]
#[command(version)]
#[command(author)]
struct Args {
    /// Config file (default: ~/.config/statscreen/config.ron)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Theme file, overrides the config
    #[arg(short, long)]
    theme: Option<PathBuf>,

    /// Sensor backend (auto, linux, stub, static), overrides the config
    #[arg(short, long)]
    sensors: Option<SensorBackend>,

    /// Draw every scheduled metric once and exit
    #[arg(short, long)]
    once: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Generate example config file and exit
    #[arg(long)]
    generate_config: bool,
}

fn load_config(args: &Args) -> Result<GlobalConfig> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GlobalConfig::load().context("Failed to load config")?,
    };

    if let Some(theme) = &args.theme {
        config.theme = Some(theme.clone());
    }
    if let Some(backend) = args.sensors {
        config.hw_sensors = backend;
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if args.generate_config {
        let config_path = GlobalConfig::default_config_path().context("Could not determine config directory")?;
        GlobalConfig::save_example_config_to_file(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("Generated example config at: {}", config_path.display());
        return Ok(());
    }

    let config = load_config(&args)?;
    let theme_path = config
        .theme
        .clone()
        .context("No theme given: pass --theme or set `theme` in the config")?;
    let theme = Theme::load(&theme_path).with_context(|| format!("Failed to load theme {}", theme_path.display()))?;

    let ctx = PresenterContext {
        interfaces: NetInterfaces::new(config.wlo.clone(), config.eth.clone()),
        locale: date::system_locale(),
    };
    let sensors = backend::build(&config);
    let mut scheduler = Scheduler::new(theme, sensors, ctx);
    let mut renderer = JsonRenderer::new(io::stdout().lock());

    if args.once {
        scheduler.run_once(&mut renderer)?;
        return Ok(());
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    scheduler.run(&mut renderer, shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        std::fs::write(&path, r#"(hw_sensors: linux, eth: "eth1", theme: Some("a.yaml"))"#).unwrap();

        let args = Args::parse_from([
            "statscreen",
            "--config",
            path.to_str().unwrap(),
            "--theme",
            "b.yaml",
            "--sensors",
            "static",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.theme, Some(PathBuf::from("b.yaml")));
        assert_eq!(config.hw_sensors, SensorBackend::Static);
        assert_eq!(config.eth, "eth1");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = Args::parse_from(["statscreen", "--config", "/nonexistent/config.ron"]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Args::try_parse_from(["statscreen", "--sensors", "lhm"]).is_err());
    }
}
