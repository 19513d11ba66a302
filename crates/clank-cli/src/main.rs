use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clank_core::config::{PINNED_RELEASE, SERVER_REPOSITORY};
use clank_core::{
    default_managed_root, BinaryLocator, BinaryStrategy, ClangdConfig, Installer,
    LifecycleController, ReleaseFeed, ReleaseVersion,
};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

mod consent;

#[derive(Parser, Debug)]
#[clap(
    name = "clank",
    version = "0.1.0",
    about = "clangd binary resolution and lifecycle manager"
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Managed storage root (defaults to ~/.clank/LSP-clangd)")]
    storage: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resolved server binary for a strategy
    Resolve {
        #[clap(long, default_value = "auto", help = "system | managed | auto")]
        binary: String,

        #[clap(long, help = "Path or executable name to prefer on the system")]
        system_binary: Option<String>,

        #[clap(long, default_value = PINNED_RELEASE)]
        version: String,
    },

    /// Download and install the managed server release
    Install {
        #[clap(long, default_value = PINNED_RELEASE)]
        version: String,
    },

    /// Compile the full launch command from a configuration snapshot
    Command {
        #[clap(help = "Path to a JSON configuration snapshot")]
        config: PathBuf,

        #[clap(long, default_value = PINNED_RELEASE)]
        version: String,
    },

    /// Check the release feed for a newer server release
    UpdateCheck {
        #[clap(long, default_value = PINNED_RELEASE, help = "Version to compare against")]
        current: String,
    },
}

fn parse_strategy(value: &str) -> Result<BinaryStrategy> {
    match value {
        "system" => Ok(BinaryStrategy::System),
        "managed" => Ok(BinaryStrategy::Managed),
        "auto" => Ok(BinaryStrategy::Auto),
        "custom" => Ok(BinaryStrategy::Custom),
        other => bail!("unknown binary strategy '{}'", other),
    }
}

/// Output lines of the release-check automation
fn update_check_lines(current: &ReleaseVersion, latest: &ReleaseVersion) -> Vec<String> {
    vec![
        format!("REQUIRES_UPDATE={}", i32::from(latest > current)),
        format!("LATEST_TAG={}", latest),
        format!("BRANCH_NAME={}", latest.underscored()),
    ]
}

fn emit_check_output(lines: &[String]) -> Result<()> {
    // Release automation reads these from the GITHUB_OUTPUT file when set.
    if let Ok(output_path) = std::env::var("GITHUB_OUTPUT") {
        let mut output = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&output_path)
            .with_context(|| format!("failed to open {}", output_path))?;
        for line in lines {
            writeln!(output, "{}", line)?;
        }
    } else {
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(LevelFilter::Info))
        .init();

    let managed_root = match cli.storage {
        Some(storage) => storage,
        None => default_managed_root()?,
    };

    match cli.command {
        Commands::Resolve {
            binary,
            system_binary,
            version,
        } => {
            let strategy = parse_strategy(&binary)?;
            let locator = BinaryLocator::new(managed_root, version);
            match locator.resolve(strategy, system_binary.as_deref()) {
                Some(path) => println!("{}", path.display()),
                None => bail!("clangd is currently not installed"),
            }
        }
        Commands::Install { version } => {
            let installer = Installer::new(managed_root)?;
            let binary = installer.install(&version).await?;
            println!("{}", binary.display());
        }
        Commands::Command { config, version } => {
            let snapshot = std::fs::read_to_string(&config)
                .with_context(|| format!("failed to read {}", config.display()))?;
            let snapshot: ClangdConfig = serde_json::from_str(&snapshot)
                .with_context(|| format!("failed to parse {}", config.display()))?;

            let controller =
                LifecycleController::new(managed_root, version, Arc::new(consent::PromptConsent))?;
            match controller.ensure_ready_and_build_command(&snapshot).await? {
                Some(launch) => println!("{}", launch.join(" ")),
                None => log::info!("start cycle aborted, nothing to launch"),
            }
        }
        Commands::UpdateCheck { current } => {
            let current = ReleaseVersion::parse(&current)?;
            let latest = ReleaseFeed::new()?
                .latest_version(SERVER_REPOSITORY)
                .await?;
            emit_check_output(&update_check_lines(&current, &latest))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_parse_from_their_setting_values() {
        assert_eq!(parse_strategy("system").unwrap(), BinaryStrategy::System);
        assert_eq!(parse_strategy("managed").unwrap(), BinaryStrategy::Managed);
        assert_eq!(parse_strategy("auto").unwrap(), BinaryStrategy::Auto);
        assert_eq!(parse_strategy("custom").unwrap(), BinaryStrategy::Custom);
        assert!(parse_strategy("github").is_err());
    }

    #[test]
    fn update_check_reports_a_newer_release() {
        let current = ReleaseVersion::parse("15.0.1").unwrap();
        let latest = ReleaseVersion::parse("16.0.2").unwrap();
        assert_eq!(
            update_check_lines(&current, &latest),
            vec![
                "REQUIRES_UPDATE=1".to_string(),
                "LATEST_TAG=16.0.2".to_string(),
                "BRANCH_NAME=16_0_2".to_string(),
            ]
        );
    }

    #[test]
    fn update_check_reports_current_is_latest() {
        let current = ReleaseVersion::parse("15.0.1").unwrap();
        let lines = update_check_lines(&current, &current.clone());
        assert_eq!(lines[0], "REQUIRES_UPDATE=0");
    }
}
