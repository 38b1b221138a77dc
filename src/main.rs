use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cmth::commands;
use cmth::model::FileModelSource;
use cmth::notify::ConsoleNotifier;
use cmth::runtime::RealRuntime;

/// cmth - CMake Tools Helper
///
/// Install pre-built CMake releases and keep c_cpp_properties.json in sync
/// with the active CMake configuration.
///
/// Examples:
///   cmth install 3.18.4   # Install CMake 3.18.4 for this platform
///   cmth show-config      # Print the active configuration label
///   cmth sync             # Move the active entry to the front once
///   cmth watch            # Keep syncing as the build state changes
#[derive(Parser, Debug)]
#[command(author, version = env!("CMTH_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Code-model state file exported by the CMake integration
    #[arg(
        long = "state-file",
        env = "CMTH_STATE_FILE",
        value_name = "PATH",
        default_value = ".vscode/cmake_state.json",
        global = true
    )]
    state_file: PathBuf,

    /// c_cpp_properties.json owned by the C/C++ tooling plugin
    #[arg(
        long = "properties-file",
        env = "CMTH_PROPERTIES_FILE",
        value_name = "PATH",
        default_value = ".vscode/c_cpp_properties.json",
        global = true
    )]
    properties_file: PathBuf,

    /// Settings file (defaults to ~/.cmth/settings.json)
    #[arg(
        long = "settings-file",
        env = "CMTH_SETTINGS_FILE",
        value_name = "PATH",
        global = true
    )]
    settings_file: Option<PathBuf>,

    /// Base URL of the CMake release file index (defaults to https://cmake.org/files)
    #[arg(long = "files-url", env = "CMTH_FILES_URL", value_name = "URL", global = true)]
    files_url: Option<String>,

    /// GitHub API URL for version listing (defaults to https://api.github.com)
    #[arg(long = "api-url", env = "CMTH_API_URL", value_name = "URL", global = true)]
    api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Download and install a CMake release for this platform
    Install(InstallArgs),

    /// Show the active CMake configuration label
    ShowConfig,

    /// Reorder c_cpp_properties.json so the active configuration is first
    Sync,

    /// Watch the build state and re-sync on every change
    Watch(WatchArgs),
}

#[derive(clap::Args, Debug)]
struct InstallArgs {
    /// Version to install (e.g. "3.18.4"); prompts when omitted
    #[arg(value_name = "VERSION")]
    version: Option<String>,

    /// Update cmake_path without asking
    #[arg(long, short = 'y')]
    yes: bool,
}

#[derive(clap::Args, Debug)]
struct WatchArgs {
    /// Poll interval for state-file changes, in milliseconds
    #[arg(long = "poll-ms", value_name = "MS", default_value_t = 2000)]
    poll_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    match cli.command {
        Commands::Install(args) => {
            commands::install(
                &runtime,
                args.version,
                args.yes,
                cli.settings_file,
                cli.files_url,
                cli.api_url,
            )
            .await?
        }
        Commands::ShowConfig => {
            commands::show_active_config(&source_for(cli.state_file), &ConsoleNotifier);
        }
        Commands::Sync => {
            commands::sync(&runtime, &source_for(cli.state_file), &cli.properties_file)?
        }
        Commands::Watch(args) => {
            let source = Arc::new(source_for(cli.state_file));
            let poller = {
                let source = Arc::clone(&source);
                let interval = Duration::from_millis(args.poll_ms);
                tokio::spawn(async move { source.poll_changes(interval).await })
            };

            let result = commands::watch(
                &runtime,
                source.as_ref(),
                &ConsoleNotifier,
                &cli.properties_file,
            )
            .await;
            poller.abort();
            result?
        }
    }
    Ok(())
}

fn source_for(state_file: PathBuf) -> FileModelSource<RealRuntime> {
    FileModelSource::new(Arc::new(RealRuntime), state_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["cmth", "install", "3.18.4"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.version.as_deref(), Some("3.18.4"));
                assert!(!args.yes);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_without_version() {
        let cli = Cli::try_parse_from(["cmth", "install", "--yes"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.version, None);
                assert!(args.yes);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_global_paths_parsing() {
        let cli = Cli::try_parse_from([
            "cmth",
            "--state-file",
            "/tmp/state.json",
            "--properties-file",
            "/tmp/props.json",
            "sync",
        ])
        .unwrap();
        assert_eq!(cli.state_file, PathBuf::from("/tmp/state.json"));
        assert_eq!(cli.properties_file, PathBuf::from("/tmp/props.json"));
    }

    #[test]
    fn test_cli_default_paths() {
        let cli = Cli::try_parse_from(["cmth", "show-config"]).unwrap();
        assert_eq!(cli.state_file, PathBuf::from(".vscode/cmake_state.json"));
        assert_eq!(
            cli.properties_file,
            PathBuf::from(".vscode/c_cpp_properties.json")
        );
        assert_eq!(cli.settings_file, None);
    }

    #[test]
    fn test_cli_watch_poll_interval() {
        let cli = Cli::try_parse_from(["cmth", "watch", "--poll-ms", "500"]).unwrap();
        match cli.command {
            Commands::Watch(args) => assert_eq!(args.poll_ms, 500),
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["cmth", "3.18.4"]);
        assert!(result.is_err());
    }
}
