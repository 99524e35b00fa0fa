//! Command line front end for the modpack install engine

use anyhow::Context;
use clap::{Parser, Subcommand};
use modpack_installer::{
    CancelToken, ConsoleProgressReporter, InstallConfig, InstallError, InstallOptions,
    InstallSummary, Installer, IntoProgressCallback, ModpackConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modpack", about = "Install modpacks described by *.Modpack.json files", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download every mod of a pack into a target directory
    Install {
        /// Path to the *.Modpack.json file
        pack: PathBuf,
        /// Directory the mods are installed into
        target: PathBuf,
        /// Fill the directory in place instead of replacing it
        #[arg(long)]
        keep_existing: bool,
        /// Show byte-level download progress
        #[arg(long)]
        verbose: bool,
    },
    /// List the entries of a pack
    Show {
        /// Path to the *.Modpack.json file
        pack: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Install {
            pack,
            target,
            keep_existing,
            verbose,
        } => install(pack, target, keep_existing, verbose).await,
        Command::Show { pack } => show(pack).await,
    }
}

async fn install(
    pack: PathBuf,
    target: PathBuf,
    keep_existing: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    let modpack = ModpackConfig::load(&pack)
        .await
        .with_context(|| format!("loading {}", pack.display()))?;
    let total = modpack.len();

    let installer = Installer::new(InstallConfig::default())?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("stopping after the current mod...");
                cancel.cancel();
            }
        });
    }

    let options = InstallOptions {
        delete_existing: !keep_existing,
        cancel: Some(cancel),
    };
    let progress = ConsoleProgressReporter::new(verbose).into_callback();

    let results = installer
        .install_with_options(&modpack, &target, options, Some(progress))
        .await
        .with_context(|| format!("installing into {}", target.display()))?;

    let summary = InstallSummary::of(&results);
    if results.len() < total {
        return Err(InstallError::Cancelled {
            completed: results.len(),
            total,
        }
        .into());
    }
    if summary.failed > 0 {
        anyhow::bail!("{} of {} mods failed to download", summary.failed, total);
    }
    Ok(())
}

async fn show(pack: PathBuf) -> anyhow::Result<()> {
    let modpack = ModpackConfig::load(&pack)
        .await
        .with_context(|| format!("loading {}", pack.display()))?;

    for entry in &modpack.mods {
        match &entry.version {
            Some(version) => println!("{}  {}  ({})", entry.name, version, entry.download_url),
            None => println!("{}  ({})", entry.name, entry.download_url),
        }
    }
    println!("{} mods", modpack.len());
    Ok(())
}
