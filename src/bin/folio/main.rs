use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spdlog::{info, warn};

use folio::logger::configure_logger;
use folio::maintenance::dedupe::{remove_duplicates, DedupeOptions};
use folio::maintenance::image_processor::process_images;
use folio::server::server_run;
use folio::site_builder::build_site;

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "folio.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the site (default)
    Serve,
    /// Render the site into the output directory
    Build,
    /// Create web copies, thumbnails and metadata for the original photos
    ProcessImages,
    /// Remove duplicate originals, keeping the oldest copy
    Dedupe {
        /// Only report what would be removed
        #[arg(long)]
        dry_run: bool,
        /// Move duplicates to the configured backup dir instead of deleting them
        #[arg(long)]
        backup: bool,
    },
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run folio --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting Folio =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
            info!("Listening on {}:{}", config.server.address, config.server.port);
            server_run(config).await?;
        }
        Command::Build => {
            let report = build_site(&config)?;
            println!("Built {} pages, {} posts, {} photos ({} failed)",
                report.pages, report.posts, report.photos, report.failed);
        }
        Command::ProcessImages => {
            let report = process_images(&config.images, &config.paths.photo_metadata)?;
            println!("Processed {} images ({} failed), {} files written",
                report.processed, report.failed, report.files_written);
        }
        Command::Dedupe { dry_run, backup } => {
            let backup_dir = match (backup, config.images.backup_dir.clone()) {
                (false, _) => None,
                (true, Some(dir)) => Some(dir),
                (true, None) => anyhow::bail!("--backup needs images.backup_dir in {}", CFG_FILE_NAME),
            };
            let options = DedupeOptions { dry_run, backup_dir };
            let report = remove_duplicates(&config.images.originals_dir, &options)?;
            println!("{} duplicate groups, {} removed, {} moved ({} failed)",
                report.groups, report.removed, report.moved, report.failed);
        }
    }

    Ok(())
}
