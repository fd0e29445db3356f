mod auth;
mod cache;
mod cache_cmd;
mod client;
mod config;
mod create_album_cmd;
mod fetch;
mod fs;
mod index;
mod label;
mod label_cmd;
mod missing_local_cmd;
mod missing_remote_cmd;
mod reconcile;
mod reconcile_cmd;
mod sort_local_cmd;
mod space_saver_cmd;
mod test_util;
mod types;

use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Path to the JSON config file
    #[arg(short, long, default_value = "config/config.json")]
    config: String,

    /// If true, don't do anything, just print what would be done.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare an album against one local folder, both directions
    Reconcile {
        #[arg(short, long, help = "Local folder to compare")]
        root_dir: String,

        #[arg(short, long, help = "Title of the album to compare against")]
        album_title: String,
    },
    /// List remote library items with no local file
    MissingLocal,
    /// List local files with no remote library item
    MissingRemote {
        #[arg(short, long, help = "Local folder tree to check")]
        root_dir: String,
    },
    /// Insert one text label per local folder into an album
    Label {
        #[arg(short, long, help = "Local folder tree the album mirrors")]
        root_dir: String,

        #[arg(short, long, help = "Title of the album to label")]
        album_title: String,

        #[arg(long, help = "Actually insert the labels instead of printing the plan")]
        create: bool,
    },
    /// Create a new empty album
    CreateAlbum {
        #[arg(short, long)]
        title: String,
    },
    /// Refetch the full library listing into the on-disk cache
    RefreshCache,
    /// Move loose files under a folder into per-date subfolders
    SortLocal {
        #[arg(short, long, help = "Folder holding the loose files")]
        root_dir: String,
    },
    /// List remote-only items newer than the free-before date
    SpaceSaver,
}

fn main() {
    match go() {
        Ok(_) => {}
        Err(e) => {
            error!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn go() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let dry_run = cli.dry_run;
    let tracing_level = match cli.debug {
        0 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .init();
    if tracing_level == tracing::Level::DEBUG {
        info!("Debug mode is on");
    }

    let cfg = config::Config::load(&cli.config)?;
    match cli.command {
        Commands::Reconcile {
            root_dir,
            album_title,
        } => reconcile_cmd::main(&cfg, &root_dir, &album_title)?,
        Commands::MissingLocal => missing_local_cmd::main(&cfg)?,
        Commands::MissingRemote { root_dir } => missing_remote_cmd::main(&cfg, &root_dir)?,
        Commands::Label {
            root_dir,
            album_title,
            create,
        } => label_cmd::main(&cfg, &root_dir, &album_title, create)?,
        Commands::CreateAlbum { title } => create_album_cmd::main(&cfg, &title)?,
        Commands::RefreshCache => cache_cmd::main(&cfg)?,
        Commands::SortLocal { root_dir } => sort_local_cmd::main(&cfg, &root_dir, dry_run)?,
        Commands::SpaceSaver => space_saver_cmd::main(&cfg)?,
    }

    Ok(())
}
