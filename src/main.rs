use clap::{Parser, Subcommand, ValueEnum};
use sevenziptools::app::{execute, CommandContext, CommandOutcome, Pane, PluginCommand, Window};
use sevenziptools::models::Location;
use sevenziptools::system::LocalFileSystem;
use sevenziptools::ui::{ConsoleHost, DirectoryPane};
use sevenziptools::utils::config::Settings;
use sevenziptools::utils::logging;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "sevenziptools")]
#[command(version, about = "7-Zip extract, compress and hash commands for two panes", long_about = None)]
struct Cli {
    /// Settings file (default: SevenZipTools.json in the config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Left pane directory, or a file to place the cursor on
    #[arg(long, global = true, default_value = ".")]
    left: PathBuf,

    /// Right pane directory, or a file to place the cursor on
    #[arg(long, global = true, default_value = ".")]
    right: PathBuf,

    /// Active pane
    #[arg(long, global = true, value_enum, default_value_t = Side::Left)]
    active: Side,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    Left,
    Right,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract an archive into a new directory in the opposite pane
    Extract {
        /// Archive (default: file under the cursor)
        archive: Option<PathBuf>,
    },
    /// Compress the active pane directory into the opposite pane
    Compress,
    /// Show the hash of a file or directory
    Hash {
        /// Target (default: file under the cursor)
        file: Option<PathBuf>,
    },
    /// Compare the files under the cursor in both panes
    Compare {
        /// Active side file (default: file under the cursor)
        file: Option<PathBuf>,
    },
}

fn target_location(path: Option<PathBuf>) -> Option<Location> {
    path.map(|p| Location::local(p.canonicalize().unwrap_or(p)))
}

fn main() {
    logging::init("warn");

    let cli = Cli::parse();
    let settings = Settings::load(cli.settings.as_deref());

    let (command, target) = match cli.command {
        Commands::Extract { archive } => (PluginCommand::ExtractToOpposite, archive),
        Commands::Compress => (PluginCommand::CompressToOpposite, None),
        Commands::Hash { file } => (PluginCommand::GetHash, file),
        Commands::Compare { file } => (PluginCommand::CompareFiles, file),
    };

    let left = DirectoryPane::from_path(Path::new(&cli.left));
    let right = DirectoryPane::from_path(Path::new(&cli.right));
    let active = match cli.active {
        Side::Left => 0,
        Side::Right => 1,
    };

    let host = ConsoleHost::new();
    let filesystem = LocalFileSystem::new();
    let window = Window::new(vec![&left as &dyn Pane, &right as &dyn Pane], active);
    let ctx = CommandContext::new(&host, &filesystem, window, &settings);

    match execute(&ctx, command, target_location(target)) {
        CommandOutcome::Completed => {}
        CommandOutcome::Aborted => process::exit(2),
        CommandOutcome::Failed => process::exit(1),
    }
}
