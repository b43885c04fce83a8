//! CLI tool for Angelica package archives.

mod commands;
mod exit_codes;
mod list_filter;
mod output;
mod progress;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use pck::AtomicProgress;

use exit_codes::ExitCode;

/// Angelica package (.pck/.pkx) tool
#[derive(Parser)]
#[command(name = "pcktool")]
#[command(author, version, about = "Angelica package (.pck/.pkx) tool", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Number of extraction threads (0 = auto)
    #[arg(long, short = 't', default_value = "0", global = true)]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract files from a package (alias: x)
    #[command(alias = "x")]
    Extract {
        /// Package to extract
        archive: PathBuf,

        /// Extract only this entry
        entry: Option<String>,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// List file of entries and directories (ending in `\`) to skip
        #[arg(short = 'e', long, conflicts_with = "entry")]
        exclude_list: Option<PathBuf>,

        /// List file of entries and directories to extract even if excluded
        #[arg(short = 'k', long, conflicts_with = "entry")]
        keep_list: Option<PathBuf>,
    },

    /// Create a package from a directory (alias: c)
    #[command(alias = "c")]
    Create {
        /// Package file to create
        archive: PathBuf,

        /// Directory to compress
        dir: PathBuf,

        /// Do not prefix entry names with the directory's own name
        #[arg(long)]
        no_dir_name: bool,

        /// Compression level (0-9)
        #[arg(short = 'l', long, default_value = "6")]
        level: u32,

        /// Replace the package if it exists
        #[arg(long)]
        overwrite: bool,
    },

    /// List package contents (alias: l)
    #[command(alias = "l")]
    List {
        /// Package file to list
        archive: PathBuf,

        /// Show entries as a directory tree
        #[arg(long)]
        tree: bool,
    },

    /// Add or update a file (alias: a)
    #[command(alias = "a")]
    Add {
        /// Package to modify
        archive: PathBuf,

        /// File on disk
        file: PathBuf,

        /// Entry name inside the package
        name: String,
    },

    /// Delete an entry (alias: d)
    #[command(alias = "d")]
    Delete {
        /// Package to modify
        archive: PathBuf,

        /// Entry name inside the package
        name: String,
    },

    /// Rebuild a package, dropping unused space and duplicate names (alias: r)
    #[command(alias = "r")]
    Rebuild {
        /// Package to read
        archive: PathBuf,

        /// Package to write
        output: PathBuf,

        /// Replace the output if it exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Show package statistics (alias: i)
    #[command(alias = "i")]
    Info {
        /// Package file to inspect
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    // Ctrl+C cancels the running operation through its progress reporter.
    let cancel = AtomicProgress::shared();
    let handler_cancel = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_cancel.is_cancelled() {
            eprintln!("\nInterrupted");
            std::process::exit(ExitCode::UserInterrupt.code());
        }
        handler_cancel.cancel();
    })
    .ok();

    let exit_code = match cli.command {
        Commands::Extract {
            archive,
            entry,
            output,
            exclude_list,
            keep_list,
        } => commands::extract(&commands::ExtractConfig {
            archive_path: &archive,
            entry: entry.as_deref(),
            output_dir: &output,
            exclude_list: exclude_list.as_deref(),
            keep_list: keep_list.as_deref(),
            format: cli.format,
            quiet: cli.quiet,
            thread_count: cli.threads,
            cancel: &cancel,
        }),

        Commands::Create {
            archive,
            dir,
            no_dir_name,
            level,
            overwrite,
        } => commands::create(&commands::CreateConfig {
            archive_path: &archive,
            source_dir: &dir,
            use_dir_name: !no_dir_name,
            level,
            overwrite,
            format: cli.format,
            quiet: cli.quiet,
            cancel: &cancel,
        }),

        Commands::List { archive, tree } => commands::list(&archive, tree, cli.format),

        Commands::Add {
            archive,
            file,
            name,
        } => commands::add(&archive, &file, &name, cli.format),

        Commands::Delete { archive, name } => commands::delete(&archive, &name, cli.format),

        Commands::Rebuild {
            archive,
            output,
            overwrite,
        } => commands::rebuild(&archive, &output, overwrite, cli.format, cli.quiet, &cancel),

        Commands::Info { archive } => commands::info(&archive, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
