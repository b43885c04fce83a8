//! Command implementations for the CLI tool.

use std::path::Path;
use std::sync::Arc;

use pck::progress::NoProgress;
use pck::{Archive, ArchiveOptions, AtomicProgress, Error, ExtractOptions, Threads};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::list_filter::{ListFilter, NameList};
use crate::output::create_formatter;
use crate::progress::CliProgress;

/// Configuration for the extract command.
pub struct ExtractConfig<'a> {
    pub archive_path: &'a Path,
    pub entry: Option<&'a str>,
    pub output_dir: &'a Path,
    pub exclude_list: Option<&'a Path>,
    pub keep_list: Option<&'a Path>,
    pub format: OutputFormat,
    pub quiet: bool,
    pub thread_count: usize,
    pub cancel: &'a Arc<AtomicProgress>,
}

/// Configuration for the create command.
pub struct CreateConfig<'a> {
    pub archive_path: &'a Path,
    pub source_dir: &'a Path,
    pub use_dir_name: bool,
    pub level: u32,
    pub overwrite: bool,
    pub format: OutputFormat,
    pub quiet: bool,
    pub cancel: &'a Arc<AtomicProgress>,
}

/// Prints a one-line failure message and maps the error to an exit code.
fn fail(context: &str, error: &Error) -> ExitCode {
    eprintln!("Error: {}: {}", context, error);
    error_to_exit_code(error)
}

/// Prints formatted output, ending it with exactly one newline.
fn emit(text: &str) {
    println!("{}", text.trim_end());
}

/// Extract command implementation
pub fn extract(config: &ExtractConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let archive = match open_archive(config.archive_path, true) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Some(name) = config.entry {
        let entry = match archive.entry_by_name(name) {
            Ok(e) => e,
            Err(e) => return fail("extract", &e),
        };
        return match archive.extract_entry(entry, config.output_dir) {
            Ok(_) => {
                emit(&formatter.format_extract_result(1));
                ExitCode::Success
            }
            Err(e) => fail("extract", &e),
        };
    }

    let exclude = match config.exclude_list.map(NameList::load).transpose() {
        Ok(list) => list.unwrap_or_default(),
        Err(e) => return fail("reading exclude list", &Error::Io(e)),
    };
    let keep = match config.keep_list.map(NameList::load).transpose() {
        Ok(list) => list.unwrap_or_default(),
        Err(e) => return fail("reading keep list", &Error::Io(e)),
    };
    let filter = ListFilter::new(exclude, keep);

    let threads = match config.thread_count {
        0 => Threads::Auto,
        n => Threads::count_or_single(n),
    };
    let options = ExtractOptions::new().threads(threads);

    let mut progress = CliProgress::new("files", config.quiet, config.cancel);
    progress.set_message("Extracting...");

    match archive.extract_where(config.output_dir, &filter, &options, &mut progress) {
        Ok(count) => {
            progress.finish();
            emit(&formatter.format_extract_result(count));
            ExitCode::Success
        }
        Err(e) => {
            progress.finish_with_message("Failed");
            fail("extract", &e)
        }
    }
}

/// Create command implementation
pub fn create(config: &CreateConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let options = match ArchiveOptions::new().read_only(false).level(config.level) {
        Ok(o) => o,
        Err(e) => return fail("create", &e),
    };

    let mut progress = CliProgress::new("files", config.quiet, config.cancel);
    progress.set_message("Compressing...");

    match Archive::create_from_directory(
        config.archive_path,
        config.source_dir,
        config.use_dir_name,
        config.overwrite,
        &options,
        &mut progress,
    ) {
        Ok(archive) => {
            progress.finish();
            let result = pck::CommitResult {
                added: archive.len(),
                ..Default::default()
            };
            emit(&formatter.format_commit("create", &result, archive.len()));
            ExitCode::Success
        }
        Err(e) => {
            progress.finish_with_message("Failed");
            fail("create", &e)
        }
    }
}

/// List command implementation
pub fn list(archive_path: &Path, tree: bool, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let archive = match open_archive(archive_path, true) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if tree {
        emit(&formatter.format_tree(&archive.tree(), archive.entries()));
    } else {
        emit(&formatter.format_list(archive.entries()));
    }

    ExitCode::Success
}

/// Add command implementation
pub fn add(archive_path: &Path, file: &Path, name: &str, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let mut archive = match open_archive(archive_path, false) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = archive
        .begin_transaction()
        .and_then(|()| archive.add_file(file, name))
        .and_then(|()| archive.commit_transaction(&mut NoProgress));
    match result {
        Ok(result) => {
            emit(&formatter.format_commit("add", &result, archive.len()));
            ExitCode::Success
        }
        Err(e) => fail("add", &e),
    }
}

/// Delete command implementation
///
/// A missing entry is reported but is not a failure.
pub fn delete(archive_path: &Path, name: &str, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let mut archive = match open_archive(archive_path, false) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let Some(id) = archive.find(name).map(|e| e.id) else {
        eprintln!("Entry not found: {}", name);
        return ExitCode::Success;
    };

    let result = archive
        .begin_transaction()
        .and_then(|()| archive.delete(id))
        .and_then(|()| archive.commit_transaction(&mut NoProgress));
    match result {
        Ok(result) => {
            emit(&formatter.format_commit("delete", &result, archive.len()));
            ExitCode::Success
        }
        Err(e) => fail("delete", &e),
    }
}

/// Rebuild command implementation
pub fn rebuild(
    archive_path: &Path,
    output: &Path,
    overwrite: bool,
    format: OutputFormat,
    quiet: bool,
    cancel: &Arc<AtomicProgress>,
) -> ExitCode {
    let formatter = create_formatter(format);

    let mut progress = CliProgress::new("entries", quiet, cancel);
    progress.set_message("Rebuilding...");

    match Archive::rebuild(archive_path, output, overwrite, &mut progress) {
        Ok(archive) => {
            progress.finish();
            emit(&formatter.format_info(&archive.stats(), &archive.info_text()));
            ExitCode::Success
        }
        Err(e) => {
            progress.finish_with_message("Failed");
            fail("rebuild", &e)
        }
    }
}

/// Info command implementation
pub fn info(archive_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let archive = match open_archive(archive_path, true) {
        Ok(a) => a,
        Err(code) => return code,
    };

    emit(&formatter.format_info(&archive.stats(), &archive.info_text()));

    ExitCode::Success
}

/// Helper to open a package read-only or writable
fn open_archive(path: &Path, read_only: bool) -> Result<Archive, ExitCode> {
    let options = ArchiveOptions::new().read_only(read_only);
    Archive::open_with_options(path, &options).map_err(|e| {
        eprintln!("Error opening package: {}", e);
        error_to_exit_code(&e)
    })
}
