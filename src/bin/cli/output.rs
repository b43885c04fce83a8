//! Output formatting for CLI operations.

use serde_json::json;

use pck::progress::format_bytes_iec;
use pck::{ArchiveStats, CommitResult, Entry, EntryTree};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a flat list of entries
    fn format_list(&self, entries: &[Entry]) -> String;

    /// Formats entries as a directory tree
    fn format_tree(&self, tree: &EntryTree, entries: &[Entry]) -> String;

    /// Formats package statistics
    fn format_info(&self, stats: &ArchiveStats, info_text: &str) -> String;

    /// Formats the number of extracted files
    fn format_extract_result(&self, extracted: usize) -> String;

    /// Formats the outcome of a modifying command
    fn format_commit(&self, action: &str, result: &CommitResult, entry_count: usize) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, entries: &[Entry]) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{:>12} {:>12} {}\n",
            "Size", "Stored", "Name"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        let mut total_size: u64 = 0;
        let mut total_stored: u64 = 0;
        for entry in entries {
            total_size += u64::from(entry.size);
            total_stored += u64::from(entry.compressed_size);
            output.push_str(&format!(
                "{:>12} {:>12} {}\n",
                format_bytes_iec(u64::from(entry.size)),
                format_bytes_iec(u64::from(entry.compressed_size)),
                entry.name()
            ));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{} files, {} total, {} stored\n",
            entries.len(),
            format_bytes_iec(total_size),
            format_bytes_iec(total_stored)
        ));

        output
    }

    fn format_tree(&self, tree: &EntryTree, entries: &[Entry]) -> String {
        let mut output = format!("{} files\n", entries.len());
        output.push_str(&"=".repeat(16));
        output.push('\n');
        for (depth, node) in tree.walk() {
            output.push_str(&"\t".repeat(depth));
            output.push_str(&node.name);
            if node.is_dir {
                output.push('\\');
            }
            output.push('\n');
        }
        output
    }

    fn format_info(&self, stats: &ArchiveStats, info_text: &str) -> String {
        let mut output = String::new();

        output.push_str("Package Information:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("  Entries:        {}\n", stats.entry_count));
        output.push_str(&format!(
            "  File size:      {}\n",
            format_bytes_iec(stats.file_size)
        ));
        output.push_str(&format!(
            "  Total size:     {}\n",
            format_bytes_iec(stats.total_size)
        ));
        output.push_str(&format!(
            "  Stored size:    {}\n",
            format_bytes_iec(stats.compressed_size)
        ));
        output.push_str(&format!(
            "  Index size:     {}\n",
            format_bytes_iec(stats.index_size)
        ));
        output.push_str(&format!(
            "  Redundancy:     {} ({:.1}%)\n",
            format_bytes_iec(stats.redundancy),
            stats.redundancy_ratio() * 100.0
        ));
        output.push_str(&format!(
            "  Ratio:          {:.1}%\n",
            stats.compression_ratio() * 100.0
        ));
        output.push_str(&format!(
            "  Overflow file:  {}\n",
            if stats.has_overflow { "Yes" } else { "No" }
        ));
        if !info_text.is_empty() {
            output.push_str(&format!("  Info:           {}\n", info_text));
        }

        output
    }

    fn format_extract_result(&self, extracted: usize) -> String {
        format!("Extracted {} files\n", extracted)
    }

    fn format_commit(&self, action: &str, result: &CommitResult, entry_count: usize) -> String {
        format!(
            "{}: {} added, {} updated, {} deleted; {} entries\n",
            action, result.added, result.updated, result.deleted, entry_count
        )
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, entries: &[Entry]) -> String {
        let items: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "name": e.name(),
                    "offset": e.offset,
                    "size": e.size,
                    "compressed_size": e.compressed_size,
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_tree(&self, tree: &EntryTree, _entries: &[Entry]) -> String {
        fn node_json(node: &pck::TreeNode) -> serde_json::Value {
            json!({
                "name": node.name,
                "path": node.full_path,
                "is_dir": node.is_dir,
                "entry": node.entry,
                "children": node.children.values().map(node_json).collect::<Vec<_>>(),
            })
        }
        let roots: Vec<_> = tree.roots().values().map(node_json).collect();
        serde_json::to_string_pretty(&roots).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_info(&self, stats: &ArchiveStats, info_text: &str) -> String {
        let obj = json!({
            "entry_count": stats.entry_count,
            "file_size": stats.file_size,
            "total_size": stats.total_size,
            "compressed_size": stats.compressed_size,
            "index_size": stats.index_size,
            "redundancy": stats.redundancy,
            "compression_ratio": stats.compression_ratio(),
            "has_overflow": stats.has_overflow,
            "info": info_text,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_extract_result(&self, extracted: usize) -> String {
        let obj = json!({
            "success": true,
            "entries_extracted": extracted,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_commit(&self, action: &str, result: &CommitResult, entry_count: usize) -> String {
        let obj = json!({
            "action": action,
            "added": result.added,
            "updated": result.updated,
            "deleted": result.deleted,
            "renamed": result.renamed,
            "entry_count": entry_count,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}
