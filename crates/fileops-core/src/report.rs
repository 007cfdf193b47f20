//! Human-readable operation summaries

use crate::archive::ArchiveFormat;
use crate::fsops::ListedEntry;
use crate::pages::{ImagePlan, SplitPlan};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Structural outcome of one operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Files written, copied, moved or counted
    pub items_processed: u64,
    /// Bytes read from the inputs
    pub total_bytes_in: u64,
    /// Bytes produced on disk
    pub total_bytes_out: u64,
    /// Paths produced, in order
    pub output_paths: Vec<PathBuf>,
}

impl OperationResult {
    /// Percentage saved between input and output, see [`compression_ratio`]
    pub fn compression_ratio(&self) -> i64 {
        compression_ratio(self.total_bytes_in, self.total_bytes_out)
    }
}

/// What an [`OperationResult`] came from, with the details worth printing
#[derive(Debug, Clone)]
pub enum ReportMeta<'a> {
    ArchiveCreated {
        format: ArchiveFormat,
        inputs: usize,
    },
    ArchiveExtracted {
        archive: &'a Path,
        format: ArchiveFormat,
        target: &'a Path,
    },
    FilesCounted {
        folder: &'a Path,
        direct_entries: u64,
    },
    FilesListed {
        folder: &'a Path,
        entries: &'a [ListedEntry],
    },
    Copied {
        source: &'a Path,
        is_dir: bool,
        preserve_timestamps: bool,
    },
    Moved {
        source: &'a Path,
        is_dir: bool,
    },
    PdfSplit {
        input: &'a Path,
        plan: &'a SplitPlan,
    },
    PagesSelected {
        input: &'a Path,
        pages: Option<&'a str>,
        plan: &'a ImagePlan,
    },
}

/// `round((1 - compressed / original) * 100)`, or 0 for an empty original
pub fn compression_ratio(original: u64, compressed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    ((1.0 - compressed as f64 / original as f64) * 100.0).round() as i64
}

/// Bytes to whole kilobytes, rounded
pub fn kb(bytes: u64) -> u64 {
    (bytes as f64 / 1024.0).round() as u64
}

/// Render a summary. Never fails.
pub fn render(result: &OperationResult, meta: &ReportMeta<'_>) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = render_into(&mut out, result, meta);
    out.truncate(out.trim_end().len());
    out
}

fn render_into(out: &mut String, result: &OperationResult, meta: &ReportMeta<'_>) -> std::fmt::Result {
    let first_output = result
        .output_paths
        .first()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    match meta {
        ReportMeta::ArchiveCreated { format, inputs } => {
            writeln!(out, "Archive created!")?;
            writeln!(out, "Archive: {}", first_output)?;
            writeln!(out, "Format: {}", format.label())?;
            writeln!(out, "Original size: {}KB", kb(result.total_bytes_in))?;
            writeln!(out, "Compressed size: {}KB", kb(result.total_bytes_out))?;
            if result.total_bytes_in == 0 {
                writeln!(out, "Compression ratio: 0% (empty input)")?;
            } else {
                writeln!(out, "Compression ratio: {}%", result.compression_ratio())?;
            }
            writeln!(out, "Inputs: {}", inputs)?;
            writeln!(out, "Files: {}", result.items_processed)?;
        }
        ReportMeta::ArchiveExtracted {
            archive,
            format,
            target,
        } => {
            writeln!(out, "Extraction complete!")?;
            writeln!(out, "Archive: {}", archive.display())?;
            writeln!(out, "Format: {}", format.label())?;
            writeln!(out, "Extracted to: {}", target.display())?;
            writeln!(out, "Files extracted: {}", result.items_processed)?;
            writeln!(out, "Total size: {}KB", kb(result.total_bytes_out))?;
        }
        ReportMeta::FilesCounted {
            folder,
            direct_entries,
        } => {
            writeln!(
                out,
                "Folder {} contains {} files/folders",
                folder.display(),
                direct_entries
            )?;
            writeln!(
                out,
                "Files in the whole tree: {} ({}KB)",
                result.items_processed,
                kb(result.total_bytes_in)
            )?;
        }
        ReportMeta::FilesListed { folder, entries } => {
            if entries.is_empty() {
                writeln!(out, "Folder {} is empty", folder.display())?;
            } else {
                writeln!(out, "Contents of {}:", folder.display())?;
                for entry in entries.iter() {
                    if entry.is_dir {
                        writeln!(out, "- {} (folder, -)", entry.name)?;
                    } else {
                        writeln!(out, "- {} (file, {}KB)", entry.name, kb(entry.size))?;
                    }
                }
            }
        }
        ReportMeta::Copied {
            source,
            is_dir,
            preserve_timestamps,
        } => {
            writeln!(out, "Copy complete!")?;
            writeln!(out, "Source: {}", source.display())?;
            writeln!(out, "Target: {}", first_output)?;
            writeln!(out, "Type: {}", if *is_dir { "folder" } else { "file" })?;
            writeln!(out, "Size: {}KB", kb(result.total_bytes_in))?;
            if *is_dir {
                writeln!(out, "Files: {}", result.items_processed)?;
            }
            writeln!(
                out,
                "Timestamps preserved: {}",
                if *preserve_timestamps { "yes" } else { "no" }
            )?;
        }
        ReportMeta::Moved { source, is_dir } => {
            writeln!(out, "Move complete!")?;
            writeln!(out, "Source: {}", source.display())?;
            writeln!(out, "Target: {}", first_output)?;
            writeln!(out, "Type: {}", if *is_dir { "folder" } else { "file" })?;
            writeln!(out, "Size: {}KB", kb(result.total_bytes_in))?;
            if *is_dir {
                writeln!(out, "Files: {}", result.items_processed)?;
            }
        }
        ReportMeta::PdfSplit { input, plan } => {
            writeln!(out, "PDF split planned ({} mode)", plan.mode)?;
            writeln!(out, "Input: {}", input.display())?;
            writeln!(out, "Output directory: {}", plan.output_dir.display())?;
            writeln!(out, "Source pages: {}", plan.total_pages)?;
            writeln!(out, "Output files: {}", plan.outputs.len())?;
            for (i, output) in plan.outputs.iter().enumerate() {
                writeln!(
                    out,
                    "  {}. {} (pages {}-{}, {} pages)",
                    i + 1,
                    output.file_name,
                    output.span.start,
                    output.span.end,
                    output.span.len()
                )?;
            }
        }
        ReportMeta::PagesSelected { input, pages, plan } => {
            writeln!(out, "PDF to image planned")?;
            writeln!(out, "Input: {}", input.display())?;
            writeln!(out, "Output directory: {}", plan.output_dir.display())?;
            writeln!(
                out,
                "Format: {} (quality {}%, {} DPI)",
                plan.format.label(),
                plan.quality,
                plan.dpi
            )?;
            match pages {
                Some(spec) => writeln!(out, "Pages: {}", spec)?,
                None => writeln!(out, "Pages: all")?,
            }
            writeln!(out, "Images: {}", plan.outputs.len())?;
            for (i, path) in plan.outputs.iter().enumerate() {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                writeln!(out, "  {}. {}", i + 1, name)?;
            }
        }
    }

    Ok(())
}
