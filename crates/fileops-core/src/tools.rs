//! Named tool operations
//!
//! Each tool takes a JSON argument object (camelCase keys) and returns a
//! [`ToolResult`]. Errors never escape [`Toolbox::dispatch`]: they come back
//! as results with `is_error` set and a readable message.

use crate::archive::{self, ArchiveFormat, ArchiveSpec, ExtractionSpec};
use crate::config::Config;
use crate::fsops;
use crate::pages::{self, ImageFormat, ImageOptions, SplitMode};
use crate::report::{render, OperationResult, ReportMeta};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Names accepted by [`Toolbox::dispatch`]
pub const TOOL_NAMES: &[&str] = &[
    "count-files",
    "list-files",
    "copy-files",
    "move-files",
    "create-archive",
    "extract-archive",
    "split-pdf",
    "pdf-to-image",
];

/// Outcome of a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub text: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountFilesArgs {
    pub folder_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesArgs {
    pub folder_path: Option<PathBuf>,
    pub include_hidden: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFilesArgs {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default = "default_true")]
    pub preserve_timestamps: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFilesArgs {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArchiveArgs {
    pub files: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub format: Option<ArchiveFormat>,
    pub compression_level: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractArchiveArgs {
    pub archive_path: PathBuf,
    pub extract_to: PathBuf,
    pub overwrite: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPdfArgs {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    /// Page count reported by the PDF engine
    pub total_pages: u32,
    #[serde(default)]
    pub split_mode: SplitMode,
    #[serde(default)]
    pub ranges: Vec<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfToImageArgs {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    /// Page count reported by the PDF engine
    pub total_pages: u32,
    #[serde(default)]
    pub format: ImageFormat,
    #[serde(default = "default_quality")]
    pub quality: u32,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    pub pages: Option<String>,
    pub prefix: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_quality() -> u32 {
    ImageOptions::default().quality
}

fn default_dpi() -> u32 {
    ImageOptions::default().dpi
}

/// Runs tools against a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Toolbox {
    config: Config,
}

impl Toolbox {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the tool `name` with JSON `args`
    pub fn dispatch(&self, name: &str, args: Value) -> ToolResult {
        debug!("Tool call {} with {}", name, args);

        let outcome = match name {
            "count-files" => parse(args).and_then(|a| self.count_files(a)),
            "list-files" => parse(args).and_then(|a| self.list_files(a)),
            "copy-files" => parse(args).and_then(|a| self.copy_files(a)),
            "move-files" => parse(args).and_then(|a| self.move_files(a)),
            "create-archive" => parse(args).and_then(|a| self.create_archive(a)),
            "extract-archive" => parse(args).and_then(|a| self.extract_archive(a)),
            "split-pdf" => parse(args).and_then(|a| self.split_pdf(a)),
            "pdf-to-image" => parse(args).and_then(|a| self.pdf_to_image(a)),
            _ => {
                return ToolResult::error(format!(
                    "Unknown tool: {} (available: {})",
                    name,
                    TOOL_NAMES.join(", ")
                ))
            }
        };

        match outcome {
            Ok(text) => ToolResult::success(text),
            Err(err) => {
                warn!("Tool {} failed: {}", name, err);
                ToolResult::error(format!("{} failed: {}", name, err))
            }
        }
    }

    pub fn count_files(&self, args: CountFilesArgs) -> Result<String> {
        let folder = args
            .folder_path
            .unwrap_or_else(|| self.config.default_folder());
        let (direct_entries, result) = fsops::count_entries(&folder)?;

        Ok(render(
            &result,
            &ReportMeta::FilesCounted {
                folder: &folder,
                direct_entries,
            },
        ))
    }

    pub fn list_files(&self, args: ListFilesArgs) -> Result<String> {
        let folder = args
            .folder_path
            .unwrap_or_else(|| self.config.default_folder());
        let include_hidden = args
            .include_hidden
            .unwrap_or(self.config.listing.include_hidden);
        let entries = fsops::list_entries(&folder, include_hidden)?;

        Ok(render(
            &OperationResult {
                items_processed: entries.len() as u64,
                ..Default::default()
            },
            &ReportMeta::FilesListed {
                folder: &folder,
                entries: &entries,
            },
        ))
    }

    pub fn copy_files(&self, args: CopyFilesArgs) -> Result<String> {
        let is_dir = args.source_path.is_dir();
        let result = fsops::copy_path(
            &args.source_path,
            &args.target_path,
            args.overwrite,
            args.preserve_timestamps,
        )?;

        Ok(render(
            &result,
            &ReportMeta::Copied {
                source: &args.source_path,
                is_dir,
                preserve_timestamps: args.preserve_timestamps,
            },
        ))
    }

    pub fn move_files(&self, args: MoveFilesArgs) -> Result<String> {
        let is_dir = args.source_path.is_dir();
        let result = fsops::move_path(&args.source_path, &args.target_path, args.overwrite)?;

        Ok(render(
            &result,
            &ReportMeta::Moved {
                source: &args.source_path,
                is_dir,
            },
        ))
    }

    pub fn create_archive(&self, args: CreateArchiveArgs) -> Result<String> {
        let format = args.format.unwrap_or(self.config.archive.default_format);
        let spec = ArchiveSpec::new(args.files, args.output_path)
            .with_format(format)
            .with_level(
                args.compression_level
                    .unwrap_or(self.config.archive.compression_level),
            );
        let result = archive::create(&spec)?;

        Ok(render(
            &result,
            &ReportMeta::ArchiveCreated {
                format,
                inputs: spec.inputs.len(),
            },
        ))
    }

    pub fn extract_archive(&self, args: ExtractArchiveArgs) -> Result<String> {
        let spec = ExtractionSpec::new(&args.archive_path, &args.extract_to)
            .with_overwrite(args.overwrite.unwrap_or(self.config.archive.overwrite));
        let format = ArchiveFormat::detect(&spec.archive_path)?;
        let result = archive::extract(&spec)?;

        Ok(render(
            &result,
            &ReportMeta::ArchiveExtracted {
                archive: &spec.archive_path,
                format,
                target: &spec.target_dir,
            },
        ))
    }

    pub fn split_pdf(&self, args: SplitPdfArgs) -> Result<String> {
        require_file(&args.input_path)?;
        let plan = pages::plan_split(
            &args.input_path,
            &args.output_dir,
            args.total_pages,
            args.split_mode,
            &args.ranges,
            args.prefix.as_deref(),
        )?;

        let result = OperationResult {
            items_processed: plan.outputs.len() as u64,
            output_paths: plan.outputs.iter().map(|o| o.path.clone()).collect(),
            ..Default::default()
        };
        Ok(render(
            &result,
            &ReportMeta::PdfSplit {
                input: &args.input_path,
                plan: &plan,
            },
        ))
    }

    pub fn pdf_to_image(&self, args: PdfToImageArgs) -> Result<String> {
        require_file(&args.input_path)?;
        let options = ImageOptions {
            format: args.format,
            quality: args.quality,
            dpi: args.dpi,
        };
        let plan = pages::plan_images(
            &args.input_path,
            &args.output_dir,
            args.total_pages,
            args.pages.as_deref(),
            options,
            args.prefix.as_deref(),
        )?;

        let result = OperationResult {
            items_processed: plan.outputs.len() as u64,
            output_paths: plan.outputs.clone(),
            ..Default::default()
        };
        Ok(render(
            &result,
            &ReportMeta::PagesSelected {
                input: &args.input_path,
                pages: args.pages.as_deref(),
                plan: &plan,
            },
        ))
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T> {
    // a missing argument object means "all defaults"
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| Error::InvalidArgument(format!("invalid arguments: {}", e)))
}

fn require_file(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(Error::InvalidPath(format!("{} is not a file", path.display()))),
        Err(_) => Err(Error::NotFound(path.to_path_buf())),
    }
}
