//! fileops-cli - Command-line interface for fileops
//!
//! Every subcommand runs one fileops operation and prints its summary:
//! - counting and listing folders, copying and moving trees
//! - packing and unpacking ZIP, TAR and TAR.GZ archives
//! - planning PDF splits and page images
//! - calling any tool by name with a JSON argument object

use anyhow::Result;
use clap::{Parser, Subcommand};
use fileops_core::pages::{ImageFormat, SplitMode};
use fileops_core::tools::{
    CopyFilesArgs, CountFilesArgs, CreateArchiveArgs, ExtractArchiveArgs, ListFilesArgs,
    MoveFilesArgs, PdfToImageArgs, SplitPdfArgs,
};
use fileops_core::{ArchiveFormat, Config, Toolbox};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// fileops - file tree and archive operations
#[derive(Parser)]
#[command(name = "fileops")]
#[command(author, version, about = "File tree and archive operations", long_about = None)]
struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this configuration file instead of the default one
    #[arg(long, global = true, env = "FILEOPS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the entries of a folder
    Count {
        /// Folder to count (defaults to the configured folder)
        folder: Option<PathBuf>,
    },

    /// List the entries of a folder
    List {
        /// Folder to list (defaults to the configured folder)
        folder: Option<PathBuf>,

        /// Include dot-files
        #[arg(short = 'a', long)]
        all: bool,
    },

    /// Copy a file or folder
    Copy {
        source: PathBuf,
        target: PathBuf,

        /// Replace or merge into an existing target
        #[arg(long)]
        overwrite: bool,

        /// Do not carry over access and modification times
        #[arg(long)]
        no_preserve_timestamps: bool,
    },

    /// Move a file or folder
    Move {
        source: PathBuf,
        target: PathBuf,

        /// Replace an existing target
        #[arg(long)]
        overwrite: bool,
    },

    /// Pack files and folders into an archive
    Pack {
        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output archive file
        #[arg(short, long)]
        output: PathBuf,

        /// Archive format (zip, tar, tar.gz)
        #[arg(short, long)]
        format: Option<ArchiveFormat>,

        /// Compression level (0-9)
        #[arg(long)]
        level: Option<u32>,
    },

    /// Extract an archive
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory (defaults to the archive name without its suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extract into a directory that already has files
        #[arg(long)]
        overwrite: bool,
    },

    /// Plan PDF page outputs
    Pages {
        #[command(subcommand)]
        command: PagesCommand,
    },

    /// Run a tool by name with a JSON argument object
    Call {
        /// Tool name, e.g. create-archive
        tool: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,

        /// Print the tool result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long, conflicts_with = "path")]
        show: bool,

        /// Show configuration file path
        #[arg(long, conflicts_with = "show")]
        path: bool,
    },
}

#[derive(Subcommand)]
enum PagesCommand {
    /// Plan the files produced by splitting a PDF
    Split {
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Number of pages in the document
        #[arg(long)]
        total_pages: u32,

        /// Ranges such as 1-3; one output per range (default: one per page)
        #[arg(short, long)]
        range: Vec<String>,

        /// Output name prefix (defaults to the input name)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Plan the images rendered from a PDF
    Images {
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Number of pages in the document
        #[arg(long)]
        total_pages: u32,

        /// Pages to render: 3, 1,3,5 or 2-6 (default: all)
        #[arg(long)]
        pages: Option<String>,

        /// Image format (jpeg, png)
        #[arg(short, long, default_value = "jpeg", value_parser = parse_image_format)]
        format: ImageFormat,

        /// JPEG quality (1-100)
        #[arg(long, default_value_t = 80)]
        quality: u32,

        /// Resolution (50-600)
        #[arg(long, default_value_t = 150)]
        dpi: u32,

        /// Output name prefix (defaults to the input name)
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn parse_image_format(s: &str) -> std::result::Result<ImageFormat, String> {
    match s.to_lowercase().as_str() {
        "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        other => Err(format!("unsupported image format: {} (use jpeg or png)", other)),
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let result = run();

    match result {
        Ok(_) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);

            let exit_code = map_error_to_exit_code(&e);
            process::exit(exit_code);
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from(path)?),
        None => Ok(Config::load_or_default()),
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_ref())?;
    debug!("Using configuration: {:?}", config);
    let toolbox = Toolbox::new(config);

    let text = match cli.command {
        Commands::Count { folder } => toolbox.count_files(CountFilesArgs {
            folder_path: folder,
        })?,

        Commands::List { folder, all } => toolbox.list_files(ListFilesArgs {
            folder_path: folder,
            include_hidden: all.then_some(true),
        })?,

        Commands::Copy {
            source,
            target,
            overwrite,
            no_preserve_timestamps,
        } => toolbox.copy_files(CopyFilesArgs {
            source_path: source,
            target_path: target,
            overwrite,
            preserve_timestamps: !no_preserve_timestamps,
        })?,

        Commands::Move {
            source,
            target,
            overwrite,
        } => toolbox.move_files(MoveFilesArgs {
            source_path: source,
            target_path: target,
            overwrite,
        })?,

        Commands::Pack {
            inputs,
            output,
            format,
            level,
        } => {
            // an unnamed format follows the output suffix when it has a known one
            let format = format.or_else(|| ArchiveFormat::detect(&output).ok());
            toolbox.create_archive(CreateArchiveArgs {
                files: inputs,
                output_path: output,
                format,
                compression_level: level,
            })?
        }

        Commands::Extract {
            archive,
            output,
            overwrite,
        } => toolbox.extract_archive(ExtractArchiveArgs {
            extract_to: output.unwrap_or_else(|| default_extract_dir(&archive)),
            archive_path: archive,
            overwrite: overwrite.then_some(true),
        })?,

        Commands::Pages { command } => match command {
            PagesCommand::Split {
                input,
                output,
                total_pages,
                range,
                prefix,
            } => toolbox.split_pdf(SplitPdfArgs {
                input_path: input,
                output_dir: output,
                total_pages,
                split_mode: if range.is_empty() {
                    SplitMode::Pages
                } else {
                    SplitMode::Ranges
                },
                ranges: range,
                prefix,
            })?,

            PagesCommand::Images {
                input,
                output,
                total_pages,
                pages,
                format,
                quality,
                dpi,
                prefix,
            } => toolbox.pdf_to_image(PdfToImageArgs {
                input_path: input,
                output_dir: output,
                total_pages,
                format,
                quality,
                dpi,
                pages,
                prefix,
            })?,
        },

        Commands::Call { tool, args, json } => {
            let args: serde_json::Value = serde_json::from_str(&args)
                .map_err(|e| anyhow::anyhow!("invalid JSON arguments: {}", e))?;
            let result = toolbox.dispatch(&tool, args);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if !result.is_error {
                println!("{}", result.text);
            }

            if result.is_error {
                anyhow::bail!("{}", result.text);
            }
            return Ok(());
        }

        Commands::Config { show, path } => {
            let config_path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };

            if path {
                println!("{}", config_path.display());
            } else if show {
                println!("{}", toml::to_string_pretty(toolbox.config())?);
            } else {
                eprintln!("Please specify --show or --path");
            }
            return Ok(());
        }
    };

    println!("{}", text);
    Ok(())
}

/// `bundle` for `bundle.tar.gz`, relative to the working directory
fn default_extract_dir(archive: &Path) -> PathBuf {
    ArchiveFormat::stem(archive)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Map errors to exit codes:
/// - 0: Success
/// - 1: General or configuration error
/// - 2: IO error or missing path
/// - 3: Invalid input
/// - 4: Archive failure
fn map_error_to_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(core_err) = err.downcast_ref::<fileops_core::Error>() {
        match core_err {
            fileops_core::Error::Io(_) => 2,
            fileops_core::Error::NotFound(_) => 2,
            fileops_core::Error::AlreadyExists(_) => 3,
            fileops_core::Error::TargetNotEmpty(_) => 3,
            fileops_core::Error::UnsupportedFormat(_) => 3,
            fileops_core::Error::InvalidRangeSyntax { .. } => 3,
            fileops_core::Error::InvalidPath(_) => 3,
            fileops_core::Error::InvalidArgument(_) => 3,
            fileops_core::Error::ArchiveWrite(_) => 4,
            fileops_core::Error::ArchiveRead(_) => 4,
            fileops_core::Error::Config(_) => 1,
        }
    } else if err.is::<std::io::Error>() {
        2
    } else if err.to_string().contains("invalid") {
        3
    } else {
        1
    }
}
