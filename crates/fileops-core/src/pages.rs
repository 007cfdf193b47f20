//! PDF page selection planning
//!
//! Splitting a PDF and rasterising its pages are done by an external PDF
//! engine. This module decides which pages go into which output file and
//! what those files are called, using the range language from
//! [`crate::range`].

use crate::range::{self, PageSpan};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How a document is split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// One output per page
    #[default]
    Pages,
    /// One output per requested range
    Ranges,
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitMode::Pages => write!(f, "pages"),
            SplitMode::Ranges => write!(f, "ranges"),
        }
    }
}

/// One planned split output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    pub span: PageSpan,
    pub file_name: String,
    pub path: PathBuf,
}

/// Planned split of a document
#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub mode: SplitMode,
    pub output_dir: PathBuf,
    pub total_pages: u32,
    pub outputs: Vec<SplitOutput>,
}

/// Plan the outputs of splitting `input`.
///
/// In pages mode every page becomes `{prefix}_page_NNN.pdf`; in ranges mode
/// each range becomes `{prefix}_pages_{start}-{end}.pdf`. The prefix
/// defaults to the input's name without `.pdf`.
pub fn plan_split(
    input: &Path,
    output_dir: &Path,
    total_pages: u32,
    mode: SplitMode,
    ranges: &[String],
    prefix: Option<&str>,
) -> Result<SplitPlan> {
    let base = base_name(input, prefix)?;
    if total_pages == 0 {
        return Err(Error::InvalidArgument("PDF has no pages".to_string()));
    }

    let outputs = match mode {
        SplitMode::Pages => (1..=total_pages)
            .map(|page| {
                let file_name = format!("{}_page_{:03}.pdf", base, page);
                SplitOutput {
                    span: PageSpan {
                        start: page,
                        end: page,
                    },
                    path: output_dir.join(&file_name),
                    file_name,
                }
            })
            .collect(),
        SplitMode::Ranges => {
            if ranges.is_empty() {
                return Err(Error::InvalidArgument(
                    "ranges mode needs at least one range, e.g. [\"1-3\", \"4-6\"]".to_string(),
                ));
            }
            ranges
                .iter()
                .map(|spec| {
                    let span = range::parse_span(spec, total_pages)?;
                    let file_name = format!("{}_pages_{}-{}.pdf", base, span.start, span.end);
                    Ok(SplitOutput {
                        span,
                        path: output_dir.join(&file_name),
                        file_name,
                    })
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    Ok(SplitPlan {
        mode,
        output_dir: output_dir.to_path_buf(),
        total_pages,
        outputs,
    })
}

/// Raster format for page images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }
}

/// Rendering settings handed to the PDF engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    pub format: ImageFormat,
    /// 1-100, only meaningful for JPEG
    pub quality: u32,
    /// 50-600
    pub dpi: u32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            quality: 80,
            dpi: 150,
        }
    }
}

impl ImageOptions {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(Error::InvalidArgument(format!(
                "quality {} is outside 1-100",
                self.quality
            )));
        }
        if !(50..=600).contains(&self.dpi) {
            return Err(Error::InvalidArgument(format!(
                "dpi {} is outside 50-600",
                self.dpi
            )));
        }
        Ok(())
    }
}

/// Planned page rasterisation
#[derive(Debug, Clone)]
pub struct ImagePlan {
    pub format: ImageFormat,
    pub quality: u32,
    pub dpi: u32,
    pub output_dir: PathBuf,
    /// Pages to render, in request order
    pub pages: Vec<u32>,
    /// One output per entry of `pages`: `{prefix}.{page}.{ext}`
    pub outputs: Vec<PathBuf>,
}

/// Plan which pages of `input` to render. `pages` of `None` means all.
pub fn plan_images(
    input: &Path,
    output_dir: &Path,
    total_pages: u32,
    pages: Option<&str>,
    options: ImageOptions,
    prefix: Option<&str>,
) -> Result<ImagePlan> {
    let base = base_name(input, prefix)?;
    options.validate()?;
    if total_pages == 0 {
        return Err(Error::InvalidArgument("PDF has no pages".to_string()));
    }

    let pages = match pages {
        Some(spec) => range::parse(spec, total_pages)?,
        None => (1..=total_pages).collect(),
    };
    let outputs = pages
        .iter()
        .map(|page| output_dir.join(format!("{}.{}.{}", base, page, options.format.extension())))
        .collect();

    Ok(ImagePlan {
        format: options.format,
        quality: options.quality,
        dpi: options.dpi,
        output_dir: output_dir.to_path_buf(),
        pages,
        outputs,
    })
}

fn base_name(input: &Path, prefix: Option<&str>) -> Result<String> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !name.to_lowercase().ends_with(".pdf") {
        return Err(Error::UnsupportedFormat(format!(
            "{} is not a PDF file",
            input.display()
        )));
    }

    match prefix {
        Some(prefix) if !prefix.is_empty() => Ok(prefix.to_string()),
        _ => Ok(name[..name.len() - 4].to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_mode() {
        let plan = plan_split(
            Path::new("in/report.pdf"),
            Path::new("out"),
            3,
            SplitMode::Pages,
            &[],
            None,
        )
        .unwrap();

        let names: Vec<_> = plan.outputs.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["report_page_001.pdf", "report_page_002.pdf", "report_page_003.pdf"]
        );
        assert_eq!(plan.outputs[1].path, PathBuf::from("out/report_page_002.pdf"));
    }

    #[test]
    fn test_split_ranges_mode() {
        let ranges = vec!["1-3".to_string(), "5".to_string()];
        let plan = plan_split(
            Path::new("book.PDF"),
            Path::new("out"),
            6,
            SplitMode::Ranges,
            &ranges,
            Some("part"),
        )
        .unwrap();

        assert_eq!(plan.outputs[0].file_name, "part_pages_1-3.pdf");
        assert_eq!(plan.outputs[0].span.len(), 3);
        assert_eq!(plan.outputs[1].file_name, "part_pages_5-5.pdf");
    }

    #[test]
    fn test_split_rejections() {
        let out = Path::new("out");
        assert!(matches!(
            plan_split(Path::new("a.txt"), out, 3, SplitMode::Pages, &[], None),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            plan_split(Path::new("a.pdf"), out, 0, SplitMode::Pages, &[], None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            plan_split(Path::new("a.pdf"), out, 3, SplitMode::Ranges, &[], None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            plan_split(
                Path::new("a.pdf"),
                out,
                3,
                SplitMode::Ranges,
                &["2-4".to_string()],
                None
            ),
            Err(Error::InvalidRangeSyntax { .. })
        ));
    }

    #[test]
    fn test_plan_images() {
        let plan = plan_images(
            Path::new("deck.pdf"),
            Path::new("img"),
            10,
            Some("1,3,5"),
            ImageOptions {
                format: ImageFormat::Png,
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(plan.pages, vec![1, 3, 5]);
        assert_eq!(plan.outputs[2], PathBuf::from("img/deck.5.png"));

        let all = plan_images(
            Path::new("deck.pdf"),
            Path::new("img"),
            4,
            None,
            ImageOptions::default(),
            Some("slide"),
        )
        .unwrap();
        assert_eq!(all.pages, vec![1, 2, 3, 4]);
        assert_eq!(all.outputs[0], PathBuf::from("img/slide.1.jpeg"));
    }

    #[test]
    fn test_image_options_bounds() {
        let options = ImageOptions {
            dpi: 20,
            ..Default::default()
        };
        assert!(plan_images(Path::new("a.pdf"), Path::new("o"), 2, None, options, None).is_err());
        assert!(matches!(
            plan_images(
                Path::new("a.pdf"),
                Path::new("o"),
                2,
                Some("3"),
                ImageOptions::default(),
                None
            ),
            Err(Error::InvalidRangeSyntax { .. })
        ));
    }
}
