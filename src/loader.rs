//! PDF directory loader.
//!
//! Reads every `.pdf` file at the top level of the configured directory and
//! turns each non-empty page into a [`DocumentPage`] tagged with its file
//! name and 1-based page number. Anything that is not a PDF is ignored.

use anyhow::{bail, Context, Result};
use std::path::Path;
use walkdir::WalkDir;

use crate::extract::extract_pages;
use crate::models::{DocumentPage, PageMetadata};

/// Loads all PDF pages under `dir`, sorted by file name then page.
///
/// A missing directory or a PDF that cannot be parsed aborts the whole load.
pub fn load_pdf_pages(dir: &Path) -> Result<Vec<DocumentPage>> {
    if !dir.is_dir() {
        bail!("PDF directory does not exist: {}", dir.display());
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut pages = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().is_file() || !is_pdf(entry.path()) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        let bytes = std::fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        let page_texts = extract_pages(&bytes)
            .with_context(|| format!("Failed to extract text from {}", file_name))?;

        pages.extend(pages_from_texts(&file_name, page_texts));
    }

    let total_chars: usize = pages.iter().map(|p| p.text.chars().count()).sum();
    tracing::info!(
        dir = %dir.display(),
        pages = pages.len(),
        total_chars,
        "loaded PDF pages"
    );

    Ok(pages)
}

/// Tags extracted page texts with their origin, dropping blank pages.
pub fn pages_from_texts(file_name: &str, page_texts: Vec<String>) -> Vec<DocumentPage> {
    page_texts
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| DocumentPage {
            metadata: PageMetadata {
                source: file_name.to_string(),
                page: (i + 1) as u32,
            },
            text,
        })
        .collect()
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
