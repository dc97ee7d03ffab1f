//! # `docbot-pdf`: PDF Text Extraction
//!
//! Pulls the raw text lines out of a source PDF for the offline indexing
//! pipeline. Extraction is line-oriented and lossy by design: pages that fail
//! to parse are skipped with a warning so one corrupt page cannot abort the
//! rest of the document.

use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use pdf::file::FileOptions;

/// Errors raised while extracting text from a source document.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The path does not resolve to a readable file. Fatal to an indexing run.
    #[error("document not found: {0}")]
    DocumentNotFound(String),
    /// The file exists but is not a parseable PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("internal error during PDF extraction: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Extracts all non-empty, whitespace-trimmed text lines from the PDF at
/// `path`, in document order across pages.
///
/// Parsing is CPU-bound, so the walk over pages runs on a blocking thread.
pub async fn extract_lines(path: &Path) -> Result<Vec<String>, ExtractError> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(_) => return Err(ExtractError::DocumentNotFound(path.display().to_string())),
    };

    let lines = tokio::task::spawn_blocking(move || -> Result<Vec<String>, ExtractError> {
        let file = FileOptions::cached()
            .load(&data[..])
            .map_err(|e| ExtractError::Parse(e.to_string()))?;

        let resolver = file.resolver();
        let mut lines = Vec::new();

        for page_num in 0..file.num_pages() {
            let page = match file.get_page(page_num) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Skipping unreadable page {page_num}: {e}");
                    continue;
                }
            };

            let Some(content) = &page.contents else {
                warn!("Page {page_num} has no content stream.");
                continue;
            };

            let operations = match content.operations(&resolver) {
                Ok(operations) => operations,
                Err(e) => {
                    warn!("Skipping page {page_num} with unreadable content stream: {e}");
                    continue;
                }
            };

            let mut page_text = String::new();
            for op in operations.iter() {
                match op {
                    pdf::content::Op::TextDraw { text } => {
                        page_text.push_str(&text.to_string_lossy());
                        page_text.push('\n');
                    }
                    pdf::content::Op::TextDrawAdjusted { array } => {
                        for item in array.iter() {
                            if let pdf::content::TextDrawAdjusted::Text(text) = item {
                                page_text.push_str(&text.to_string_lossy());
                            }
                        }
                        page_text.push('\n');
                    }
                    _ => {}
                }
            }

            for line in page_text.lines() {
                let line = line.trim();
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
        }

        Ok(lines)
    })
    .await
    .map_err(|e| ExtractError::Internal(anyhow::anyhow!("join error during PDF parsing: {e}")))??;

    info!("Extracted {} lines from {}.", lines.len(), path.display());
    Ok(lines)
}
