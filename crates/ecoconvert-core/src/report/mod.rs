//! Paginated PDF analysis report.

pub mod document;
pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod sections;

use crate::error::EcoConvertError;
use crate::model::AnalysisResult;
use chrono::NaiveDateTime;
use document::ReportDocument;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A rendered report ready to be saved.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// `EcoConvert_Analysis_<YYYYMMDD>_<HHMMSS>.pdf`
pub fn report_file_name(generated_at: NaiveDateTime) -> String {
    generated_at
        .format("EcoConvert_Analysis_%Y%m%d_%H%M%S.pdf")
        .to_string()
}

/// Lay out the report pages without serializing them.
pub fn build_document(
    result: &AnalysisResult,
    generated_at: NaiveDateTime,
) -> Result<ReportDocument, EcoConvertError> {
    if !result.has_report() {
        return Err(EcoConvertError::ReportUnavailable(
            "the image was not identified as waste".into(),
        ));
    }
    Ok(sections::render(result, generated_at))
}

/// Render `result` as a PDF stamped with `generated_at`.
///
/// The same result and timestamp always produce the same bytes.
pub fn generate_report(
    result: &AnalysisResult,
    generated_at: NaiveDateTime,
) -> Result<GeneratedReport, EcoConvertError> {
    let doc = build_document(result, generated_at)?;
    let bytes = pdf::write_pdf(
        &doc,
        &pdf::DocumentInfo {
            title: sections::REPORT_SUBTITLE,
            producer: concat!("ecoconvert ", env!("CARGO_PKG_VERSION")),
            created: generated_at,
        },
    )?;

    tracing::info!(
        pages = doc.page_count(),
        bytes = bytes.len(),
        categories = %result.category_list(),
        "generated analysis report"
    );

    Ok(GeneratedReport {
        file_name: report_file_name(generated_at),
        bytes,
        page_count: doc.page_count(),
    })
}

/// Save `report` into `dir`. The file appears complete or not at all.
pub fn write_report(report: &GeneratedReport, dir: &Path) -> Result<PathBuf, EcoConvertError> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(&report.file_name);

    let mut tmp = tempfile::Builder::new()
        .prefix(".ecoconvert-report-")
        .suffix(".pdf.tmp")
        .tempfile_in(dir)?;
    tmp.write_all(&report.bytes)?;
    tmp.flush()?;
    tmp.persist(&target).map_err(|e| EcoConvertError::Io(e.error))?;

    tracing::info!(path = %target.display(), "saved report");
    Ok(target)
}
