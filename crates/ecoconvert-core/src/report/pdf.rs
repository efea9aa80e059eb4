//! PDF serialization of laid-out report documents.
//!
//! Only the two standard Helvetica faces are referenced, so no font data is
//! embedded. Output is deterministic for a given document and metadata.

use super::document::{DrawOp, FilledRect, Font, ReportDocument, Rgb, TextRun};
use super::fonts::encode_win_ansi;
use crate::error::EcoConvertError;
use chrono::{Datelike, NaiveDateTime, Timelike};
use pdf_writer::{Content, Date, Name, Pdf, Rect, Ref, Str, TextStr};

const CATALOG_ID: i32 = 1;
const PAGES_ID: i32 = 2;
const INFO_ID: i32 = 3;
const FIRST_FONT_ID: i32 = 4;

const FONTS: [Font; 2] = [Font::Helvetica, Font::HelveticaBold];
const WIN_ANSI: Name<'static> = Name(b"WinAnsiEncoding");

pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub producer: &'a str,
    pub created: NaiveDateTime,
}

/// Serialize `doc` to PDF bytes.
pub fn write_pdf(
    doc: &ReportDocument,
    info: &DocumentInfo<'_>,
) -> Result<Vec<u8>, EcoConvertError> {
    if doc.page_count() == 0 {
        return Err(EcoConvertError::ReportGeneration("document has no pages".into()));
    }
    check_geometry(doc)?;
    let created = pdf_date(info.created)?;

    let pages_id = Ref::new(PAGES_ID);
    let font_ids: Vec<(Font, Ref)> = FONTS
        .iter()
        .enumerate()
        .map(|(i, &font)| (font, Ref::new(FIRST_FONT_ID + i as i32)))
        .collect();
    let first_page = FIRST_FONT_ID + FONTS.len() as i32;
    // Each page is followed by its content stream.
    let page_ids: Vec<Ref> = (0..doc.page_count())
        .map(|i| Ref::new(first_page + 2 * i as i32))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(Ref::new(CATALOG_ID)).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    pdf.document_info(Ref::new(INFO_ID))
        .title(TextStr(info.title))
        .producer(TextStr(info.producer))
        .creation_date(created);

    for &(font, id) in &font_ids {
        pdf.type1_font(id)
            .base_font(Name(font.base_font().as_bytes()))
            .encoding_predefined(WIN_ANSI);
    }

    let media_box = Rect::new(0.0, 0.0, doc.width as f32, doc.height as f32);
    for (page, &page_id) in doc.pages().iter().zip(&page_ids) {
        let content_id = Ref::new(page_id.get() + 1);
        {
            let mut pdf_page = pdf.page(page_id);
            pdf_page
                .media_box(media_box)
                .parent(pages_id)
                .contents(content_id);
            let mut resources = pdf_page.resources();
            let mut fonts = resources.fonts();
            for &(font, id) in &font_ids {
                fonts.pair(Name(font.resource_name().as_bytes()), id);
            }
        }

        let mut content = Content::new();
        for op in &page.ops {
            match op {
                DrawOp::Rect(rect) => rect_ops(&mut content, rect),
                DrawOp::Text(run) => text_ops(&mut content, run),
            }
        }
        let data = content.finish();
        pdf.stream(content_id, &data);
    }

    Ok(pdf.finish())
}

fn check_geometry(doc: &ReportDocument) -> Result<(), EcoConvertError> {
    for (i, page) in doc.pages().iter().enumerate() {
        for op in &page.ops {
            let finite = match op {
                DrawOp::Text(t) => t.x.is_finite() && t.y.is_finite() && t.size.is_finite(),
                DrawOp::Rect(r) => [r.x, r.y, r.width, r.height].iter().all(|v| v.is_finite()),
            };
            if !finite {
                return Err(EcoConvertError::ReportGeneration(format!(
                    "non-finite coordinate on page {}",
                    i + 1
                )));
            }
        }
    }
    Ok(())
}

fn pdf_date(at: NaiveDateTime) -> Result<Date, EcoConvertError> {
    let year = u16::try_from(at.year())
        .ok()
        .filter(|y| *y <= 9999)
        .ok_or_else(|| {
            EcoConvertError::ReportGeneration(format!("unsupported report year {}", at.year()))
        })?;
    // chrono keeps every other component well inside the u8 range.
    Ok(Date::new(year)
        .month(at.month() as u8)
        .day(at.day() as u8)
        .hour(at.hour() as u8)
        .minute(at.minute() as u8)
        .second(at.second() as u8))
}

fn fill(content: &mut Content, c: Rgb) {
    content.set_fill_rgb(c.0 as f32, c.1 as f32, c.2 as f32);
}

fn rect_ops(content: &mut Content, rect: &FilledRect) {
    fill(content, rect.color);
    content
        .rect(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        )
        .fill_nonzero();
}

fn text_ops(content: &mut Content, run: &TextRun) {
    fill(content, run.color);
    let bytes = encode_win_ansi(&run.text);
    content
        .begin_text()
        .set_font(Name(run.font.resource_name().as_bytes()), run.size as f32)
        .next_line(run.x as f32, run.y as f32)
        .show(Str(&bytes))
        .end_text();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::Page;
    use chrono::NaiveDate;

    fn info() -> DocumentInfo<'static> {
        DocumentInfo {
            title: "Report (draft)",
            producer: "test",
            created: NaiveDate::from_ymd_opt(2025, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
        }
    }

    fn page(text: &str) -> Page {
        Page {
            ops: vec![
                DrawOp::Rect(FilledRect {
                    x: 0.0,
                    y: 741.89,
                    width: 595.28,
                    height: 100.0,
                    color: Rgb::PRIMARY,
                }),
                DrawOp::Text(TextRun {
                    x: 50.0,
                    y: 700.0,
                    size: 12.0,
                    font: Font::Helvetica,
                    color: Rgb::TEXT,
                    text: text.to_string(),
                }),
            ],
        }
    }

    fn one_page(text: &str) -> ReportDocument {
        ReportDocument::from_pages(595.28, 841.89, vec![page(text)])
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_structure() {
        let bytes = write_pdf(&one_page("Hello"), &info()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"/Count 1"));
        assert!(contains(&bytes, b"(Hello) Tj"));
        assert!(contains(&bytes, b" re\n"));
        assert!(contains(&bytes, b"/BaseFont /Helvetica-Bold"));
        assert!(contains(&bytes, b"/Encoding /WinAnsiEncoding"));
        assert!(contains(&bytes, b"D:20250309"));
    }

    #[test]
    fn test_one_page_object_per_document_page() {
        let pages = vec![page("a"), page("b"), page("c")];
        let doc = ReportDocument::from_pages(595.28, 841.89, pages);
        let bytes = write_pdf(&doc, &info()).unwrap();
        assert!(contains(&bytes, b"/Count 3"));
        assert_eq!(count(&bytes, b"/Type /Page\n"), 3);
        assert!(contains(&bytes, b"(c) Tj"));
    }

    #[test]
    fn test_rejects_empty_and_broken_documents() {
        let empty = ReportDocument::from_pages(595.28, 841.89, vec![]);
        assert!(matches!(
            write_pdf(&empty, &info()),
            Err(EcoConvertError::ReportGeneration(_))
        ));

        let mut pages = one_page("x").pages().to_vec();
        if let DrawOp::Text(run) = &mut pages[0].ops[1] {
            run.y = f64::NAN;
        }
        let doc = ReportDocument::from_pages(595.28, 841.89, pages);
        assert!(write_pdf(&doc, &info()).is_err());
    }

    #[test]
    fn test_output_is_deterministic() {
        let doc = one_page("Same");
        assert_eq!(write_pdf(&doc, &info()).unwrap(), write_pdf(&doc, &info()).unwrap());
    }
}
