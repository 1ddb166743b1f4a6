//! PDF report rendering.
//!
//! Lays an [`AnalysisRecord`] out as a paginated A4 document with the
//! builtin Helvetica fonts, then hands the bytes back for transport as
//! base64. Builtin fonts only cover a single-byte encoding, so every text
//! field is transcoded lossily before insertion.

use std::io::BufWriter;

use base64::Engine;
use printpdf::*;

use crate::error::{MeetScribeError, Result};
use crate::types::AnalysisRecord;

const REPORT_TITLE: &str = "MeetScribe Analysis Report";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
/// Auto page break fires when the cursor would cross into this bottom band.
const PAGE_BREAK_MARGIN_MM: f32 = 15.0;

const TITLE_PT: f32 = 20.0;
const HEADING_PT: f32 = 16.0;
const BODY_PT: f32 = 12.0;

const HEADING_LINE_MM: f32 = 10.0;
const BODY_LINE_MM: f32 = 5.0;

const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph advance as a fraction of the point size.
const GLYPH_EM: f32 = 0.5;

/// Render the analysis record as a PDF document.
///
/// Output is deterministic for a given record. Fails only when the final
/// byte serialization fails.
pub fn render_pdf(record: &AnalysisRecord) -> Result<Vec<u8>> {
    let mut report = ReportBuilder::new(REPORT_TITLE)?;

    report.centered_line(REPORT_TITLE, TITLE_PT);
    report.gap(10.0);

    report.heading("Summary");
    report.paragraph(&latin1_lossy(&record.summary));
    report.gap(5.0);

    report.heading("Sentiment");
    report.paragraph(&latin1_lossy(&record.sentiment));
    report.gap(5.0);

    report.heading("Action Items");
    if record.action_items.is_empty() {
        report.paragraph("No action items were identified.");
    } else {
        for item in &record.action_items {
            report.paragraph(&format!("Task: {}", latin1_lossy(&item.task)));
            report.paragraph(&format!(
                "Owner: {} | Deadline: {}",
                latin1_lossy(&item.owner),
                latin1_lossy(&item.deadline)
            ));
            report.gap(2.0);
        }
    }

    report.finish()
}

/// Encode rendered PDF bytes with the standard base64 alphabet.
pub fn encode_pdf_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

struct ReportBuilder {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Cursor position as distance from the page top, in mm.
    cursor_mm: f32,
}

impl ReportBuilder {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

        // No XMP packet or ICC profile; output must stay byte-stable
        // across runs for the same record.
        let doc = doc.with_conformance(PdfConformance::Custom(CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..Default::default()
        }));

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| MeetScribeError::Render {
                reason: format!("font registration failed: {e:?}"),
            })?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| MeetScribeError::Render {
                reason: format!("font registration failed: {e:?}"),
            })?;

        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor_mm: MARGIN_MM,
        })
    }

    /// Bold heading on its own line.
    fn heading(&mut self, text: &str) {
        self.write_line(text, true, HEADING_PT, MARGIN_MM, HEADING_LINE_MM);
    }

    /// Bold line centered on the page.
    fn centered_line(&mut self, text: &str, size_pt: f32) {
        let x = ((PAGE_WIDTH_MM - text_width_mm(text, size_pt)) / 2.0).max(MARGIN_MM);
        self.write_line(text, true, size_pt, x, HEADING_LINE_MM);
    }

    /// Body text wrapped to the page width.
    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, max_chars_per_line(BODY_PT)) {
            self.write_line(&line, false, BODY_PT, MARGIN_MM, BODY_LINE_MM);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.cursor_mm += mm;
    }

    fn write_line(&mut self, text: &str, bold: bool, size_pt: f32, x_mm: f32, line_mm: f32) {
        self.break_page_if_needed(line_mm);
        self.cursor_mm += line_mm;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(
            text,
            size_pt,
            Mm(x_mm),
            Mm(PAGE_HEIGHT_MM - self.cursor_mm),
            font,
        );
    }

    fn break_page_if_needed(&mut self, line_mm: f32) {
        if self.cursor_mm + line_mm > PAGE_HEIGHT_MM - PAGE_BREAK_MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor_mm = MARGIN_MM;
        }
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| MeetScribeError::Render {
                reason: format!("PDF serialization failed: {e:?}"),
            })?;
        writer.into_inner().map_err(|e| MeetScribeError::Render {
            reason: format!("PDF serialization failed: {e}"),
        })
    }
}

/// Replace characters outside the Latin-1 range with `?`.
///
/// The builtin fonts reject anything above U+00FF outright, with no
/// fallback glyph of their own, so the substitution happens here for every
/// field that reaches the page.
fn latin1_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c } else { '?' })
        .collect()
}

/// Greedy word wrap with hard breaks for words longer than a line.
///
/// Embedded newlines start a new line, like the original multi-line cells.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            let mut rest = word;
            while rest.chars().count() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split = rest
                    .char_indices()
                    .nth(max_chars)
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                let (head, tail) = rest.split_at(split);
                lines.push(head.to_string());
                rest = tail;
            }
            let word_chars = rest.chars().count();
            let current_chars = current.chars().count();
            if !current.is_empty() && current_chars + 1 + word_chars > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(rest);
        }
        lines.push(current);
    }
    lines
}

fn max_chars_per_line(size_pt: f32) -> usize {
    let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    (usable_mm / (size_pt * GLYPH_EM * PT_TO_MM)) as usize
}

fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * GLYPH_EM * PT_TO_MM
}
