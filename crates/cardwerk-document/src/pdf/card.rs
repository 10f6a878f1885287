// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Card generator: lays a rendered template out as a text PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 builds documents from `PdfPage` values holding `Vec<Op>`
// operation lists, serialised through `PdfDocument::save()`.

use cardwerk_core::error::{CardwerkError, Result};
use cardwerk_core::traits::CardGenerator;
use cardwerk_core::types::CardKind;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info, instrument};

/// Stand-in for inline images, which this generator does not draw.
const IMAGE_MARKER: &str = "[image]";

const FONT_SIZE_PT: f32 = 10.0;
const LINE_HEIGHT_PT: f32 = 13.0;
const MARGIN_MM: f32 = 12.0;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.50;
const PT_TO_MM: f32 = 0.3528;

/// Produces unprotected PDF cards from rendered template text.
#[derive(Debug, Clone)]
pub struct PdfCardGenerator {
    width: Mm,
    height: Mm,
    title: String,
}

impl PdfCardGenerator {
    /// A generator for pages of `width_mm` x `height_mm`.
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width: Mm(width_mm),
            height: Mm(height_mm),
            title: "Identity Card".to_owned(),
        }
    }

    /// A4 portrait.
    pub fn a4() -> Self {
        Self::new(210.0, 297.0)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn layout(&self, text: &str) -> Vec<PdfPage> {
        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let usable_width_mm = self.width.0 - 2.0 * MARGIN_MM;
        let glyph_mm = AVG_GLYPH_WIDTH * FONT_SIZE_PT * PT_TO_MM;
        let max_chars = ((usable_width_mm / glyph_mm) as usize).max(1);

        let page_h_pt = self.height.into_pt().0;
        let lines_per_page = (((page_h_pt - 2.0 * margin_pt) / LINE_HEIGHT_PT) as usize).max(1);

        let lines = wrap_text(&strip_inline_images(text), max_chars);
        let mut pages: Vec<PdfPage> = lines
            .chunks(lines_per_page)
            .map(|chunk| {
                let ops = chunk
                    .iter()
                    .enumerate()
                    .flat_map(|(idx, line)| {
                        let y_pt = page_h_pt - margin_pt - idx as f32 * LINE_HEIGHT_PT;
                        text_line_ops(line, margin_pt, y_pt)
                    })
                    .collect();
                PdfPage::new(self.width, self.height, ops)
            })
            .collect();

        if pages.is_empty() {
            pages.push(PdfPage::new(self.width, self.height, Vec::new()));
        }
        pages
    }
}

impl Default for PdfCardGenerator {
    fn default() -> Self {
        Self::a4()
    }
}

impl CardGenerator for PdfCardGenerator {
    #[instrument(skip_all, fields(template_len = template.len(), kind = ?kind, protected = password.is_some()))]
    fn generate(&self, template: &[u8], kind: CardKind, password: Option<&str>) -> Result<Vec<u8>> {
        if password.is_some() {
            return Err(CardwerkError::PdfGeneration(
                "password protection is not supported by the text card generator".into(),
            ));
        }
        let CardKind::Pdf = kind;

        let text = std::str::from_utf8(template)
            .map_err(|e| CardwerkError::TemplateRender(format!("template is not UTF-8: {e}")))?;

        info!(title = %self.title, "generating PDF card");
        let mut doc = PdfDocument::new(&self.title);
        doc.with_pages(self.layout(text));
        debug!(pages = doc.pages.len(), "card layout complete");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if bytes.is_empty() {
            return Err(CardwerkError::PdfGeneration("empty PDF output".into()));
        }
        Ok(bytes)
    }
}

fn text_line_ops(line: &str, x_pt: f32, y_pt: f32) -> [Op; 5] {
    [
        Op::StartTextSection,
        Op::SetTextCursor {
            pos: Point {
                x: Pt(x_pt),
                y: Pt(y_pt),
            },
        },
        Op::SetFontSizeBuiltinFont {
            size: Pt(FONT_SIZE_PT),
            font: BuiltinFont::Helvetica,
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(line.to_owned())],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
    ]
}

/// Replace data URI tokens with a short marker.
fn strip_inline_images(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            line.split(' ')
                .map(|word| {
                    if word.starts_with("data:image/") {
                        IMAGE_MARKER
                    } else {
                        word
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Word-wrap each line of `text` to at most `max_width` characters.
/// Over-long words are broken on character boundaries.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            if chars.len() > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        lines.push(chunk.iter().collect());
                    } else {
                        current = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current.is_empty() {
                current.push_str(word);
                current_len = chars.len();
            } else if current_len + 1 + chars.len() <= max_width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + chars.len();
            } else {
                lines.push(std::mem::replace(&mut current, word.to_owned()));
                current_len = chars.len();
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_pdf_bytes() {
        let generator = PdfCardGenerator::a4().with_title("UIN 4821");
        let pdf = generator
            .generate(b"UIN: 4821\nName: Ada Lovelace", CardKind::Pdf, None)
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn password_is_refused() {
        let err = PdfCardGenerator::default()
            .generate(b"UIN: 4821", CardKind::Pdf, Some("AdaL1990"))
            .unwrap_err();
        assert!(matches!(err, CardwerkError::PdfGeneration(_)));
    }

    #[test]
    fn non_utf8_template_is_render_error() {
        let err = PdfCardGenerator::default()
            .generate(&[0xFF, 0xFE, 0x00], CardKind::Pdf, None)
            .unwrap_err();
        assert!(matches!(err, CardwerkError::TemplateRender(_)));
    }

    #[test]
    fn long_pages_break() {
        let text = (0..200).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let generator = PdfCardGenerator::new(85.6, 54.0);
        assert!(generator.layout(&text).len() > 1);
    }

    #[test]
    fn wrap_breaks_long_words_and_keeps_blank_lines() {
        let lines = wrap_text("abcdefghij\n\nshort words here", 4);
        assert_eq!(lines, ["abcd", "efgh", "ij", "", "shor", "t", "word", "s", "here"]);
    }

    #[test]
    fn data_uris_become_markers() {
        assert_eq!(
            strip_inline_images("Photo: data:image/png;base64,AAAA end"),
            "Photo: [image] end"
        );
    }
}
