use mupdf::{Document, TextPageFlags};

use flexrent_core::{
    BackendError, LayoutConfig, PageTables, TableBackend, TextSpan, detect_tables,
};

/// MuPDF-based implementation of [`TableBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the extractor and its callers do not
/// transitively depend on it.
///
/// Each text line is split into spans wherever the horizontal gap between
/// glyphs exceeds `gap_ratio` times the font size, or at a run of two or more
/// whitespace characters. The spans of a page are then grouped into tables
/// by [`detect_tables`].
pub struct MupdfBackend {
    layout: LayoutConfig,
    /// Gap between glyphs, as a fraction of font size, that starts a new span.
    /// Default 0.8.
    gap_ratio: f32,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            gap_ratio: 0.8,
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Set the span-splitting gap ratio. Non-positive values are ignored.
    pub fn with_gap_ratio(mut self, ratio: f32) -> Self {
        if ratio > 0.0 {
            self.gap_ratio = ratio;
        }
        self
    }

    fn open(&self, data: &[u8], password: Option<&str>) -> Result<Document, BackendError> {
        let mut document = Document::from_bytes(data, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        let needs_password = document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        if needs_password {
            let Some(password) = password else {
                return Err(BackendError::PasswordRequired);
            };
            let authenticated = document
                .authenticate(password)
                .map_err(|e| BackendError::OpenError(e.to_string()))?;
            if !authenticated {
                return Err(BackendError::IncorrectPassword);
            }
        }

        Ok(document)
    }
}

impl TableBackend for MupdfBackend {
    fn extract_tables(
        &self,
        data: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<PageTables>, BackendError> {
        let document = self.open(data, password)?;

        let mut pages = Vec::new();

        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
            .enumerate()
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let mut spans = Vec::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let glyphs = line.chars().map(|c| {
                        let quad = c.quad();
                        Glyph {
                            ch: c.char().unwrap_or('\u{FFFD}'),
                            x0: quad.ul.x.min(quad.ll.x),
                            x1: quad.ur.x.max(quad.lr.x),
                            y: c.origin().y,
                            size: c.size(),
                        }
                    });
                    spans.extend(split_line(glyphs, self.gap_ratio));
                }
            }

            let tables = detect_tables(spans, &self.layout);
            tracing::debug!(page = index + 1, tables = tables.len(), "extracted page tables");
            pages.push(PageTables {
                page_number: index + 1,
                tables,
            });
        }

        Ok(pages)
    }
}

/// One positioned character of a text line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub x0: f32,
    pub x1: f32,
    pub y: f32,
    pub size: f32,
}

/// Split the glyphs of one line into spans at wide gaps and whitespace runs.
pub fn split_line(glyphs: impl IntoIterator<Item = Glyph>, gap_ratio: f32) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut current: Option<TextSpan> = None;
    let mut pending_spaces = 0usize;

    for glyph in glyphs {
        if glyph.ch.is_whitespace() {
            pending_spaces += 1;
            if pending_spaces >= 2 {
                finish(&mut current, &mut spans);
            }
            continue;
        }

        let breaks = current
            .as_ref()
            .is_some_and(|span| glyph.x0 - span.x1 > gap_ratio * glyph.size.max(span.font_size));
        if breaks {
            finish(&mut current, &mut spans);
        }

        match current.as_mut() {
            Some(span) => {
                if pending_spaces > 0 {
                    span.text.push(' ');
                }
                span.text.push(glyph.ch);
                span.x1 = span.x1.max(glyph.x1);
            }
            None => {
                current = Some(TextSpan {
                    text: glyph.ch.to_string(),
                    x0: glyph.x0,
                    x1: glyph.x1,
                    y: glyph.y,
                    font_size: glyph.size,
                });
            }
        }
        pending_spaces = 0;
    }
    finish(&mut current, &mut spans);

    spans
}

fn finish(current: &mut Option<TextSpan>, spans: &mut Vec<TextSpan>) {
    if let Some(span) = current.take() {
        spans.push(span);
    }
}
