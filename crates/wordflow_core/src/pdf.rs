//! crates/wordflow_core/src/pdf.rs
//!
//! `PageSource` implementation backed by `lopdf`.
//!
//! Page text is rebuilt from the content stream rather than taken from
//! `Document::extract_text`, which only separates text blocks. Lines set
//! inside one `BT`..`ET` block are positioned with `Td`, `TD`, `T*`, `Tm`,
//! `'` and `"`, and each of those must end the current word.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::debug;

use crate::extract::{extract, Extraction, ExtractionError, PageSource};

/// A `TJ` adjustment below this, in thousandths of a text space unit, is a
/// gap between words rather than kerning.
const TJ_WORD_GAP: f32 = -200.0;

/// A parsed PDF, ready to be read page by page.
pub struct PdfPages {
    document: Document,
    /// Page objects in document order.
    page_ids: Vec<ObjectId>,
}

impl PdfPages {
    /// Parses a PDF held in memory.
    pub fn load_mem(bytes: &[u8]) -> Result<Self, ExtractionError> {
        Self::from_document(Document::load_mem(bytes)?)
    }

    /// Parses a PDF from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ExtractionError> {
        Self::from_document(Document::load(path)?)
    }

    fn from_document(document: Document) -> Result<Self, ExtractionError> {
        if document.is_encrypted() {
            return Err(ExtractionError::Encrypted);
        }
        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        debug!(pages = page_ids.len(), "Loaded PDF");
        Ok(Self { document, page_ids })
    }
}

impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_text(&self, index: usize) -> Result<Option<String>, ExtractionError> {
        let page_error = |reason: String| ExtractionError::Page {
            page: index + 1,
            reason,
        };

        let page_id = *self
            .page_ids
            .get(index)
            .ok_or_else(|| page_error("page does not exist".to_string()))?;
        let text = read_page(&self.document, page_id).map_err(|e| page_error(e.to_string()))?;

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}

/// Collects the text shown on one page in content-stream order.
fn read_page(document: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let encodings = document
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(document).map(|encoding| (name, encoding)))
        .collect::<lopdf::Result<BTreeMap<Vec<u8>, Encoding>>>()?;
    let content = document.get_and_decode_page_content(page_id)?;

    let mut text = String::new();
    let mut encoding = None;

    for operation in &content.operations {
        let operands = operation.operands.as_slice();
        match operation.operator.as_str() {
            "Tf" => {
                encoding = match operands.first() {
                    Some(font) => encodings.get(font.as_name()?),
                    None => None,
                };
            }
            "BT" | "ET" | "Td" | "TD" | "T*" | "Tm" => end_word(&mut text),
            "Tj" => push_strings(&mut text, encoding, operands)?,
            "'" => {
                end_word(&mut text);
                push_strings(&mut text, encoding, operands)?;
            }
            "\"" => {
                // aw ac string
                end_word(&mut text);
                push_strings(&mut text, encoding, operands.get(2..).unwrap_or_default())?;
            }
            "TJ" => {
                for item in operands.iter().filter_map(|o| o.as_array().ok()).flatten() {
                    match item {
                        Object::String(bytes, _) => push_decoded(&mut text, encoding, bytes)?,
                        other => {
                            if other.as_float().is_ok_and(|gap| gap < TJ_WORD_GAP) {
                                end_word(&mut text);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(text)
}

fn end_word(text: &mut String) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push('\n');
    }
}

fn push_strings(text: &mut String, encoding: Option<&Encoding>, operands: &[Object]) -> lopdf::Result<()> {
    for operand in operands {
        if let Object::String(bytes, _) = operand {
            push_decoded(text, encoding, bytes)?;
        }
    }
    Ok(())
}

fn push_decoded(text: &mut String, encoding: Option<&Encoding>, bytes: &[u8]) -> lopdf::Result<()> {
    match encoding {
        Some(encoding) => text.push_str(&Document::decode_text(encoding, bytes)?),
        None => debug!("Skipped text shown before any font was selected"),
    }
    Ok(())
}

/// Parses `bytes` as a PDF and tokenizes all of its pages.
pub fn extract_pdf(bytes: &[u8]) -> Result<Extraction, ExtractionError> {
    let pages = PdfPages::load_mem(bytes)?;
    extract(&pages)
}
