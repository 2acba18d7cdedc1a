//! LSP type conversion utilities.
//!
//! Documents are indexed in chars; LSP positions count UTF-16 code units.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range, Url};

use valet_core::Severity;
use valet_document::{Decoration, Document, LineTable, TextRange};

/// Diagnostic source shown by editors.
pub const DIAGNOSTIC_SOURCE: &str = "vale";

/// Converts a decoration to an LSP diagnostic.
pub fn to_lsp_diagnostic(decoration: &Decoration, document: &Document) -> Option<Diagnostic> {
    let range = offsets_to_range(decoration.range, document)?;
    let finding = &decoration.finding;

    let severity = match decoration.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Suggestion => DiagnosticSeverity::INFORMATION,
    };

    let code_description = Url::parse(&finding.link)
        .ok()
        .map(|href| tower_lsp::lsp_types::CodeDescription { href });

    Some(Diagnostic {
        range,
        severity: Some(severity),
        code: Some(NumberOrString::String(finding.check.clone())),
        code_description,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: finding.message.clone(),
        ..Default::default()
    })
}

/// Converts a char range to an LSP range.
pub fn offsets_to_range(range: TextRange, document: &Document) -> Option<Range> {
    let start = offset_to_position(range.from, document)?;
    let end = offset_to_position(range.to, document)?;
    Some(Range::new(start, end))
}

/// Converts a char offset to an LSP position.
pub fn offset_to_position(offset: usize, document: &Document) -> Option<Position> {
    if offset > document.len_chars() {
        return None;
    }

    let line = document.line_of(offset);
    let line_start = document.line_start_offset(line)?;
    let column: usize = document
        .slice(line_start, offset)?
        .chars()
        .map(char::len_utf16)
        .sum();

    Some(Position::new(line as u32, column as u32))
}

/// Converts an LSP position to a char offset.
///
/// Columns past the end of a line clamp to the line end; lines past the end
/// of the document clamp to the document end.
pub fn position_to_offset(position: Position, document: &Document) -> usize {
    let Some(line_start) = document.line_start_offset(position.line as usize) else {
        return document.len_chars();
    };
    let line_end = document
        .line_start_offset(position.line as usize + 1)
        .map(|next| next - 1)
        .unwrap_or_else(|| document.len_chars());

    let mut units = 0;
    let mut offset = line_start;
    for ch in document.slice(line_start, line_end).unwrap_or_default().chars() {
        if units >= position.character as usize {
            break;
        }
        units += ch.len_utf16();
        offset += 1;
    }
    offset
}

/// Converts an LSP range to char offsets, ordered.
pub fn range_to_offsets(range: Range, document: &Document) -> (usize, usize) {
    let from = position_to_offset(range.start, document);
    let to = position_to_offset(range.end, document);
    (from.min(to), from.max(to))
}

/// Helper to compare Positions (p1 <= p2)
pub fn positions_le(p1: Position, p2: Position) -> bool {
    p1.line < p2.line || (p1.line == p2.line && p1.character <= p2.character)
}
