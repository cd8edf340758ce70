use crate::text::font::GlyphFace;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Word-wrapped text with the rendered width of each line.
pub struct WrappedText {
    /// Lines in top-to-bottom order; words are joined by single spaces.
    pub lines: Vec<String>,
    /// Pixel advance of each line, including inter-word spaces.
    pub widths: Vec<u32>,
}

impl WrappedText {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// `true` when the text contained no words.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

struct Word<'a> {
    text: &'a str,
    width: u32,
}

/// Greedily pack the whitespace-separated words of `text` into lines no wider than
/// `max_width_px` where possible.
///
/// A word moves to a new line only when the current line already holds a word, so a single
/// word wider than the budget still gets its own line intact.
pub fn wrap<F: GlyphFace + ?Sized>(text: &str, max_width_px: u32, face: &F) -> WrappedText {
    let words = text
        .split_whitespace()
        .map(|w| Word {
            text: w,
            width: round_px(w.chars().map(|c| face.advance(c)).sum()),
        })
        .collect::<Vec<_>>();

    let space = round_px(face.advance(' '));

    let mut out = WrappedText::default();
    let mut line = String::new();
    let mut line_width = 0u32;
    for word in words {
        if !line.is_empty()
            && u64::from(line_width) + u64::from(space) + u64::from(word.width)
                > u64::from(max_width_px)
        {
            out.lines.push(std::mem::take(&mut line));
            out.widths.push(line_width);
            line_width = 0;
        }
        if !line.is_empty() {
            line.push(' ');
            line_width = line_width.saturating_add(space);
        }
        line.push_str(word.text);
        line_width = line_width.saturating_add(word.width);
    }

    if !line.is_empty() {
        out.lines.push(line);
        out.widths.push(line_width);
    }
    out
}

fn round_px(v: f32) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.round() as u32
    } else {
        0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
