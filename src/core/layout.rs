/// Text layout: greedy word-wrap against a measured pixel width.

/// Measures the rendered width of a string in pixels.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> f32,
{
    fn measure(&self, text: &str) -> f32 {
        self(text)
    }
}

/// Lines produced by [`wrap`], together with the line budget of the box
/// they are meant for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutText {
    lines: Vec<String>,
    max_lines: usize,
}

impl LaidOutText {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// The lines that fit the budget. Anything past it is not displayed.
    pub fn visible(&self) -> &[String] {
        &self.lines[..self.lines.len().min(self.max_lines)]
    }

    pub fn is_truncated(&self) -> bool {
        self.lines.len() > self.max_lines
    }
}

/// Greedy word-wrap.
///
/// Words are split on whitespace and packed into lines joined by a single
/// space. A word that would push a non-empty line past `max_width` starts
/// a new line. A single word wider than `max_width` is emitted on its own
/// line, unsplit. The result is never truncated to `max_lines`; callers
/// use [`LaidOutText::visible`].
pub fn wrap<M>(text: &str, measure: &M, max_width: f32, max_lines: usize) -> LaidOutText
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if measure.measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    LaidOutText { lines, max_lines }
}

/// Fixed advance per character. Stands in for a system font when no font
/// file can be loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f32,
}

impl MonospaceMetrics {
    /// Approximate metrics for a font rendered at `size` pixels.
    pub fn for_size(size: f32) -> Self {
        Self {
            advance: size * 0.5,
        }
    }
}

impl TextMeasure for MonospaceMetrics {
    fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }
}
