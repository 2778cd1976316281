use core::ops::Range;

/// Byte range of a node within its expression source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span(start..end)
    }

    pub fn start(&self) -> usize {
        self.0.start
    }

    pub fn end(&self) -> usize {
        self.0.end
    }

    /// Smallest span covering both `a` and `b`.
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span(a.0.start.min(b.0.start)..a.0.end.max(b.0.end))
    }

    /// The text covered by this span, or `""` when out of range.
    pub fn snippet<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.0.clone()).unwrap_or("")
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(span: pest::Span<'_>) -> Self {
        Span(span.start()..span.end())
    }
}
