//! Review queue navigation.
//!
//! The list of checkplots to review belongs to whatever presents it (a
//! sidebar, a terminal list). The controller only resolves positions and
//! asks for the highlight to move.

use std::path::Path;

/// Index ⇄ identifier mapping of the review queue.
pub trait QueueNavigator {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn identifier_at(&self, index: usize) -> Option<&str>;

    fn index_of(&self, identifier: &str) -> Option<usize>;

    /// Move the highlight to `index`, un-highlighting the previous entry.
    fn highlight(&mut self, index: Option<usize>);
}

/// A queue of checkplot identifiers held in memory.
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    entries: Vec<String>,
    highlighted: Option<usize>,
}

impl ReviewQueue {
    #[must_use]
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries,
            highlighted: None,
        }
    }

    /// Read a queue file: one identifier per line, blank lines and `#`
    /// comments ignored.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string)
                .collect(),
        ))
    }

    #[must_use]
    pub const fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl QueueNavigator for ReviewQueue {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn identifier_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    fn index_of(&self, identifier: &str) -> Option<usize> {
        self.entries.iter().position(|e| e == identifier)
    }

    fn highlight(&mut self, index: Option<usize>) {
        if self.highlighted != index {
            tracing::trace!(from = ?self.highlighted, to = ?index, "queue highlight");
        }
        self.highlighted = index.filter(|i| *i < self.entries.len());
    }
}
