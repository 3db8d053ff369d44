use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Poem {
    lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoemStats {
    pub lines: usize,
    pub words: usize,
    pub characters: usize,
}

impl Poem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Starts the poem over with `line` as its opening.
    pub fn begin(&mut self, line: String) {
        self.lines.clear();
        self.lines.push(line);
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn stats(&self) -> PoemStats {
        let words = self.lines.join(" ").split_whitespace().count();
        let characters = self.lines.iter().map(|l| l.chars().count()).sum();

        PoemStats {
            lines: self.lines.len(),
            words,
            characters,
        }
    }
}

impl fmt::Display for PoemStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lines: {} | Words: {} | Characters: {}",
            self.lines, self.words, self.characters
        )
    }
}
