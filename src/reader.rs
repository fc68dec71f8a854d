//! Poem-by-poem navigation through one poet's document, the filterable table
//! of contents, and the short-lived "copied" indicators.

use std::time::{Duration, Instant};

use crate::models::Poem;

/// How long a copy/share confirmation stays visible.
pub const FLASH_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
}

/// Current position inside a poem list of fixed length. Movement clamps at
/// both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reader {
    current: usize,
    len: usize,
}

impl Reader {
    /// Start at `initial` if it names a poem, otherwise at the first one.
    pub fn new(len: usize, initial: usize) -> Self {
        let current = if initial < len { initial } else { 0 };
        Self { current, len }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn can_step(&self, step: Step) -> bool {
        match step {
            Step::Prev => self.current > 0,
            Step::Next => self.current + 1 < self.len,
        }
    }

    /// Move one poem back or forward. Returns whether the index changed.
    pub fn step(&mut self, step: Step) -> bool {
        if !self.can_step(step) {
            return false;
        }
        match step {
            Step::Prev => self.current -= 1,
            Step::Next => self.current += 1,
        }
        true
    }

    /// Jump straight to `index`. Out-of-range targets and the current index
    /// are no-ops.
    pub fn jump(&mut self, index: usize) -> bool {
        if index >= self.len || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    /// "k / n" page indicator, one-based.
    pub fn indicator(&self) -> String {
        if self.len == 0 {
            return "0 / 0".to_string();
        }
        format!("{} / {}", self.current + 1, self.len)
    }
}

/// One table-of-contents row, remembering where the poem sits in the full list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry<'a> {
    pub original_index: usize,
    pub title: &'a str,
}

/// Poems whose title contains `query`, case-insensitively, in document order.
/// An empty query lists every poem.
pub fn toc_entries<'a>(poems: &'a [Poem], query: &str) -> Vec<TocEntry<'a>> {
    let needle = query.to_lowercase();
    poems
        .iter()
        .enumerate()
        .filter(|(_, poem)| needle.is_empty() || poem.title.to_lowercase().contains(&needle))
        .map(|(original_index, poem)| TocEntry {
            original_index,
            title: &poem.title,
        })
        .collect()
}

/// Transient success indicator. Idle until triggered, then "done" for
/// [`FLASH_DURATION`] before reverting on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flash {
    until: Option<Instant>,
}

impl Flash {
    pub fn trigger(&mut self, now: Instant) {
        self.until = Some(now + FLASH_DURATION);
    }

    pub fn reset(&mut self) {
        self.until = None;
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Drop an expired indicator so the next frame renders it idle. Returns
    /// true when something changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.until.is_some() && !self.is_done(now) {
            self.until = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poems(titles: &[&str]) -> Vec<Poem> {
        titles
            .iter()
            .map(|title| Poem {
                title: title.to_string(),
                date: String::new(),
                content: String::new(),
            })
            .collect()
    }

    #[test]
    fn steps_clamp_at_both_ends() {
        let mut reader = Reader::new(3, 0);
        assert!(!reader.step(Step::Prev));
        assert_eq!(reader.current(), 0);
        assert!(reader.step(Step::Next));
        assert!(reader.step(Step::Next));
        assert!(!reader.step(Step::Next));
        assert_eq!(reader.current(), 2);
        assert!(!reader.can_step(Step::Next));
        assert!(reader.can_step(Step::Prev));
    }

    #[test]
    fn out_of_range_start_falls_back_to_first() {
        assert_eq!(Reader::new(5, 9).current(), 0);
        assert_eq!(Reader::new(5, 3).current(), 3);
    }

    #[test]
    fn empty_reader_never_moves() {
        let mut reader = Reader::new(0, 0);
        assert!(reader.is_empty());
        assert!(!reader.step(Step::Next));
        assert!(!reader.step(Step::Prev));
        assert!(!reader.jump(0));
        assert_eq!(reader.indicator(), "0 / 0");
    }

    #[test]
    fn jump_ignores_invalid_targets() {
        let mut reader = Reader::new(4, 1);
        assert!(!reader.jump(4));
        assert!(!reader.jump(1));
        assert!(reader.jump(3));
        assert_eq!(reader.indicator(), "4 / 4");
    }

    #[test]
    fn toc_filter_keeps_original_indices() {
        let poems = poems(&["静夜思", "Spring Dawn", "将进酒", "spring river"]);
        let entries = toc_entries(&poems, "SPRING");
        let indices: Vec<usize> = entries.iter().map(|e| e.original_index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(toc_entries(&poems, "").len(), 4);
        assert!(toc_entries(&poems, "autumn").is_empty());
    }

    #[test]
    fn flash_reverts_after_two_seconds() {
        let start = Instant::now();
        let mut flash = Flash::default();
        assert!(!flash.is_done(start));
        flash.trigger(start);
        assert!(flash.is_done(start + Duration::from_millis(1999)));
        assert!(!flash.expire(start + Duration::from_millis(1999)));
        assert!(flash.expire(start + FLASH_DURATION));
        assert!(!flash.is_done(start));
    }
}
