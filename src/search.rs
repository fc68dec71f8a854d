//! Free-text search over the two index collections plus the batch-wise reveal
//! of the results. Everything here is pure state; the home screen decides
//! when the tail row is on screen and feeds that into [`RevealTrigger`].

use std::cmp::min;

use crate::models::{PoemSummary, PoetSummary};

/// Number of results revealed per collection on every reveal step.
pub const BATCH_SIZE: usize = 50;

/// Case-insensitive substring match on the poet's name or romanization.
/// `needle` must already be lowercased.
pub fn poet_matches(poet: &PoetSummary, needle: &str) -> bool {
    poet.name.to_lowercase().contains(needle) || poet.pinyin.to_lowercase().contains(needle)
}

/// Case-insensitive substring match on the poem title only.
/// `needle` must already be lowercased.
pub fn poem_matches(poem: &PoemSummary, needle: &str) -> bool {
    poem.title.to_lowercase().contains(needle)
}

/// Positions of the poets matching `query`, in source order. An empty query
/// matches nothing.
pub fn filter_poets(poets: &[PoetSummary], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    poets
        .iter()
        .enumerate()
        .filter(|(_, poet)| poet_matches(poet, &needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// Positions of the poems whose title matches `query`, in source order. An
/// empty query matches nothing.
pub fn filter_poems(poems: &[PoemSummary], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    poems
        .iter()
        .enumerate()
        .filter(|(_, poem)| poem_matches(poem, &needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// Page counter deciding how many filtered results are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealCursor {
    page: usize,
    batch: usize,
}

impl Default for RevealCursor {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}

impl RevealCursor {
    pub fn new(batch: usize) -> Self {
        Self {
            page: 1,
            batch: batch.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn advance(&mut self) {
        self.page += 1;
    }

    /// How many of `total` results are visible at the current page.
    pub fn shown(&self, total: usize) -> usize {
        min(self.page.saturating_mul(self.batch), total)
    }
}

/// The row whose visibility drives the next reveal step: the last displayed
/// poet while no poems are displayed, otherwise the last displayed poem.
/// The payload is the position inside the displayed slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    Poet(usize),
    Poem(usize),
}

/// Query plus its derived results and reveal cursor.
#[derive(Debug, Clone, Default)]
pub struct Search {
    query: String,
    poets: Vec<usize>,
    poems: Vec<usize>,
    cursor: RevealCursor,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Replace the query and recompute the matches. The cursor only resets
    /// when the query actually changes.
    pub fn set_query(&mut self, query: &str, poets: &[PoetSummary], poems: &[PoemSummary]) {
        if query == self.query {
            return;
        }
        self.query = query.to_string();
        self.recompute(poets, poems);
    }

    /// Re-derive matches for the current query, e.g. after the collections
    /// finished loading. Starts again from the first batch.
    pub fn recompute(&mut self, poets: &[PoetSummary], poems: &[PoemSummary]) {
        self.poets = filter_poets(poets, &self.query);
        self.poems = filter_poems(poems, &self.query);
        self.cursor.reset();
    }

    pub fn cursor(&self) -> RevealCursor {
        self.cursor
    }

    /// Every matching poet position, not just the revealed ones.
    pub fn poet_matches(&self) -> &[usize] {
        &self.poets
    }

    pub fn poem_matches(&self) -> &[usize] {
        &self.poems
    }

    pub fn shown_poets(&self) -> &[usize] {
        &self.poets[..self.cursor.shown(self.poets.len())]
    }

    pub fn shown_poems(&self) -> &[usize] {
        &self.poems[..self.cursor.shown(self.poems.len())]
    }

    /// No match in either collection for a non-empty query.
    pub fn is_empty(&self) -> bool {
        self.poets.is_empty() && self.poems.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.shown_poets().len() < self.poets.len() || self.shown_poems().len() < self.poems.len()
    }

    pub fn tail(&self) -> Option<Tail> {
        let poems = self.shown_poems().len();
        if poems > 0 {
            return Some(Tail::Poem(poems - 1));
        }
        let poets = self.shown_poets().len();
        if poets > 0 {
            Some(Tail::Poet(poets - 1))
        } else {
            None
        }
    }

    /// Reveal one more batch of both collections. Returns false, leaving the
    /// cursor untouched, when everything is already shown.
    pub fn reveal_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.cursor.advance();
        true
    }
}

/// Snapshot of what the trigger was armed against. Any difference means the
/// old observation is stale and must be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Watch {
    query: String,
    shown_poets: usize,
    shown_poems: usize,
    total_poets: usize,
    total_poems: usize,
    tail: Option<Tail>,
}

/// Reveal trigger watching the tail row. At most one observation is live; it
/// is replaced whenever its inputs change and fires at most once.
#[derive(Debug, Default)]
pub struct RevealTrigger {
    watch: Option<Watch>,
    armed: Option<Tail>,
}

impl RevealTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tail row currently observed, if any.
    pub fn observed(&self) -> Option<Tail> {
        self.armed
    }

    /// Re-establish the observation if the loading flag, the query or any
    /// count moved since the last call. With no tail row there is nothing to
    /// observe and the trigger stays inert until one appears.
    pub fn sync(&mut self, loading: bool, search: &Search) {
        let watch = Watch {
            query: search.query().to_string(),
            shown_poets: search.shown_poets().len(),
            shown_poems: search.shown_poems().len(),
            total_poets: search.poet_matches().len(),
            total_poems: search.poem_matches().len(),
            tail: search.tail(),
        };
        if !loading && self.watch.as_ref() == Some(&watch) {
            return;
        }

        self.armed = None;
        if loading || !search.is_active() {
            self.watch = None;
            return;
        }
        self.armed = if search.has_more() { watch.tail } else { None };
        self.watch = Some(watch);
    }

    /// Report whether the observed row is on screen. Fires when it is and more
    /// results remain, revealing the next batch; the observation is consumed
    /// and the next `sync` arms a fresh one against the new tail.
    pub fn notify(&mut self, tail_visible: bool, search: &mut Search) -> bool {
        if self.armed.is_none() || !tail_visible {
            return false;
        }
        self.armed = None;
        search.reveal_more()
    }
}
