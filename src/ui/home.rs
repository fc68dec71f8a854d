use std::cell::Cell;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::models::{PoemSummary, PoetSummary};
use crate::route::Location;
use crate::search::{RevealTrigger, Search, Tail};

use super::helpers::{centered_rect, scroll_into_view, spinner_frame};

/// One rendered line of the results list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Row {
    PoetHeader,
    Poet(usize),
    PoemHeader,
    Poem(usize),
    NoResults,
    More,
}

/// A selectable result, by position in the revealed slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Poet(usize),
    Poem(usize),
}

/// Index screen state. Lives for the whole session so returning from a poet
/// keeps the query and the revealed batches.
pub(crate) struct HomeScreen {
    pub(crate) search: Search,
    pub(crate) trigger: RevealTrigger,
    pub(crate) input: String,
    pub(crate) editing: bool,
    pub(crate) selected: usize,
    pub(crate) offset: usize,
    /// Result rows that fit on screen at the last draw.
    pub(crate) viewport: Cell<usize>,
}

impl HomeScreen {
    pub(crate) fn new() -> Self {
        Self {
            search: Search::new(),
            trigger: RevealTrigger::new(),
            input: String::new(),
            editing: false,
            selected: 0,
            offset: 0,
            viewport: Cell::new(0),
        }
    }

    /// Push the edited input into the search. Selection and scroll restart at
    /// the top whenever the query changes.
    pub(crate) fn apply_input(&mut self, poets: &[PoetSummary], poems: &[PoemSummary]) {
        if self.input == self.search.query() {
            return;
        }
        self.search.set_query(&self.input, poets, poems);
        self.selected = 0;
        self.offset = 0;
    }

    pub(crate) fn clear(&mut self, poets: &[PoetSummary], poems: &[PoemSummary]) {
        self.input.clear();
        self.apply_input(poets, poems);
    }

    pub(crate) fn rows(&self) -> Vec<Row> {
        if !self.search.is_active() {
            return Vec::new();
        }
        let poets = self.search.shown_poets().len();
        let poems = self.search.shown_poems().len();
        let mut rows = Vec::with_capacity(poets + poems + 3);
        if poets > 0 {
            rows.push(Row::PoetHeader);
            rows.extend((0..poets).map(Row::Poet));
        }
        if poems > 0 {
            rows.push(Row::PoemHeader);
            rows.extend((0..poems).map(Row::Poem));
        }
        if poets == 0 && poems == 0 {
            rows.push(Row::NoResults);
        }
        if self.search.has_more() {
            rows.push(Row::More);
        }
        rows
    }

    pub(crate) fn entries(&self) -> Vec<Entry> {
        let poets = self.search.shown_poets().len();
        let poems = self.search.shown_poems().len();
        (0..poets)
            .map(Entry::Poet)
            .chain((0..poems).map(Entry::Poem))
            .collect()
    }

    pub(crate) fn current_entry(&self) -> Option<Entry> {
        self.entries().get(self.selected).copied()
    }

    fn row_of(&self, target: Row) -> Option<usize> {
        self.rows().iter().position(|row| *row == target)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = self.entries().len();
        if len == 0 {
            return;
        }
        let next = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = next as usize;
        self.reveal_selection();
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    pub(crate) fn select_last(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.selected = len - 1;
            self.reveal_selection();
        }
    }

    /// Scroll so the selected entry is on screen. The first entry also pulls
    /// its section header into view.
    fn reveal_selection(&mut self) {
        if self.selected == 0 {
            self.offset = 0;
            return;
        }
        let target = match self.current_entry() {
            Some(Entry::Poet(pos)) => Row::Poet(pos),
            Some(Entry::Poem(pos)) => Row::Poem(pos),
            None => return,
        };
        if let Some(row) = self.row_of(target) {
            let height = self.viewport.get();
            self.offset = scroll_into_view(row, self.offset, height);
            // Keep the "more" marker visible once the last entry is selected.
            if self.selected + 1 == self.entries().len() && self.search.has_more() {
                self.offset = scroll_into_view(row + 1, self.offset, height);
            }
        }
    }

    /// Whether the row the reveal trigger watches is inside the visible window.
    pub(crate) fn tail_visible(&self) -> bool {
        let height = self.viewport.get();
        if height == 0 {
            return false;
        }
        let target = match self.search.tail() {
            Some(Tail::Poet(pos)) => Row::Poet(pos),
            Some(Tail::Poem(pos)) => Row::Poem(pos),
            None => return false,
        };
        self.row_of(target)
            .is_some_and(|row| row >= self.offset && row < self.offset + height)
    }

    /// Where the selected entry leads.
    pub(crate) fn target(&self, poets: &[PoetSummary], poems: &[PoemSummary]) -> Option<Location> {
        match self.current_entry()? {
            Entry::Poet(pos) => {
                let poet = poets.get(*self.search.shown_poets().get(pos)?)?;
                Some(Location::poet(&poet.id, None))
            }
            Entry::Poem(pos) => {
                let poem = poems.get(*self.search.shown_poems().get(pos)?)?;
                Some(Location::poet(&poem.poet_id, Some(poem.index)))
            }
        }
    }
}

/// Everything the index screen needs from the application to draw itself.
pub(crate) struct HomeView<'a> {
    pub(crate) home: &'a HomeScreen,
    pub(crate) poets: &'a [PoetSummary],
    pub(crate) poems: &'a [PoemSummary],
    pub(crate) loading: bool,
    pub(crate) tick: usize,
}

pub(crate) fn draw_home(frame: &mut Frame, area: Rect, view: &HomeView) {
    if view.loading {
        let panel = centered_rect(40, 20, area);
        let spinner = Paragraph::new(format!("{} Loading", spinner_frame(view.tick)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(spinner, panel);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let hero = Paragraph::new(vec![
        Line::from(Span::styled(
            "诗库",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} poets, {} poems", view.poets.len(), view.poems.len()),
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(hero, chunks[0]);

    draw_search_box(frame, chunks[1], view.home);
    draw_results(frame, chunks[2], view);
}

fn draw_search_box(frame: &mut Frame, area: Rect, home: &HomeScreen) {
    let border_style = if home.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Search poets or poems");
    let text = if home.input.is_empty() && !home.editing {
        Span::styled("press / to search", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(home.input.clone())
    };
    let paragraph = Paragraph::new(Line::from(text)).block(block.clone());
    frame.render_widget(paragraph, area);

    if home.editing {
        let inner = block.inner(area);
        let cursor_x = inner.x + Line::from(home.input.as_str()).width() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

fn draw_results(frame: &mut Frame, area: Rect, view: &HomeView) {
    let home = view.home;
    home.viewport.set(area.height as usize);
    if area.height == 0 || !home.search.is_active() {
        return;
    }

    let selected_row = home.current_entry().map(|entry| match entry {
        Entry::Poet(pos) => Row::Poet(pos),
        Entry::Poem(pos) => Row::Poem(pos),
    });
    let header_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD);
    let highlight = Style::default().fg(Color::Yellow);

    let lines: Vec<Line> = home
        .rows()
        .into_iter()
        .skip(home.offset)
        .take(area.height as usize)
        .map(|row| {
            let marker = if Some(row) == selected_row { "▶ " } else { "  " };
            let style = if Some(row) == selected_row {
                highlight
            } else {
                Style::default()
            };
            match row {
                Row::PoetHeader => Line::from(Span::styled(
                    format!("Poets ({})", home.search.poet_matches().len()),
                    header_style,
                )),
                Row::PoemHeader => Line::from(Span::styled(
                    format!("Poems ({})", home.search.poem_matches().len()),
                    header_style,
                )),
                Row::Poet(pos) => {
                    let poet = home.search.shown_poets().get(pos).and_then(|&i| view.poets.get(i));
                    match poet {
                        Some(poet) => Line::from(vec![
                            Span::styled(format!("{marker}{}", poet.name), style),
                            Span::styled(
                                format!("  {}  {} poems", poet.pinyin, poet.poem_count),
                                Style::default().fg(Color::DarkGray),
                            ),
                        ]),
                        None => Line::from(""),
                    }
                }
                Row::Poem(pos) => {
                    let poem = home.search.shown_poems().get(pos).and_then(|&i| view.poems.get(i));
                    match poem {
                        Some(poem) => Line::from(vec![
                            Span::styled(format!("{marker}{}", poem.title), style),
                            Span::styled(
                                format!("  {}", poem.author),
                                Style::default().fg(Color::DarkGray),
                            ),
                        ]),
                        None => Line::from(""),
                    }
                }
                Row::NoResults => Line::from(Span::styled(
                    "No matching poets or poems.",
                    Style::default().fg(Color::Gray),
                ))
                .alignment(Alignment::Center),
                Row::More => Line::from(Span::styled("...", Style::default().fg(Color::Gray)))
                    .alignment(Alignment::Center),
            }
        })
        .collect();

    // No wrapping: one result row per screen line, overflow is clipped at the
    // pane edge. Scrolling and the reveal trigger count rows the same way.
    frame.render_widget(Paragraph::new(lines), area);
}
