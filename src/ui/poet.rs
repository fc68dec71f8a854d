use std::cell::Cell;
use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::loader::Ticket;
use crate::models::{Poem, PoetDetail};
use crate::reader::{toc_entries, Flash, Reader, Step, TocEntry};
use crate::route::Location;

use super::helpers::{centered_rect, spinner_frame};

/// Width of the table-of-contents sidebar.
const SIDEBAR_WIDTH: u16 = 32;

/// Lifecycle of one poet screen instance.
pub(crate) enum DetailLoad {
    Loading(Ticket),
    Ready(Box<PoetView>),
    NotFound,
}

/// Detail screen for a single poet. Dropped as soon as the user leaves, which
/// is what makes late responses for it irrelevant.
pub(crate) struct PoetScreen {
    pub(crate) id: String,
    pub(crate) load: DetailLoad,
}

impl PoetScreen {
    pub(crate) fn loading(id: &str, ticket: Ticket) -> Self {
        Self {
            id: id.to_string(),
            load: DetailLoad::Loading(ticket),
        }
    }

    pub(crate) fn waiting_for(&self, ticket: Ticket) -> bool {
        matches!(self.load, DetailLoad::Loading(pending) if pending == ticket)
    }

    pub(crate) fn view_mut(&mut self) -> Option<&mut PoetView> {
        match &mut self.load {
            DetailLoad::Ready(view) => Some(&mut **view),
            _ => None,
        }
    }
}

/// Filter state of the open table of contents.
#[derive(Debug, Default)]
pub(crate) struct TocState {
    pub(crate) query: String,
    pub(crate) selected: usize,
}

/// A loaded poet document plus the reader state layered on top of it.
pub(crate) struct PoetView {
    pub(crate) detail: PoetDetail,
    pub(crate) reader: Reader,
    pub(crate) scroll: u16,
    pub(crate) copy: Flash,
    pub(crate) share: Flash,
    pub(crate) toc: Option<TocState>,
    /// Width of the poem pane at the last draw; zero until first drawn.
    pub(crate) body_width: Cell<u16>,
}

impl PoetView {
    /// Build the view and sync `location` to the poem it opens on.
    pub(crate) fn open(detail: PoetDetail, location: &mut Location) -> Self {
        let initial = location.initial_index(detail.poems.len());
        let reader = Reader::new(detail.poems.len(), initial);
        let mut view = Self {
            detail,
            reader,
            scroll: 0,
            copy: Flash::default(),
            share: Flash::default(),
            toc: None,
            body_width: Cell::new(0),
        };
        view.on_index_change(location);
        view
    }

    pub(crate) fn current_poem(&self) -> Option<&Poem> {
        self.detail.poem(self.reader.current())
    }

    pub(crate) fn step(&mut self, step: Step, location: &mut Location) -> bool {
        let moved = self.reader.step(step);
        if moved {
            self.on_index_change(location);
        }
        moved
    }

    pub(crate) fn jump(&mut self, index: usize, location: &mut Location) -> bool {
        let moved = self.reader.jump(index);
        if moved {
            self.on_index_change(location);
        }
        moved
    }

    /// Side effects of landing on a poem: the fragment names it, the text
    /// starts from the top, and both indicators go idle.
    fn on_index_change(&mut self, location: &mut Location) {
        if self.reader.is_empty() {
            return;
        }
        location.replace_fragment(self.reader.current());
        self.scroll = 0;
        self.copy.reset();
        self.share.reset();
    }

    /// Scroll the poem text, stopping once its last screen line is at the top.
    /// Long lines wrap, so the limit is counted in wrapped lines.
    pub(crate) fn scroll_by(&mut self, delta: i32) {
        let width = self.body_width.get();
        let max = self
            .current_poem()
            .map(|poem| {
                let height = if width == 0 {
                    poem.lines().count()
                } else {
                    poem_body(poem).line_count(width)
                };
                height.saturating_sub(1)
            })
            .unwrap_or(0) as i32;
        self.scroll = (self.scroll as i32 + delta).clamp(0, max.max(0)) as u16;
    }

    pub(crate) fn expire_flashes(&mut self, now: Instant) {
        self.copy.expire(now);
        self.share.expire(now);
    }

    pub(crate) fn toggle_toc(&mut self) {
        if self.toc.take().is_some() {
            return;
        }
        // Start on the open poem so Enter is a no-op until the user moves.
        self.toc = Some(TocState {
            query: String::new(),
            selected: self.reader.current(),
        });
    }

    pub(crate) fn toc_entries(&self) -> Vec<TocEntry<'_>> {
        match &self.toc {
            Some(toc) => toc_entries(&self.detail.poems, &toc.query),
            None => Vec::new(),
        }
    }

    pub(crate) fn move_toc(&mut self, offset: isize) {
        let len = self.toc_entries().len();
        if let Some(toc) = &mut self.toc {
            if len == 0 {
                toc.selected = 0;
                return;
            }
            let next = (toc.selected as isize + offset).clamp(0, len as isize - 1);
            toc.selected = next as usize;
        }
    }

    pub(crate) fn edit_toc_query(&mut self, edit: impl FnOnce(&mut String)) {
        if let Some(toc) = &mut self.toc {
            edit(&mut toc.query);
            toc.selected = 0;
        }
    }

    /// Jump to the highlighted table-of-contents entry and close the sidebar.
    pub(crate) fn choose_toc(&mut self, location: &mut Location) -> bool {
        let selected = self.toc.as_ref().map(|toc| toc.selected).unwrap_or(0);
        let target = self
            .toc_entries()
            .get(selected)
            .map(|entry| entry.original_index);
        let Some(index) = target else {
            return false;
        };
        self.toc = None;
        self.jump(index, location);
        true
    }
}

pub(crate) struct PoetDrawContext<'a> {
    pub(crate) location: &'a Location,
    pub(crate) site: &'a str,
    pub(crate) now: Instant,
    pub(crate) tick: usize,
}

pub(crate) fn draw_poet(frame: &mut Frame, area: Rect, screen: &PoetScreen, ctx: &PoetDrawContext) {
    match &screen.load {
        DetailLoad::Loading(_) => {
            let panel = centered_rect(40, 20, area);
            let spinner = Paragraph::new(format!("{} Loading {}", spinner_frame(ctx.tick), screen.id))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(spinner, panel);
        }
        DetailLoad::NotFound => {
            let panel = centered_rect(60, 20, area);
            let message = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Poet not found",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("No document for '{}'", screen.id),
                    Style::default().fg(Color::Gray),
                )),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, panel);
        }
        DetailLoad::Ready(view) => draw_reader(frame, area, view, ctx),
    }
}

fn draw_reader(frame: &mut Frame, area: Rect, view: &PoetView, ctx: &PoetDrawContext) {
    let main_area = if view.toc.is_some() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);
        draw_sidebar(frame, columns[0], view);
        columns[1]
    } else {
        area
    };

    let Some(poem) = view.current_poem() else {
        let message = Paragraph::new(format!("{} has no poems.", view.detail.name))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(view.detail.name.clone()));
        frame.render_widget(message, main_area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(main_area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            poem.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            view.detail.name.clone(),
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    view.body_width.set(chunks[1].width);
    frame.render_widget(poem_body(poem).scroll((view.scroll, 0)), chunks[1]);

    frame.render_widget(action_line(view, ctx.now), chunks[2]);
    frame.render_widget(pagination_line(view), chunks[3]);

    let address = Paragraph::new(Span::styled(
        ctx.location.href(ctx.site),
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(address, chunks[4]);
}

/// Poem text as drawn. Blank lines are kept as-is so stanza breaks stay
/// visible.
fn poem_body(poem: &Poem) -> Paragraph<'static> {
    let body: Vec<Line> = poem.lines().map(|line| Line::from(line.to_string())).collect();
    Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
}

fn action_line(view: &PoetView, now: Instant) -> Paragraph<'static> {
    let done = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let idle = Style::default().fg(Color::Gray);
    let share = if view.share.is_done(now) {
        Span::styled("✓ Link copied", done)
    } else {
        Span::styled("[s] Share", idle)
    };
    let copy = if view.copy.is_done(now) {
        Span::styled("✓ Copied", done)
    } else {
        Span::styled("[c] Copy", idle)
    };
    Paragraph::new(Line::from(vec![share, Span::raw("   |   "), copy])).alignment(Alignment::Center)
}

fn pagination_line(view: &PoetView) -> Paragraph<'static> {
    let enabled = Style::default();
    let disabled = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
    let prev_style = if view.reader.can_step(Step::Prev) {
        enabled
    } else {
        disabled
    };
    let next_style = if view.reader.can_step(Step::Next) {
        enabled
    } else {
        disabled
    };
    Paragraph::new(Line::from(vec![
        Span::styled("← Prev", prev_style),
        Span::styled(
            format!("     {}     ", view.reader.indicator()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled("Next →", next_style),
    ]))
    .alignment(Alignment::Center)
}

fn draw_sidebar(frame: &mut Frame, area: Rect, view: &PoetView) {
    let Some(toc) = &view.toc else {
        return;
    };
    let block = Block::default()
        .borders(Borders::RIGHT)
        .title(format!("{} · {} poems", view.detail.name, view.detail.poems.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let filter = Paragraph::new(Line::from(vec![
        Span::styled("Filter: ", Style::default().fg(Color::Gray)),
        Span::raw(toc.query.clone()),
    ]))
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(filter, chunks[0]);
    let cursor_x = chunks[0].x + "Filter: ".len() as u16 + Line::from(toc.query.as_str()).width() as u16;
    frame.set_cursor_position((cursor_x.min(chunks[0].right().saturating_sub(1)), chunks[0].y));

    let current = view.reader.current();
    let items: Vec<ListItem> = view
        .toc_entries()
        .into_iter()
        .map(|entry| {
            let style = if entry.original_index == current {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(entry.title.to_string(), style))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default();
    list_state.select(Some(toc.selected));
    frame.render_stateful_widget(list, chunks[1], &mut list_state);
}
