use std::mem;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_link;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, error, info, warn};

use crate::clipboard::Clipboard;
use crate::corpus::{is_http, Corpus};
use crate::loader::{Loader, Payload, Request, Response, Ticket};
use crate::models::{PoemSummary, PoetSummary};
use crate::random;
use crate::reader::Step;
use crate::route::{Location, Route};

use super::helpers::{key_hints, surface_error};
use super::home::{draw_home, HomeScreen, HomeView};
use super::poet::{draw_poet, DetailLoad, PoetDrawContext, PoetScreen, PoetView};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows moved by PageUp/PageDown in result lists.
const PAGE_STEP: isize = 10;

/// Where the application is, as one explicit state instead of a handful of
/// loading flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Index data or a random pick is being fetched.
    Loading,
    /// Index screen is interactive.
    Ready,
    DetailLoading,
    DetailReady,
    /// The poet document could not be loaded.
    DetailError,
}

/// High-level navigation states. The index screen's own state lives on the
/// app so it survives trips to a poet.
enum Screen {
    Home,
    Poet(PoetScreen),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    loader: Loader,
    clipboard: Box<dyn Clipboard>,
    rng: StdRng,
    site: String,
    poets: Vec<PoetSummary>,
    poems: Vec<PoemSummary>,
    index_ticket: Option<Ticket>,
    random_ticket: Option<Ticket>,
    home: HomeScreen,
    screen: Screen,
    location: Location,
    history: Vec<Location>,
    status: Option<StatusMessage>,
    ticks: usize,
}

impl App {
    /// Start loading the index collections and open `start`.
    pub fn new(
        corpus: Arc<dyn Corpus>,
        clipboard: Box<dyn Clipboard>,
        site: &str,
        start: Location,
    ) -> Self {
        info!(source = %corpus.describe(), "opening corpus");
        let mut loader = Loader::new(corpus);
        let index_ticket = loader.request(Request::Index);
        let mut app = Self {
            loader,
            clipboard,
            rng: StdRng::from_entropy(),
            site: site.to_string(),
            poets: Vec::new(),
            poems: Vec::new(),
            index_ticket: Some(index_ticket),
            random_ticket: None,
            home: HomeScreen::new(),
            screen: Screen::Home,
            location: Location::index(),
            history: Vec::new(),
            status: None,
            ticks: 0,
        };
        app.enter(start);
        app
    }

    pub fn phase(&self) -> Phase {
        match &self.screen {
            Screen::Home => {
                if self.home_loading() {
                    Phase::Loading
                } else {
                    Phase::Ready
                }
            }
            Screen::Poet(poet) => match poet.load {
                DetailLoad::Loading(_) => Phase::DetailLoading,
                DetailLoad::Ready(_) => Phase::DetailReady,
                DetailLoad::NotFound => Phase::DetailError,
            },
        }
    }

    /// Current location, fragment included.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Full URL of the current location, as shared.
    pub fn current_url(&self) -> String {
        self.location.href(&self.site)
    }

    fn home_loading(&self) -> bool {
        self.index_ticket.is_some() || self.random_ticket.is_some()
    }

    /// Apply finished fetches, expire indicators and let the reveal trigger
    /// react to what is on screen. Called once per loop iteration.
    pub fn tick(&mut self, now: Instant) {
        self.ticks = self.ticks.wrapping_add(1);
        while let Some(response) = self.loader.try_next() {
            self.apply_response(response);
        }
        if let Screen::Poet(poet) = &mut self.screen {
            if let Some(view) = poet.view_mut() {
                view.expire_flashes(now);
            }
        }
        self.update_reveal();
    }

    fn update_reveal(&mut self) {
        let loading = self.home_loading();
        let home = &mut self.home;
        home.trigger.sync(loading, &home.search);
        if !matches!(self.screen, Screen::Home) {
            return;
        }
        let visible = home.tail_visible();
        if home.trigger.notify(visible, &mut home.search) {
            debug!(
                page = home.search.cursor().page(),
                poets = home.search.shown_poets().len(),
                poems = home.search.shown_poems().len(),
                "revealed next batch"
            );
            home.trigger.sync(loading, &home.search);
        }
    }

    fn apply_response(&mut self, response: Response) {
        let Response { ticket, payload } = response;
        match payload {
            Payload::Index(result) => {
                if self.index_ticket != Some(ticket) {
                    debug!(ticket, "discarding stale index response");
                    return;
                }
                self.index_ticket = None;
                match result {
                    Ok((poets, poems)) => {
                        info!(poets = poets.len(), poems = poems.len(), "index loaded");
                        self.poets = poets;
                        self.poems = poems;
                    }
                    Err(err) => {
                        error!(error = %err, "failed to load index data");
                        self.poets.clear();
                        self.poems.clear();
                    }
                }
                self.home.search.recompute(&self.poets, &self.poems);
            }
            Payload::Poet { id, result } => {
                let Screen::Poet(poet) = &mut self.screen else {
                    debug!(ticket, %id, "discarding poet response, screen closed");
                    return;
                };
                if !poet.waiting_for(ticket) {
                    debug!(ticket, %id, "discarding stale poet response");
                    return;
                }
                poet.load = match result {
                    Ok(detail) => {
                        info!(%id, poems = detail.poems.len(), "poet loaded");
                        DetailLoad::Ready(Box::new(PoetView::open(detail, &mut self.location)))
                    }
                    Err(err) if err.is_not_found() => {
                        warn!(%id, error = %err, "poet document missing");
                        DetailLoad::NotFound
                    }
                    Err(err) => {
                        error!(%id, error = %err, "failed to load poet");
                        DetailLoad::NotFound
                    }
                };
            }
            Payload::Random { poet_id, result } => {
                if self.random_ticket != Some(ticket) {
                    debug!(ticket, %poet_id, "discarding stale random pick");
                    return;
                }
                self.random_ticket = None;
                if let Err(err) = &result {
                    debug!(%poet_id, error = %err, "random pick fell back to the poet page");
                }
                let destination = random::destination(&poet_id, &result, &mut self.rng);
                self.navigate(destination);
            }
        }
    }

    /// Open `location` as a new history entry.
    pub fn navigate(&mut self, location: Location) {
        let previous = mem::replace(&mut self.location, Location::index());
        self.history.push(previous);
        self.enter(location);
    }

    /// Return to the previous location, or the index when there is none.
    pub fn back(&mut self) {
        let target = self.history.pop().unwrap_or_else(Location::index);
        self.enter(target);
    }

    /// Show the screen for `location`. Leaving a poet drops its screen, so any
    /// fetch still running for it is simply never applied.
    fn enter(&mut self, location: Location) {
        self.status = None;
        match location.route().clone() {
            Route::Index => {
                self.location = location;
                self.screen = Screen::Home;
            }
            Route::Poet { id } => {
                self.location = location;
                let ticket = self.loader.request(Request::Poet { id: id.clone() });
                self.screen = Screen::Poet(PoetScreen::loading(&id, ticket));
            }
        }
    }

    /// Pick a random poet and, once its document arrives, a random poem.
    pub fn start_random(&mut self) {
        if self.home_loading() {
            return;
        }
        let Some(poet) = random::pick_poet(&self.poets, &mut self.rng) else {
            self.set_status("Nothing loaded to pick from.", StatusKind::Error);
            return;
        };
        let poet_id = poet.id.clone();
        debug!(%poet_id, "random poet picked");
        self.random_ticket = Some(self.loader.request(Request::Random { poet_id }));
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        match self.screen {
            Screen::Home => self.handle_home_key(code, &mut exit),
            Screen::Poet(_) => self.handle_poet_key(code, &mut exit)?,
        }
        Ok(exit)
    }

    /// Clear the current query or table-of-contents filter.
    pub fn handle_ctrl_u(&mut self) {
        if let Screen::Poet(poet) = &mut self.screen {
            if let Some(view) = poet.view_mut() {
                view.edit_toc_query(|query| query.clear());
            }
            return;
        }
        if !self.home_loading() {
            self.home.clear(&self.poets, &self.poems);
        }
    }

    fn handle_home_key(&mut self, code: KeyCode, exit: &mut bool) {
        if self.home_loading() {
            if code == KeyCode::Char('q') {
                *exit = true;
            }
            return;
        }

        match code {
            KeyCode::Up => self.home.move_selection(-1),
            KeyCode::Down => self.home.move_selection(1),
            KeyCode::PageUp => self.home.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.home.move_selection(PAGE_STEP),
            _ if self.home.editing => self.handle_search_input(code),
            KeyCode::Char('q') => *exit = true,
            KeyCode::Char('/') | KeyCode::Char('f') => self.home.editing = true,
            KeyCode::Char('r') => self.start_random(),
            KeyCode::Home => self.home.select_first(),
            KeyCode::End => self.home.select_last(),
            KeyCode::Enter => self.open_selected_result(),
            KeyCode::Esc => {
                if self.home.input.is_empty() {
                    *exit = true;
                } else {
                    self.home.clear(&self.poets, &self.poems);
                }
            }
            _ => {}
        }
    }

    fn handle_search_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.home.editing = false,
            KeyCode::Enter => {
                self.home.editing = false;
                if self.home.current_entry().is_some() {
                    self.open_selected_result();
                }
            }
            KeyCode::Backspace => {
                self.home.input.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => self.home.input.push(ch),
            _ => {}
        }
        self.home.apply_input(&self.poets, &self.poems);
    }

    fn open_selected_result(&mut self) {
        match self.home.target(&self.poets, &self.poems) {
            Some(location) => self.navigate(location),
            None => self.set_status("No result selected.", StatusKind::Error),
        }
    }

    fn handle_poet_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<()> {
        let Screen::Poet(poet) = &mut self.screen else {
            return Ok(());
        };
        let Some(view) = poet.view_mut() else {
            match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.back(),
                _ => {}
            }
            return Ok(());
        };

        if view.toc.is_some() {
            match code {
                KeyCode::Esc | KeyCode::Tab => view.toggle_toc(),
                KeyCode::Up => view.move_toc(-1),
                KeyCode::Down => view.move_toc(1),
                KeyCode::PageUp => view.move_toc(-PAGE_STEP),
                KeyCode::PageDown => view.move_toc(PAGE_STEP),
                KeyCode::Enter => {
                    view.choose_toc(&mut self.location);
                }
                KeyCode::Backspace => view.edit_toc_query(|query| {
                    query.pop();
                }),
                KeyCode::Char(ch) if !ch.is_control() => {
                    view.edit_toc_query(|query| query.push(ch))
                }
                _ => {}
            }
            return Ok(());
        }

        match code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
                view.step(Step::Prev, &mut self.location);
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
                view.step(Step::Next, &mut self.location);
            }
            KeyCode::Up | KeyCode::Char('k') => view.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => view.scroll_by(1),
            KeyCode::Tab | KeyCode::Char('t') => view.toggle_toc(),
            KeyCode::Char('c') => self.copy_poem(),
            KeyCode::Char('s') => self.share_link(),
            KeyCode::Char('o') => self.open_in_browser(),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.back(),
            KeyCode::Char('q') => *exit = true,
            _ => {}
        }
        Ok(())
    }

    /// Put the open poem's text on the clipboard.
    pub fn copy_poem(&mut self) {
        let Screen::Poet(poet) = &mut self.screen else {
            return;
        };
        let Some(view) = poet.view_mut() else {
            return;
        };
        let Some(content) = view.current_poem().map(|poem| poem.content.clone()) else {
            return;
        };
        match self.clipboard.set(&content).context("failed to copy poem") {
            Ok(()) => view.copy.trigger(Instant::now()),
            Err(err) => {
                warn!(error = %err, "clipboard write failed");
                let message = surface_error(&err);
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    /// Put the full URL of the open poem on the clipboard.
    pub fn share_link(&mut self) {
        let url = self.current_url();
        let Screen::Poet(poet) = &mut self.screen else {
            return;
        };
        let Some(view) = poet.view_mut() else {
            return;
        };
        if view.current_poem().is_none() {
            return;
        }
        match self.clipboard.set(&url).context("failed to copy link") {
            Ok(()) => view.share.trigger(Instant::now()),
            Err(err) => {
                warn!(error = %err, "clipboard write failed");
                let message = surface_error(&err);
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    fn open_in_browser(&mut self) {
        if !is_http(&self.site) {
            self.set_status(
                "Links only open in a browser when --site is an http(s) URL.",
                StatusKind::Error,
            );
            return;
        }
        let url = self.current_url();
        match open_link(&url).with_context(|| format!("failed to open {url}")) {
            Ok(()) => self.set_status(format!("Opened {url}"), StatusKind::Info),
            Err(err) => {
                warn!(error = %err, "browser launch failed");
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Home => {
                let view = HomeView {
                    home: &self.home,
                    poets: &self.poets,
                    poems: &self.poems,
                    loading: self.home_loading(),
                    tick: self.ticks,
                };
                draw_home(frame, content_area, &view);
            }
            Screen::Poet(poet) => {
                let ctx = PoetDrawContext {
                    location: &self.location,
                    site: &self.site,
                    now: Instant::now(),
                    tick: self.ticks,
                };
                draw_poet(frame, content_area, poet, &ctx);
            }
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, self.phase()) {
            (_, Phase::Loading) | (_, Phase::DetailLoading) => key_hints(&[("q", "Quit")]),
            (Screen::Home, _) if self.home.editing => key_hints(&[
                ("↑↓", "Select"),
                ("Enter", "Open"),
                ("Esc", "Done"),
                ("Ctrl-U", "Clear"),
            ]),
            (Screen::Home, _) => key_hints(&[
                ("/", "Search"),
                ("↑↓", "Select"),
                ("Enter", "Open"),
                ("r", "Random"),
                ("Esc", "Clear"),
                ("q", "Quit"),
            ]),
            (Screen::Poet(_), Phase::DetailError) => key_hints(&[("Esc", "Back"), ("q", "Quit")]),
            (Screen::Poet(poet), _) => {
                let toc_open = matches!(&poet.load, DetailLoad::Ready(view) if view.toc.is_some());
                if toc_open {
                    key_hints(&[
                        ("type", "Filter"),
                        ("↑↓", "Select"),
                        ("Enter", "Jump"),
                        ("Esc", "Close"),
                    ])
                } else {
                    key_hints(&[
                        ("←→", "Prev/Next"),
                        ("↑↓", "Scroll"),
                        ("t", "Contents"),
                        ("c", "Copy"),
                        ("s", "Share"),
                        ("o", "Browser"),
                        ("Esc", "Back"),
                        ("q", "Quit"),
                    ])
                }
            }
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardError;
    use crate::corpus::memory::MemoryCorpus;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct MockClipboard {
        value: Arc<Mutex<String>>,
    }

    impl Clipboard for MockClipboard {
        fn set(&mut self, contents: &str) -> Result<(), ClipboardError> {
            *self.value.lock().expect("lock clipboard") = contents.to_string();
            Ok(())
        }
    }

    const SITE: &str = "https://example.org";

    fn make_app(corpus: MemoryCorpus, start: &str) -> (App, Arc<Mutex<String>>, Arc<MemoryCorpus>) {
        let corpus = Arc::new(corpus);
        let value = Arc::new(Mutex::new(String::new()));
        let clipboard = MockClipboard { value: value.clone() };
        let app = App::new(
            corpus.clone(),
            Box::new(clipboard),
            SITE,
            Location::parse(start),
        );
        (app, value, corpus)
    }

    /// Apply responses until nothing is in flight.
    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while in_flight(app) {
            assert!(Instant::now() < deadline, "fetches did not settle");
            if let Some(response) = app.loader.next_timeout(Duration::from_millis(50)) {
                app.apply_response(response);
            }
        }
        app.tick(Instant::now());
    }

    fn in_flight(app: &App) -> bool {
        app.home_loading() || app.phase() == Phase::DetailLoading
    }

    fn type_query(app: &mut App, query: &str) {
        app.handle_key(KeyCode::Char('/')).unwrap();
        for ch in query.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn corpus() -> MemoryCorpus {
        MemoryCorpus::default()
            .with_poet("li-bai", "李白", "libai", 5)
            .with_poet("du-fu", "杜甫", "dufu", 3)
    }

    #[test]
    fn starts_loading_then_becomes_ready() {
        let (mut app, _, _) = make_app(corpus(), "/");
        assert_eq!(app.phase(), Phase::Loading);
        settle(&mut app);
        assert_eq!(app.phase(), Phase::Ready);
        assert_eq!(app.poets.len(), 2);
        assert_eq!(app.poems.len(), 8);
    }

    #[test]
    fn failed_index_degrades_to_empty_collections() {
        let corpus = MemoryCorpus {
            fail_index: true,
            ..corpus()
        };
        let (mut app, _, _) = make_app(corpus, "/");
        settle(&mut app);
        assert_eq!(app.phase(), Phase::Ready);
        assert!(app.poets.is_empty());
        type_query(&mut app, "li");
        assert!(app.home.search.is_empty());
    }

    #[test]
    fn search_then_open_a_poem() {
        let (mut app, _, _) = make_app(corpus(), "/");
        settle(&mut app);
        type_query(&mut app, "杜甫 poem 2");
        assert_eq!(app.home.search.poem_matches().len(), 1);
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.phase(), Phase::DetailLoading);
        settle(&mut app);
        assert_eq!(app.phase(), Phase::DetailReady);
        assert_eq!(app.location().to_string(), "/poet/du-fu?poemId=2#poem-2");
    }

    #[test]
    fn fragment_selects_the_initial_poem() {
        let (mut app, _, _) = make_app(corpus(), "/poet/li-bai#poem-3");
        settle(&mut app);
        assert_eq!(app.location().fragment(), Some("poem-3"));

        let (mut app, _, _) = make_app(corpus(), "/poet/li-bai#poem-9");
        settle(&mut app);
        assert_eq!(app.location().fragment(), Some("poem-0"));

        let (mut app, _, _) = make_app(corpus(), "/poet/li-bai");
        settle(&mut app);
        assert_eq!(app.location().fragment(), Some("poem-0"));
    }

    #[test]
    fn arrows_step_and_clamp() {
        let (mut app, _, _) = make_app(corpus(), "/poet/du-fu");
        settle(&mut app);
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.location().fragment(), Some("poem-0"));
        for _ in 0..5 {
            app.handle_key(KeyCode::Right).unwrap();
        }
        assert_eq!(app.location().fragment(), Some("poem-2"));
        assert_eq!(app.history.len(), 0);
    }

    #[test]
    fn unknown_poet_shows_not_found() {
        let (mut app, _, _) = make_app(corpus(), "/poet/nobody");
        settle(&mut app);
        assert_eq!(app.phase(), Phase::DetailError);
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.phase(), Phase::Ready);
    }

    #[test]
    fn server_errors_also_show_not_found() {
        let corpus = MemoryCorpus {
            detail_status: Some(500),
            ..corpus()
        };
        let (mut app, _, _) = make_app(corpus, "/poet/li-bai");
        settle(&mut app);
        assert_eq!(app.phase(), Phase::DetailError);
    }

    #[test]
    fn copy_and_share_fill_the_clipboard() {
        let (mut app, clipboard, _) = make_app(corpus(), "/poet/li-bai#poem-1");
        settle(&mut app);

        app.handle_key(KeyCode::Char('c')).unwrap();
        assert_eq!(*clipboard.lock().unwrap(), "line one of 1\nline two of 1");

        app.handle_key(KeyCode::Char('s')).unwrap();
        assert_eq!(
            *clipboard.lock().unwrap(),
            "https://example.org/poet/li-bai#poem-1"
        );

        let Screen::Poet(poet) = &mut app.screen else {
            panic!("expected poet screen");
        };
        let view = poet.view_mut().unwrap();
        let now = Instant::now();
        assert!(view.copy.is_done(now));
        assert!(view.share.is_done(now));
    }

    #[test]
    fn random_with_an_empty_poet_opens_the_bare_page() {
        let corpus = MemoryCorpus::default().with_poet("hermit", "隐士", "yinshi", 0);
        let (mut app, _, _) = make_app(corpus, "/");
        settle(&mut app);
        app.handle_key(KeyCode::Char('r')).unwrap();
        assert_eq!(app.phase(), Phase::Loading);
        settle(&mut app);
        assert_eq!(app.location().to_string(), "/poet/hermit");
        assert_eq!(app.phase(), Phase::DetailReady);
    }

    #[test]
    fn random_lands_on_a_real_poem() {
        let corpus = MemoryCorpus::default().with_poet("li-bai", "李白", "libai", 5);
        let (mut app, _, _) = make_app(corpus, "/");
        settle(&mut app);
        app.start_random();
        settle(&mut app);
        let index: usize = app.location().poem_param().unwrap().parse().unwrap();
        assert!(index < 5);
        assert_eq!(app.location().fragment(), Some(format!("poem-{index}").as_str()));
    }

    #[test]
    fn leaving_a_poet_discards_its_late_response() {
        let (mut app, _, corpus) = make_app(corpus(), "/");
        settle(&mut app);
        app.navigate(Location::poet("li-bai", None));
        app.back();
        app.navigate(Location::poet("du-fu", None));
        settle(&mut app);
        // Let the abandoned li-bai fetch land too.
        while corpus.detail_fetches.load(Ordering::SeqCst) < 2 {
            std::thread::sleep(Duration::from_millis(5));
        }
        std::thread::sleep(Duration::from_millis(20));
        app.tick(Instant::now());
        assert_eq!(app.location().poet_id(), Some("du-fu"));
        let Screen::Poet(poet) = &mut app.screen else {
            panic!("expected poet screen");
        };
        assert_eq!(poet.view_mut().unwrap().detail.id, "du-fu");
    }

    #[test]
    fn scrolling_to_the_tail_reveals_the_next_batch() {
        let corpus = MemoryCorpus::default().with_poet("li-bai", "李白", "libai", 120);
        let (mut app, _, _) = make_app(corpus, "/");
        settle(&mut app);
        app.home.viewport.set(20);
        type_query(&mut app, "poem");
        app.tick(Instant::now());
        assert_eq!(app.home.search.shown_poems().len(), 50);

        app.handle_key(KeyCode::Esc).unwrap();
        app.handle_key(KeyCode::End).unwrap();
        app.tick(Instant::now());
        assert_eq!(app.home.search.shown_poems().len(), 100);

        app.handle_key(KeyCode::End).unwrap();
        app.tick(Instant::now());
        assert_eq!(app.home.search.shown_poems().len(), 120);

        app.handle_key(KeyCode::End).unwrap();
        app.tick(Instant::now());
        assert_eq!(app.home.search.shown_poems().len(), 120);
    }

    #[test]
    fn going_back_keeps_the_query() {
        let (mut app, _, _) = make_app(corpus(), "/");
        settle(&mut app);
        type_query(&mut app, "li");
        app.handle_key(KeyCode::Enter).unwrap();
        settle(&mut app);
        assert_eq!(app.phase(), Phase::DetailReady);
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.phase(), Phase::Ready);
        assert_eq!(app.home.search.query(), "li");
    }
}
