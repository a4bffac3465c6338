use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::filter::FilterEngine;
use crate::geo::{resolve_current_location, Gazetteer, PositionProvider};
use crate::loader::{self, Availability, Board, JobSource};
use crate::models::{Job, LocationOption};
use crate::selection::{detail_text, placeholder_text, skill_tags, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Search,
    Location,
    Results,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Search => Focus::Location,
            Focus::Location => Focus::Results,
            Focus::Results => Focus::Search,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Search => Focus::Results,
            Focus::Location => Focus::Search,
            Focus::Results => Focus::Location,
        }
    }
}

/// Searchable location dropdown.
#[derive(Debug, Default)]
struct Picker {
    filter: String,
    highlighted: usize,
}

impl Picker {
    fn matching<'a>(&self, options: &'a [LocationOption]) -> Vec<&'a LocationOption> {
        let needle = self.filter.to_lowercase();
        options
            .iter()
            .filter(|o| o.label.to_lowercase().contains(&needle))
            .collect()
    }
}

struct AppState {
    source: JobSource,
    engine: FilterEngine,
    locations: Vec<LocationOption>,
    availability: Availability,
    skipped: usize,
    selection: Selection,
    cursor: usize,
    scroll_offset: u16,
    focus: Focus,
    picker: Option<Picker>,
    status: Option<String>,
    provider: Box<dyn PositionProvider>,
    gazetteer: Gazetteer,
    placeholder: String,
}

impl AppState {
    fn new(
        source: JobSource,
        board: Board,
        provider: Box<dyn PositionProvider>,
        gazetteer: Gazetteer,
        placeholder: String,
    ) -> Self {
        Self {
            source,
            engine: FilterEngine::new(board.jobs),
            locations: board.locations,
            availability: board.availability,
            skipped: board.skipped.len(),
            selection: Selection::default(),
            cursor: 0,
            scroll_offset: 0,
            focus: Focus::Search,
            picker: None,
            status: None,
            provider,
            gazetteer,
            placeholder,
        }
    }

    fn cursor_job(&self) -> Option<&Job> {
        let id = self.engine.visible().get(self.cursor)?;
        self.engine.job(*id)
    }

    fn selected_job(&self) -> Option<&Job> {
        self.selection.selected_job(self.engine.jobs())
    }

    fn clamp_cursor(&mut self) {
        let len = self.engine.visible_count();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn next(&mut self) {
        let len = self.engine.visible_count();
        if len > 0 && self.cursor < len - 1 {
            self.cursor += 1;
        }
    }

    fn prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn click(&mut self) {
        if let Some(id) = self.cursor_job().map(|job| job.id) {
            self.selection.click(id);
            self.scroll_offset = 0;
        }
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut String)) {
        let mut query = self.engine.criteria().query.clone();
        edit(&mut query);
        self.engine.set_query(query);
        self.clamp_cursor();
    }

    fn search(&mut self) {
        self.engine.trigger_search();
        self.cursor = 0;
        self.status = None;
    }

    fn choose_location(&mut self, option: LocationOption) {
        if !option.is_current_location() {
            self.engine.set_location(Some(option));
            self.clamp_cursor();
            return;
        }
        match resolve_current_location(self.provider.as_ref(), &self.locations, &self.gazetteer) {
            Some(nearest) => {
                self.status = Some(format!("Nearest location: {}", nearest.label));
                self.engine.set_location(Some(nearest));
                self.clamp_cursor();
            }
            None => {
                self.status = Some("Current location unavailable".to_string());
            }
        }
    }

    /// Fetch the job list again. The selection survives if its job is still present.
    fn reload(&mut self) {
        self.apply_board(loader::load(&self.source));
    }

    fn apply_board(&mut self, board: Board) {
        self.locations = board.locations;
        self.availability = board.availability;
        self.skipped = board.skipped.len();
        self.engine.reset(board.jobs);
        if let Some(id) = self.selection.id() {
            if self.engine.job(id).is_none() {
                self.selection = Selection::None;
            }
        }
        self.clamp_cursor();
        self.status = Some(format!("Reloaded {} jobs", self.engine.jobs().len()));
    }

    fn clear_location(&mut self) {
        self.engine.set_location(None);
        self.clamp_cursor();
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        if self.picker.is_some() {
            self.handle_picker_key(key);
            return false;
        }
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            _ => match self.focus {
                Focus::Search => self.handle_search_key(key.code),
                Focus::Location => self.handle_location_key(key.code),
                Focus::Results => return self.handle_results_key(key.code),
            },
        }
        false
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.search(),
            KeyCode::Backspace => self.edit_query(|q| {
                q.pop();
            }),
            KeyCode::Char(c) => self.edit_query(|q| q.push(c)),
            _ => {}
        }
    }

    fn handle_location_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Down => self.picker = Some(Picker::default()),
            KeyCode::Backspace | KeyCode::Delete => self.clear_location(),
            _ => {}
        }
    }

    fn handle_results_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.prev(),
            KeyCode::Char('J') | KeyCode::PageDown => self.scroll_down(),
            KeyCode::Char('K') | KeyCode::PageUp => self.scroll_up(),
            KeyCode::Enter | KeyCode::Char(' ') => self.click(),
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Some(picker) = self.picker.as_mut() else { return };
        let count = picker.matching(&self.locations).len();
        match key.code {
            KeyCode::Esc => self.picker = None,
            KeyCode::Down => {
                if count > 0 && picker.highlighted < count - 1 {
                    picker.highlighted += 1;
                }
            }
            KeyCode::Up => picker.highlighted = picker.highlighted.saturating_sub(1),
            KeyCode::Backspace => {
                picker.filter.pop();
                picker.highlighted = 0;
            }
            KeyCode::Char(c) => {
                picker.filter.push(c);
                picker.highlighted = 0;
            }
            KeyCode::Enter => {
                let chosen = picker
                    .matching(&self.locations)
                    .get(picker.highlighted)
                    .map(|o| (*o).clone());
                self.picker = None;
                if let Some(option) = chosen {
                    self.choose_location(option);
                }
            }
            _ => {}
        }
    }
}

pub fn run_browse(
    source: JobSource,
    board: Board,
    provider: Box<dyn PositionProvider>,
    gazetteer: Gazetteer,
    placeholder: String,
) -> Result<()> {
    let mut state = AppState::new(source, board, provider, gazetteer, placeholder);

    // Setup terminal; restored when `_restore` drops, on every exit path
    enable_raw_mode()?;
    let _restore = OnDrop(restore_terminal);
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    run_loop(&mut terminal, &mut state)
}

/// Runs the wrapped closure when dropped.
struct OnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for OnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        tracing::warn!(error = %e, "failed to disable raw mode");
    }
    if let Err(e) = stdout().execute(LeaveAlternateScreen) {
        tracing::warn!(error = %e, "failed to leave alternate screen");
    }
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select((state.engine.visible_count() > 0).then_some(state.cursor));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if state.handle_key(key) {
                break;
            }
        }
    }
    Ok(())
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::LightMagenta)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).border_style(style).title(title)
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .split(rows[0]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(panes[0]);

    draw_search_bar(frame, state, left[0]);
    draw_results(frame, state, left[1], list_state);
    draw_detail(frame, state, panes[1]);

    // Footer help
    let help = state.status.clone().unwrap_or_else(|| {
        " tab:focus  enter:search/open/select  j/k:navigate  J/K:scroll  r:reload  bksp:clear location  q/esc:quit"
            .to_string()
    });
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );

    if let Some(picker) = &state.picker {
        draw_picker(frame, state, picker, left[0]);
    }
}

/// Cursor just past the typed text, kept inside the input's border.
fn input_cursor(area: Rect, text: &str) -> (u16, u16) {
    let typed = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(typed);
    (x.min(area.right().saturating_sub(2)), area.y.saturating_add(1))
}

fn draw_search_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Percentage(33),
            Constraint::Length(12),
        ])
        .split(area);

    let query = &state.engine.criteria().query;
    let query_line = if query.is_empty() {
        Line::from(Span::styled("Search jobs...", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(query.as_str())
    };
    frame.render_widget(
        Paragraph::new(query_line).block(focus_block(" Search ", state.focus == Focus::Search)),
        cols[0],
    );
    if state.focus == Focus::Search && state.picker.is_none() {
        frame.set_cursor_position(input_cursor(cols[0], query));
    }

    let location_line = match &state.engine.criteria().location {
        Some(option) => Line::from(option.label.as_str()),
        None => Line::from(Span::styled("Select Location", Style::default().fg(Color::DarkGray))),
    };
    frame.render_widget(
        Paragraph::new(location_line)
            .block(focus_block(" Location ", state.focus == Focus::Location)),
        cols[1],
    );

    let button = Paragraph::new(Line::from(Span::styled(
        " Search ",
        Style::default().bg(Color::LightMagenta).fg(Color::White).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, cols[2]);
}

fn job_card(job: &Job, selected: bool) -> ListItem<'static> {
    let marker = if selected { "* " } else { "  " };
    let lines = vec![
        Line::from(vec![
            Span::raw(marker),
            Span::styled(job.position.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(format!("  {}", job.company)),
        Line::from(
            std::iter::once(Span::raw("  "))
                .chain(skill_tags(&job.skills).spans)
                .collect::<Vec<_>>(),
        ),
        Line::from(vec![
            Span::styled(format!("  {}", job.salary), Style::default().fg(Color::LightMagenta)),
            Span::styled(format!("  {}", job.posted_time), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];
    ListItem::new(lines)
}

fn draw_results(frame: &mut Frame, state: &AppState, area: Rect, list_state: &mut ListState) {
    let title = format!(" Search Results - {} Jobs Found ", state.engine.visible_count());
    let block = focus_block(&title, state.focus == Focus::Results);

    if let Availability::Unavailable(reason) = &state.availability {
        let text = Text::from(vec![
            Line::from(Span::styled(
                "No jobs available",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(reason.clone(), Style::default().fg(Color::Red))),
        ]);
        frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: false }), area);
        return;
    }

    let items: Vec<ListItem> = state
        .engine
        .visible_jobs()
        .map(|job| job_card(job, state.selection.is_selected(job.id)))
        .collect();

    let mut block = block;
    if state.skipped > 0 {
        block = block.title_bottom(format!(" {} malformed record(s) skipped ", state.skipped));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, list_state);
}

fn draw_detail(frame: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Detail ");
    let widget = match state.selected_job() {
        Some(job) => Paragraph::new(detail_text(job, area.width.saturating_sub(2) as usize))
            .scroll((state.scroll_offset, 0)),
        None => Paragraph::new(placeholder_text(&state.placeholder)),
    };
    frame.render_widget(widget.block(block).wrap(Wrap { trim: false }), area);
}

fn draw_picker(frame: &mut Frame, state: &AppState, picker: &Picker, anchor: Rect) {
    let options = picker.matching(&state.locations);
    let frame_area = frame.area();
    let height = (options.len() as u16 + 3).min(frame_area.height.saturating_sub(anchor.bottom()));
    let area = Rect {
        x: anchor.x + anchor.width / 3,
        y: anchor.bottom(),
        width: (anchor.width / 2).max(20).min(frame_area.width),
        height: height.max(3),
    }
    .intersection(frame_area);

    let items: Vec<ListItem> = options
        .iter()
        .map(|o| ListItem::new(o.label.clone()))
        .collect();
    let mut list_state = ListState::default();
    if !options.is_empty() {
        list_state.select(Some(picker.highlighted));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightMagenta))
                .title(format!(
                    " {} ",
                    if picker.filter.is_empty() { "Type to filter" } else { picker.filter.as_str() }
                )),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut list_state);
}
