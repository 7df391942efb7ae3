use std::io;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use portal_api::prelude::*;
use ratatui::{Terminal, backend::CrosstermBackend, widgets::TableState};
use tokio::runtime::Handle;
use tracing::debug;

use super::keys::{KeyAction, map_key_with_input_mode};
use super::loader::{FetchRequest, LoadEvent, Loader};
use super::ui;

/// Rows moved by PgUp / PgDn
const PAGE_STEP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Data,
    Api,
}

impl Route {
    pub const ALL: [Self; 2] = [Self::Data, Self::Api];

    pub fn title(self) -> &'static str {
        match self {
            Self::Data => "Data",
            Self::Api => "API",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Data => 0,
            Self::Api => 1,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Data => Self::Api,
            Self::Api => Self::Data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    None,
    Query,
}

/// Highlighted rows of one page: the catalog list and the detail table.
#[derive(Debug, Default)]
pub struct ViewState {
    pub list: TableState,
    pub detail: TableState,
}

pub struct App {
    pub route: Route,
    pub data: PageState<CatalogItem, Preview>,
    pub api: PageState<ApiSpec, ApiDocument>,
    pub data_view: ViewState,
    pub api_view: ViewState,
    pub formatter: CellFormatter,
    pub input_mode: InputMode,
    /// Byte offset of the cursor within the current page query.
    pub input_cursor: usize,
    pub show_help: bool,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Fetches requested since the last dispatch
    pub outbox: Vec<FetchRequest>,
}

impl App {
    /// A new app on `route`. The dataset catalog load is queued immediately.
    pub fn new(route: Route, apis: Vec<ApiSpec>, formatter: CellFormatter) -> Self {
        let mut data = PageState::default();
        let ticket = data.begin_catalog_load();

        let mut app = Self {
            route,
            data,
            api: PageState::new(apis),
            data_view: ViewState::default(),
            api_view: ViewState::default(),
            formatter,
            input_mode: InputMode::None,
            input_cursor: 0,
            show_help: false,
            should_quit: false,
            status_message: None,
            outbox: vec![FetchRequest::Sources(ticket)],
        };
        app.reset_list(Route::Api);
        app
    }

    pub fn run(client: PortalClient, formatter: CellFormatter, route: Route, handle: Handle) -> Result<()> {
        let mut app = Self::new(route, client.api_catalog(), formatter);
        let mut loader = Loader::new(client, handle);

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(info);
        }));

        let result = app.event_loop(&mut terminal, &mut loader);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        loader: &mut Loader,
    ) -> Result<()> {
        loop {
            for request in self.outbox.drain(..) {
                loader.dispatch(request);
            }
            for event in loader.drain() {
                self.apply(event);
            }

            terminal.draw(|frame| ui::draw(frame, self))?;

            if event::poll(std::time::Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                let action = map_key_with_input_mode(key, self.input_mode != InputMode::None);
                self.handle_action(action);
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    pub(crate) fn handle_action(&mut self, action: KeyAction) {
        if self.input_mode != InputMode::None {
            self.handle_input_action(action);
            return;
        }

        if self.show_help {
            match action {
                KeyAction::ToggleHelp | KeyAction::Dismiss => {
                    self.show_help = false;
                }
                KeyAction::Quit => {
                    self.show_help = false;
                    self.should_quit = true;
                }
                _ => {}
            }
            return;
        }

        if action != KeyAction::Noop {
            self.status_message = None;
        }

        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::ToggleHelp => self.show_help = true,
            KeyAction::NextRoute | KeyAction::PrevRoute => self.route = self.route.next(),
            KeyAction::JumpRoute(n) => {
                self.route = match n {
                    1 => Route::Data,
                    2 => Route::Api,
                    _ => self.route,
                };
            }
            KeyAction::MoveDown => self.move_down(1),
            KeyAction::MoveUp => self.move_up(1),
            KeyAction::PageDown => self.move_down(PAGE_STEP),
            KeyAction::PageUp => self.move_up(PAGE_STEP),
            KeyAction::JumpFirst => self.move_up(usize::MAX),
            KeyAction::JumpLast => self.move_down(usize::MAX),
            KeyAction::Open => self.open_highlighted(),
            KeyAction::Back => self.back(),
            KeyAction::StartQuery => {
                self.input_mode = InputMode::Query;
                self.input_cursor = self.current_query().len();
            }
            KeyAction::Dismiss => {
                if !self.current_query().is_empty() {
                    self.set_current_query(String::new());
                }
            }
            KeyAction::Download => self.download(),
            KeyAction::Reload => self.reload(),
            KeyAction::Noop
            | KeyAction::InputChar(_)
            | KeyAction::Backspace
            | KeyAction::CursorLeft
            | KeyAction::CursorRight
            | KeyAction::CursorStart
            | KeyAction::CursorEnd
            | KeyAction::KillToEnd => {}
        }
    }

    /// The query is applied as it is typed; Enter and Esc only leave input mode.
    fn handle_input_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Quit => {
                self.input_mode = InputMode::None;
                self.should_quit = true;
            }
            KeyAction::Dismiss | KeyAction::Open => {
                self.input_mode = InputMode::None;
            }
            KeyAction::Backspace => self.edit_query(|query, cursor| {
                if *cursor > 0 {
                    let prev = prev_boundary(query, *cursor);
                    query.drain(prev..*cursor);
                    *cursor = prev;
                }
            }),
            KeyAction::InputChar(c) => self.edit_query(|query, cursor| {
                query.insert(*cursor, c);
                *cursor += c.len_utf8();
            }),
            KeyAction::KillToEnd => self.edit_query(|query, cursor| query.truncate(*cursor)),
            KeyAction::CursorLeft => {
                self.input_cursor = prev_boundary(self.current_query(), self.input_cursor);
            }
            KeyAction::CursorRight => {
                let query = self.current_query();
                if self.input_cursor < query.len() {
                    self.input_cursor += query[self.input_cursor..]
                        .chars()
                        .next()
                        .map_or(0, char::len_utf8);
                }
            }
            KeyAction::CursorStart => self.input_cursor = 0,
            KeyAction::CursorEnd => self.input_cursor = self.current_query().len(),
            _ => {}
        }
    }

    /// Applies a fetch result. Results for superseded tickets are dropped by the page state.
    pub(crate) fn apply(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Sources(ticket, catalog) => {
                let origin = catalog.origin;
                if self.data.finish_catalog_load(ticket, catalog.items) {
                    debug!(%origin, count = self.data.catalog().len(), "catalog loaded");
                    self.data_view = ViewState::default();
                    self.reset_list(Route::Data);
                    // the reload cleared the query under the cursor
                    self.input_cursor = self.input_cursor.min(self.current_query().len());
                }
            }
            LoadEvent::Preview(ticket, result) => {
                if self.data.complete(&ticket, result) {
                    self.reset_detail(Route::Data);
                }
            }
            LoadEvent::ApiDocument(ticket, result) => {
                if self.api.complete(&ticket, result) {
                    self.reset_detail(Route::Api);
                }
            }
            LoadEvent::Downloaded { label, result } => {
                self.status_message = Some(match result {
                    Ok((path, bytes)) => format!(" saved {bytes} bytes to {}", path.display()),
                    Err(e) => format!(" download of {label} failed: {e}"),
                });
            }
        }
    }

    pub fn current_query(&self) -> &str {
        match self.route {
            Route::Data => self.data.query(),
            Route::Api => self.api.query(),
        }
    }

    fn is_listing(&self) -> bool {
        match self.route {
            Route::Data => self.data.selection().is_listing(),
            Route::Api => self.api.selection().is_listing(),
        }
    }

    fn set_current_query(&mut self, query: String) {
        match self.route {
            Route::Data => self.data.set_query(query),
            Route::Api => self.api.set_query(query),
        }
        self.input_cursor = self.input_cursor.min(self.current_query().len());
        if self.is_listing() {
            self.reset_list(self.route);
        } else {
            self.reset_detail(self.route);
        }
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut String, &mut usize)) {
        let mut query = self.current_query().to_string();
        let mut cursor = self.input_cursor.min(query.len());
        edit(&mut query, &mut cursor);
        self.input_cursor = cursor;
        if query != self.current_query() {
            self.set_current_query(query);
        }
    }

    /// Rows currently shown in the focused table of the current route
    pub fn visible_len(&self) -> usize {
        if self.is_listing() {
            self.list_len(self.route)
        } else {
            self.detail_len(self.route)
        }
    }

    fn list_len(&self, route: Route) -> usize {
        match route {
            Route::Data => self.data.filtered_catalog().len(),
            Route::Api => self.api.filtered_catalog().len(),
        }
    }

    fn detail_len(&self, route: Route) -> usize {
        match route {
            Route::Data => self.data.detail().detail().map_or(0, |preview| {
                preview.filtered_rows(self.data.query(), &self.formatter).len()
            }),
            Route::Api => self
                .api
                .detail()
                .detail()
                .map_or(0, |doc| filter_items(&doc.operations, self.api.query()).len()),
        }
    }

    fn view_mut(&mut self, route: Route) -> &mut ViewState {
        match route {
            Route::Data => &mut self.data_view,
            Route::Api => &mut self.api_view,
        }
    }

    fn focused_table(&mut self) -> &mut TableState {
        let (route, listing) = (self.route, self.is_listing());
        let view = self.view_mut(route);
        if listing { &mut view.list } else { &mut view.detail }
    }

    fn move_down(&mut self, amount: usize) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let state = self.focused_table();
        let current = state.selected().unwrap_or(0);
        state.select(Some(current.saturating_add(amount).min(len - 1)));
    }

    fn move_up(&mut self, amount: usize) {
        if self.visible_len() == 0 {
            return;
        }
        let state = self.focused_table();
        let current = state.selected().unwrap_or(0);
        state.select(Some(current.saturating_sub(amount)));
    }

    fn reset_list(&mut self, route: Route) {
        let len = self.list_len(route);
        self.view_mut(route)
            .list
            .select(if len > 0 { Some(0) } else { None });
    }

    fn reset_detail(&mut self, route: Route) {
        let len = self.detail_len(route);
        let view = self.view_mut(route);
        view.detail = TableState::default();
        if len > 0 {
            view.detail.select(Some(0));
        }
    }

    pub fn highlighted_dataset(&self) -> Option<&CatalogItem> {
        let idx = self.data_view.list.selected()?;
        self.data.filtered_catalog().get(idx).copied()
    }

    pub fn highlighted_api(&self) -> Option<&ApiSpec> {
        let idx = self.api_view.list.selected()?;
        self.api.filtered_catalog().get(idx).copied()
    }

    /// Opens the highlighted catalog entry. In a failed detail view, retries the selection.
    fn open_highlighted(&mut self) {
        match self.route {
            Route::Data => {
                let item = if self.data.selection().is_listing() {
                    self.highlighted_dataset().cloned()
                } else if self.data.detail().error().is_some() {
                    self.data.selected().cloned()
                } else {
                    None
                };
                if let Some(item) = item {
                    let ticket = self.data.select(item);
                    self.data_view.detail = TableState::default();
                    self.outbox.push(FetchRequest::Preview(ticket));
                }
            }
            Route::Api => {
                let spec = if self.api.selection().is_listing() {
                    self.highlighted_api().cloned()
                } else if self.api.detail().error().is_some() {
                    self.api.selected().cloned()
                } else {
                    None
                };
                if let Some(spec) = spec {
                    let ticket = self.api.select(spec);
                    self.api_view.detail = TableState::default();
                    self.outbox.push(FetchRequest::ApiDocument(ticket));
                }
            }
        }
    }

    fn back(&mut self) {
        let went_back = match self.route {
            Route::Data => self.data.back(),
            Route::Api => self.api.back(),
        };
        if went_back {
            // the query was cleared, so the full list is visible again
            let len = self.visible_len();
            let state = self.focused_table();
            let current = state.selected().unwrap_or(0);
            state.select(if len > 0 { Some(current.min(len - 1)) } else { None });
        }
    }

    fn download(&mut self) {
        let selected = if self.route == Route::Data {
            self.data.selected().cloned()
        } else {
            None
        };
        match selected {
            Some(item) => {
                self.status_message = Some(format!(
                    " downloading {}",
                    download_file_name(&item.label)
                ));
                self.outbox.push(FetchRequest::Download {
                    key: item.key,
                    label: item.label,
                });
            }
            None => {
                self.status_message = Some(" open a dataset to download it".to_string());
            }
        }
    }

    fn reload(&mut self) {
        match self.route {
            Route::Data => {
                let ticket = self.data.begin_catalog_load();
                self.outbox.push(FetchRequest::Sources(ticket));
            }
            Route::Api => {
                let apis = self.api.catalog().to_vec();
                self.api.replace_catalog(apis);
                self.api_view = ViewState::default();
                self.reset_list(Route::Api);
            }
        }
    }
}

fn prev_boundary(text: &str, cursor: usize) -> usize {
    let cursor = cursor.min(text.len());
    text[..cursor]
        .char_indices()
        .next_back()
        .map_or(0, |(i, _)| i)
}
