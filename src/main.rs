use iced::widget::{button, column, container, row, text, text_input};
use iced::{alignment, Alignment, Element, Length, Size, Subscription, Task, Theme};
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::UnboundedReceiverStream;

mod config;
mod error;
mod sort;
mod state;
mod ui;

use config::SortConfig;
use error::{StartupError, ValidationError};
use sort::{SortEngine, SortHandle, SortUpdate, StepEvent};
use state::data::{BookFields, SortKey};
use state::store::RecordStore;
use ui::table::TableView;
use ui::toast::Toast;

/// How often the title changes color
const TITLE_CYCLE: Duration = Duration::from_millis(400);

/// Main application state
struct LibraryManager {
    /// The catalog, shared with the sort worker
    store: Arc<RecordStore>,
    engine: SortEngine,
    /// The sort currently animating, if any
    active_sort: Option<SortHandle>,
    /// Text in the entry fields
    fields: BookFields,
    search: String,
    table: TableView,
    toast: Option<Toast>,
    title_tick: usize,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    IdChanged(String),
    TitleChanged(String),
    AuthorChanged(String),
    YearChanged(String),
    SearchChanged(String),
    AddBook,
    Search,
    Sort(SortKey),
    StopSort,
    ClearAll,
    /// A step or table refresh from the sort worker
    SortProgress(SortUpdate),
    TitleTick,
    ToastTick,
    Exit,
}

impl LibraryManager {
    fn new(config: SortConfig, runtime: tokio::runtime::Handle) -> (Self, Task<Message>) {
        let store = Arc::new(RecordStore::new());
        let engine = SortEngine::new(Arc::clone(&store), config, runtime);
        let store_snapshot = store.snapshot();

        log::info!(
            "📚 Library manager ready (compare delay {:?}, swap delay {:?})",
            config.compare_delay(),
            config.swap_delay()
        );

        (
            LibraryManager {
                store,
                engine,
                active_sort: None,
                fields: BookFields::default(),
                search: String::new(),
                table: TableView::new(store_snapshot),
                toast: None,
                title_tick: 0,
                status: "Ready. Add a book to get started.".to_string(),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::IdChanged(value) => self.fields.id = value,
            Message::TitleChanged(value) => self.fields.title = value,
            Message::AuthorChanged(value) => self.fields.author = value,
            Message::YearChanged(value) => self.fields.year = value,
            Message::SearchChanged(value) => self.search = value,
            Message::AddBook => self.add_book(),
            Message::Search => {
                let results = self.store.find_matching(&self.search);
                self.table.show_search(results);
                self.status = format!("{} matching books", self.table.rows().len());
            }
            Message::Sort(key) => return self.start_sort(key),
            Message::StopSort => {
                if let Some(handle) = &self.active_sort {
                    if handle.is_cancelled() {
                        self.status = "Already stopping; waiting for the current step to finish.".to_string();
                    } else {
                        handle.cancel();
                        self.status = format!("Stopping sort by {}...", handle.key());
                    }
                }
            }
            Message::ClearAll => {
                if self.store.is_sorting() {
                    self.status = "Stop the running sort before clearing the library.".to_string();
                } else if self.store.is_empty() {
                    self.status = "The library is already empty.".to_string();
                } else {
                    self.store.clear();
                    self.table.show_all(self.store.snapshot());
                    self.status = "Library cleared.".to_string();
                }
            }
            Message::SortProgress(update) => self.apply_sort_update(update),
            Message::TitleTick => self.title_tick = self.title_tick.wrapping_add(1),
            Message::ToastTick => {
                if let Some(toast) = &mut self.toast {
                    if !toast.fade() {
                        self.toast = None;
                    }
                }
            }
            Message::Exit => {
                if let Some(handle) = &self.active_sort {
                    handle.cancel();
                }
                return iced::exit();
            }
        }

        Task::none()
    }

    fn add_book(&mut self) {
        match self.store.insert(&self.fields) {
            Ok(book) => {
                self.table.show_all(self.store.snapshot());
                self.status = format!("Added \"{}\".", book.title);
                self.toast = Some(Toast::new("Book Added!", ui::palette::accent()));
            }
            Err(e @ ValidationError::MissingField { .. }) => {
                log::warn!("Rejected book: {}", e);
                show_dialog(MessageLevel::Warning, "Warning", "Please fill all fields!");
            }
            Err(e @ ValidationError::InvalidId { .. }) => {
                log::warn!("Rejected book: {}", e);
                show_dialog(MessageLevel::Error, "Error", "Book ID must be a number!");
            }
        }
    }

    fn start_sort(&mut self, key: SortKey) -> Task<Message> {
        match self.engine.request_sort(key) {
            Ok(mut handle) => {
                // Highlights index into the store, so show all of it
                self.table.show_all(self.store.snapshot());
                self.status = format!("Sorting by {}...", key);

                let updates = handle.take_updates();
                self.active_sort = Some(handle);
                match updates {
                    Some(updates) => {
                        Task::run(UnboundedReceiverStream::new(updates), Message::SortProgress)
                    }
                    None => Task::none(),
                }
            }
            Err(e) => {
                self.status = e.to_string();
                Task::none()
            }
        }
    }

    fn apply_sort_update(&mut self, update: SortUpdate) {
        let terminal = match &update {
            SortUpdate::Step(event) if event.is_terminal() => Some(*event),
            _ => None,
        };

        if let SortUpdate::Step(StepEvent::PassStart { .. }) = &update {
            if let Some(handle) = &self.active_sort {
                let progress = handle.progress();
                self.status = format!(
                    "Sorting by {}: filling row {} (minimum so far at row {})",
                    handle.key(),
                    progress.current_pass + 1,
                    progress.current_min_index + 1
                );
            }
        }

        update.deliver(&mut self.table);

        match terminal {
            Some(StepEvent::SortComplete { key }) => {
                self.release_finished_sort();
                self.status = format!("Books sorted by {}.", key);
                show_dialog(
                    MessageLevel::Info,
                    "Sorting Complete",
                    &format!("Books sorted by {}!", key),
                );
            }
            Some(_) => {
                self.release_finished_sort();
                self.status = "Sort stopped.".to_string();
            }
            None => {}
        }
    }

    /// Drop the handle of a run that has ended. A newer run that was
    /// started before this terminal event arrived is left alone.
    fn release_finished_sort(&mut self) {
        if self
            .active_sort
            .as_ref()
            .is_some_and(|handle| !handle.progress().active)
        {
            self.active_sort = None;
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let title = text("Library Management System")
            .size(28)
            .color(ui::palette::title_color(self.title_tick));

        let inputs = row![
            text_input("ID", &self.fields.id)
                .on_input(Message::IdChanged)
                .padding(8)
                .width(Length::Fixed(100.0)),
            text_input("Title", &self.fields.title)
                .on_input(Message::TitleChanged)
                .padding(8)
                .width(Length::Fixed(250.0)),
            text_input("Author", &self.fields.author)
                .on_input(Message::AuthorChanged)
                .padding(8)
                .width(Length::Fixed(200.0)),
            text_input("Year", &self.fields.year)
                .on_input(Message::YearChanged)
                .on_submit(Message::AddBook)
                .padding(8)
                .width(Length::Fixed(100.0)),
        ]
        .spacing(16);

        let sorting = self.engine.is_running();
        let buttons = row![
            action_button("Add Book", Some(Message::AddBook)),
            action_button("Search", Some(Message::Search)),
            action_button("Sort by ID", Some(Message::Sort(SortKey::Id))),
            action_button("Sort by Title", Some(Message::Sort(SortKey::Title))),
            action_button("Stop Sort", sorting.then_some(Message::StopSort)),
            action_button("Clear All", (!self.store.is_sorting()).then_some(Message::ClearAll)),
            action_button("Exit", Some(Message::Exit)),
        ]
        .spacing(10);

        let search = text_input("Search by ID or title", &self.search)
            .on_input(Message::SearchChanged)
            .on_submit(Message::Search)
            .padding(8)
            .width(Length::Fixed(360.0));

        let toast = self
            .toast
            .as_ref()
            .map(|toast| text(toast.text()).size(18).color(toast.color()));

        let content = column![title, inputs, buttons, search]
            .push_maybe(toast)
            .push(text(&self.status).size(14))
            .push_maybe(
                self.table
                    .is_filtered()
                    .then(|| text("Showing search results. Search with an empty query to list every book.").size(12)),
            )
            .push(self.table.view())
            .spacing(14)
            .padding(20)
            .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let title = iced::time::every(TITLE_CYCLE).map(|_| Message::TitleTick);
        let toast = if self.toast.is_some() {
            iced::time::every(ui::toast::FADE_INTERVAL).map(|_| Message::ToastTick)
        } else {
            Subscription::none()
        };
        Subscription::batch([title, toast])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        ui::palette::theme()
    }
}

/// Toolbar button with the hover highlight; disabled when `message` is `None`
fn action_button(label: &str, message: Option<Message>) -> button::Button<'_, Message> {
    button(text(label).width(Length::Fill).align_x(alignment::Horizontal::Center))
        .on_press_maybe(message)
        .padding(10)
        .width(Length::Fixed(130.0))
        .style(ui::palette::action_button)
}

/// Show a blocking native message box
fn show_dialog(level: MessageLevel, title: &str, description: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn main() -> Result<(), StartupError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SortConfig::load()?;

    // Sort pacing runs here, never on the rendering thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("sort-worker")
        .enable_time()
        .build()?;
    let handle = runtime.handle().clone();

    iced::application(
        "Library Management System",
        LibraryManager::update,
        LibraryManager::view,
    )
    .theme(LibraryManager::theme)
    .subscription(LibraryManager::subscription)
    .window_size(Size::new(1000.0, 650.0))
    .centered()
    .run_with(move || LibraryManager::new(config, handle))?;

    Ok(())
}
