/// The book table and its row highlighting
///
/// `TableView` is the UI-visible state the sort animates. It only changes on
/// the rendering loop: sort updates reach it through `DisplaySurface`.
use iced::widget::{container, row, scrollable, text, Column};
use iced::{Background, Color, Element, Length, Theme};
use std::collections::HashMap;

use super::palette;
use crate::sort::{DisplaySurface, StepEvent};
use crate::state::data::BookRecord;

/// Why a row is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowHighlight {
    Pass,
    Compare,
    Swap,
}

impl RowHighlight {
    fn color(self) -> Color {
        match self {
            RowHighlight::Pass => palette::pass_row(),
            RowHighlight::Compare => palette::compare_row(),
            RowHighlight::Swap => palette::swap_row(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TableView {
    rows: Vec<BookRecord>,
    highlights: HashMap<usize, RowHighlight>,
    /// Rows are search results rather than the whole store
    filtered: bool,
}

impl TableView {
    pub fn new(rows: Vec<BookRecord>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Show every record, in store order
    pub fn show_all(&mut self, snapshot: Vec<BookRecord>) {
        self.rows = snapshot;
        self.filtered = false;
    }

    /// Show search results. Highlights refer to store positions, so they are dropped.
    pub fn show_search(&mut self, results: Vec<BookRecord>) {
        self.rows = results;
        self.filtered = true;
        self.highlights.clear();
    }

    pub fn rows(&self) -> &[BookRecord] {
        &self.rows
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn highlight(&self, index: usize) -> Option<RowHighlight> {
        self.highlights.get(&index).copied()
    }

    pub fn view<'a, Message: 'a>(&'a self) -> Element<'a, Message> {
        let header = table_row("ID", "Title", "Author", "Year", None);

        let body = Column::with_children(self.rows.iter().enumerate().map(|(index, book)| {
            table_row(
                book.id.to_string(),
                book.title.as_str(),
                book.author.as_str(),
                book.year.as_str(),
                self.highlight(index).map(RowHighlight::color),
            )
        }))
        .spacing(2);

        Column::new()
            .push(header)
            .push(scrollable(body).height(Length::Fill))
            .spacing(6)
            .into()
    }
}

impl DisplaySurface for TableView {
    fn on_step_event(&mut self, event: StepEvent) {
        if self.filtered {
            return;
        }
        match event {
            StepEvent::PassStart { pass } => {
                self.highlights.clear();
                self.highlights.insert(pass, RowHighlight::Pass);
            }
            StepEvent::CompareStart { index } => {
                self.highlights.insert(index, RowHighlight::Compare);
            }
            StepEvent::CompareEnd { index } => {
                self.highlights.remove(&index);
            }
            StepEvent::Swap { pass, min_index } => {
                self.highlights.insert(pass, RowHighlight::Swap);
                if event.swapped() {
                    self.highlights.insert(min_index, RowHighlight::Swap);
                }
            }
            StepEvent::SortComplete { .. } | StepEvent::Cancelled => {
                self.highlights.clear();
            }
        }
    }

    fn on_store_changed(&mut self, snapshot: Vec<BookRecord>) {
        self.show_all(snapshot);
    }
}

fn table_row<'a, Message: 'a>(
    id: impl text::IntoFragment<'a>,
    title: impl text::IntoFragment<'a>,
    author: impl text::IntoFragment<'a>,
    year: impl text::IntoFragment<'a>,
    highlight: Option<Color>,
) -> Element<'a, Message> {
    let cells = row![
        text(id).width(Length::FillPortion(1)),
        text(title).width(Length::FillPortion(4)),
        text(author).width(Length::FillPortion(3)),
        text(year).width(Length::FillPortion(1)),
    ]
    .spacing(12);

    container(cells)
        .width(Length::Fill)
        .padding(4)
        .style(move |_theme: &Theme| match highlight {
            Some(color) => container::Style {
                background: Some(Background::Color(color)),
                text_color: Some(Color::BLACK),
                ..container::Style::default()
            },
            None => container::Style {
                background: Some(Background::Color(palette::panel())),
                ..container::Style::default()
            },
        })
        .into()
}
