/// Colors used by the application shell
use iced::theme::Palette;
use iced::widget::button;
use iced::{Background, Border, Color, Theme};

/// Title label cycles through these, one step per tick
const TITLE_COLORS: [(u8, u8, u8); 5] = [
    (0x00, 0xFF, 0xAA),
    (0x00, 0xD4, 0xFF),
    (0xFF, 0xD7, 0x00),
    (0xFF, 0x66, 0xCC),
    (0x00, 0xFF, 0x88),
];

pub fn background() -> Color {
    Color::from_rgb8(0x1e, 0x1e, 0x2f)
}

pub fn panel() -> Color {
    Color::from_rgb8(0x29, 0x29, 0x3d)
}

pub fn accent() -> Color {
    Color::from_rgb8(0x00, 0xFF, 0xAA)
}

/// Row currently being filled by a pass
pub fn pass_row() -> Color {
    Color::from_rgb8(0xFF, 0xD7, 0x00)
}

/// Row being compared against the running minimum
pub fn compare_row() -> Color {
    Color::from_rgb8(0xFF, 0x66, 0x66)
}

/// Row that just received its final value
pub fn swap_row() -> Color {
    Color::from_rgb8(0x00, 0xFF, 0x88)
}

/// Resting button background
pub fn button_idle() -> Color {
    Color::from_rgb8(0x33, 0x33, 0x4d)
}

/// Buttons light up in the accent color with dark text while hovered
pub fn action_button(_theme: &Theme, status: button::Status) -> button::Style {
    let (background, text_color) = match status {
        button::Status::Hovered | button::Status::Pressed => (accent(), Color::BLACK),
        button::Status::Active => (button_idle(), Color::WHITE),
        button::Status::Disabled => (button_idle(), Color::from_rgb8(0x80, 0x80, 0x90)),
    };

    button::Style {
        background: Some(Background::Color(background)),
        text_color,
        border: Border {
            color: panel(),
            width: 2.0,
            radius: 4.0.into(),
        },
        ..button::Style::default()
    }
}

pub fn title_color(tick: usize) -> Color {
    let (r, g, b) = TITLE_COLORS[tick % TITLE_COLORS.len()];
    Color::from_rgb8(r, g, b)
}

pub fn theme() -> Theme {
    Theme::custom(
        "Library".to_string(),
        Palette {
            background: background(),
            text: Color::WHITE,
            primary: button_idle(),
            success: swap_row(),
            danger: compare_row(),
        },
    )
}
