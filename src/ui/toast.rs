/// Short-lived status message that fades out
use iced::Color;
use std::time::Duration;

/// How often the toast fades
pub const FADE_INTERVAL: Duration = Duration::from_millis(50);

/// Alpha lost per fade tick
const FADE_STEP: f32 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    text: String,
    color: Color,
    alpha: f32,
}

impl Toast {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
            alpha: 1.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The toast color at its current opacity
    pub fn color(&self) -> Color {
        Color {
            a: self.alpha,
            ..self.color
        }
    }

    /// Fade one step. Returns false once the toast is fully transparent.
    pub fn fade(&mut self) -> bool {
        self.alpha = (self.alpha - FADE_STEP).max(0.0);
        self.alpha > FADE_STEP / 2.0
    }
}
