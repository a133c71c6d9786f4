//! Drawing primitives.
//!
//! The engine never paints pixels itself. Dispatch hands fully resolved
//! parameters to a [`Renderer`], which owns the display transport.

use crate::ramp::Rgb;
use serde::Serialize;
use std::path::PathBuf;

/// Font used when an element does not name one.
pub const DEFAULT_FONT: &str = "roboto-mono/RobotoMono-Regular.ttf";
/// Font size used when an element does not set one.
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Horizontal progress bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarParams {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub value: i64,
    pub min_value: f64,
    pub max_value: f64,
    pub text: String,
    pub font: String,
    pub font_size: u32,
    pub font_color: Rgb,
    pub stroke_width: u32,
    pub bar_color: Rgb,
    pub bar_outline: bool,
    pub background_color: Rgb,
    pub background_image: Option<PathBuf>,
}

/// Circular gauge drawn as an arc starting at `start_angle` degrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircularParams {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub thickness: i32,
    pub start_angle: i32,
    pub value: i64,
    pub min_value: f64,
    pub max_value: f64,
    pub text: String,
    pub font: String,
    pub font_size: u32,
    pub font_color: Rgb,
    pub stroke_width: u32,
    pub bar_color: Rgb,
    pub bar_outline: bool,
    pub background_color: Rgb,
    pub background_image: Option<PathBuf>,
}

/// A block of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextParams {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub font: String,
    pub font_size: u32,
    pub font_color: Rgb,
    pub background_color: Rgb,
    pub background_image: Option<PathBuf>,
}

/// Errors a renderer may report back to dispatch.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode draw call: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("element at ({x}, {y}) is outside the {width}x{height} display")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    #[error("background image not found: {}", path.display())]
    MissingImage { path: PathBuf },
}

/// The display side of the engine.
pub trait Renderer {
    fn draw_bar(&mut self, params: &BarParams) -> Result<(), RenderError>;

    fn draw_circular_gauge(&mut self, params: &CircularParams) -> Result<(), RenderError>;

    fn draw_text(&mut self, params: &TextParams) -> Result<(), RenderError>;
}

/// One recorded primitive call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCall {
    Bar(BarParams),
    CircularGauge(CircularParams),
    Text(TextParams),
}

impl DrawCall {
    /// The text carried by the call, whatever its kind.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Bar(params) => &params.text,
            Self::CircularGauge(params) => &params.text,
            Self::Text(params) => &params.text,
        }
    }
}

/// Renderer that keeps every call in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text(params) => Some(params.text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_bar(&mut self, params: &BarParams) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Bar(params.clone()));
        Ok(())
    }

    fn draw_circular_gauge(&mut self, params: &CircularParams) -> Result<(), RenderError> {
        self.calls.push(DrawCall::CircularGauge(params.clone()));
        Ok(())
    }

    fn draw_text(&mut self, params: &TextParams) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Text(params.clone()));
        Ok(())
    }
}
