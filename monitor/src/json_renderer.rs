//! Renderer writing one JSON object per draw call.

use statscreen_core::{BarParams, CircularParams, DrawCall, RenderError, Renderer, TextParams};
use std::io::Write;
use std::path::Path;

/// Serialises draw calls as JSON lines for whatever drives the panel.
#[derive(Debug)]
pub struct JsonRenderer<W: Write> {
    out: W,
    bounds: Option<(u32, u32)>,
}

impl<W: Write> JsonRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self { out, bounds: None }
    }

    /// Reject elements whose origin falls outside a `width` x `height` panel.
    #[must_use]
    pub const fn with_bounds(mut self, width: u32, height: u32) -> Self {
        self.bounds = Some((width, height));
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn check(&self, x: i32, y: i32, background_image: Option<&Path>) -> Result<(), RenderError> {
        if let Some((width, height)) = self.bounds {
            let inside = |pos: i32, limit: u32| u32::try_from(pos).is_ok_and(|pos| pos < limit);
            if !inside(x, width) || !inside(y, height) {
                return Err(RenderError::OutOfBounds { x, y, width, height });
            }
        }
        if let Some(path) = background_image {
            if !path.exists() {
                return Err(RenderError::MissingImage { path: path.to_owned() });
            }
        }
        Ok(())
    }

    fn emit(&mut self, call: &DrawCall) -> Result<(), RenderError> {
        serde_json::to_writer(&mut self.out, call)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn draw_bar(&mut self, params: &BarParams) -> Result<(), RenderError> {
        self.check(params.x, params.y, params.background_image.as_deref())?;
        self.emit(&DrawCall::Bar(params.clone()))
    }

    fn draw_circular_gauge(&mut self, params: &CircularParams) -> Result<(), RenderError> {
        self.check(params.x, params.y, params.background_image.as_deref())?;
        self.emit(&DrawCall::CircularGauge(params.clone()))
    }

    fn draw_text(&mut self, params: &TextParams) -> Result<(), RenderError> {
        self.check(params.x, params.y, params.background_image.as_deref())?;
        self.emit(&DrawCall::Text(params.clone()))
    }
}
