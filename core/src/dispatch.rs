//! Resolution of a reading into draw calls.
//!
//! [`Dispatcher::present`] is the single entry point every presenter goes
//! through: it looks the metric up in the theme, builds color ramps for the
//! configured elements and invokes the renderer once per shown element.

use crate::ramp::{parse_color, ColorRamp, Rgb};
use crate::render::{
    BarParams, CircularParams, Renderer, TextParams, DEFAULT_FONT, DEFAULT_FONT_SIZE,
};
use crate::theme::{is_truthy, MetricPoint, Resolution, Theme, ThemeError};
use crate::{format, DispatchError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// `GRAPH` element: a horizontal progress bar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct GraphSpec {
    pub show: bool,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub text: bool,
    pub show_unit: bool,
    pub min_value: f64,
    pub max_value: f64,
    pub font: String,
    pub font_size: u32,
    pub stroke_width: u32,
    pub bar_color: Option<Value>,
    pub font_color: Option<Value>,
    pub bar_outline: bool,
    pub background_color: Option<Value>,
    pub background_image: Option<String>,
}

impl Default for GraphSpec {
    fn default() -> Self {
        Self {
            show: false,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            text: false,
            show_unit: true,
            min_value: 0.0,
            max_value: 100.0,
            font: DEFAULT_FONT.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            stroke_width: 10,
            bar_color: None,
            font_color: None,
            bar_outline: false,
            background_color: None,
            background_image: None,
        }
    }
}

/// `GRAPH_CIRC` element: a circular gauge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct CircularSpec {
    pub show: bool,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "R")]
    pub radius: i32,
    pub thickness: i32,
    pub start_angle: i32,
    pub text: bool,
    pub show_unit: bool,
    pub min_value: f64,
    pub max_value: f64,
    pub font: String,
    pub font_size: u32,
    pub stroke_width: u32,
    pub bar_color: Option<Value>,
    pub font_color: Option<Value>,
    pub bar_outline: bool,
    pub background_color: Option<Value>,
    pub background_image: Option<String>,
}

impl Default for CircularSpec {
    fn default() -> Self {
        Self {
            show: false,
            x: 0,
            y: 0,
            radius: 0,
            thickness: 0,
            start_angle: 0,
            text: false,
            show_unit: true,
            min_value: 0.0,
            max_value: 100.0,
            font: DEFAULT_FONT.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            stroke_width: 0,
            bar_color: None,
            font_color: None,
            bar_outline: false,
            background_color: None,
            background_image: None,
        }
    }
}

/// `TEXT` and `PERCENT_TEXT` elements.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct TextSpec {
    pub show: bool,
    pub x: i32,
    pub y: i32,
    pub show_unit: bool,
    pub font: String,
    pub font_size: u32,
    pub font_color: Option<Value>,
    pub background_color: Option<Value>,
    pub background_image: Option<String>,
    /// Only read by the date presenter.
    pub format: Option<String>,
}

impl Default for TextSpec {
    fn default() -> Self {
        Self {
            show: false,
            x: 0,
            y: 0,
            show_unit: false,
            font: DEFAULT_FONT.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            font_color: None,
            background_color: None,
            background_image: None,
            format: None,
        }
    }
}

/// The elements configured on one theme leaf.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualConfig {
    pub graph: Option<GraphSpec>,
    pub graph_circ: Option<CircularSpec>,
    pub text: Option<TextSpec>,
    pub percent_text: Option<TextSpec>,
}

impl VisualConfig {
    /// Parse the element maps of a resolved leaf. Elements that are absent or
    /// empty are left as `None`.
    pub fn from_node(point: &MetricPoint<'_>, node: &Map<String, Value>) -> Result<Self, ThemeError> {
        Ok(Self {
            graph: element(point, node, "GRAPH")?,
            graph_circ: element(point, node, "GRAPH_CIRC")?,
            text: element(point, node, "TEXT")?,
            percent_text: element(point, node, "PERCENT_TEXT")?,
        })
    }
}

fn element<T: DeserializeOwned>(
    point: &MetricPoint<'_>,
    node: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<T>, ThemeError> {
    match node.get(name) {
        Some(spec) if is_truthy(spec) => T::deserialize(spec)
            .map(Some)
            .map_err(|source| ThemeError::Element {
                point: point.to_string(),
                element: name,
                source,
            }),
        _ => Ok(None),
    }
}

/// Integer part of a reading, as drawn on bars and gauges.
///
/// Saturates at the `i64` range; NaN becomes 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn truncate(value: f64) -> i64 {
    value as i64
}

/// Routes readings to the renderer according to the theme.
pub struct Dispatcher<'a> {
    theme: &'a Theme,
    renderer: &'a mut dyn Renderer,
}

impl<'a> Dispatcher<'a> {
    pub fn new(theme: &'a Theme, renderer: &'a mut dyn Renderer) -> Self {
        Self { theme, renderer }
    }

    #[must_use]
    pub const fn theme(&self) -> &'a Theme {
        self.theme
    }

    /// Draw every configured element for `point`.
    ///
    /// `value` drives bars, gauges and colors; `value_text` is what text
    /// elements show. Elements that need a number are skipped when `value`
    /// is `None`. An unconfigured point is a no-op.
    pub fn present(
        &mut self,
        point: &MetricPoint<'_>,
        value: Option<f64>,
        value_text: &str,
        unit: &str,
    ) -> Result<(), DispatchError> {
        let Resolution::Configured(node) = self.theme.resolve(point) else {
            return Ok(());
        };
        let visual = VisualConfig::from_node(point, node)?;

        if let Some(graph) = visual.graph.as_ref().filter(|spec| spec.show) {
            if let Some(value) = value {
                let params = self.bar_params(graph, value, value_text, unit);
                self.renderer.draw_bar(&params)?;
            }
        }

        if let Some(circ) = visual.graph_circ.as_ref().filter(|spec| spec.show) {
            if let Some(value) = value {
                let params = self.circular_params(circ, value, value_text, unit);
                self.renderer.draw_circular_gauge(&params)?;
            }
        }

        if let Some(text) = visual.text.as_ref().filter(|spec| spec.show) {
            let mut shown = if value_text.is_empty() {
                value.map(format::py_float).unwrap_or_default()
            } else {
                value_text.to_owned()
            };
            if text.show_unit {
                shown.push_str(unit);
            }
            let params = self.text_params(text, shown, value);
            self.renderer.draw_text(&params)?;
        }

        if let Some(percent) = visual.percent_text.as_ref().filter(|spec| spec.show) {
            if let Some(value) = value {
                let mut shown = format!("{:>3}", truncate(value));
                if percent.show_unit {
                    shown.push('%');
                }
                let params = self.text_params(percent, shown, Some(value));
                self.renderer.draw_text(&params)?;
            }
        }

        Ok(())
    }

    fn bar_params(&self, spec: &GraphSpec, value: f64, value_text: &str, unit: &str) -> BarParams {
        let value = truncate(value);
        #[allow(clippy::cast_precision_loss)]
        let at = value as f64;
        BarParams {
            x: spec.x,
            y: spec.y,
            width: spec.width,
            height: spec.height,
            value,
            min_value: spec.min_value,
            max_value: spec.max_value,
            text: graph_text(spec.text, spec.show_unit, value_text, unit),
            font: spec.font.clone(),
            font_size: spec.font_size,
            font_color: ColorRamp::from_spec(spec.font_color.as_ref()).color(at),
            stroke_width: spec.stroke_width,
            bar_color: ColorRamp::from_spec(spec.bar_color.as_ref()).color(at),
            bar_outline: spec.bar_outline,
            background_color: background(spec.background_color.as_ref()),
            background_image: self.image(spec.background_image.as_deref()),
        }
    }

    fn circular_params(
        &self,
        spec: &CircularSpec,
        value: f64,
        value_text: &str,
        unit: &str,
    ) -> CircularParams {
        let value = truncate(value);
        #[allow(clippy::cast_precision_loss)]
        let at = value as f64;
        CircularParams {
            x: spec.x,
            y: spec.y,
            radius: spec.radius,
            thickness: spec.thickness,
            start_angle: spec.start_angle,
            value,
            min_value: spec.min_value,
            max_value: spec.max_value,
            text: graph_text(spec.text, spec.show_unit, value_text, unit),
            font: spec.font.clone(),
            font_size: spec.font_size,
            font_color: ColorRamp::from_spec(spec.font_color.as_ref()).color(at),
            stroke_width: spec.stroke_width,
            bar_color: ColorRamp::from_spec(spec.bar_color.as_ref()).color(at),
            bar_outline: spec.bar_outline,
            background_color: background(spec.background_color.as_ref()),
            background_image: self.image(spec.background_image.as_deref()),
        }
    }

    fn text_params(&self, spec: &TextSpec, text: String, value: Option<f64>) -> TextParams {
        TextParams {
            text,
            x: spec.x,
            y: spec.y,
            font: spec.font.clone(),
            font_size: spec.font_size,
            font_color: ColorRamp::from_spec(spec.font_color.as_ref()).color(value.unwrap_or(0.0)),
            background_color: background(spec.background_color.as_ref()),
            background_image: self.image(spec.background_image.as_deref()),
        }
    }

    fn image(&self, name: Option<&str>) -> Option<std::path::PathBuf> {
        name.filter(|name| !name.is_empty())
            .map(|name| self.theme.background_image(name))
    }
}

fn graph_text(enabled: bool, show_unit: bool, value_text: &str, unit: &str) -> String {
    if !enabled {
        return String::new();
    }
    if show_unit {
        format!("{value_text}{unit}")
    } else {
        value_text.to_owned()
    }
}

fn background(spec: Option<&Value>) -> Rgb {
    spec.filter(|value| !value.is_null())
        .map_or(Rgb::WHITE, parse_color)
}
