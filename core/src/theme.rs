//! Theme tree access.
//!
//! A theme is a read-only nested mapping loaded once at startup. Metrics live
//! under `STATS.<CATEGORY>.<TYPE>[.<SUBTYPE>[.<SUBSUBTYPE>]]`; each leaf may
//! hold `GRAPH`, `GRAPH_CIRC`, `TEXT` and `PERCENT_TEXT` element maps.

use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Entries that older themes configured as a bare text block instead of a
/// node with a nested `TEXT` element.
const LEGACY_TEXT_PARENTS: &[(&str, &str)] = &[("MEMORY", "VIRTUAL")];
const LEGACY_TEXT_ENTRIES: &[&str] = &["USED", "FREE"];

/// Errors raised while loading a theme or reading its element specs.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("failed to read theme {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML theme: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON theme: {0}")]
    Json(#[from] serde_json::Error),

    #[error("theme has no STATS section")]
    MissingStats,

    #[error("invalid {element} settings for {point}: {source}")]
    Element {
        point: String,
        element: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A path into the theme tree identifying one displayable quantity,
/// e.g. `CPU.FREQUENCY.CORES.C0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricPoint<'a> {
    pub category: &'a str,
    pub kind: &'a str,
    pub subtype: Option<&'a str>,
    pub subsubtype: Option<&'a str>,
}

impl<'a> MetricPoint<'a> {
    #[must_use]
    pub const fn new(category: &'a str, kind: &'a str) -> Self {
        Self {
            category,
            kind,
            subtype: None,
            subsubtype: None,
        }
    }

    #[must_use]
    pub const fn with_subtype(mut self, subtype: &'a str) -> Self {
        self.subtype = Some(subtype);
        self
    }

    #[must_use]
    pub const fn with_subsubtype(mut self, subsubtype: &'a str) -> Self {
        self.subsubtype = Some(subsubtype);
        self
    }
}

impl fmt::Display for MetricPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.kind)?;
        if let Some(subtype) = self.subtype {
            write!(f, ".{subtype}")?;
        }
        if let Some(subsubtype) = self.subsubtype {
            write!(f, ".{subsubtype}")?;
        }
        Ok(())
    }
}

/// Outcome of looking up a [`MetricPoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// The leaf node for the metric.
    Configured(&'a Map<String, Value>),
    /// The theme does not display this metric.
    NotConfigured,
}

/// Loaded theme: the `STATS` tree plus the directory background images are
/// resolved against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Theme {
    root: Value,
    base_path: Option<PathBuf>,
}

impl Theme {
    /// Wrap an already parsed tree. The backward compatibility pass is
    /// applied immediately.
    #[must_use]
    pub fn from_value(root: Value) -> Self {
        let mut theme = Self {
            root,
            base_path: None,
        };
        theme.normalize();
        theme
    }

    /// Set the directory background image names are relative to.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Load a theme file. `.json` files are read as JSON, anything else as
    /// YAML. The file's directory becomes the base path.
    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_owned(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let root: Value = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml_ng::from_str(&content)?
        };

        if !root.get("STATS").is_some_and(Value::is_object) {
            return Err(ThemeError::MissingStats);
        }

        let mut theme = Self::from_value(root);
        theme.base_path = path.parent().map(Path::to_path_buf);
        log::info!("Loaded theme from {}", path.display());
        Ok(theme)
    }

    /// Raw lookup below `STATS`.
    #[must_use]
    pub fn node(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(self.root.get("STATS")?, |node, key| node.get(*key))
    }

    /// Find the most specific node for `point`.
    ///
    /// Subtypes and sub-subtypes that are absent (or empty, `null`, `false`)
    /// yield [`Resolution::NotConfigured`]; callers skip those silently.
    #[must_use]
    pub fn resolve(&self, point: &MetricPoint<'_>) -> Resolution<'_> {
        let Some(mut node) = self.node(&[point.category, point.kind]) else {
            log::debug!("{point}: category not present in theme");
            return Resolution::NotConfigured;
        };

        for key in [point.subtype, point.subsubtype].into_iter().flatten() {
            match node.get(key) {
                Some(child) if is_truthy(child) => node = child,
                _ => return Resolution::NotConfigured,
            }
        }

        match node.as_object() {
            Some(leaf) => Resolution::Configured(leaf),
            None => Resolution::NotConfigured,
        }
    }

    /// Let legacy themes keep their single level `USED`/`FREE` entries.
    ///
    /// An entry whose `TEXT` is missing, `false` or `0` gets one holding a
    /// copy of its own fields. Applying the pass again leaves the tree unchanged.
    pub fn normalize(&mut self) {
        for (category, kind) in LEGACY_TEXT_PARENTS {
            let Some(parent) = self
                .root
                .get_mut("STATS")
                .and_then(|stats| stats.get_mut(*category))
                .and_then(|category| category.get_mut(*kind))
                .and_then(Value::as_object_mut)
            else {
                continue;
            };

            for entry in LEGACY_TEXT_ENTRIES {
                let Some(Value::Object(fields)) = parent.get_mut(*entry) else {
                    continue;
                };
                if fields.is_empty() || !legacy_text_unset(fields.get("TEXT")) {
                    continue;
                }

                let text: Map<String, Value> = fields
                    .iter()
                    .filter(|(key, _)| key.as_str() != "TEXT")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                log::debug!("Synthesizing {category}.{kind}.{entry}.TEXT for legacy theme");
                fields.insert("TEXT".to_owned(), Value::Object(text));
            }
        }
    }

    /// Refresh period configured as `INTERVAL` (seconds) on the node at
    /// `path`. Missing, zero or negative values disable the metric.
    #[must_use]
    pub fn interval(&self, path: &[&str]) -> Option<Duration> {
        let seconds = self.node(path)?.get("INTERVAL")?.as_f64()?;
        (seconds > 0.0 && seconds.is_finite()).then(|| Duration::from_secs_f64(seconds))
    }

    /// Absolute path of a background image named in the theme.
    #[must_use]
    pub fn background_image(&self, name: &str) -> PathBuf {
        match &self.base_path {
            Some(base) => base.join(name),
            None => PathBuf::from(name),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }
}

/// A legacy entry only counts as lacking `TEXT` when the key is missing or
/// holds `false` or `0`. Any other value, `{}` and `null` included, is kept.
fn legacy_text_unset(text: Option<&Value>) -> bool {
    match text {
        None | Some(Value::Bool(false)) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Truthiness of theme values: `null`, `false`, `0`, `""`, `[]` and `{}` all
/// count as "not set".
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn sample() -> Theme {
        Theme::from_value(json!({
            "STATS": {
                "CPU": {
                    "PERCENTAGE": {
                        "INTERVAL": 1.5,
                        "TEXT": { "SHOW": true, "X": 10 }
                    },
                    "FREQUENCY": {
                        "INTERVAL": 0,
                        "CORES": {
                            "C0": { "CORE_LIST": "0, 1", "TEXT": { "SHOW": true } },
                            "C2": {}
                        }
                    }
                },
                "MEMORY": {
                    "VIRTUAL": {
                        "USED": { "SHOW": true, "X": 5, "Y": 7 },
                        "FREE": { "TEXT": { "SHOW": true, "X": 1 } }
                    }
                }
            }
        }))
    }

    #[test]
    fn test_metric_point_display() {
        let point = MetricPoint::new("CPU", "FREQUENCY")
            .with_subtype("CORES")
            .with_subsubtype("C0");
        assert_eq!(point.to_string(), "CPU.FREQUENCY.CORES.C0");
        assert_eq!(MetricPoint::new("DISK", "USED").to_string(), "DISK.USED");
    }

    #[test]
    fn test_resolve_leaf() {
        let theme = sample();
        let Resolution::Configured(leaf) = theme.resolve(&MetricPoint::new("CPU", "PERCENTAGE"))
        else {
            panic!("expected CPU.PERCENTAGE to resolve");
        };
        assert!(leaf.contains_key("TEXT"));

        let point = MetricPoint::new("CPU", "FREQUENCY")
            .with_subtype("CORES")
            .with_subsubtype("C0");
        assert!(matches!(theme.resolve(&point), Resolution::Configured(_)));
    }

    #[test]
    fn test_resolve_missing_subtype() {
        let theme = sample();
        let point = MetricPoint::new("CPU", "PERCENTAGE").with_subtype("CORES");
        assert_eq!(theme.resolve(&point), Resolution::NotConfigured);

        let point = MetricPoint::new("CPU", "FREQUENCY")
            .with_subtype("CORES")
            .with_subsubtype("C5");
        assert_eq!(theme.resolve(&point), Resolution::NotConfigured);

        // Empty group maps count as absent
        let point = MetricPoint::new("CPU", "FREQUENCY")
            .with_subtype("CORES")
            .with_subsubtype("C2");
        assert_eq!(theme.resolve(&point), Resolution::NotConfigured);
    }

    #[test]
    fn test_resolve_missing_category() {
        let theme = sample();
        assert_eq!(
            theme.resolve(&MetricPoint::new("GPU", "PERCENTAGE")),
            Resolution::NotConfigured
        );
        assert_eq!(
            Theme::default().resolve(&MetricPoint::new("CPU", "PERCENTAGE")),
            Resolution::NotConfigured
        );
    }

    #[test]
    fn test_normalize_synthesizes_text() {
        let theme = sample();
        let used = theme.node(&["MEMORY", "VIRTUAL", "USED"]).unwrap();
        assert_eq!(used["TEXT"], json!({ "SHOW": true, "X": 5, "Y": 7 }));

        // Entries that already have TEXT are left alone
        let free = theme.node(&["MEMORY", "VIRTUAL", "FREE"]).unwrap();
        assert_eq!(free, &json!({ "TEXT": { "SHOW": true, "X": 1 } }));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = sample();
        let mut twice = once.clone();
        twice.normalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_replaces_false_text() {
        let theme = Theme::from_value(json!({
            "STATS": { "MEMORY": { "VIRTUAL": {
                "USED": { "SHOW": true, "TEXT": false, "X": 3 }
            } } }
        }));
        let used = theme.node(&["MEMORY", "VIRTUAL", "USED"]).unwrap();
        assert_eq!(used["TEXT"], json!({ "SHOW": true, "X": 3 }));
    }

    #[test]
    fn test_normalize_keeps_empty_and_null_text() {
        let theme = Theme::from_value(json!({
            "STATS": { "MEMORY": { "VIRTUAL": {
                "USED": { "SHOW": true, "TEXT": {} },
                "FREE": { "SHOW": true, "TEXT": null }
            } } }
        }));
        let used = theme.node(&["MEMORY", "VIRTUAL", "USED"]).unwrap();
        assert_eq!(used["TEXT"], json!({}));
        let free = theme.node(&["MEMORY", "VIRTUAL", "FREE"]).unwrap();
        assert_eq!(free["TEXT"], Value::Null);
    }

    #[test]
    fn test_normalize_replaces_zero_text() {
        let theme = Theme::from_value(json!({
            "STATS": { "MEMORY": { "VIRTUAL": {
                "FREE": { "SHOW": true, "TEXT": 0 }
            } } }
        }));
        let free = theme.node(&["MEMORY", "VIRTUAL", "FREE"]).unwrap();
        assert_eq!(free["TEXT"], json!({ "SHOW": true }));
    }

    #[test]
    fn test_interval() {
        let theme = sample();
        assert_eq!(
            theme.interval(&["CPU", "PERCENTAGE"]),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(theme.interval(&["CPU", "FREQUENCY"]), None);
        assert_eq!(theme.interval(&["GPU"]), None);
    }

    #[test]
    fn test_background_image_path() {
        let theme = Theme::default();
        assert_eq!(theme.background_image("bg.png"), PathBuf::from("bg.png"));

        let theme = theme.with_base_path("/themes/dark");
        assert_eq!(
            theme.background_image("bg.png"),
            PathBuf::from("/themes/dark/bg.png")
        );
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!({ "SHOW": false })));
        assert!(is_truthy(&json!("0, 1")));
    }

    #[test]
    fn test_load_yaml_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "STATS:\n  DISK:\n    INTERVAL: 10\n    USED:\n      TEXT:\n        SHOW: True\n        X: 4"
        )
        .unwrap();

        let theme = Theme::load(&path).unwrap();
        assert_eq!(theme.base_path(), Some(dir.path()));
        assert_eq!(theme.interval(&["DISK"]), Some(Duration::from_secs(10)));
        assert!(matches!(
            theme.resolve(&MetricPoint::new("DISK", "USED")),
            Resolution::Configured(_)
        ));
    }

    #[test]
    fn test_load_rejects_theme_without_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, r#"{ "display": {} }"#).unwrap();
        assert!(matches!(Theme::load(&path), Err(ThemeError::MissingStats)));

        let missing = dir.path().join("nope.yaml");
        assert!(matches!(Theme::load(&missing), Err(ThemeError::Io { .. })));
    }
}
