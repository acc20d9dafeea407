//! Ordered key-path extraction over loosely-shaped JSON responses.
//!
//! Several upstreams nest the same value under different paths depending on
//! the endpoint variant. A [`ParseStrategy`] lists `(KeyPath, Extractor)`
//! rules in priority order; the first rule whose path exists *and* whose
//! extractor accepts the value wins.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A path from the document root to one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(Segment::Index(idx));
        self
    }

    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(value, |node, seg| match seg {
            Segment::Key(k) => node.get(k.as_str()),
            Segment::Index(i) => node.get(*i),
        })
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Key(k) if i == 0 => write!(f, "{k}")?,
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// How a located value is turned into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// JSON number, or a numeric string with optional thousands separators
    Number,
    /// Non-blank JSON string
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Number(f64),
    Text(String),
}

impl Extractor {
    pub fn apply(&self, value: &Value) -> Option<Extracted> {
        match self {
            Extractor::Number => match value {
                Value::Number(n) => n.as_f64().map(Extracted::Number),
                Value::String(s) => parse_number(s).map(Extracted::Number),
                _ => None,
            },
            Extractor::Text => value
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Extracted::Text(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseStrategy {
    rules: Vec<(KeyPath, Extractor)>,
}

impl ParseStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule with lower priority than every rule added before it.
    pub fn then(mut self, path: KeyPath, extractor: Extractor) -> Self {
        self.rules.push((path, extractor));
        self
    }

    pub fn extract(&self, value: &Value) -> Option<Extracted> {
        self.rules
            .iter()
            .find_map(|(path, extractor)| path.resolve(value).and_then(|v| extractor.apply(v)))
    }

    pub fn extract_number(&self, value: &Value) -> Option<f64> {
        match self.extract(value)? {
            Extracted::Number(n) => Some(n),
            Extracted::Text(_) => None,
        }
    }

    pub fn extract_text(&self, value: &Value) -> Option<String> {
        match self.extract(value)? {
            Extracted::Text(s) => Some(s),
            Extracted::Number(_) => None,
        }
    }
}

/// Parse a decimal that may contain thousands separators ("3,850.55").
/// Returns `None` for blank, non-numeric or non-finite input.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
