//! Output value tree and deterministic JSON writer
//!
//! The writer follows the entity-geometry house style:
//! - tab indentation, one key per line for expanded objects
//! - compact objects (UV rectangles, box-UV cubes) stay on one line
//! - arrays break only before compound items
//! - numbers rounded to 5 decimal places
//! - `small` mode drops every newline and optional space

/// Output value
///
/// Objects carry their rendering layout in the variant: [`Value::Object`]
/// breaks one key per line, [`Value::CompactObject`] renders on one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    CompactObject(Map),
}

impl Value {
    fn is_compound(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::CompactObject(_)
        )
    }

    /// Field lookup on either object layout
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) | Value::CompactObject(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Insertion-ordered object fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    fields: Vec<(String, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing the value in place if the key exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(v: [f64; N]) -> Self {
        Value::Array(v.iter().map(|&n| Value::Number(n)).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

/// Writer settings
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Single line, no optional whitespace
    pub small: bool,
}

/// Render a value tree to text
pub fn to_string(value: &Value, options: WriteOptions) -> String {
    let mut out = String::new();
    Writer { options, out: &mut out }.value(value, 1);
    out
}

/// Round to 5 decimal places (ties toward +infinity) and format
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    let mut rounded = (n * 100_000.0 + 0.5).floor() / 100_000.0;
    if !rounded.is_finite() {
        // scaling overflowed; at this magnitude there are no decimals to round
        rounded = n;
    }
    if rounded == 0.0 {
        // also folds -0
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Escape backslash, double quote, newline (LF and CRLF) and tab
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("\\n");
            }
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

struct Writer<'a> {
    options: WriteOptions,
    out: &'a mut String,
}

impl Writer<'_> {
    fn newline(&mut self, tabs: usize) {
        if self.options.small {
            return;
        }
        self.out.push('\n');
        for _ in 0..tabs {
            self.out.push('\t');
        }
    }

    fn separator(&mut self, breaks: bool) {
        self.out.push(',');
        if !breaks && !self.options.small {
            self.out.push(' ');
        }
    }

    fn value(&mut self, value: &Value, tabs: usize) {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.out.push_str(&format_number(*n)),
            Value::String(s) => self.string(s),
            Value::Array(items) => self.array(items, tabs),
            Value::Object(map) => self.object(map, tabs, true),
            Value::CompactObject(map) => self.object(map, tabs, false),
        }
    }

    fn string(&mut self, s: &str) {
        self.out.push('"');
        self.out.push_str(&escape(s));
        self.out.push('"');
    }

    fn array(&mut self, items: &[Value], tabs: usize) {
        self.out.push('[');
        for (i, item) in items.iter().enumerate() {
            let breaks = item.is_compound();
            if i > 0 {
                self.separator(breaks);
            }
            if breaks {
                self.newline(tabs);
            }
            self.value(item, tabs + 1);
        }
        if items.last().is_some_and(Value::is_compound) {
            self.newline(tabs.saturating_sub(1));
        }
        self.out.push(']');
    }

    fn object(&mut self, map: &Map, tabs: usize, breaks: bool) {
        self.out.push('{');
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.separator(breaks);
            }
            if breaks {
                self.newline(tabs);
            }
            self.string(key);
            self.out.push(':');
            if !self.options.small {
                self.out.push(' ');
            }
            self.value(value, tabs + 1);
        }
        if breaks && !map.is_empty() {
            self.newline(tabs.saturating_sub(1));
        }
        self.out.push('}');
    }
}
