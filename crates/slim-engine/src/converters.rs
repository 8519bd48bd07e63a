//! Typed value conversion between fixture-native values and wire strings.
//!
//! Grounded on `waferslim.converters`: a small table of converters keyed by
//! type tag, a default registration (bool/int/float/date/time/datetime/
//! list), and a `convert_value` dispatcher that falls back to `to_string`
//! for any type with nothing registered.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use slim_core::wire::Value;

/// A value as a fixture sees it, independent of its wire representation.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    List(Vec<FixtureValue>),
    Void,
}

impl FixtureValue {
    pub fn type_tag(&self) -> &'static str {
        match self {
            FixtureValue::Bool(_) => "bool",
            FixtureValue::Int(_) => "int",
            FixtureValue::Float(_) => "float",
            FixtureValue::Str(_) => "string",
            FixtureValue::Date(_) => "date",
            FixtureValue::Time(_) => "time",
            FixtureValue::DateTime(_) => "datetime",
            FixtureValue::List(_) => "list",
            FixtureValue::Void => "void",
        }
    }
}

/// A registrable converter for one fixture-visible type.
///
/// Mirrors `waferslim.converters.Converter`: a pair of pure functions, no
/// shared state, registered once per type tag.
pub trait Converter: Send + Sync {
    fn to_wire(&self, registry: &ConverterRegistry, value: &FixtureValue) -> String;
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String>;
}

struct TrueFalseConverter;
impl Converter for TrueFalseConverter {
    fn to_wire(&self, _registry: &ConverterRegistry, value: &FixtureValue) -> String {
        match value {
            FixtureValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            other => format!("{:?}", other),
        }
    }
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String> {
        match raw {
            "true" => Ok(FixtureValue::Bool(true)),
            "false" => Ok(FixtureValue::Bool(false)),
            other => Err(format!("{:?} is not true/false", other)),
        }
    }
}

struct YesNoConverter;
impl Converter for YesNoConverter {
    fn to_wire(&self, _registry: &ConverterRegistry, value: &FixtureValue) -> String {
        match value {
            FixtureValue::Bool(b) => if *b { "yes" } else { "no" }.to_string(),
            other => format!("{:?}", other),
        }
    }
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String> {
        match raw {
            "yes" => Ok(FixtureValue::Bool(true)),
            "no" => Ok(FixtureValue::Bool(false)),
            other => Err(format!("{:?} is not yes/no", other)),
        }
    }
}

struct IntConverter;
impl Converter for IntConverter {
    fn to_wire(&self, _registry: &ConverterRegistry, value: &FixtureValue) -> String {
        match value {
            FixtureValue::Int(n) => n.to_string(),
            other => format!("{:?}", other),
        }
    }
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String> {
        raw.trim()
            .parse::<i64>()
            .map(FixtureValue::Int)
            .map_err(|_| format!("{:?} is not an integer", raw))
    }
}

struct FloatConverter;
impl Converter for FloatConverter {
    fn to_wire(&self, _registry: &ConverterRegistry, value: &FixtureValue) -> String {
        match value {
            FixtureValue::Float(f) => format_float_like_python(*f),
            other => format!("{:?}", other),
        }
    }
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String> {
        raw.trim()
            .parse::<f64>()
            .map(FixtureValue::Float)
            .map_err(|_| format!("{:?} is not a floating point number", raw))
    }
}

/// Render a float the way Python's `str(float)` does: always a decimal
/// point (or exponent marker), never the bare integer `f64::to_string`
/// gives a whole number like `2.0`. `original_source/` is the tie-break
/// authority for this wire format since waferslim relies on `str(float)`
/// directly.
fn format_float_like_python(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rendered = f.to_string();
    if rendered.contains('.') || rendered.contains('e') || rendered.contains('E') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIME_FORMAT_FRACTIONAL: &str = "%H:%M:%S%.f";

struct DateConverter;
impl Converter for DateConverter {
    fn to_wire(&self, _registry: &ConverterRegistry, value: &FixtureValue) -> String {
        match value {
            FixtureValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            other => format!("{:?}", other),
        }
    }
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String> {
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(FixtureValue::Date)
            .map_err(|_| format!("{:?} is not a date in YYYY-MM-DD form", raw))
    }
}

struct TimeConverter;
impl Converter for TimeConverter {
    fn to_wire(&self, _registry: &ConverterRegistry, value: &FixtureValue) -> String {
        match value {
            FixtureValue::Time(t) => t.format(TIME_FORMAT).to_string(),
            other => format!("{:?}", other),
        }
    }
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String> {
        // Fractional seconds are optional, matching waferslim's _timesplit.
        NaiveTime::parse_from_str(raw, TIME_FORMAT_FRACTIONAL)
            .or_else(|_| NaiveTime::parse_from_str(raw, TIME_FORMAT))
            .map(FixtureValue::Time)
            .map_err(|_| format!("{:?} is not a time in HH:MM:SS form", raw))
    }
}

struct DateTimeConverter;
impl Converter for DateTimeConverter {
    fn to_wire(&self, registry: &ConverterRegistry, value: &FixtureValue) -> String {
        match value {
            FixtureValue::DateTime(dt) => format!(
                "{} {}",
                DateConverter.to_wire(registry, &FixtureValue::Date(dt.date())),
                TimeConverter.to_wire(registry, &FixtureValue::Time(dt.time())),
            ),
            other => format!("{:?}", other),
        }
    }
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String> {
        // waferslim splits on exactly one space and delegates to the date
        // and time converters separately rather than parsing as one blob.
        let mut parts = raw.splitn(2, ' ');
        let (date_part, time_part) = match (parts.next(), parts.next()) {
            (Some(d), Some(t)) => (d, t),
            _ => return Err(format!("{:?} is not a date and time", raw)),
        };
        let date = match DateConverter.from_wire(date_part)? {
            FixtureValue::Date(d) => d,
            _ => unreachable!(),
        };
        let time = match TimeConverter.from_wire(time_part)? {
            FixtureValue::Time(t) => t,
            _ => unreachable!(),
        };
        Ok(FixtureValue::DateTime(NaiveDateTime::new(date, time)))
    }
}

struct ListConverter;
impl Converter for ListConverter {
    fn to_wire(&self, registry: &ConverterRegistry, value: &FixtureValue) -> String {
        match value {
            FixtureValue::List(items) => {
                let rendered: Vec<String> =
                    items.iter().map(|item| registry.convert_value(item)).collect();
                format!("[{}]", rendered.join(", "))
            }
            other => format!("{:?}", other),
        }
    }
    fn from_wire(&self, raw: &str) -> Result<FixtureValue, String> {
        Err(format!("list arguments are not accepted from the wire: {:?}", raw))
    }
}

/// Table of converters keyed by fixture-visible type tag.
///
/// Process-wide, built once before the listener starts accepting
/// connections and never mutated concurrently with a running session.
pub struct ConverterRegistry {
    converters: HashMap<&'static str, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        let mut converters: HashMap<&'static str, Arc<dyn Converter>> = HashMap::new();
        converters.insert("bool", Arc::new(TrueFalseConverter));
        converters.insert("int", Arc::new(IntConverter));
        converters.insert("float", Arc::new(FloatConverter));
        converters.insert("date", Arc::new(DateConverter));
        converters.insert("time", Arc::new(TimeConverter));
        converters.insert("datetime", Arc::new(DateTimeConverter));
        converters.insert("list", Arc::new(ListConverter));
        Self { converters }
    }

    /// Swap the boolean converter for the yes/no spelling. Replaces, rather
    /// than supplements, the default under the same `bool` tag.
    pub fn use_yes_no_bool(&mut self) {
        self.converters.insert("bool", Arc::new(YesNoConverter));
    }

    pub fn register(&mut self, type_tag: &'static str, converter: Arc<dyn Converter>) {
        self.converters.insert(type_tag, converter);
    }

    /// Convert a fixture value to its wire string, dispatching by the
    /// value's own runtime type tag and falling back to a plain string
    /// rendering when nothing is registered for it — matching
    /// `convert_value`'s `str(value)` fallback.
    pub fn convert_value(&self, value: &FixtureValue) -> String {
        if let FixtureValue::Str(s) = value {
            return s.clone();
        }
        if matches!(value, FixtureValue::Void) {
            return String::new();
        }
        match self.converters.get(value.type_tag()) {
            Some(converter) => converter.to_wire(self, value),
            None => format!("{:?}", value),
        }
    }

    /// Convert a raw wire argument into a typed fixture value, using the
    /// converter registered for `type_tag`. Falls back to a plain string
    /// when the tag is unregistered or is `"string"` itself.
    pub fn convert_arg(&self, type_tag: &str, raw: &str) -> Result<FixtureValue, String> {
        if type_tag == "string" {
            return Ok(FixtureValue::Str(raw.to_string()));
        }
        match self.converters.get(type_tag) {
            Some(converter) => converter.from_wire(raw),
            None => Err(format!(
                "no converter registered for type {:?}; the default converter forbids from_string",
                type_tag
            )),
        }
    }

    /// Convert a fixture value into its wire-chunk shape: a list converts
    /// element-wise into a nested [`Value::List`] (each element by its own
    /// runtime type, recursively), everything else converts through
    /// [`convert_value`] into a scalar. This is what the result collector
    /// sends back for a `call`/`callAndAssign` return, matching spec.md
    /// §4.2/§4.4's "the caller receives it as a nested chunk" — `convert_value`
    /// alone would flatten a list into one joined string.
    pub fn to_wire_list(&self, value: &FixtureValue) -> Value {
        match value {
            FixtureValue::List(items) => {
                Value::List(items.iter().map(|item| self.to_wire_list(item)).collect())
            }
            other => Value::scalar(self.convert_value(other)),
        }
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
