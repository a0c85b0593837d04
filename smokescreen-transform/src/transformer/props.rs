//! Declarative props: fields read off a record and formatted by definition.
//!
//! ```rust
//! use serde_json::json;
//! use smokescreen_transform::{Prop, Transformer};
//!
//! struct UserTransformer;
//!
//! impl Transformer for UserTransformer {
//!     fn props(&self) -> Vec<Prop> {
//!         vec![
//!             Prop::defined("id", "int"),
//!             Prop::new("name"),
//!             Prop::defined("joined", "date|map:created_at"),
//!             Prop::computed("initial", |record, _key| {
//!                 json!(record["name"].as_str().and_then(|n| n.chars().next()).map(String::from))
//!             }),
//!         ]
//!     }
//! }
//!
//! let data = UserTransformer
//!     .transform(&json!({"id": "42", "name": "Ada", "created_at": "2018-03-08 19:11:11"}))
//!     .unwrap();
//! assert_eq!(data["id"], json!(42));
//! assert_eq!(data["joined"], json!("2018-03-08"));
//! assert_eq!(data["initial"], json!("A"));
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use smokescreen_schema::PropDefinition;
use smokescreen_schema::case::snake_case;
use std::fmt::{self, Write};
use std::sync::Arc;

use super::Transformer;
use crate::error::{TransformError, TransformResult};
use crate::record::{RecordAccess, set_path};

/// Default format for `date` props, eg. `2018-03-08`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default format for `datetime` props, eg. `2018-03-08T19:11:11.234+00:00`.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// A prop closure, called with the record and the output key.
pub type PropFn = Arc<dyn Fn(&Value, &str) -> Value + Send + Sync>;

/// A declared prop.
#[derive(Clone)]
pub struct Prop {
    key: String,
    source: PropSource,
}

#[derive(Clone)]
enum PropSource {
    Plain,
    Defined(String),
    Computed(PropFn),
}

impl Prop {
    /// Copy the value of `key` from the record.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: PropSource::Plain,
        }
    }

    /// Read and format the value according to a definition string,
    /// eg. `int`, `datetime|timezone:UTC` or `string|map:full_name`.
    pub fn defined(key: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: PropSource::Defined(definition.into()),
        }
    }

    /// Compute the value with a closure.
    pub fn computed<F>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &str) -> Value + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            source: PropSource::Computed(Arc::new(f)),
        }
    }

    /// The declared key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            PropSource::Plain => "plain".to_string(),
            PropSource::Defined(definition) => definition.clone(),
            PropSource::Computed(_) => "computed".to_string(),
        };
        f.debug_struct("Prop")
            .field("key", &self.key)
            .field("source", &source)
            .finish()
    }
}

/// Evaluate props against a record.
///
/// Keys are converted to snake case segment by segment, so `author.FullName`
/// is written to `author.full_name` as a nested object.
pub fn with_props<T: Transformer + ?Sized>(
    transformer: &T,
    record: &Value,
    props: &[Prop],
) -> TransformResult<Map<String, Value>> {
    if !record.is_keyed() {
        return Err(TransformError::unhandled_resource(
            "props can only be read from a keyed record",
        ));
    }

    let mut data = Map::new();
    for prop in props {
        let key = prop_key(&prop.key);
        let value = match &prop.source {
            PropSource::Computed(f) => f(record, &key),
            PropSource::Plain => record.field(&key).cloned().unwrap_or(Value::Null),
            PropSource::Defined(definition) => {
                let definition = PropDefinition::parse(key.as_str(), definition)?;
                let value = record
                    .field(definition.map_key())
                    .cloned()
                    .unwrap_or(Value::Null);
                format_prop_value(transformer, value, &definition)?
            }
        };
        set_path(&mut data, &key, value);
    }

    Ok(data)
}

fn prop_key(key: &str) -> String {
    key.split('.').map(snake_case).collect::<Vec<_>>().join(".")
}

/// Cast or format a value according to its prop definition.
pub fn format_prop_value<T: Transformer + ?Sized>(
    transformer: &T,
    value: Value,
    definition: &PropDefinition,
) -> TransformResult<Value> {
    let Some(prop_type) = definition.prop_type() else {
        return Ok(value);
    };

    match prop_type {
        "int" | "integer" => Ok(Value::from(to_int(&value))),
        "real" | "float" | "double" => Ok(Value::from(to_float(&value))),
        "string" => Ok(Value::from(to_text(&value))),
        "bool" | "boolean" => Ok(Value::from(is_truthy(&value))),
        "array" => Ok(match value {
            Value::Null => Value::Array(Vec::new()),
            Value::Array(_) | Value::Object(_) => value,
            scalar => Value::Array(vec![scalar]),
        }),
        "date" => {
            let format = definition.format().unwrap_or(transformer.date_format());
            let timezone = definition.timezone().or(transformer.default_timezone());
            format_date(definition.key(), &value, format, timezone)
        }
        "datetime" => {
            let format = definition.format().unwrap_or(transformer.datetime_format());
            let timezone = definition.timezone().or(transformer.default_timezone());
            format_date(definition.key(), &value, format, timezone)
        }
        "datetime_utc" => {
            let format = definition.format().unwrap_or(transformer.datetime_format());
            format_date(definition.key(), &value, format, Some("UTC"))
        }
        other => match transformer.format_prop(&value, definition) {
            Some(result) => result,
            None => Err(TransformError::invalid_definition(
                definition.key(),
                format!("Unsupported format type: {other}"),
            )),
        },
    }
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => leading_number(s).map_or(0, |f| f.trunc() as i64),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(_) => 1,
    }
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => leading_number(s).unwrap_or(0.0),
        other => to_int(other) as f64,
    }
}

/// The numeric prefix of a string, eg. `12` for `"12 apples"`.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .take_while(|(idx, c)| {
            c.is_ascii_digit() || *c == '.' || (*idx == 0 && (*c == '-' || *c == '+'))
        })
        .map(|(idx, c)| idx + c.len_utf8())
        .last()?;
    text[..end].parse().ok()
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn format_date(
    key: &str,
    value: &Value,
    format: &str,
    timezone: Option<&str>,
) -> TransformResult<Value> {
    let date = match value {
        Value::Null => return Ok(Value::Null),
        Value::String(text) => parse_date(text)
            .ok_or_else(|| TransformError::invalid_definition(key, format!("cannot parse `{text}` as a date")))?,
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|date| date.fixed_offset())
            .ok_or_else(|| TransformError::invalid_definition(key, format!("invalid timestamp {n}")))?,
        other => {
            return Err(TransformError::invalid_definition(
                key,
                format!("expected a date, got {other}"),
            ));
        }
    };

    let date = match timezone {
        Some(timezone) => date.with_timezone(&parse_timezone(key, timezone)?),
        None => date,
    };

    let mut out = String::new();
    write!(out, "{}", date.format(format))
        .map_err(|_| TransformError::invalid_definition(key, format!("invalid date format `{format}`")))?;
    Ok(Value::String(out))
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` (taken as UTC) and `YYYY-MM-DD`.
fn parse_date(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date);
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

/// `UTC`, `Z` or a fixed `+HH:MM` / `-HH:MM` offset.
fn parse_timezone(key: &str, timezone: &str) -> TransformResult<FixedOffset> {
    let invalid = || TransformError::invalid_definition(key, format!("unsupported timezone `{timezone}`"));

    if timezone.eq_ignore_ascii_case("utc") || timezone == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match timezone.as_bytes().first() {
        Some(b'+') => (1, &timezone[1..]),
        Some(b'-') => (-1, &timezone[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Plain;

    impl Transformer for Plain {}

    struct Money;

    impl Transformer for Money {
        fn format_prop(
            &self,
            value: &Value,
            definition: &PropDefinition,
        ) -> Option<TransformResult<Value>> {
            match definition.prop_type() {
                Some("money") => Some(Ok(json!(format!("${:.2}", to_float(value))))),
                _ => None,
            }
        }
    }

    fn format(definition: &str, value: Value) -> TransformResult<Value> {
        let definition = PropDefinition::parse("field", definition).unwrap();
        format_prop_value(&Plain, value, &definition)
    }

    #[test]
    fn test_casts() {
        assert_eq!(format("int", json!("42")).unwrap(), json!(42));
        assert_eq!(format("integer", json!("12 apples")).unwrap(), json!(12));
        assert_eq!(format("int", json!(3.9)).unwrap(), json!(3));
        assert_eq!(format("float", json!("1.5")).unwrap(), json!(1.5));
        assert_eq!(format("string", json!(10)).unwrap(), json!("10"));
        assert_eq!(format("bool", json!("0")).unwrap(), json!(false));
        assert_eq!(format("boolean", json!("yes")).unwrap(), json!(true));
        assert_eq!(format("array", json!(null)).unwrap(), json!([]));
        assert_eq!(format("array", json!("a")).unwrap(), json!(["a"]));
    }

    #[test]
    fn test_untyped_passthrough() {
        assert_eq!(format("map:other", json!({"a": 1})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            format("date", json!("2018-03-08T19:11:11+10:00")).unwrap(),
            json!("2018-03-08")
        );
        assert_eq!(
            format("datetime", json!("2018-03-08 19:11:11.234")).unwrap(),
            json!("2018-03-08T19:11:11.234+00:00")
        );
        assert_eq!(
            format("datetime_utc", json!("2018-03-08T19:11:11+10:00")).unwrap(),
            json!("2018-03-08T09:11:11.000+00:00")
        );
        assert_eq!(
            format("datetime|timezone:+10:00", json!("2018-03-08")).unwrap(),
            json!("2018-03-08T10:00:00.000+10:00")
        );
        assert_eq!(format("date|format:%d/%m/%Y", json!("2018-03-08")).unwrap(), json!("08/03/2018"));
        assert_eq!(format("date", json!(null)).unwrap(), json!(null));
    }

    #[test]
    fn test_date_errors() {
        let err = format("date", json!("yesterday")).unwrap_err();
        assert!(matches!(err, TransformError::InvalidDefinition { .. }));

        let err = format("datetime|timezone:Mars/Olympus", json!("2018-03-08")).unwrap_err();
        assert!(err.to_string().contains("unsupported timezone"));
    }

    #[test]
    fn test_unsupported_type() {
        let err = format("type:money", json!(5)).unwrap_err();
        assert!(err.to_string().contains("Unsupported format type: money"));
    }

    #[test]
    fn test_custom_format_hook() {
        let definition = PropDefinition::parse("price", "type:money").unwrap();
        assert_eq!(
            format_prop_value(&Money, json!(5), &definition).unwrap(),
            json!("$5.00")
        );
    }

    #[test]
    fn test_with_props() {
        let props = vec![
            Prop::defined("id", "int"),
            Prop::new("FullName"),
            Prop::defined("author.name", "string|map:author_name"),
            Prop::computed("shout", |record, key| {
                json!(format!("{key}:{}", record["title"].as_str().unwrap_or_default().to_uppercase()))
            }),
        ];
        let record = json!({"id": "7", "full_name": "Ada", "author_name": "Bob", "title": "hi"});

        let data = with_props(&Plain, &record, &props).unwrap();
        assert_eq!(
            Value::Object(data),
            json!({
                "id": 7,
                "full_name": "Ada",
                "author": {"name": "Bob"},
                "shout": "shout:HI"
            })
        );
    }

    #[test]
    fn test_with_props_requires_keyed_record() {
        let err = with_props(&Plain, &json!([1, 2]), &[Prop::new("id")]).unwrap_err();
        assert!(matches!(err, TransformError::UnhandledResourceType { .. }));
    }
}
