pub mod source;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub use source::{HttpLookupSource, LookupEndpoint, LookupSource};

/// Identifier of a selectable option.
///
/// Lookup endpoints return ids as JSON numbers or strings. Both compare by
/// their textual form, so `5` and `"5"` are the same option, but the id
/// remembers which kind it arrived as and is written back the same way.
#[derive(Debug, Clone)]
pub struct OptionId {
    raw: String,
    numeric: bool,
}

impl OptionId {
    /// `None` for blank input, which is how an unset selection arrives from a form
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(OptionId {
                raw: trimmed.to_string(),
                numeric: false,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// Value from a record's JSON, treating null and blank strings as unset
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Some(OptionId {
                raw: number_text(n),
                numeric: true,
            }),
            _ => None,
        }
    }

    /// JSON form for submission: a number if it arrived as one, else a string
    pub fn to_value(&self) -> Value {
        if self.numeric {
            if let Ok(n) = self.raw.parse::<serde_json::Number>() {
                return Value::Number(n);
            }
        }
        Value::String(self.raw.clone())
    }
}

/// `5.0` and `5` name the same id
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

impl PartialEq for OptionId {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for OptionId {}

impl std::hash::Hash for OptionId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for OptionId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OptionId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Serialize for OptionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OptionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        OptionId::from_json(&value).ok_or_else(|| D::Error::custom(format!("invalid option id: {}", value)))
    }
}

impl std::fmt::Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<i64> for OptionId {
    fn from(id: i64) -> Self {
        OptionId {
            raw: id.to_string(),
            numeric: true,
        }
    }
}

impl From<&str> for OptionId {
    fn from(id: &str) -> Self {
        OptionId {
            raw: id.trim().to_string(),
            numeric: false,
        }
    }
}

/// One row of reference data from a lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    #[serde(alias = "value", alias = "Id")]
    pub id: OptionId,

    #[serde(alias = "label", alias = "displayName", alias = "text", alias = "Name")]
    pub name: String,

    #[serde(rename = "isActive", alias = "is_active", alias = "active", default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl LookupOption {
    pub fn new(id: impl Into<OptionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Drop options the user must not be offered
pub fn active_only(options: Vec<LookupOption>) -> Vec<LookupOption> {
    options.into_iter().filter(|o| o.is_active).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_string_ids_compare_equal() {
        let a: OptionId = serde_json::from_value(json!(5)).unwrap();
        let b: OptionId = serde_json::from_value(json!("5")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, OptionId::from(5));
        assert!(serde_json::from_value::<OptionId>(json!(null)).is_err());
    }

    #[test]
    fn ids_keep_their_json_kind() {
        let padded = OptionId::from_json(&json!("007")).unwrap();
        assert_eq!(padded.to_value(), json!("007"));
        assert_ne!(padded, OptionId::from(7));

        assert_eq!(OptionId::from_json(&json!("+5")).unwrap().to_value(), json!("+5"));
        assert_eq!(OptionId::from_json(&json!(70)).unwrap().to_value(), json!(70));
        assert_eq!(serde_json::to_value(OptionId::from("70")).unwrap(), json!("70"));
    }

    #[test]
    fn integral_floats_match_integer_ids() {
        let float = OptionId::from_json(&json!(5.0)).unwrap();
        assert_eq!(float, OptionId::from(5));
        assert_eq!(float.to_value(), json!(5));
        assert_eq!(OptionId::from_json(&json!(2.5)).unwrap().as_str(), "2.5");
    }

    #[test]
    fn blank_ids_are_unset() {
        assert_eq!(OptionId::parse("   "), None);
        assert_eq!(OptionId::from_json(&json!("")), None);
        assert_eq!(OptionId::from_json(&Value::Null), None);
        assert_eq!(OptionId::parse(" 12 "), Some(OptionId::from(12)));
    }

    #[test]
    fn options_decode_from_common_backend_shapes() {
        let rows: Vec<LookupOption> = serde_json::from_value(json!([
            { "id": 1, "name": "Eng", "isActive": true },
            { "value": "2", "label": "Sales", "active": false },
            { "id": 3, "displayName": "Ops" },
        ]))
        .unwrap();

        assert_eq!(rows[0], LookupOption::new(1, "Eng"));
        assert_eq!(rows[1], LookupOption::new(2, "Sales").inactive());
        assert!(rows[2].is_active);

        let active = active_only(rows);
        assert_eq!(active.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(), vec!["Eng", "Ops"]);
    }
}
