//! YAML syntax checks and document counting.
//!
//! Documents are walked with a visitor that rejects duplicate mapping keys
//! at any depth, so a file that a lenient loader would silently accept (the
//! later key wins) is reported as invalid.

use std::fmt;

use serde::de::value::{EnumAccessDeserializer, MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{
    self, Deserialize, DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use serde_yaml::Value;

const DUPLICATE_KEY: &str = "duplicate key: ";

/// Outcome of checking one YAML source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YamlCheck {
    /// Non-empty documents successfully parsed before the first error.
    pub document_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl YamlCheck {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax (or duplicate key) error with its 1-based position, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlSyntaxError {
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
}

impl YamlSyntaxError {
    fn from_serde(err: &serde_yaml::Error) -> Self {
        let text = err.to_string();
        let Some(loc) = err.location() else {
            return Self {
                line: None,
                column: None,
                message: text,
            };
        };

        // Drop the position (and any trailing parser context) after the
        // problem itself, plus the node path serde_yaml puts in front of
        // duplicate key errors.
        let mark = format!(" at line {} column {}", loc.line(), loc.column());
        let problem = text.find(&mark).map_or(text.as_str(), |end| &text[..end]);
        let problem = problem
            .find(DUPLICATE_KEY)
            .map_or(problem, |start| &problem[start..]);
        Self {
            line: Some(loc.line()),
            column: Some(loc.column()),
            message: problem.to_string(),
        }
    }
}

impl fmt::Display for YamlSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "line {line}, column {column}: {}", self.message)
            }
            _ => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for YamlSyntaxError {}

/// One line per tab-indented line, numbered from 1.
pub fn check_tabs(content: &str) -> Vec<String> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line.starts_with('\t'))
        .map(|(i, _)| format!("line {}: tab character used for indentation", i + 1))
        .collect()
}

/// Count non-empty documents, stopping at the first error.
///
/// Empty and comment-only documents are not counted. Returns the count so
/// far alongside the error, if any.
fn scan_documents(content: &str) -> (usize, Option<YamlSyntaxError>) {
    let mut count = 0;
    for document in serde_yaml::Deserializer::from_str(content) {
        match Checked::deserialize(document) {
            Ok(node) if node.null => {}
            Ok(_) => count += 1,
            Err(e) => return (count, Some(YamlSyntaxError::from_serde(&e))),
        }
    }
    (count, None)
}

/// Full syntax check: parse errors, duplicate keys and tab indentation.
pub fn validate_content(content: &str) -> YamlCheck {
    let (document_count, error) = scan_documents(content);
    YamlCheck {
        document_count,
        errors: error.map(|e| e.to_string()).into_iter().collect(),
        warnings: check_tabs(content),
    }
}

/// Number of non-empty documents in a rendered multi-document stream.
pub fn count_resources(content: &str) -> Result<usize, YamlSyntaxError> {
    match scan_documents(content) {
        (_, Some(err)) => Err(err),
        (count, None) => Ok(count),
    }
}

/// Shape-only view of a YAML node.
struct Checked {
    null: bool,
}

impl Checked {
    const PRESENT: Self = Self { null: false };
}

impl<'de> Deserialize<'de> for Checked {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CheckedVisitor)
    }
}

struct CheckedVisitor;

impl<'de> Visitor<'de> for CheckedVisitor {
    type Value = Checked;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML node")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Checked, E> {
        Ok(Checked::PRESENT)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Checked, E> {
        Ok(Checked::PRESENT)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Checked, E> {
        Ok(Checked::PRESENT)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Checked, E> {
        Ok(Checked::PRESENT)
    }

    fn visit_i128<E: de::Error>(self, _: i128) -> Result<Checked, E> {
        Ok(Checked::PRESENT)
    }

    fn visit_u128<E: de::Error>(self, _: u128) -> Result<Checked, E> {
        Ok(Checked::PRESENT)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Checked, E> {
        Ok(Checked::PRESENT)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Checked, E> {
        Ok(Checked { null: true })
    }

    fn visit_none<E: de::Error>(self) -> Result<Checked, E> {
        Ok(Checked { null: true })
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Checked, D::Error> {
        Checked::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Checked, A::Error> {
        while seq.next_element::<Checked>()?.is_some() {}
        Ok(Checked::PRESENT)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Checked, A::Error> {
        let mut seen: Vec<Value> = Vec::new();
        while map.next_key_seed(UniqueKey { seen: &mut seen })?.is_some() {
            map.next_value::<Checked>()?;
        }
        Ok(Checked::PRESENT)
    }

    // Tagged nodes (`!Ref x`) arrive as single-variant enums.
    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Checked, A::Error> {
        let (_tag, variant) = data.variant::<String>()?;
        variant.newtype_variant::<Checked>()?;
        Ok(Checked::PRESENT)
    }
}

/// Reads one mapping key and rejects it if already `seen`.
///
/// The check runs inside the key's own deserialization so serde_yaml tags
/// the error with the key's position rather than the mapping's.
struct UniqueKey<'a> {
    seen: &'a mut Vec<Value>,
}

impl<'de> DeserializeSeed<'de> for UniqueKey<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl UniqueKey<'_> {
    fn insert<E: de::Error>(self, key: Value) -> Result<(), E> {
        if self.seen.contains(&key) {
            return Err(E::custom(format!("{DUPLICATE_KEY}{}", describe_key(&key))));
        }
        self.seen.push(key);
        Ok(())
    }
}

impl<'de> Visitor<'de> for UniqueKey<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping key")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.insert(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        self.insert(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        self.insert(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        self.insert(Value::Number(v.into()))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<(), E> {
        self.insert(Value::String(v.to_string()))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<(), E> {
        self.insert(Value::String(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.insert(Value::String(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.insert(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<(), E> {
        self.insert(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<(), A::Error> {
        let key = Value::deserialize(SeqAccessDeserializer::new(seq))?;
        self.insert(key)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<(), A::Error> {
        let key = Value::deserialize(MapAccessDeserializer::new(map))?;
        self.insert(key)
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<(), A::Error> {
        let key = Value::deserialize(EnumAccessDeserializer::new(data))?;
        self.insert(key)
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::String(s) => format!("'{s}'"),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "<key>".to_string()),
    }
}
