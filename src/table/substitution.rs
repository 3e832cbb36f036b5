use crate::error::SheetDocError;
use crate::input::InputFile;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::read_rows;
use crate::table::Value;
use log::debug;
use std::collections::HashMap;

/// Lookup key of a substitution. Numbers compare by value and booleans
/// compare equal to 1 and 0, so a rule for `1` also matches `TRUE`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum SubstitutionKey {
    Text(String),
    Number(u64),
}

impl SubstitutionKey {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Empty => None,
            Value::Bool(flag) => Some(Self::number(if *flag { 1.0 } else { 0.0 })),
            Value::Number(number) if number.is_nan() => None,
            Value::Number(number) => Some(Self::number(*number)),
            Value::Text(text) => Some(SubstitutionKey::Text(text.to_owned())),
        }
    }

    fn number(number: f64) -> Self {
        // -0.0 and 0.0 are the same key
        SubstitutionKey::Number((number + 0.0).to_bits())
    }
}

/// Exact-match replacement rules for column names and cell values.
#[derive(Clone, Debug, Default)]
pub struct SubstitutionMap {
    rules: HashMap<SubstitutionKey, Value>,
    /// Original keys in insertion order, for listing
    keys: Vec<Value>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from (old, new) pairs; later pairs win over earlier ones.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut map = Self::new();
        for (old, new) in pairs {
            map.insert(old, new);
        }
        map
    }

    /// Loads rules from the first sheet of a spreadsheet without header row:
    /// the first column holds old values, the second their replacements.
    /// Rows with an empty key are skipped; a sheet with fewer than two columns
    /// yields an empty map.
    pub fn load(input: &InputFile) -> Result<Self, SheetDocError> {
        let criteria = Criteria {
            header: false,
            ..Criteria::default()
        };
        let rows = read_rows(input, &criteria)?;
        let mut map = Self::new();
        if rows.iter().map(Vec::len).max().unwrap_or(0) < 2 {
            debug!("{}: fewer than two columns, no substitutions loaded", input.name);
            return Ok(map);
        }
        for row in rows {
            let mut values = row.into_iter();
            let old = values.next().unwrap_or_default();
            let new = values.next().unwrap_or_default();
            map.insert(old, new);
        }
        debug!("{}: loaded {} substitutions", input.name, map.len());
        Ok(map)
    }

    /// Adds a rule. Empty keys are ignored.
    pub fn insert(&mut self, old: Value, new: Value) {
        if let Some(key) = SubstitutionKey::of(&old) {
            if self.rules.insert(key, new).is_none() {
                self.keys.push(old);
            }
        }
    }

    /// Replacement for a cell value, if a rule matches exactly.
    pub fn get(&self, value: &Value) -> Option<&Value> {
        SubstitutionKey::of(value).and_then(|key| self.rules.get(&key))
    }

    /// Replacement for a column name, compared as text.
    pub fn get_header(&self, name: &str) -> Option<String> {
        self.rules
            .get(&SubstitutionKey::Text(name.to_owned()))
            .map(|value| value.to_string())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.keys.iter().filter_map(move |old| self.get(old).map(|new| (old, new)))
    }
}
