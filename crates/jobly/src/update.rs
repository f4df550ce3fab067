//! Partial-update SET fragments.
//!
//! A partial update touches only the columns present in the caller's payload:
//!
//! ```ignore
//! use jobly::{FieldMap, UpdatePayload, sql_for_partial_update};
//!
//! static USER_FIELDS: FieldMap = FieldMap::new(&[("firstName", "first_name")]);
//!
//! let payload = UpdatePayload::new().set("firstName", "Aliya").set("age", 32);
//! let set = sql_for_partial_update(&payload, &USER_FIELDS)?;
//! assert_eq!(set.clause, r#""first_name"=$1, "age"=$2"#);
//!
//! // The caller owns the rest of the statement; the id takes the next ordinal.
//! let sql = format!(
//!     "UPDATE users SET {} WHERE id = ${}",
//!     set.clause,
//!     set.next_ordinal(0),
//! );
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::field_map::FieldMap;
use crate::fragment::{FragmentWriter, SqlFragment};
use crate::value::SqlValue;

/// Ordered field → value pairs for a partial update.
///
/// Order is insertion order and decides placeholder ordinals. Setting a field twice
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    fields: Vec<(String, SqlValue)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (consuming form, for chaining).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Remove a field, returning its value if it was present.
    pub fn remove(&mut self, field: &str) -> Option<SqlValue> {
        let pos = self.fields.iter().position(|(k, _)| k == field)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a payload from a JSON object, keeping the object's key order.
    pub fn from_json(value: serde_json::Value) -> JoblyResult<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(JoblyError::validation("Update data must be a JSON object"));
        };
        let mut payload = Self::new();
        for (field, value) in map {
            let value = SqlValue::from_json(&field, value)?;
            payload.fields.push((field, value));
        }
        Ok(payload)
    }

    /// Reject any field outside `allowed`.
    ///
    /// Unmapped fields become column names verbatim, so payloads built from request
    /// bodies must pass through this before reaching [`sql_for_partial_update`].
    pub fn ensure_fields(&self, allowed: &[&str]) -> JoblyResult<()> {
        match self.fields.iter().find(|(k, _)| !allowed.contains(&k.as_str())) {
            Some((field, _)) => Err(JoblyError::validation(format!("Unknown field: {field}"))),
            None => Ok(()),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for UpdatePayload
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (k, v) in iter {
            payload.insert(k, v);
        }
        payload
    }
}

/// Build the SET fragment for `payload`, numbering placeholders from `$1`.
///
/// Fails with a validation error when the payload is empty.
pub fn sql_for_partial_update(
    payload: &UpdatePayload,
    field_map: &FieldMap,
) -> JoblyResult<SqlFragment> {
    sql_for_partial_update_with_offset(payload, field_map, 0)
}

/// Build the SET fragment for `payload` with the first placeholder at `$offset + 1`.
///
/// `offset` is the number of parameters the enclosing statement binds before the SET
/// clause.
pub fn sql_for_partial_update_with_offset(
    payload: &UpdatePayload,
    field_map: &FieldMap,
    offset: usize,
) -> JoblyResult<SqlFragment> {
    if payload.is_empty() {
        return Err(JoblyError::validation("No data"));
    }

    let mut w = FragmentWriter::with_offset(offset, ", ");
    for (field, value) in &payload.fields {
        w.begin(field_map.column(field)).push('=');
        w.bind(value.clone());
    }
    Ok(w.finish())
}
