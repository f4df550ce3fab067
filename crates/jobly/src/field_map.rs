//! API field name → storage column name translation.

/// A closed, developer-authored mapping from API-facing field names (`numEmployees`)
/// to storage column names (`num_employees`).
///
/// Fields without an entry map to themselves.
///
/// ```ignore
/// static COMPANY_FIELDS: FieldMap = FieldMap::new(&[
///     ("numEmployees", "num_employees"),
///     ("logoUrl", "logo_url"),
/// ]);
/// assert_eq!(COMPANY_FIELDS.column("logoUrl"), "logo_url");
/// assert_eq!(COMPANY_FIELDS.column("name"), "name");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    entries: &'static [(&'static str, &'static str)],
}

impl FieldMap {
    /// A map with no entries: every field passes through.
    pub const EMPTY: FieldMap = FieldMap::new(&[]);

    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Explicit mapping for `field`, if one exists.
    ///
    /// An entry mapping to the empty string counts as no entry: a zero-length
    /// quoted identifier is never valid SQL.
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(from, _)| *from == field)
            .map(|(_, to)| *to)
            .filter(|to| !to.is_empty())
    }

    /// Resolve the column for `field`, falling back to the field name itself.
    pub fn column<'a>(&self, field: &'a str) -> &'a str {
        self.get(field).unwrap_or(field)
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static MAP: FieldMap = FieldMap::new(&[("firstName", "first_name"), ("blank", "")]);

    #[test]
    fn mapped_field_resolves() {
        assert_eq!(MAP.column("firstName"), "first_name");
    }

    #[test]
    fn unmapped_field_passes_through() {
        assert_eq!(MAP.column("lastName"), "lastName");
        assert_eq!(FieldMap::EMPTY.column("age"), "age");
    }

    #[test]
    fn empty_mapping_is_treated_as_absent() {
        assert_eq!(MAP.get("blank"), None);
        assert_eq!(MAP.column("blank"), "blank");
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(MAP.column("firstname"), "firstname");
    }
}
