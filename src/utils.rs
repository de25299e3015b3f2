/// Escapes a value for use inside a single-quoted SQL literal by doubling every `'`.
///
/// Nothing else is escaped.
pub fn escape_sql_literal(value: &str) -> String {
    value.replace('\'', "''")
}
