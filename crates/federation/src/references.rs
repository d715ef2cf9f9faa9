use model::source::kind::TableKind;

/// Canonical tables a statement may read, by case-insensitive substring match.
///
/// Over-inclusive on purpose: a column such as `physical_activity` also
/// marks `activity` as needed. Fetching an extra table is harmless.
pub fn referenced_tables(sql: &str) -> Vec<TableKind> {
    let lowered = sql.to_lowercase();
    TableKind::ALL
        .into_iter()
        .filter(|kind| lowered.contains(kind.canonical_name()))
        .collect()
}
