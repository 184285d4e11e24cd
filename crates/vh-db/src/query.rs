//! Dynamic list query building.
//!
//! Every list endpoint runs two statements that share one WHERE clause: the
//! page query and a `COUNT(*)`. [`WhereBuilder`] accumulates conditions with
//! `?N` placeholders so both statements bind the same parameter vector.
//! Ordering goes through a closed [`SortField`] enum per domain; names outside
//! the allow-list fall back to the domain default ordering.

use libsql::Value;
use vh_core::enums::{ArchivedFilter, SortOrder};
use vh_core::requests::SortBy;

use crate::relations::JoinTable;

/// Accumulates WHERE conditions and their bound parameters.
#[derive(Debug, Default, Clone)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl WhereBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a parameter and return its placeholder.
    fn bind(&mut self, value: impl Into<Value>) -> String {
        self.params.push(value.into());
        format!("?{}", self.params.len())
    }

    /// `column = value`
    pub fn eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let p = self.bind(value);
        self.conditions.push(format!("{column} = {p}"));
        self
    }

    /// Case-insensitive substring match. Blank text adds nothing.
    pub fn contains(&mut self, column: &str, text: Option<&str>) -> &mut Self {
        if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
            let p = self.bind(text.to_string());
            self.conditions.push(contains_sql(column, &p));
        }
        self
    }

    /// `column IN (...)`. An empty id list adds nothing.
    pub fn in_ids(&mut self, column: &str, ids: &[i64]) -> &mut Self {
        if ids.is_empty() {
            return self;
        }
        let placeholders: Vec<String> = ids.iter().map(|id| self.bind(*id)).collect();
        self.conditions
            .push(format!("{column} IN ({})", placeholders.join(", ")));
        self
    }

    /// Soft-delete filter on an `archived_at` column.
    pub fn archived(&mut self, column: &str, filter: Option<ArchivedFilter>) -> &mut Self {
        match filter {
            Some(ArchivedFilter::Archived) => {
                self.conditions.push(format!("{column} IS NOT NULL"));
            }
            Some(ArchivedFilter::Active) => self.conditions.push(format!("{column} IS NULL")),
            None => {}
        }
        self
    }

    /// Free-text search: OR of contains over `columns`, plus an exact id
    /// match when the text is numeric.
    pub fn search(&mut self, text: Option<&str>, columns: &[&str], id_column: &str) -> &mut Self {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return self;
        };
        let p = self.bind(text.to_string());
        let mut alternatives: Vec<String> = columns.iter().map(|c| contains_sql(c, &p)).collect();
        if let Ok(id) = text.parse::<i64>() {
            let id_p = self.bind(id);
            alternatives.push(format!("{id_column} = {id_p}"));
        }
        self.conditions
            .push(format!("({})", alternatives.join(" OR ")));
        self
    }

    /// Rows linked through `join` to at least one of `ids`. `outer_id` is the
    /// owner id expression of the outer query (e.g. `p.id`). Scoped join
    /// tables match only their unscoped (NULL) partition.
    pub fn exists_in(&mut self, join: &JoinTable, outer_id: &str, ids: &[i64]) -> &mut Self {
        if ids.is_empty() {
            return self;
        }
        let placeholders: Vec<String> = ids.iter().map(|id| self.bind(*id)).collect();
        let scope = join
            .scope_column
            .map(|column| format!(" AND j.{column} IS NULL"))
            .unwrap_or_default();
        self.conditions.push(format!(
            "EXISTS (SELECT 1 FROM {table} j WHERE j.{owner} = {outer_id} AND j.{related} IN ({list}){scope})",
            table = join.table,
            owner = join.owner_column,
            related = join.related_column,
            list = placeholders.join(", "),
        ));
        self
    }

    /// Render `WHERE ...`, or an empty string when there are no conditions.
    #[must_use]
    pub fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    #[must_use]
    pub fn params(&self) -> Vec<Value> {
        self.params.clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

fn contains_sql(column: &str, placeholder: &str) -> String {
    format!("instr(lower({column}), lower({placeholder})) > 0")
}

/// A closed set of sortable field names for one domain.
///
/// `columns` is the explicit lookup from a field to the SQL expressions it
/// orders by, which is where nested-relation redirects live
/// (`statusName` → the joined status table, and so on).
pub trait SortField: Sized + Copy {
    /// Id column appended as a final tie-breaker for stable paging.
    const TIEBREAK: &'static str;

    /// Resolve a request field name. Unknown names return `None`.
    fn parse(name: &str) -> Option<Self>;

    fn columns(self) -> &'static [&'static str];
}

/// Render `ORDER BY` for a requested sort, or `default` when the field is
/// missing or not in the allow-list.
#[must_use]
pub fn order_clause<F: SortField>(sort: Option<&SortBy>, default: &[(&str, SortOrder)]) -> String {
    let mut terms: Vec<String> = match sort.and_then(|s| F::parse(&s.field).map(|f| (f, s.order))) {
        Some((field, order)) => field
            .columns()
            .iter()
            .map(|c| format!("{c} {}", order.as_sql()))
            .collect(),
        None => default
            .iter()
            .map(|(c, order)| format!("{c} {}", order.as_sql()))
            .collect(),
    };
    let has_tiebreak = terms
        .iter()
        .any(|t| t.split_whitespace().next() == Some(F::TIEBREAK));
    if !has_tiebreak {
        terms.push(format!("{} ASC", F::TIEBREAK));
    }
    format!("ORDER BY {}", terms.join(", "))
}

/// Render `LIMIT/OFFSET`. Both values are integers, never user text.
#[must_use]
pub fn paginate(limit: u64, offset: u64) -> String {
    format!("LIMIT {limit} OFFSET {offset}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy)]
    enum TestSort {
        Id,
        Name,
        StatusName,
    }

    impl SortField for TestSort {
        const TIEBREAK: &'static str = "t.id";

        fn parse(name: &str) -> Option<Self> {
            match name {
                "id" => Some(Self::Id),
                "name" => Some(Self::Name),
                "statusName" => Some(Self::StatusName),
                _ => None,
            }
        }

        fn columns(self) -> &'static [&'static str] {
            match self {
                Self::Id => &["t.id"],
                Self::Name => &["t.name"],
                Self::StatusName => &["st.status_name"],
            }
        }
    }

    fn sort(field: &str, order: SortOrder) -> SortBy {
        SortBy {
            field: field.into(),
            order,
        }
    }

    #[test]
    fn empty_builder_renders_nothing() {
        let w = WhereBuilder::new();
        assert_eq!(w.to_sql(), "");
        assert!(w.params().is_empty());
    }

    #[test]
    fn conditions_are_and_joined_with_numbered_params() {
        let mut w = WhereBuilder::new();
        w.eq("t.vendor_id", 4_i64)
            .in_ids("t.status_id", &[1, 2])
            .archived("t.archived_at", Some(ArchivedFilter::Active));
        assert_eq!(
            w.to_sql(),
            "WHERE t.vendor_id = ?1 AND t.status_id IN (?2, ?3) AND t.archived_at IS NULL"
        );
        assert_eq!(w.params().len(), 3);
    }

    #[test]
    fn archived_filter_variants() {
        let mut w = WhereBuilder::new();
        w.archived("a", Some(ArchivedFilter::Archived));
        assert_eq!(w.to_sql(), "WHERE a IS NOT NULL");

        let mut w = WhereBuilder::new();
        w.archived("a", None);
        assert!(w.is_empty());
    }

    #[test]
    fn text_search_without_number() {
        let mut w = WhereBuilder::new();
        w.search(Some(" cater "), &["t.name", "t.description"], "t.id");
        assert_eq!(
            w.to_sql(),
            "WHERE (instr(lower(t.name), lower(?1)) > 0 OR instr(lower(t.description), lower(?1)) > 0)"
        );
        assert_eq!(w.params(), vec![Value::Text("cater".into())]);
    }

    #[test]
    fn numeric_search_adds_id_match() {
        let mut w = WhereBuilder::new();
        w.search(Some("42"), &["t.name"], "t.id");
        assert_eq!(
            w.to_sql(),
            "WHERE (instr(lower(t.name), lower(?1)) > 0 OR t.id = ?2)"
        );
        assert_eq!(
            w.params(),
            vec![Value::Text("42".into()), Value::Integer(42)]
        );
    }

    #[test]
    fn blank_search_and_empty_ids_add_nothing() {
        let mut w = WhereBuilder::new();
        w.search(Some("   "), &["t.name"], "t.id")
            .in_ids("t.status_id", &[])
            .contains("t.name", None);
        assert!(w.is_empty());
    }

    #[test]
    fn exists_in_uses_join_table() {
        let join = JoinTable {
            table: "role_permissions",
            owner_column: "permission_id",
            related_column: "role_id",
            scope_column: None,
        };
        let mut w = WhereBuilder::new();
        w.exists_in(&join, "p.id", &[7]);
        assert_eq!(
            w.to_sql(),
            "WHERE EXISTS (SELECT 1 FROM role_permissions j WHERE j.permission_id = p.id AND j.role_id IN (?1))"
        );
    }

    #[test]
    fn known_field_orders_by_mapped_column() {
        let s = sort("statusName", SortOrder::Desc);
        let clause = order_clause::<TestSort>(Some(&s), &[("t.id", SortOrder::Asc)]);
        assert_eq!(clause, "ORDER BY st.status_name DESC, t.id ASC");
    }

    #[test]
    fn unknown_field_falls_back_to_default() {
        let s = sort("password", SortOrder::Desc);
        let clause = order_clause::<TestSort>(
            Some(&s),
            &[("st.status_name", SortOrder::Asc), ("t.effective_date", SortOrder::Desc)],
        );
        assert_eq!(
            clause,
            "ORDER BY st.status_name ASC, t.effective_date DESC, t.id ASC"
        );
    }

    #[test]
    fn id_sort_is_not_duplicated() {
        let s = sort("id", SortOrder::Desc);
        let clause = order_clause::<TestSort>(Some(&s), &[("t.id", SortOrder::Asc)]);
        assert_eq!(clause, "ORDER BY t.id DESC");
    }

    #[test]
    fn paginate_renders_limit_offset() {
        assert_eq!(paginate(10, 20), "LIMIT 10 OFFSET 20");
    }
}
