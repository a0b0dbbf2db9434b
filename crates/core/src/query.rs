//! List query composition.
//!
//! Every list-backed view (patients, plans, procedures, mappings, storage
//! files, divergences) is described by a [`ListQuery`]. From it this module
//! derives the backend offset, the value-equality [`QueryKey`] used by the
//! query cache, and the literal request parameters sent to the backend.
//!
//! Bad arguments are rejected with [`CoreError::InvalidArgument`] instead
//! of being clamped, so caller bugs surface where they happen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Count;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per list page.
pub const DEFAULT_PAGE_SIZE: Count = 10;

/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: Count = 100;

/// Convert a 1-based page number and a page size into a row offset.
///
/// # Examples
///
/// ```
/// use clinica_core::query::to_offset;
/// assert_eq!(to_offset(1, 10), Ok(0));
/// assert_eq!(to_offset(3, 20), Ok(40));
/// assert!(to_offset(0, 10).is_err());
/// assert!(to_offset(1, 0).is_err());
/// ```
pub fn to_offset(page: Count, limit: Count) -> CoreResult<Count> {
    if page < 1 {
        return Err(CoreError::InvalidArgument(format!(
            "page must be >= 1, got {page}"
        )));
    }
    if limit < 1 {
        return Err(CoreError::InvalidArgument(format!(
            "limit must be >= 1, got {limit}"
        )));
    }
    (page - 1).checked_mul(limit).ok_or_else(|| {
        CoreError::InvalidArgument(format!("offset for page {page} x {limit} overflows"))
    })
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort direction. Parsing is case-sensitive: only `asc` and `desc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// The opposite direction, for clickable column headers.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(CoreError::InvalidArgument(format!(
                "sort direction must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Validate a user-chosen sort column and direction.
///
/// The column is trimmed and must not be blank; the direction must be
/// exactly `asc` or `desc`.
///
/// # Examples
///
/// ```
/// use clinica_core::query::{normalize_sort, SortDirection};
/// let sort = normalize_sort("nome", "asc").unwrap();
/// assert_eq!(sort.direction, SortDirection::Asc);
/// assert!(normalize_sort("nome", "ASC").is_err());
/// ```
pub fn normalize_sort(column: &str, direction: &str) -> CoreResult<SortSpec> {
    let column = column.trim();
    if column.is_empty() {
        return Err(CoreError::InvalidArgument(
            "sort column must not be blank".to_string(),
        ));
    }
    Ok(SortSpec {
        column: column.to_string(),
        direction: direction.parse()?,
    })
}

// ---------------------------------------------------------------------------
// ListQuery
// ---------------------------------------------------------------------------

/// One page of one filtered, sorted view of a resource collection.
///
/// Construction validates `page` and `limit`, so [`offset`](Self::offset)
/// cannot fail afterwards. A blank search term is stored as `None`: an
/// empty search box and no search box select the same rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    page: Count,
    limit: Count,
    search: Option<String>,
    order_column: String,
    order_direction: SortDirection,
}

impl ListQuery {
    pub fn new(page: Count, limit: Count, sort: SortSpec) -> CoreResult<Self> {
        to_offset(page, limit)?;
        Ok(Self {
            page,
            limit,
            search: None,
            order_column: sort.column,
            order_direction: sort.direction,
        })
    }

    /// Set the free-text search term (trimmed; blank clears it).
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        let trimmed = search.as_ref().trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.order_column = sort.column;
        self.order_direction = sort.direction;
        self
    }

    /// Same view, different page.
    pub fn with_page(&self, page: Count) -> CoreResult<Self> {
        to_offset(page, self.limit)?;
        Ok(Self {
            page,
            ..self.clone()
        })
    }

    /// The following page, or `None` once `total` rows are exhausted.
    pub fn next_page(&self, total: Count) -> Option<Self> {
        if self.page.saturating_mul(self.limit) >= total {
            return None;
        }
        self.with_page(self.page + 1).ok()
    }

    pub fn page(&self) -> Count {
        self.page
    }

    pub fn limit(&self) -> Count {
        self.limit
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn order_column(&self) -> &str {
        &self.order_column
    }

    pub fn order_direction(&self) -> SortDirection {
        self.order_direction
    }

    pub fn offset(&self) -> Count {
        (self.page - 1) * self.limit
    }
}

// ---------------------------------------------------------------------------
// Cache keys
// ---------------------------------------------------------------------------

/// One element of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl KeyPart {
    /// Render the part as a request parameter value (`None` for `Null`).
    pub fn render(&self) -> Option<String> {
        match self {
            KeyPart::Null => None,
            KeyPart::Bool(b) => Some(b.to_string()),
            KeyPart::Int(n) => Some(n.to_string()),
            KeyPart::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Text(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyPart::Null, Into::into)
    }
}

/// A resource-specific filter (e.g. divergence `status`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Filter {
    pub name: String,
    pub value: KeyPart,
}

impl Filter {
    pub fn new(name: impl Into<String>, value: impl Into<KeyPart>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered tuple identifying one cached list page.
///
/// Layout: `[resource, page, limit, search, orderColumn, orderDirection,
/// ...(filter name, filter value)]`. Keys compare by value, and filter order
/// is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    /// A key holding only the resource name; a prefix of every page key for
    /// that resource.
    pub fn for_resource(resource: &str) -> Self {
        Self(vec![KeyPart::from(resource)])
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// The resource name in the first position, if any.
    pub fn resource(&self) -> Option<&str> {
        match self.0.first() {
            Some(KeyPart::Text(name)) => Some(name),
            _ => None,
        }
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

/// Compose the cache key for one page of `resource`.
///
/// Each filter contributes its name followed by its value. `Null` filters
/// are left out, as they are from [`request_params`], so a key matches
/// exactly one request.
///
/// # Examples
///
/// ```
/// use clinica_core::query::{build_key, ListQuery, SortSpec};
/// let query = ListQuery::new(1, 10, SortSpec::asc("nome")).unwrap();
/// assert_eq!(build_key("pacientes", &query, &[]), build_key("pacientes", &query, &[]));
/// ```
pub fn build_key(resource: &str, query: &ListQuery, filters: &[Filter]) -> QueryKey {
    let mut parts = Vec::with_capacity(6 + 2 * filters.len());
    parts.push(KeyPart::from(resource));
    parts.push(KeyPart::Int(query.page));
    parts.push(KeyPart::Int(query.limit));
    parts.push(KeyPart::from(query.search.clone()));
    parts.push(KeyPart::from(query.order_column.as_str()));
    parts.push(KeyPart::from(query.order_direction.as_str()));
    for filter in filters.iter().filter(|f| f.value != KeyPart::Null) {
        parts.push(KeyPart::Text(filter.name.clone()));
        parts.push(filter.value.clone());
    }
    QueryKey(parts)
}

/// The literal `(name, value)` pairs sent to the backend for one page.
///
/// Both `page` and `offset` are sent so REST endpoints and range-based
/// database queries can each pick the one they use. Blank search terms and
/// `Null` filters are omitted.
pub fn request_params(query: &ListQuery, filters: &[Filter]) -> Vec<(String, String)> {
    let mut params = vec![
        ("page".to_string(), query.page.to_string()),
        ("limit".to_string(), query.limit.to_string()),
        ("offset".to_string(), query.offset().to_string()),
    ];
    if let Some(search) = &query.search {
        params.push(("search".to_string(), search.clone()));
    }
    params.push(("orderColumn".to_string(), query.order_column.clone()));
    params.push((
        "orderDirection".to_string(),
        query.order_direction.as_str().to_string(),
    ));
    params.extend(
        filters
            .iter()
            .filter_map(|f| f.value.render().map(|v| (f.name.clone(), v))),
    );
    params
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;

    use super::*;

    fn pacientes_query() -> ListQuery {
        ListQuery::new(1, 10, SortSpec::asc("nome"))
            .unwrap()
            .with_search("")
    }

    // -- to_offset -----------------------------------------------------------

    #[test]
    fn offset_first_page_is_zero() {
        assert_eq!(to_offset(1, 25), Ok(0));
    }

    #[test]
    fn offset_third_page_of_twenty() {
        assert_eq!(to_offset(3, 20), Ok(40));
    }

    #[test]
    fn offset_matches_formula() {
        for page in 1..=12 {
            for limit in 1..=12 {
                assert_eq!(to_offset(page, limit), Ok((page - 1) * limit));
            }
        }
    }

    #[test]
    fn offset_rejects_page_zero() {
        assert_matches!(to_offset(0, 10), Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn offset_rejects_limit_zero() {
        assert_matches!(to_offset(1, 0), Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn offset_rejects_negative_values() {
        assert_matches!(to_offset(-2, 10), Err(CoreError::InvalidArgument(_)));
        assert_matches!(to_offset(2, -10), Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn offset_rejects_overflow() {
        assert_matches!(to_offset(i64::MAX, 2), Err(CoreError::InvalidArgument(_)));
    }

    // -- normalize_sort ------------------------------------------------------

    #[test]
    fn sort_accepts_lowercase_directions() {
        assert_eq!(normalize_sort("nome", "asc"), Ok(SortSpec::asc("nome")));
        assert_eq!(
            normalize_sort("created_at", "desc"),
            Ok(SortSpec::desc("created_at"))
        );
    }

    #[test]
    fn sort_is_case_sensitive() {
        assert_matches!(
            normalize_sort("nome", "ASC"),
            Err(CoreError::InvalidArgument(_))
        );
        assert_matches!(
            normalize_sort("nome", "Desc"),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[test]
    fn sort_rejects_unknown_direction() {
        assert_matches!(
            normalize_sort("nome", "up"),
            Err(CoreError::InvalidArgument(_))
        );
        assert_matches!(normalize_sort("nome", ""), Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn sort_rejects_blank_column() {
        assert_matches!(normalize_sort("  ", "asc"), Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn sort_trims_column() {
        assert_eq!(normalize_sort(" nome ", "asc").unwrap().column, "nome");
    }

    #[test]
    fn direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SortDirection::Desc).unwrap(), "\"desc\"");
        assert_eq!(SortDirection::Asc.reversed(), SortDirection::Desc);
    }

    // -- ListQuery -----------------------------------------------------------

    #[test]
    fn query_rejects_invalid_page_and_limit() {
        assert_matches!(
            ListQuery::new(0, 10, SortSpec::asc("nome")),
            Err(CoreError::InvalidArgument(_))
        );
        assert_matches!(
            ListQuery::new(1, 0, SortSpec::asc("nome")),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[test]
    fn query_blank_search_is_none() {
        assert_eq!(pacientes_query().search(), None);
        let q = pacientes_query().with_search("  maria ");
        assert_eq!(q.search(), Some("maria"));
    }

    #[test]
    fn query_offset_follows_page() {
        let q = ListQuery::new(3, 20, SortSpec::asc("nome")).unwrap();
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn query_next_page_stops_at_total() {
        let q = ListQuery::new(1, 10, SortSpec::asc("nome")).unwrap();
        let next = q.next_page(25).unwrap();
        assert_eq!(next.page(), 2);
        let last = next.next_page(25).unwrap();
        assert_eq!(last.page(), 3);
        assert!(last.next_page(25).is_none());
    }

    #[test]
    fn query_with_page_keeps_view() {
        let q = pacientes_query().with_search("ana").with_sort(SortSpec::desc("cpf"));
        let moved = q.with_page(4).unwrap();
        assert_eq!(moved.search(), Some("ana"));
        assert_eq!(moved.order_column(), "cpf");
        assert_eq!(moved.order_direction(), SortDirection::Desc);
        assert_matches!(q.with_page(0), Err(CoreError::InvalidArgument(_)));
    }

    #[test]
    fn query_serializes_camel_case() {
        let json = serde_json::to_value(pacientes_query()).unwrap();
        assert_eq!(json["orderColumn"], "nome");
        assert_eq!(json["orderDirection"], "asc");
        assert!(json["search"].is_null());
    }

    // -- build_key -----------------------------------------------------------

    #[test]
    fn key_equal_for_equal_queries() {
        let a = build_key("pacientes", &pacientes_query(), &[]);
        let b = build_key("pacientes", &pacientes_query(), &[]);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn key_layout_is_ordered_tuple() {
        let key = build_key(
            "divergencias",
            &pacientes_query().with_search("joao"),
            &[Filter::new("status", "pendente"), Filter::new("lote", 7_i64)],
        );
        assert_eq!(
            key.parts(),
            &[
                KeyPart::from("divergencias"),
                KeyPart::Int(1),
                KeyPart::Int(10),
                KeyPart::from("joao"),
                KeyPart::from("nome"),
                KeyPart::from("asc"),
                KeyPart::from("status"),
                KeyPart::from("pendente"),
                KeyPart::from("lote"),
                KeyPart::Int(7),
            ]
        );
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            r#"["divergencias",1,10,"joao","nome","asc","status","pendente","lote",7]"#
        );
    }

    #[test]
    fn key_separates_filters_sharing_a_value() {
        let q = pacientes_query();
        let by_status = build_key("divergencias", &q, &[Filter::new("status", "2024-01-01")]);
        let by_start = build_key(
            "divergencias",
            &q,
            &[Filter::new("data_inicio", "2024-01-01")],
        );
        assert_ne!(by_status, by_start);
    }

    #[test]
    fn null_filter_keys_like_an_omitted_one() {
        let q = pacientes_query();
        let with_null = build_key(
            "divergencias",
            &q,
            &[Filter::new("status", None::<String>), Filter::new("lote", 7_i64)],
        );
        let without = build_key("divergencias", &q, &[Filter::new("lote", 7_i64)]);
        assert_eq!(with_null, without);
        assert_ne!(without, build_key("divergencias", &q, &[Filter::new("status", 7_i64)]));
    }

    #[test]
    fn key_differs_by_any_axis() {
        let base = build_key("pacientes", &pacientes_query(), &[]);
        let q = pacientes_query();
        assert_ne!(base, build_key("planos", &q, &[]));
        assert_ne!(base, build_key("pacientes", &q.with_page(2).unwrap(), &[]));
        assert_ne!(base, build_key("pacientes", &q.clone().with_search("x"), &[]));
        assert_ne!(
            base,
            build_key("pacientes", &q.clone().with_sort(SortSpec::desc("nome")), &[])
        );
        assert_ne!(base, build_key("pacientes", &q, &[Filter::new("ativo", true)]));
    }

    #[test]
    fn key_prefix_matches_resource() {
        let key = build_key("pacientes", &pacientes_query(), &[]);
        assert_eq!(key.resource(), Some("pacientes"));
        assert!(key.starts_with(&QueryKey::for_resource("pacientes")));
        assert!(!key.starts_with(&QueryKey::for_resource("planos")));
    }

    // -- request_params ------------------------------------------------------

    #[test]
    fn params_include_offset_and_sort() {
        let q = ListQuery::new(3, 20, SortSpec::desc("created_at"))
            .unwrap()
            .with_search("consulta");
        let params = request_params(&q, &[Filter::new("status", None::<String>)]);
        let pairs: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("page", "3"),
                ("limit", "20"),
                ("offset", "40"),
                ("search", "consulta"),
                ("orderColumn", "created_at"),
                ("orderDirection", "desc"),
            ]
        );
    }

    #[test]
    fn params_omit_blank_search_and_render_filters() {
        let params = request_params(
            &pacientes_query(),
            &[Filter::new("ativo", true), Filter::new("plano_id", 12_i64)],
        );
        assert!(!params.iter().any(|(k, _)| k == "search"));
        assert!(params.contains(&("ativo".to_string(), "true".to_string())));
        assert!(params.contains(&("plano_id".to_string(), "12".to_string())));
    }
}
