// ABOUTME: Search query model (criteria, sort orders, capabilities) and the query/filter compiler.
// ABOUTME: Compiles a capability-declared SearchQuery into source-specific request parameters.

//! Search queries and the query/filter compiler.
//!
//! A [`SearchQuery`] is source-agnostic: an ordered list of criteria, an
//! optional sort order and a pagination offset. Each source declares which
//! (field, criterion-kind) pairs it supports; [`compile`] translates the
//! query into that source's request parameters, silently dropping anything
//! the source did not declare. Dropping is deliberate — callers combine one
//! query with sources of very different capability sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A searchable field of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchableField {
    Title,
    Tag,
    State,
    Author,
    ContentRating,
    Demographic,
    PublicationYear,
}

/// The kind of a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    Include,
    Exclude,
    Match,
}

/// One search criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Include {
        field: SearchableField,
        values: Vec<String>,
    },
    Exclude {
        field: SearchableField,
        values: Vec<String>,
    },
    Match {
        field: SearchableField,
        value: String,
    },
}

impl Criterion {
    pub fn field(&self) -> SearchableField {
        match self {
            Criterion::Include { field, .. }
            | Criterion::Exclude { field, .. }
            | Criterion::Match { field, .. } => *field,
        }
    }

    pub fn kind(&self) -> CriterionKind {
        match self {
            Criterion::Include { .. } => CriterionKind::Include,
            Criterion::Exclude { .. } => CriterionKind::Exclude,
            Criterion::Match { .. } => CriterionKind::Match,
        }
    }
}

/// Sort orders understood by the compiler. Each source maps the ones it
/// supports to its own token; anything else falls back to the source default.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Updated,
    UpdatedAsc,
    Popularity,
    PopularityAsc,
    Rating,
    RatingAsc,
    Newest,
    NewestAsc,
    Alphabetical,
    AlphabeticalDesc,
}

/// A declared (field, criterion-kinds) pair a source supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub field: SearchableField,
    pub kinds: Vec<CriterionKind>,
    /// Whether the field accepts more than one value per criterion.
    #[serde(default)]
    pub multiple: bool,
}

impl Capability {
    fn allows(&self, kind: CriterionKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// A source-agnostic search query.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub criteria: Vec<Criterion>,
    pub order: Option<SortOrder>,
    pub offset: u32,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an Include criterion.
    pub fn include<I, S>(mut self, field: SearchableField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.push(Criterion::Include {
            field,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add an Exclude criterion.
    pub fn exclude<I, S>(mut self, field: SearchableField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.push(Criterion::Exclude {
            field,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add a Match criterion.
    pub fn matching(mut self, field: SearchableField, value: impl Into<String>) -> Self {
        self.criteria.push(Criterion::Match {
            field,
            value: value.into(),
        });
        self
    }

    /// Convenience: match on the title field.
    pub fn title(self, value: impl Into<String>) -> Self {
        self.matching(SearchableField::Title, value)
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// How multiple values of one Include/Exclude criterion become parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamStyle {
    /// One parameter instance per value, e.g. `genre[]=a&genre[]=b`.
    #[default]
    Repeat,
    /// A single comma-joined parameter, e.g. `genres=a,b`.
    CommaJoin,
}

/// Per-field output formatting rule for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamRule {
    pub name: String,
    /// Parameter name for Exclude criteria; defaults to `exclude_<name>`.
    #[serde(default)]
    pub exclude_name: Option<String>,
    #[serde(default)]
    pub style: ParamStyle,
}

/// How a source paginates list requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pagination {
    /// `?offset=N&limit=M` style.
    OffsetLimit { offset: String, limit: String },
    /// 1-based page number, `page = offset / page_size + 1`.
    PageNumber { param: String },
}

fn default_sort_param() -> String {
    "sort".to_string()
}

fn default_page_size() -> u32 {
    20
}

/// The request-parameter mapping of one list strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpec {
    #[serde(default)]
    pub params: BTreeMap<SearchableField, ParamRule>,
    #[serde(default = "default_sort_param")]
    pub sort_param: String,
    #[serde(default)]
    pub sort_tokens: BTreeMap<SortOrder, String>,
    /// Parameters appended verbatim to every request (e.g. `post_type`).
    #[serde(default)]
    pub fixed: BTreeMap<String, String>,
    pub pagination: Pagination,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SearchSpec {
    fn default() -> Self {
        Self {
            params: BTreeMap::new(),
            sort_param: default_sort_param(),
            sort_tokens: BTreeMap::new(),
            fixed: BTreeMap::new(),
            pagination: Pagination::PageNumber {
                param: "page".to_string(),
            },
            page_size: default_page_size(),
        }
    }
}

/// Compile a search query into request parameters for one source.
///
/// Compiled output is a strict function of `query ∩ capabilities`: a
/// criterion whose (field, kind) pair is not declared, or whose field has no
/// parameter rule, is dropped without error. A multi-value criterion on a
/// single-value field is truncated to its first value. An unrecognized sort
/// order falls back to the source's declared default.
pub fn compile(
    query: &SearchQuery,
    capabilities: &[Capability],
    spec: &SearchSpec,
    default_order: SortOrder,
) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();

    for (name, value) in &spec.fixed {
        params.push((name.clone(), value.clone()));
    }

    for criterion in &query.criteria {
        let capability = capabilities
            .iter()
            .find(|c| c.field == criterion.field() && c.allows(criterion.kind()));
        let Some(capability) = capability else {
            continue;
        };
        let Some(rule) = spec.params.get(&criterion.field()) else {
            continue;
        };

        match criterion {
            Criterion::Match { value, .. } => {
                params.push((rule.name.clone(), value.clone()));
            }
            Criterion::Include { values, .. } => {
                append_values(&mut params, rule, &rule.name, values, capability.multiple);
            }
            Criterion::Exclude { values, .. } => {
                let name = rule
                    .exclude_name
                    .clone()
                    .unwrap_or_else(|| format!("exclude_{}", rule.name));
                append_values(&mut params, rule, &name, values, capability.multiple);
            }
        }
    }

    if !spec.sort_tokens.is_empty() {
        let requested = query.order.unwrap_or(default_order);
        let token = spec
            .sort_tokens
            .get(&requested)
            .or_else(|| spec.sort_tokens.get(&default_order));
        if let Some(token) = token {
            params.push((spec.sort_param.clone(), token.clone()));
        }
    }

    match &spec.pagination {
        Pagination::OffsetLimit { offset, limit } => {
            params.push((offset.clone(), query.offset.to_string()));
            params.push((limit.clone(), spec.page_size.to_string()));
        }
        Pagination::PageNumber { param } => {
            let page = query.offset / spec.page_size.max(1) + 1;
            params.push((param.clone(), page.to_string()));
        }
    }

    params
}

fn append_values(
    params: &mut Vec<(String, String)>,
    rule: &ParamRule,
    name: &str,
    values: &[String],
    multiple: bool,
) {
    if values.is_empty() {
        return;
    }
    let values: &[String] = if multiple { values } else { &values[..1] };
    match rule.style {
        ParamStyle::Repeat => {
            for value in values {
                params.push((name.to_string(), value.clone()));
            }
        }
        ParamStyle::CommaJoin => {
            params.push((name.to_string(), values.join(",")));
        }
    }
}
