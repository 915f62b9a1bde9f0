//! Query model for the hosted store and its PostgREST rendering.
//!
//! A [`Query`] names one table plus a projection (optionally embedding a
//! related table), filters, a sort key and an offset/limit window.  The HTTP
//! client turns it into URL parameters with [`Query::to_params`]; the
//! in-memory store evaluates it directly.

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// One entry of the projection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// Every column of the base table (`*`).
    All,
    /// A single column of the base table.
    Field(String),
    /// Rows of a related table nested under its table name.
    ///
    /// With `inner` set, base rows without a matching related row are
    /// dropped (an inner join).
    Embed {
        table: String,
        inner: bool,
        columns: Vec<String>,
    },
}

/// A row predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`, compared on the textual form of the value.
    Eq { column: String, value: String },
    /// Case-insensitive substring match of `needle` against any of `columns`.
    ///
    /// `scope` names an embedded table when the columns live there rather
    /// than on the base table.
    ContainsAny {
        scope: Option<String>,
        columns: Vec<String>,
        needle: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: String,
    pub columns: Vec<Column>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Query {
    /// Start a query against `table`.  Without any `select` call the whole
    /// row is projected.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            offset: None,
            limit: None,
        }
    }

    /// Project the given base-table columns.  `"*"` projects the whole row.
    pub fn select(mut self, columns: &[&str]) -> Self {
        for column in columns {
            if *column == "*" {
                self.columns.push(Column::All);
            } else {
                self.columns.push(Column::Field((*column).to_owned()));
            }
        }
        self
    }

    /// Nest the related rows of `table` under each base row.
    pub fn embed(mut self, table: &str, columns: &[&str]) -> Self {
        self.columns.push(Column::Embed {
            table: table.to_owned(),
            inner: false,
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
        });
        self
    }

    /// Like [`Query::embed`], but drop base rows with no related row.
    pub fn embed_inner(mut self, table: &str, columns: &[&str]) -> Self {
        self.columns.push(Column::Embed {
            table: table.to_owned(),
            inner: true,
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
        });
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_owned(),
            value: value.to_string(),
        });
        self
    }

    /// Keep rows where any of `columns` contains `needle`, ignoring case.
    pub fn contains_any(mut self, columns: &[&str], needle: &str) -> Self {
        self.filters.push(Filter::ContainsAny {
            scope: None,
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            needle: needle.to_owned(),
        });
        self
    }

    /// Substring filter on the columns of the embedded table `scope`.
    pub fn contains_any_in(mut self, scope: &str, columns: &[&str], needle: &str) -> Self {
        self.filters.push(Filter::ContainsAny {
            scope: Some(scope.to_owned()),
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            needle: needle.to_owned(),
        });
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.to_owned(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restrict the result to `limit` rows starting at `offset`.
    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    /// Filters that apply to the base table.
    pub fn base_filters(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter().filter(|f| f.scope().is_none())
    }

    /// Filters that apply to the embedded table `table`.
    pub fn scoped_filters<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Filter> {
        self.filters.iter().filter(move |f| f.scope() == Some(table))
    }

    // -----------------------------------------------------------------------
    // PostgREST rendering
    // -----------------------------------------------------------------------

    /// URL parameters for a row-returning request.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = self.count_params();

        if let Some(order) = &self.order {
            params.push((
                "order".to_owned(),
                format!("{}.{}", order.column, order.direction.as_str()),
            ));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_owned(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }

        params
    }

    /// URL parameters for a count-only request: projection and filters, no
    /// ordering or window.
    pub fn count_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_owned(), self.render_select())];
        params.extend(self.filters.iter().map(Filter::to_param));
        params
    }

    fn render_select(&self) -> String {
        if self.columns.is_empty() {
            return "*".to_owned();
        }

        self.columns
            .iter()
            .map(|column| match column {
                Column::All => "*".to_owned(),
                Column::Field(name) => name.clone(),
                Column::Embed { table, inner, columns } => {
                    let hint = if *inner { "!inner" } else { "" };
                    format!("{table}{hint}({})", columns.join(","))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Filter {
    pub fn scope(&self) -> Option<&str> {
        match self {
            Self::Eq { .. } => None,
            Self::ContainsAny { scope, .. } => scope.as_deref(),
        }
    }

    fn to_param(&self) -> (String, String) {
        match self {
            Self::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Self::ContainsAny { scope, columns, needle } => {
                let key = match scope {
                    Some(table) => format!("{table}.or"),
                    None => "or".to_owned(),
                };
                let pattern = quote(&like_pattern(needle));
                let terms = columns
                    .iter()
                    .map(|column| format!("{column}.ilike.{pattern}"))
                    .collect::<Vec<_>>()
                    .join(",");
                (key, format!("({terms})"))
            }
        }
    }
}

/// `%needle%` with the LIKE metacharacters of `needle` escaped, so the
/// caller's text is matched literally.
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Double-quote a value for use inside a PostgREST logic tree, where commas,
/// dots and parentheses would otherwise be read as syntax.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
