use sea_orm::sea_query::{ConditionExpression, Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, DbBackend, Value};

/// Ordered, named list of the caller's optional filters.
///
/// Each builder method takes an `Option`: `None` (and, for text, the empty
/// string) leaves the set unchanged. Values are always bound as parameters.
/// Present filters are AND-ed in insertion order.
#[derive(Clone, Debug, Default)]
pub struct FilterSet {
    entries: Vec<(&'static str, Filter)>,
}

#[derive(Clone, Debug)]
enum Filter {
    Cond(Condition),
    /// Rendered per backend: SQL case folding differs between drivers.
    TextCi { cols: Vec<SimpleExpr>, text: String },
}

impl Filter {
    fn condition(&self, backend: DbBackend) -> Condition {
        match self {
            Filter::Cond(c) => c.clone(),
            Filter::TextCi { cols, text } => text_ci_condition(cols, text, backend),
        }
    }
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact match.
    #[must_use]
    pub fn eq<C, V>(self, name: &'static str, col: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        self.push(name, value.map(|v| col.eq(v)))
    }

    /// Case-insensitive substring match, Unicode-aware.
    #[must_use]
    pub fn contains_ci<C: ColumnTrait>(
        self,
        name: &'static str,
        col: C,
        text: Option<&str>,
    ) -> Self {
        self.any_contains_ci(name, &[col], text)
    }

    /// Case-insensitive substring match on any of `cols`.
    #[must_use]
    pub fn any_contains_ci<C: ColumnTrait>(
        self,
        name: &'static str,
        cols: &[C],
        text: Option<&str>,
    ) -> Self {
        let Some(text) = non_empty(text) else {
            return self;
        };
        let cols = cols.iter().map(|col| column(*col).into()).collect();
        self.push_filter(
            name,
            Filter::TextCi {
                cols,
                text: text.to_owned(),
            },
        )
    }

    /// Case-sensitive substring match.
    #[must_use]
    pub fn contains<C: ColumnTrait>(self, name: &'static str, col: C, text: Option<&str>) -> Self {
        let cond = non_empty(text).map(|text| column(col).like(like(&like_pattern(text))));
        self.push(name, cond)
    }

    /// Inclusive lower bound: `col >= value`.
    #[must_use]
    pub fn at_least<C, V>(self, name: &'static str, col: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        self.push(name, value.map(|v| col.gte(v)))
    }

    /// Inclusive upper bound: `col <= value`.
    #[must_use]
    pub fn at_most<C, V>(self, name: &'static str, col: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        self.push(name, value.map(|v| col.lte(v)))
    }

    /// Any other parameterized condition.
    #[must_use]
    pub fn with(self, name: &'static str, cond: Option<Condition>) -> Self {
        self.push(name, cond)
    }

    fn push(self, name: &'static str, cond: Option<impl Into<ConditionExpression>>) -> Self {
        match cond {
            Some(c) => self.push_filter(name, Filter::Cond(Condition::all().add(c))),
            None => self,
        }
    }

    fn push_filter(mut self, name: &'static str, filter: Filter) -> Self {
        self.entries.push((name, filter));
        self
    }

    /// Names of the present filters, in application order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(n, _)| *n).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Conjunction of every present filter, rendered for `backend`.
    /// `TRUE` when empty.
    #[must_use]
    pub fn condition(&self, backend: DbBackend) -> Condition {
        self.entries
            .iter()
            .fold(Condition::all(), |all, (_, f)| all.add(f.condition(backend)))
    }
}

/// SQLite's `LOWER`/`UPPER` and `LIKE` fold ASCII only, so the needle is
/// expanded into a case-sensitive `GLOB` with one character class per cased
/// letter. Elsewhere both sides go through `LOWER`.
fn text_ci_condition(cols: &[SimpleExpr], text: &str, backend: DbBackend) -> Condition {
    match backend {
        DbBackend::Sqlite => {
            let pattern = glob_pattern(text);
            cols.iter().fold(Condition::any(), |any, col| {
                any.add(Expr::cust_with_exprs(
                    "$1 GLOB $2",
                    [col.clone(), Expr::val(pattern.clone()).into()],
                ))
            })
        }
        _ => {
            let pattern = like_pattern(&text.to_lowercase());
            cols.iter().fold(Condition::any(), |any, col| {
                any.add(Expr::expr(Func::lower(col.clone())).like(like(&pattern)))
            })
        }
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn column<C: ColumnTrait>(col: C) -> Expr {
    Expr::col((col.entity_name(), col))
}

fn like(pattern: &str) -> LikeExpr {
    LikeExpr::new(pattern).escape('\\')
}

/// `%text%` with LIKE metacharacters in `text` escaped.
fn like_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// `*text*` where every cased letter matches in any case and GLOB
/// metacharacters in `text` are matched literally.
fn glob_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3 + 2);
    out.push('*');
    for ch in text.chars() {
        let variants = case_variants(ch);
        if variants.len() > 1 {
            out.push('[');
            out.extend(variants);
            out.push(']');
        } else if matches!(ch, '*' | '?' | '[') {
            out.push('[');
            out.push(ch);
            out.push(']');
        } else {
            out.push(ch);
        }
    }
    out.push('*');
    out
}

/// `ch` plus its single-character lower and upper case forms.
fn case_variants(ch: char) -> Vec<char> {
    let mut variants = vec![ch];
    for alt in [single(ch.to_lowercase()), single(ch.to_uppercase())]
        .into_iter()
        .flatten()
    {
        if !variants.contains(&alt) {
            variants.push(alt);
        }
    }
    variants
}

fn single(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}
