use sea_orm::{
    sea_query::{Alias, Expr, IntoCondition, SimpleExpr},
    Condition, ConditionalStatement, DbBackend, QueryFilter, Value,
};
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use crate::{
    chain::Conditional,
    filter::Where,
    presence::{self, Lexeme, WhereArgs},
    truthy::Truthy,
};

/// A query that knows which backend it will be built for, so templates can
/// use that backend's placeholders.
#[derive(Debug, Clone)]
pub struct BackendQuery<Q> {
    inner: Q,
    backend: DbBackend,
}

impl<Q> BackendQuery<Q> {
    pub fn new(inner: Q, backend: DbBackend) -> Self {
        Self { inner, backend }
    }

    pub fn backend(&self) -> DbBackend {
        self.backend
    }

    pub fn into_inner(self) -> Q {
        self.inner
    }
}

impl<Q> QueryFilter for BackendQuery<Q>
where
    Q: QueryFilter,
{
    type QueryStatement = Q::QueryStatement;

    fn query(&mut self) -> &mut Self::QueryStatement {
        QueryFilter::query(&mut self.inner)
    }
}

impl<Q> Where for BackendQuery<Q>
where
    Q: QueryFilter,
{
    fn apply_where(mut self, args: WhereArgs) -> Self {
        if let Some(condition) = into_condition(args, self.backend) {
            QueryFilter::query(&mut self.inner).cond_where(condition);
        }
        self
    }
}

pub trait QueryFilterExt: QueryFilter {
    fn for_backend(self, backend: DbBackend) -> BackendQuery<Self> {
        BackendQuery::new(self, backend)
    }

    fn filter_when<C, F>(self, condition: C, filter: F) -> Self
    where
        C: Truthy,
        F: IntoCondition,
    {
        self.when_with(condition, |query| query.filter(filter)).into_inner()
    }
}

impl<T> QueryFilterExt for T where T: QueryFilter {}

pub trait ConditionExt {
    fn add_if_present<A>(self, backend: DbBackend, args: A) -> Self
    where
        A: Into<WhereArgs>;
}

impl ConditionExt for Condition {
    fn add_if_present<A>(self, backend: DbBackend, args: A) -> Self
    where
        A: Into<WhereArgs>,
    {
        let condition =
            presence::retain_present(args.into()).and_then(|args| into_condition(args, backend));
        match condition {
            Some(condition) => self.add(condition),
            None => self,
        }
    }
}

fn into_condition(args: WhereArgs, backend: DbBackend) -> Option<Condition> {
    match args {
        WhereArgs::Criteria(map) => Some(add_criteria(Condition::all(), None, &map)),
        WhereArgs::Template { sql, values } => {
            let placeholders = presence::placeholder_count(&sql);
            if placeholders != values.len() {
                warn!(placeholders, values = values.len(), %sql, "template not applied");
                return None;
            }
            let expr = Expr::cust_with_values(
                bind_template(&sql, backend),
                values.iter().map(into_value),
            );
            Some(Condition::all().add(expr))
        }
        WhereArgs::Raw(args) => Some(args.iter().fold(Condition::all(), |condition, arg| {
            match arg {
                JsonValue::Object(map) => add_criteria(condition, None, map),
                JsonValue::String(sql) => condition.add(Expr::cust(sql.as_str())),
                other => condition.add(SimpleExpr::Value(into_value(other))),
            }
        })),
    }
}

/// Rewrites `?` placeholders into the backend's own markers.
///
/// Postgres binds `$1`, `$2`, ... and reads a bare `$` as a marker, so literal
/// dollars outside identifiers are doubled.
fn bind_template(sql: &str, backend: DbBackend) -> String {
    let numbered = backend == DbBackend::Postgres;
    let mut lexemes = presence::lex(sql).peekable();
    let mut bound = String::with_capacity(sql.len());
    let mut index = 0;
    let mut in_word = false;

    while let Some(lexeme) = lexemes.next() {
        match lexeme {
            Lexeme::Placeholder => {
                if numbered {
                    if bound.ends_with(is_word_char) {
                        bound.push(' ');
                    }
                    index += 1;
                    bound.push('$');
                    bound.push_str(&index.to_string());
                } else {
                    bound.push('?');
                }
                let separate = match lexemes.peek() {
                    Some(Lexeme::Placeholder) => true,
                    Some(Lexeme::Text(c)) => numbered && is_word_char(*c),
                    _ => false,
                };
                if separate {
                    bound.push(' ');
                }
                in_word = false;
            }
            Lexeme::Text('$') if numbered && !in_word => bound.push_str("$$"),
            Lexeme::Text(c) => {
                in_word = c.is_alphanumeric() || (in_word && is_word_char(c));
                bound.push(c);
            }
            Lexeme::Quoted(c) => {
                in_word = false;
                bound.push(c);
            }
        }
    }

    bound
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$')
}

/// Only the first level of nesting names a table. Deeper mappings are
/// compared as JSON values.
fn add_criteria(
    condition: Condition,
    table: Option<&str>,
    map: &Map<String, JsonValue>,
) -> Condition {
    map.iter().fold(condition, |condition, (key, value)| match (table, value) {
        (None, JsonValue::Object(nested)) => add_criteria(condition, Some(key.as_str()), nested),
        _ => condition.add(column_condition(table, key, value)),
    })
}

fn column_condition(table: Option<&str>, column: &str, value: &JsonValue) -> SimpleExpr {
    let expr = match table {
        Some(table) => Expr::col((Alias::new(table), Alias::new(column))),
        None => Expr::col(Alias::new(column)),
    };

    match value {
        JsonValue::Null => expr.is_null(),
        JsonValue::Array(items) => expr.is_in(items.iter().map(into_value).collect::<Vec<_>>()),
        _ => expr.eq(into_value(value)),
    }
}

fn into_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::from(None::<String>),
        JsonValue::Bool(b) => Value::from(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64())
            }
        }
        JsonValue::String(s) => Value::from(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::from(value.clone()),
    }
}
