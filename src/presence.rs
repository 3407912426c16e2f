use serde_json::{Map, Value as JsonValue};
use tracing::debug;

/// Arguments for a `where` style filter.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereArgs {
    Criteria(Map<String, JsonValue>),
    Template {
        sql: String,
        values: Vec<JsonValue>,
    },
    Raw(Vec<JsonValue>),
}

impl WhereArgs {
    pub fn template<S, I>(sql: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<JsonValue>,
    {
        WhereArgs::Template {
            sql: sql.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Map<String, JsonValue>> for WhereArgs {
    fn from(value: Map<String, JsonValue>) -> Self {
        WhereArgs::Criteria(value)
    }
}

impl From<JsonValue> for WhereArgs {
    fn from(value: JsonValue) -> Self {
        WhereArgs::from(vec![value])
    }
}

impl From<Vec<JsonValue>> for WhereArgs {
    fn from(args: Vec<JsonValue>) -> Self {
        let mut rest = args.into_iter();

        match rest.next() {
            Some(JsonValue::Object(map)) if rest.len() == 0 => WhereArgs::Criteria(map),
            Some(JsonValue::String(sql)) => WhereArgs::Template {
                sql,
                values: rest.collect(),
            },
            Some(first) => WhereArgs::Raw(std::iter::once(first).chain(rest).collect()),
            None => WhereArgs::Raw(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lexeme {
    Text(char),
    Quoted(char),
    Placeholder,
}

/// Splits a template into characters, quoted text and `?` placeholders.
/// Quotes follow the statement tokenizer: `'`, `"`, `` ` `` and `[...]`, with
/// backslash escapes inside.
pub(crate) fn lex(sql: &str) -> impl Iterator<Item = Lexeme> + '_ {
    let mut close: Option<char> = None;
    let mut escaped = false;

    sql.chars().map(move |c| match close {
        Some(end) => {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == end {
                close = None;
            }
            Lexeme::Quoted(c)
        }
        None => match c {
            '\'' | '"' | '`' => {
                close = Some(c);
                Lexeme::Quoted(c)
            }
            '[' => {
                close = Some(']');
                Lexeme::Quoted(c)
            }
            '?' => Lexeme::Placeholder,
            _ => Lexeme::Text(c),
        },
    })
}

pub(crate) fn placeholder_count(sql: &str) -> usize {
    lex(sql)
        .filter(|lexeme| *lexeme == Lexeme::Placeholder)
        .count()
}

pub fn is_present(value: &JsonValue) -> bool {
    !value.is_null()
}

/// Drops null entries at any depth, then any nested mapping left empty.
pub fn compact(map: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    map.iter()
        .filter_map(|(key, value)| match value {
            JsonValue::Null => None,
            JsonValue::Object(nested) => {
                let nested = compact(nested);
                (!nested.is_empty()).then(|| (key.clone(), JsonValue::Object(nested)))
            }
            _ => Some((key.clone(), value.clone())),
        })
        .collect()
}

pub(crate) fn retain_present(args: WhereArgs) -> Option<WhereArgs> {
    match args {
        WhereArgs::Criteria(map) => {
            let map = compact(&map);
            (!map.is_empty()).then_some(WhereArgs::Criteria(map))
        }
        WhereArgs::Template { sql, values } => {
            if placeholder_count(&sql) != values.len() {
                debug!(
                    placeholders = placeholder_count(&sql),
                    values = values.len(),
                    "template arity mismatch"
                );
                return None;
            }
            values
                .iter()
                .all(is_present)
                .then_some(WhereArgs::Template { sql, values })
        }
        raw @ WhereArgs::Raw(_) => Some(raw),
    }
}
