use tracing::debug;

use crate::presence::{self, WhereArgs};

pub trait Where: Sized {
    fn apply_where(self, args: WhereArgs) -> Self;
}

pub trait WhereIfPresent: Where {
    /// `apply_where` runs at most once.
    fn where_if_present<A>(self, args: A) -> Self
    where
        A: Into<WhereArgs>,
    {
        match presence::retain_present(args.into()) {
            Some(args) => self.apply_where(args),
            None => {
                debug!("no present values, filter skipped");
                self
            }
        }
    }
}

impl<T> WhereIfPresent for T where T: Where {}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value as JsonValue};

    use super::{Where, WhereIfPresent};
    use crate::{presence::WhereArgs, Conditional};

    #[derive(Debug, Default, PartialEq)]
    struct Relation {
        wheres: Vec<WhereArgs>,
    }

    impl Where for Relation {
        fn apply_where(mut self, args: WhereArgs) -> Self {
            self.wheres.push(args);
            self
        }
    }

    fn criteria(value: JsonValue) -> WhereArgs {
        match value {
            JsonValue::Object(map) => WhereArgs::Criteria(map),
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_template_with_all_values_present() {
        let relation = Relation::default().where_if_present(vec![
            json!("version BETWEEN ? AND ?"),
            json!(1),
            json!(2),
        ]);
        assert_eq!(
            relation.wheres,
            [WhereArgs::template("version BETWEEN ? AND ?", [1, 2])]
        );
    }

    #[test]
    fn test_template_with_missing_value() {
        let relation = Relation::default().where_if_present(vec![
            json!("version BETWEEN ? AND ?"),
            json!(null),
            json!(2),
        ]);
        assert_eq!(relation, Relation::default());
    }

    #[test]
    fn test_criteria_drop_null_values() {
        let relation = Relation::default()
            .where_if_present(json!({"key1": "", "key2": null, "key3": "value", "key4": 0}));
        assert_eq!(
            relation.wheres,
            [criteria(json!({"key1": "", "key3": "value", "key4": 0}))]
        );
    }

    #[test]
    fn test_criteria_all_null() {
        let relation = Relation::default().where_if_present(json!({"key1": null, "key2": null}));
        assert!(relation.wheres.is_empty());

        let relation = Relation::default().where_if_present(Map::new());
        assert!(relation.wheres.is_empty());
    }

    #[test]
    fn test_nested_criteria() {
        let relation = Relation::default()
            .where_if_present(json!({"a": {"b": 1, "c": null}, "d": {"e": null}}));
        assert_eq!(relation.wheres, [criteria(json!({"a": {"b": 1}}))]);
    }

    #[test]
    fn test_raw_args_pass_through() {
        let args = vec![json!({"a": null}), json!({"b": 2})];
        let relation = Relation::default().where_if_present(args.clone());
        assert_eq!(relation.wheres, [WhereArgs::Raw(args)]);
    }

    #[test]
    fn test_inside_conditional_chain() {
        let relation = Relation::default()
            .when(false)
            .apply(|r| r.where_if_present(json!({"a": 1})))
            .otherwise_with(|r| r.where_if_present(json!({"b": null, "c": true})))
            .into_inner();
        assert_eq!(relation.wheres, [criteria(json!({"c": true}))]);
    }
}
