use serde_json::Value as JsonValue;

pub trait Truthy {
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::truthy)
    }
}

impl Truthy for JsonValue {
    fn truthy(&self) -> bool {
        !matches!(self, JsonValue::Null | JsonValue::Bool(false))
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn truthy(&self) -> bool {
        (**self).truthy()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Truthy;

    #[test]
    fn test_falsy_values() {
        assert!(!false.truthy());
        assert!(!None::<bool>.truthy());
        assert!(!Some(false).truthy());
        assert!(!json!(null).truthy());
        assert!(!json!(false).truthy());
    }

    #[test]
    fn test_present_values_are_truthy() {
        assert!(true.truthy());
        assert!(Some(true).truthy());
        assert!(json!(0).truthy());
        assert!(json!("").truthy());
        assert!(json!({}).truthy());
        assert!((&json!([])).truthy());
    }
}
