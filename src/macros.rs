/// Builds a [`Value`](crate::Value) from literal-like syntax.
///
/// Object entries are pushed in the order written, so repeated keys are
/// kept, the same as a parse with the default options.
///
/// # Examples
///
/// ```rust
/// use nosj::nosj;
///
/// let value = nosj!({
///     "name": "Alice",
///     "tags": ["a", "b"],
///     "extra": null
/// });
/// assert_eq!(value.to_string(), r#"{"name":"Alice","tags":["a","b"],"extra":null}"#);
/// ```
#[macro_export]
macro_rules! nosj {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::nosj!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.push($key.to_string(), $crate::nosj!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Any other serializable expression
    ($other:expr) => {{
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Map, Value};

    #[test]
    fn test_nosj_macro_primitives() {
        assert_eq!(nosj!(null), Value::Null);
        assert_eq!(nosj!(true), Value::Bool(true));
        assert_eq!(nosj!(false), Value::Bool(false));
        assert_eq!(nosj!(42).as_i64(), Some(42));
        assert_eq!(nosj!(3.5).as_f64(), Some(3.5));
        assert_eq!(nosj!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_nosj_macro_arrays() {
        assert_eq!(nosj!([]), Value::Array(vec![]));
        assert_eq!(nosj!([1, [true], {}]).to_string(), "[1,[true],{}]");
    }

    #[test]
    fn test_nosj_macro_objects() {
        assert_eq!(nosj!({}), Value::Object(Map::new()));

        let obj = nosj!({
            "name": "Alice",
            "age": 30,
            "name": "Bob"
        });
        let map = obj.as_object().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("name").and_then(Value::as_str), Some("Bob"));
        assert_eq!(map.get("age").and_then(Value::as_i64), Some(30));
    }
}
