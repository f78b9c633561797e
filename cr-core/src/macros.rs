pub use std::collections::BTreeMap;

// Generate labels or annotations for a k8s object, using klabel!("key1" => "value1", ...) syntax
#[macro_export]
macro_rules! klabel {
    ($($key:expr => $val:expr),+$(,)?) => {
        Some($crate::macros::BTreeMap::from([$(($key.to_string(), $val.to_string())),+]))
    };
}

pub use klabel;
