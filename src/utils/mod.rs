//! Miscellaneous utility structs and functions.

mod component;
mod errors;

#[doc(inline)]
pub use self::{
    component::{TaskHandle, WatchersStore},
    errors::{JsCaused, JsonParseError, PlaygroundError},
};

/// Creates new [`BTreeMap`] from a list of key-value pairs.
///
/// # Example
///
/// ```rust
/// # use medea_constraints_playground::btreemap;
/// let map = btreemap! {
///     "a" => 1,
///     "b" => 2,
/// };
/// assert_eq!(map["a"], 1);
/// assert_eq!(map["b"], 2);
/// assert_eq!(map.get("c"), None);
/// ```
///
/// [`BTreeMap`]: std::collections::BTreeMap
#[macro_export]
macro_rules! btreemap {
    ($($key:expr => $value:expr,)+) => { $crate::btreemap!($($key => $value),+) };
    ($($key:expr => $value:expr),*) => {
        {
            let mut _map = ::std::collections::BTreeMap::new();
            $(
                let _ = _map.insert($key, $value);
            )*
            _map
        }
    };
}
