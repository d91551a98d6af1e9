//! Run-time checks on values parsed from tool output.

use engkit_error::{EngError, EngResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Values that can be "null": empty, absent, zero or false.
pub trait NullCheck {
    fn is_null(&self) -> bool;
}

impl NullCheck for str {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl NullCheck for String {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl<T> NullCheck for [T] {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl<T> NullCheck for Vec<T> {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> NullCheck for HashMap<K, V, S> {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> NullCheck for BTreeMap<K, V> {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl<T: NullCheck> NullCheck for Option<T> {
    fn is_null(&self) -> bool {
        self.as_ref().map_or(true, NullCheck::is_null)
    }
}

impl NullCheck for bool {
    fn is_null(&self) -> bool {
        !*self
    }
}

impl<T: NullCheck + ?Sized> NullCheck for &T {
    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

macro_rules! numeric_null_check {
    ($($t:ty),*) => {
        $(impl NullCheck for $t {
            fn is_null(&self) -> bool {
                *self == <$t>::default()
            }
        })*
    };
}

numeric_null_check!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

/// Fail with `EngError::NullValue` when `value` is null, so parsing mistakes
/// surface here instead of cascading.
pub fn check_null<T: NullCheck + ?Sized>(value: &T, what: &str) -> EngResult<()> {
    if value.is_null() {
        log::error!("Null Value Error");
        log::debug!("{}", what);
        return Err(EngError::NullValue(what.to_string()));
    }
    Ok(())
}

pub fn check_path(path: &Path) -> EngResult<()> {
    if !path.exists() {
        log::error!("Path Not Exist Error");
        log::debug!("path: {}", path.display());
        return Err(EngError::PathNotExist(path.to_path_buf()));
    }
    Ok(())
}

/// Compact single-line rendering of a value for debug detail lines.
pub fn get_debug<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| format!("<unserializable: {}>", err))
}
