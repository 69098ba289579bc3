//! Absent Value Module
//!
//! Defines what counts as a missing key or value for the cache contract.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::{CacheError, Result};

// == Absent ==
/// A type that has a null-equivalent state.
///
/// Caches refuse to store absent keys or values. `Option` is absent when
/// `None`, string types when empty. Numeric, `char` and `bool` values are
/// never absent.
pub trait Absent {
    fn is_absent(&self) -> bool;
}

impl<T> Absent for Option<T> {
    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl Absent for String {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Absent for &str {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Absent for Box<str> {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Absent for Arc<str> {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Absent for Rc<str> {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! never_absent {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Absent for $ty {
                #[inline]
                fn is_absent(&self) -> bool {
                    false
                }
            }
        )*
    };
}

never_absent!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char, bool);

// == Argument Checks ==
pub(crate) fn check_key<K: Absent>(key: &K) -> Result<()> {
    if key.is_absent() {
        return Err(CacheError::InvalidArgument(
            "Key cannot be absent".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_value<V: Absent>(value: &V) -> Result<()> {
    if value.is_absent() {
        return Err(CacheError::InvalidArgument(
            "Value cannot be absent".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_absent_when_none() {
        assert!(None::<u32>.is_absent());
        assert!(!Some(0u32).is_absent());
    }

    #[test]
    fn test_strings_absent_when_empty() {
        assert!(String::new().is_absent());
        assert!("".is_absent());
        assert!(!"key".is_absent());
        assert!(Arc::<str>::from("").is_absent());
        assert!(!Box::<str>::from("v").is_absent());
    }

    #[test]
    fn test_numbers_never_absent() {
        assert!(!0u64.is_absent());
        assert!(!(-1i32).is_absent());
        assert!(!false.is_absent());
    }

    #[test]
    fn test_check_key_and_value() {
        assert!(check_key(&"k").is_ok());
        assert!(matches!(
            check_key(&""),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(matches!(
            check_value(&None::<String>),
            Err(CacheError::InvalidArgument(_))
        ));
    }
}
