//! Results that distinguish "served normally" from "served via fallback".

use crate::error::DataError;

/// A value that was produced either by the intended store or, after that
/// store failed, by a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Served<T> {
    /// The intended store handled the operation.
    Normal(T),
    /// The intended store failed with `cause`; `value` came from the fallback.
    Degraded { value: T, cause: DataError },
}

impl<T> Served<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Normal(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Normal(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// The failure that caused the fallback, if any.
    pub fn cause(&self) -> Option<&DataError> {
        match self {
            Self::Normal(_) => None,
            Self::Degraded { cause, .. } => Some(cause),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Served<U> {
        match self {
            Self::Normal(value) => Served::Normal(f(value)),
            Self::Degraded { value, cause } => Served::Degraded {
                value: f(value),
                cause,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_keeps_cause_through_map() {
        let served = Served::Degraded {
            value: 2,
            cause: DataError::LocalStorage("disk full".into()),
        };
        let mapped = served.map(|v| v * 10);
        assert!(mapped.is_degraded());
        assert_eq!(*mapped.value(), 20);
        assert!(mapped.cause().is_some());
    }

    #[test]
    fn normal_has_no_cause() {
        let served = Served::Normal("ok");
        assert!(!served.is_degraded());
        assert!(served.cause().is_none());
        assert_eq!(served.into_value(), "ok");
    }
}
