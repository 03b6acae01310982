//! Convenience macros for error handling and propagation

/// Equivalent to `anyhow::bail!` but for `StarGraphError`
///
/// Allows early returns with custom error messages.
///
/// # Examples
///
/// ```rust
/// use stargraph_common::bail;
/// use stargraph_common::Result;
///
/// fn check_value(value: i32) -> Result<()> {
///     if value < 0 {
///         bail!("Value cannot be negative: {}", value);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::StarGraphError::new($msg))
    };
    ($err:expr $(,)?) => {
        return Err($crate::StarGraphError::new($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::StarGraphError::new(format!($fmt, $($arg)*)))
    };
}

/// Equivalent to `anyhow::ensure!` but for `StarGraphError`
///
/// Checks a condition and returns an error if it is false.
///
/// # Examples
///
/// ```rust
/// use stargraph_common::ensure;
/// use stargraph_common::Result;
///
/// fn validate_positive(value: i32) -> Result<()> {
///     ensure!(value > 0, "Value must be positive, got: {}", value);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($crate::StarGraphError::new($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($crate::StarGraphError::new($err));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::StarGraphError::new(format!($fmt, $($arg)*)));
        }
    };
}

/// Add context to an error while preserving the error chain
///
/// # Examples
///
/// ```rust
/// use stargraph_common::{with_context, Result};
///
/// fn read_settings() -> Result<String> {
///     std::fs::read_to_string("stargraph.yaml")
///         .map_err(|e| with_context!(e, "Failed to read configuration file"))
/// }
/// ```
#[macro_export]
macro_rules! with_context {
    ($err:expr, $msg:literal $(,)?) => {
        $crate::StarGraphError::with_source($msg, $err)
    };
    ($err:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::StarGraphError::with_source(format!($fmt, $($arg)*), $err)
    };
}
