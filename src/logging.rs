/// Conditional logging module for development builds
///
/// The `log!` macro provides informational console logging that is compiled out
/// in production (release) builds by default, and `log_warn!` does the same for
/// recoverable problems (bad imports, dangling reconcile groups).
///
/// Logging is enabled when either:
/// - Building in debug mode (`cfg(debug_assertions)`)
/// - The `console_logging` feature is explicitly enabled
///
/// Both macros only reach the browser console on `wasm32`; native builds (tests,
/// benches) compile them to nothing.
///
/// # Examples
///
/// ```rust
/// use metro_canvas::logging::log;
///
/// let dropped = 3;
/// log!("Dropped {} dangling lines", dropped);
/// ```
/// Conditionally log to console in development builds
#[macro_export]
macro_rules! log {
    ($($arg:expr),+ $(,)?) => {
        #[cfg(all(target_arch = "wasm32", any(debug_assertions, feature = "console_logging")))]
        {
            web_sys::console::log_1(&format!($($arg),+).into());
        }
        #[cfg(not(all(target_arch = "wasm32", any(debug_assertions, feature = "console_logging"))))]
        {
            let _ = ($(&$arg),+);
        }
    };
}

/// Conditionally emit a console warning in development builds
#[macro_export]
macro_rules! log_warn {
    ($($arg:expr),+ $(,)?) => {
        #[cfg(all(target_arch = "wasm32", any(debug_assertions, feature = "console_logging")))]
        {
            web_sys::console::warn_1(&format!($($arg),+).into());
        }
        #[cfg(not(all(target_arch = "wasm32", any(debug_assertions, feature = "console_logging"))))]
        {
            let _ = ($(&$arg),+);
        }
    };
}

pub use crate::{log, log_warn};
