/// Macro for prefixed status logging to stderr.
///
/// Prints when stderr is a terminal or when running inside an Actions job,
/// where stderr is the step log.
///
/// Usage:
/// ```ignore
/// log_status!("install", "{}", command);
/// log_status!("runtime", "Using Python {}", version);
/// ```
#[macro_export]
macro_rules! log_status {
    ($prefix:expr, $($arg:tt)*) => {
        if ::std::io::IsTerminal::is_terminal(&::std::io::stderr())
            || ::std::env::var($crate::workflow::ACTIONS_ENV).is_ok_and(|v| v == "true")
        {
            eprintln!(concat!("[", $prefix, "] {}"), format_args!($($arg)*));
        }
    };
}

pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `releaser::script` instead of `releaser::core::script`
pub use self::core::*;
pub use self::utils::*;
