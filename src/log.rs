//! Utilities for logging diagnostic messages from the library.

use once_cell::sync::Lazy;

#[macro_export]
macro_rules! a11y_log {
    (
        $($arg:tt)+
    ) => {
        if $crate::log::log_enabled() {
            eprintln!("{}", format_args!($($arg)+));
        }
    };
}

pub fn log_enabled() -> bool {
    static ENABLED: Lazy<bool> = Lazy::new(|| ::std::env::var_os("A11Y_ANALYZER_LOG").is_some());

    *ENABLED
}
