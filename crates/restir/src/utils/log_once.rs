//! Logging that fires at most once per call site.
//!
//! Per-pixel and per-photon code paths run millions of times a frame. A degenerate material id or
//! an expired light handle is worth one line in the log, not one line per sample.

#[macro_export]
macro_rules! log_once {
    (target: $target:expr, $lvl:expr, $($arg:tt)+) => {{
        static ONCE: std::sync::Once = std::sync::Once::new();
        ONCE.call_once(|| {
            if log::log_enabled!(target: $target, $lvl) {
                log::log!(target: $target, $lvl, $($arg)+);
            }
        });
    }};
    ($lvl:expr, $($arg:tt)+) => ($crate::log_once!(target: module_path!(), $lvl, $($arg)+));
}

macro_rules! once_at_level {
    (@inner $macro: ident, $lvl: expr, $d:tt) => {
        #[macro_export]
        macro_rules! $macro {
            (target: $d target:expr, $d($d arg:tt)*) => (
                $crate::log_once!(target: $d target, $lvl, $d ($d arg)*)
            );
            ($d ($d arg:tt)*) => (
                $crate::log_once!($lvl, $d ($d arg)*)
            );
        }

        pub use $macro;
    };
    ($macro_n: ident, $lvl: expr) => {
        once_at_level!(@inner $macro_n, $lvl, $);
    };
}

once_at_level!(error_once, log::Level::Error);
once_at_level!(warn_once, log::Level::Warn);
once_at_level!(info_once, log::Level::Info);
