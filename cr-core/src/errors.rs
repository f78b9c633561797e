pub use std::backtrace::Backtrace;

pub use anyhow::{
    anyhow,
    bail,
    ensure,
};
pub use paste::paste;
pub use regex::{
    Regex,
    RegexBuilder,
};
pub use thiserror::Error;

pub type EmptyResult = anyhow::Result<()>;

pub const CARGO_REGISTRY_DIR: &str = "/.cargo/registry/";
pub const RUSTC_DIR: &str = "/rustc/";
pub const GLIBC: &str = "glibc";

// Declares a thiserror enum and, for each variant, a snake_case constructor that wraps the
// variant in an anyhow::Error, so call sites can write `bail!(FooError::some_thing(&x))`.
#[macro_export]
macro_rules! err_impl {
    (@hidden $errtype:ident, $item:ident, String) => {
        paste! {
            pub fn [<$item:snake>](in_: &str) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.into())}
            }
        }
    };

    (@hidden $errtype:ident, $item:ident, $($dtype:tt)::+) => {
        paste! {
            pub fn [<$item:snake>](in_: &$($dtype)::+) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.clone())}
            }
        }
    };

    ($errtype:ident,
        $(#[$errinfo:meta] $item:ident($($dtype:tt)::+),)+
    ) => {
        #[derive(Debug, Error)]
        pub enum $errtype {
            $(#[$errinfo] $item($($dtype)::+)),+
        }

        impl $errtype {
            $(err_impl! {@hidden $errtype, $item, $($dtype)::+})+
        }
    };
}

// Logs an anyhow::Error along with the frames of its backtrace that point at our own code; the
// tokio runtime and dependency frames are collapsed into a "skipped" marker.  This is not cheap,
// so it should only be used on failure paths.
#[macro_export]
macro_rules! skerr {
    (@hidden $err:ident, $msg:literal, $($args:expr),*) => {
        let bt = $err.backtrace().to_string();
        let re = RegexBuilder::new(r"^\s+\d+(?s:.*?)(\s+at\s+.*:\d+)$")
            .multi_line(true)
            .build()
            .expect("backtrace regex is valid");
        let mut skipped_frames = 0;
        let mut filtered_bt = String::new();
        for frame in re.find_iter(&bt).map(|m| m.as_str()) {
            if frame.contains(CARGO_REGISTRY_DIR) || frame.contains(RUSTC_DIR) || frame.contains(GLIBC) {
                skipped_frames += 1;
                continue;
            }
            if skipped_frames > 0 {
                filtered_bt += &format!("      -- <skipped {skipped_frames} frame(s)> --\n");
                skipped_frames = 0;
            }
            filtered_bt += &format!("{frame}\n");
        }
        if skipped_frames > 0 {
            filtered_bt += &format!("      -- <skipped {skipped_frames} frame(s)> --");
        }
        error!(concat!($msg, "\n\n{}\n\nPartial Stack Trace:\n\n{}\n\n") $(, $args)*, $err, filtered_bt);
    };

    ($err:ident, $msg:literal) => {
        skerr! {@hidden $err, $msg, };
    };

    ($err:ident, $msg:literal, $($args:expr),*) => {
        skerr! {@hidden $err, $msg, $($args),*};
    };
}

pub use {
    err_impl,
    skerr,
};
