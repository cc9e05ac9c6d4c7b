//! Terminal logging with colored module prefixes.
//!
//! ```ignore
//! log!("index"; "recorded {} hashes", count);
//! log!("warn"; "{} has no tags", title);
//! ```

use std::io::{Write, stderr, stdout};

use colored::{ColoredString, Colorize};

/// Log a message with a colored module prefix.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::log::log($module, &format!($($arg)*))
    }};
}

/// Write `[module] message`. Warnings and errors go to stderr.
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);
    if is_diagnostic(&module_lower) {
        let mut stream = stderr().lock();
        writeln!(stream, "{prefix} {message}").ok();
        stream.flush().ok();
    } else {
        let mut stream = stdout().lock();
        writeln!(stream, "{prefix} {message}").ok();
        stream.flush().ok();
    }
}

fn is_diagnostic(module_lower: &str) -> bool {
    matches!(module_lower, "warn" | "error")
}

#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_yellow().bold(),
        "write" => prefix.bright_green().bold(),
        _ => prefix.bright_blue().bold(),
    }
}
