//! User-facing progress lines: `[LOG]` on stdout, `[ERROR]` on stderr.

use std::fmt::Display;

pub fn log(message: impl Display) {
    println!("[LOG] {message}");
}

pub fn error(message: impl Display) {
    eprintln!("[ERROR] {message}");
}
