use serde::Serialize;

use crate::error::Result;

/// Widest name in `names`, with a minimum of `min` and a maximum of `max`.
pub fn name_width<'a>(names: impl Iterator<Item = &'a str>, min: usize, max: usize) -> usize {
    names
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(min)
        .clamp(min, max)
}

/// Keep the tail of `s` so it fits in `width` columns.
pub fn truncate_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len <= width {
        return s.to_string();
    }
    if width <= 3 {
        return s.chars().skip(len - width).collect();
    }
    let tail: String = s.chars().skip(len - (width - 3)).collect();
    format!("...{tail}")
}

/// Print a horizontal separator of box-drawing chars.
pub fn separator(width: usize) -> String {
    "\u{2500}".repeat(width)
}

/// Serialize to pretty JSON and print to stdout.
pub fn print_json_stdout(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "report_helpers_test.rs"]
mod tests;
