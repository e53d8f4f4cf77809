use std::io::{self, Write};

pub use term::color;

/// Writes a bold coloured status label followed by plain text.
///
/// Falls back to plain stdout when no terminfo entry is available, which is
/// the case under most CI runners and when output is piped.
fn term_print_(color: color::Color, status_text: &str, text: &str, newline: bool) {
    if let Some(mut t) = term::stdout() {
        let _ = t.attr(term::Attr::Bold);
        let _ = t.fg(color);
        let _ = write!(t, "{} ", status_text);
        let _ = t.reset();
        if newline {
            let _ = writeln!(t, "{}", text);
        } else {
            let _ = write!(t, "{}", text);
        }
        let _ = t.flush();
        return;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if newline {
        let _ = writeln!(out, "{} {}", status_text, text);
    } else {
        let _ = write!(out, "{} {}", status_text, text);
    }
    let _ = out.flush();
}

/// Prints without a trailing newline, for prompts.
pub fn term_print(color: color::Color, status_text: &str, text: &str) {
    term_print_(color, status_text, text, false);
}

pub fn term_println(color: color::Color, status_text: &str, text: &str) {
    term_print_(color, status_text, text, true);
}

pub fn term_panic(text: &str) {
    term_println(color::BRIGHT_RED, "Failure:", text);
}
