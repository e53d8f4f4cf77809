use std::io::{self, BufRead};

use crate::term_print::*;

/// Source of operator answers.
pub trait Prompt {
    /// Shows `question` and returns the answer without its line ending.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Asks on the terminal and reads one line from stdin.
pub struct TermPrompt;

impl Prompt for TermPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        // The label keeps its trailing space, so "Destination:" renders as
        // "Destination: " with the cursor right after it.
        term_print(color::WHITE, question.trim_end(), "");

        let stdin = io::stdin();
        let mut answer = String::new();
        stdin.lock().read_line(&mut answer)?;
        Ok(strip_line_ending(&answer).to_owned())
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(|c| c == '\n' || c == '\r')
}

/// Fixed answer that remembers every question it was asked.
#[cfg(test)]
pub struct Answer {
    answer: &'static str,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl Answer {
    pub fn new(answer: &'static str) -> Answer {
        Answer {
            answer,
            asked: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompt for Answer {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_owned());
        Ok(self.answer.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings_are_stripped() {
        assert_eq!(strip_line_ending("dev\n"), "dev");
        assert_eq!(strip_line_ending("www\r\n"), "www");
        assert_eq!(strip_line_ending(" dev \n"), " dev ");
        assert_eq!(strip_line_ending(""), "");
    }
}
