//! Terminal prompts

use owo_colors::OwoColorize;
use pantry_common::models::Classification;
use pantry_common::prompt::{Confirmation, Prompter};
use std::io::{self, BufRead, Write};

/// Asks on stdout, reads answers from stdin.
/// End of input or a read error counts as "no".
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_answer(question: &str) -> Option<String> {
        print!("{} ", question);
        io::stdout().flush().ok()?;
        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim().to_string()),
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// `None` means cancel; unrecognised input asks again
pub fn parse_classification(answer: &str, suggested: Classification) -> Option<Option<Classification>> {
    match answer.to_lowercase().as_str() {
        "" => Some(Some(suggested)),
        "i" | "ingredient" => Some(Some(Classification::Ingredient)),
        "s" | "seasoning" => Some(Some(Classification::Seasoning)),
        "q" | "quit" | "cancel" => Some(None),
        _ => None,
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, request: &Confirmation) -> bool {
        println!();
        println!("{} {}", "[CONFIRM]".yellow(), request.message());
        let confirmed = Self::read_answer("[y/N]").map(|a| is_yes(&a)).unwrap_or(false);
        if !confirmed {
            println!("Cancelled. No changes were made.");
        }
        confirmed
    }

    fn choose_classification(&self, name: &str, suggested: Classification) -> Option<Classification> {
        let question = format!(
            "Classify \"{}\": [i]ngredient / [s]easoning / [q]uit (default {}):",
            name, suggested
        );
        loop {
            let answer = Self::read_answer(&question)?;
            if let Some(choice) = parse_classification(&answer, suggested) {
                return choice;
            }
            println!("Please answer i, s or q.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_answers() {
        assert!(is_yes("y"));
        assert!(is_yes("YES"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_classification_answers() {
        let s = Classification::Ingredient;
        assert_eq!(parse_classification("", s), Some(Some(Classification::Ingredient)));
        assert_eq!(parse_classification("S", s), Some(Some(Classification::Seasoning)));
        assert_eq!(parse_classification("q", s), Some(None));
        assert_eq!(parse_classification("x", s), None);
    }
}
