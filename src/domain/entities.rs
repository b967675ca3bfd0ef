//! Domain entities: small value types shared by the tree and the game

use std::fmt;

/// A player's reply to a yes/no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// Lenient reading of a reply line.
    ///
    /// Only a first non-blank `y`/`Y` is affirmative. Anything else, including an empty
    /// line or no line at all, counts as no; there is no third outcome.
    pub fn parse(line: Option<&str>) -> Self {
        match line.and_then(|l| l.trim_start().chars().next()) {
            Some('y') | Some('Y') => Answer::Yes,
            _ => Answer::No,
        }
    }

    pub fn is_yes(self) -> bool {
        self == Answer::Yes
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Yes => write!(f, "yes"),
            Answer::No => write!(f, "no"),
        }
    }
}

/// Result of one guessing round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The tree guessed the player's animal
    Guessed { animal: String },
    /// The guess was wrong and the tree learned a new question
    Learned {
        animal: String,
        question: String,
        previous: String,
    },
}

impl RoundOutcome {
    pub fn tree_changed(&self) -> bool {
        matches!(self, RoundOutcome::Learned { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_missing_line_when_parsing_then_no() {
        assert_eq!(Answer::parse(None), Answer::No);
    }

    #[test]
    fn given_indented_yes_when_parsing_then_yes() {
        assert_eq!(Answer::parse(Some("   yes please")), Answer::Yes);
    }
}
