//! Guessing game engine
//!
//! One round walks the tree from the root, one prompt per step:
//!
//! ```text
//! Asking(q)   --yes--> Asking/Guessing(q.yes)
//!             --no---> Asking/Guessing(q.no)
//! Guessing(a) --yes--> Won
//!             --no---> Learning(a) --> Done   (tree grows at a)
//! ```
//!
//! Replies to yes/no prompts are read leniently: anything that is not a `y` answer is
//! a no, and nothing is asked twice. Free-text replies (the new animal and the question
//! telling it apart) are trimmed and asked again while blank or too long to store.

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    Answer, DomainError, KnowledgeTree, NodeId, RoundOutcome, DEFAULT_MAX_LINE_LEN,
};
use crate::infrastructure::traits::Prompter;

/// Where a round currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// About to ask a question node
    Asking(NodeId),
    /// About to guess an animal leaf
    Guessing(NodeId),
    /// The guess was wrong; about to learn at this leaf
    Learning(NodeId),
    /// The guess was right
    Won,
    /// A new question was learned
    Done,
}

impl RoundState {
    /// State for arriving at `id`.
    fn enter(tree: &KnowledgeTree, id: NodeId) -> Self {
        match tree.node(id) {
            Some(node) if node.is_question() => RoundState::Asking(id),
            _ => RoundState::Guessing(id),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RoundState::Won | RoundState::Done)
    }
}

/// A single traversal of the tree, advanced one prompt at a time.
pub struct Round<'t> {
    tree: &'t mut KnowledgeTree,
    state: RoundState,
    outcome: Option<RoundOutcome>,
    max_text_len: usize,
}

impl<'t> Round<'t> {
    pub fn new(tree: &'t mut KnowledgeTree, max_text_len: usize) -> Self {
        let state = RoundState::enter(tree, tree.root());
        Self {
            tree,
            state,
            outcome: None,
            max_text_len,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    /// Performs the current state's prompt and moves to the next state.
    /// Terminal states stay where they are.
    #[instrument(level = "trace", skip_all)]
    pub fn step(&mut self, prompter: &mut dyn Prompter) -> ApplicationResult<RoundState> {
        let current = self.state;
        self.state = match current {
            RoundState::Asking(id) => {
                let node = self.tree.node(id).ok_or(DomainError::NodeNotFound(id))?;
                let reply = prompter.ask(node.text()).with_context("read answer")?;
                let answer = Answer::parse(reply.as_deref());
                debug!("{:?} -> {}", node.text(), answer);
                match node.follow(answer) {
                    Some(child) => RoundState::enter(self.tree, child),
                    None => RoundState::Guessing(id),
                }
            }
            RoundState::Guessing(id) => {
                let node = self.tree.node(id).ok_or(DomainError::NodeNotFound(id))?;
                let animal = node.text().to_string();
                let reply = prompter
                    .ask(&format!("Is it a {}?", animal))
                    .with_context("read answer")?;
                if Answer::parse(reply.as_deref()).is_yes() {
                    self.outcome = Some(RoundOutcome::Guessed { animal });
                    RoundState::Won
                } else {
                    RoundState::Learning(id)
                }
            }
            RoundState::Learning(id) => {
                self.learn(id, prompter)?;
                RoundState::Done
            }
            terminal @ (RoundState::Won | RoundState::Done) => terminal,
        };
        Ok(self.state)
    }

    fn learn(&mut self, id: NodeId, prompter: &mut dyn Prompter) -> ApplicationResult<()> {
        let previous = self
            .tree
            .node(id)
            .ok_or(DomainError::NodeNotFound(id))?
            .text()
            .to_string();

        prompter
            .say("You win, I couldn't guess your animal.")
            .with_context("write prompt")?;
        let animal = self.ask_text(prompter, "What was your animal?")?;
        let question = self.ask_text(
            prompter,
            &format!(
                "What is a yes/no question that is true of {} but not of {}?",
                animal, previous
            ),
        )?;

        self.tree.grow(id, question.as_str(), animal.as_str())?;
        prompter.say("Okay, got it!").with_context("write prompt")?;
        self.outcome = Some(RoundOutcome::Learned {
            animal,
            question,
            previous,
        });
        Ok(())
    }

    fn ask_text(&self, prompter: &mut dyn Prompter, prompt: &str) -> ApplicationResult<String> {
        loop {
            let Some(reply) = prompter.ask(prompt).with_context("read answer")? else {
                return Err(ApplicationError::InputClosed);
            };
            let reply = reply.trim();
            if reply.is_empty() {
                prompter
                    .say("Please type an answer.")
                    .with_context("write prompt")?;
            } else if reply.len() > self.max_text_len {
                prompter
                    .say(&format!(
                        "Please keep it under {} characters.",
                        self.max_text_len
                    ))
                    .with_context("write prompt")?;
            } else {
                return Ok(reply.to_string());
            }
        }
    }

    /// Steps until a terminal state and returns what happened.
    pub fn run(mut self, prompter: &mut dyn Prompter) -> ApplicationResult<RoundOutcome> {
        while !self.state.is_terminal() {
            self.step(prompter)?;
        }
        self.outcome.ok_or(ApplicationError::InputClosed)
    }
}

/// Service for playing rounds against a tree.
#[derive(Debug, Clone)]
pub struct GameService {
    max_text_len: usize,
}

impl Default for GameService {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl GameService {
    /// `max_text_len` bounds learned names and questions so the tree stays storable.
    pub fn new(max_text_len: usize) -> Self {
        Self { max_text_len }
    }

    pub fn round<'t>(&self, tree: &'t mut KnowledgeTree) -> Round<'t> {
        Round::new(tree, self.max_text_len)
    }

    /// Plays exactly one traversal, growing the tree if the final guess was wrong.
    #[instrument(level = "debug", skip_all)]
    pub fn play_round(
        &self,
        tree: &mut KnowledgeTree,
        prompter: &mut dyn Prompter,
    ) -> ApplicationResult<RoundOutcome> {
        let outcome = self.round(tree).run(prompter)?;
        match &outcome {
            RoundOutcome::Guessed { animal } => info!("guessed {:?}", animal),
            RoundOutcome::Learned {
                animal, previous, ..
            } => info!(
                "learned {:?} apart from {:?}, tree has {} nodes",
                animal,
                previous,
                tree.len()
            ),
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::ScriptedPrompter;

    #[test]
    fn given_seed_tree_when_round_starts_then_guessing_root() {
        let mut tree = KnowledgeTree::default();
        let root = tree.root();

        let round = GameService::default().round(&mut tree);

        assert_eq!(round.state(), RoundState::Guessing(root));
    }

    #[test]
    fn given_terminal_state_when_stepping_then_no_prompt() {
        let mut tree = KnowledgeTree::default();
        let mut prompter = ScriptedPrompter::new(["yes"]);
        let mut round = GameService::default().round(&mut tree);

        assert_eq!(round.step(&mut prompter).unwrap(), RoundState::Won);
        assert_eq!(round.step(&mut prompter).unwrap(), RoundState::Won);
        assert_eq!(prompter.prompts().len(), 1);
    }

    #[test]
    fn given_overlong_animal_when_learning_then_asked_again() {
        let mut tree = KnowledgeTree::default();
        let mut prompter =
            ScriptedPrompter::new(["no", "hippopotamus", "dog", "Barks?"]);

        let outcome = GameService::new(8)
            .play_round(&mut tree, &mut prompter)
            .unwrap();

        assert!(matches!(
            outcome,
            RoundOutcome::Learned { ref animal, ref question, .. }
                if animal == "dog" && question == "Barks?"
        ));
        assert!(prompter
            .messages()
            .iter()
            .any(|m| m.contains("under 8 characters")));
    }
}
