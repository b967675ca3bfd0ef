//! Session loop: play rounds until the player stops, then save once.

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Answer, KnowledgeTree, RoundOutcome};
use crate::infrastructure::traits::Prompter;

use super::game::GameService;
use super::store::TreeStore;

pub const PLAY_AGAIN_PROMPT: &str = "Do you want to play again?";

/// What happened during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub rounds: usize,
    pub guessed: usize,
    pub learned: usize,
    /// Input ended in the middle of a round
    pub interrupted: bool,
}

/// Service running a whole session against one tree.
pub struct SessionService {
    game: GameService,
    store: TreeStore,
}

impl SessionService {
    pub fn new(game: GameService, store: TreeStore) -> Self {
        Self { game, store }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    /// Plays rounds until the player declines another one, then saves the tree.
    ///
    /// `banner` is shown before every round. Input ending mid-round ends the session
    /// normally; any other failure is returned after the tree has been saved.
    #[instrument(level = "debug", skip_all)]
    pub fn run(
        &self,
        tree: &mut KnowledgeTree,
        prompter: &mut dyn Prompter,
        banner: Option<&str>,
    ) -> ApplicationResult<SessionSummary> {
        let played = self.play(tree, prompter, banner);
        self.store.save(tree)?;
        played
    }

    fn play(
        &self,
        tree: &mut KnowledgeTree,
        prompter: &mut dyn Prompter,
        banner: Option<&str>,
    ) -> ApplicationResult<SessionSummary> {
        let mut summary = SessionSummary::default();
        loop {
            if let Some(banner) = banner {
                prompter.say(banner).with_context("write banner")?;
            }
            match self.game.play_round(tree, prompter) {
                Ok(RoundOutcome::Guessed { .. }) => {
                    prompter
                        .say("I guessed your animal correctly! Thanks for playing!")
                        .with_context("write prompt")?;
                    summary.guessed += 1;
                }
                Ok(RoundOutcome::Learned { .. }) => summary.learned += 1,
                Err(ApplicationError::InputClosed) => {
                    warn!("input closed during round {}", summary.rounds + 1);
                    summary.interrupted = true;
                    return Ok(summary);
                }
                Err(e) => return Err(e),
            }
            summary.rounds += 1;

            let reply = prompter
                .ask(PLAY_AGAIN_PROMPT)
                .with_context("read answer")?;
            if !Answer::parse(reply.as_deref()).is_yes() {
                debug!("session over after {} rounds", summary.rounds);
                return Ok(summary);
            }
        }
    }
}
