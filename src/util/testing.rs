//! Shared test helpers: logging setup and a scripted player.

use std::collections::VecDeque;
use std::io;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::traits::Prompter;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        eprintln!("Error: Failed to set up logging: {}", e);
    }
}

/// Prompter that replays canned replies and records everything shown.
///
/// Once the replies run out, every further `ask` reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    replies: VecDeque<String>,
    prompts: Vec<String>,
    messages: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Prompts in the order they were asked.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Messages passed to `say`, in order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.replies.pop_front())
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        self.messages.push(message.to_string());
        Ok(())
    }
}
