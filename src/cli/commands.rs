//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::SessionSummary;
use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{TreeDisplay, MAX_DRAWN_DEPTH};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, TerminalPrompter};
use crate::infrastructure::InfraError;

pub const BANNER: &str = "\
Welcome to the Animal Guessing Game!
I will ask you a series of questions to which you will answer yes or no.
I am counting on you to help me expand my series of questions if I get it wrong.
Let's begin!
";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let mut settings = Settings::load()?;
    if let Some(file) = &cli.file {
        settings = settings.with_tree_file(file);
    }
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        None => cmd_play(&container, false),
        Some(Commands::Play { quiet }) => cmd_play(&container, *quiet),
        Some(Commands::Show { inline }) => cmd_show(&container, *inline),
        Some(Commands::Stats) => cmd_stats(&container),
        Some(Commands::Config { command }) => cmd_config(&container, command),
        Some(Commands::Completion { .. }) => Ok(()),
    }
}

#[instrument(skip(container))]
fn cmd_play(container: &ServiceContainer, quiet: bool) -> CliResult<()> {
    let session = container.session();
    let mut tree = session.store().load()?;
    let mut prompter = TerminalPrompter::stdio();

    let banner = if quiet { None } else { Some(BANNER) };
    let summary = session.run(&mut tree, &mut prompter, banner)?;

    report(&summary);
    output::success(&format!(
        "tree written to {}",
        session.store().path().display()
    ));
    Ok(())
}

fn report(summary: &SessionSummary) {
    if summary.interrupted {
        output::warning("input ended, the unfinished round was discarded");
    }
    output::detail(&format!(
        "{} rounds played, {} guessed, {} learned",
        summary.rounds, summary.guessed, summary.learned
    ));
}

#[instrument(skip(container))]
fn cmd_show(container: &ServiceContainer, inline: bool) -> CliResult<()> {
    let tree = container.store().load()?;
    if inline {
        output::info(&tree.to_inline());
    } else {
        if tree.depth() > MAX_DRAWN_DEPTH {
            output::warning(&format!(
                "tree is {} levels deep, only {} are drawn; use --inline to see all of it",
                tree.depth(),
                MAX_DRAWN_DEPTH
            ));
        }
        output::info(&tree.to_termtree());
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_stats(container: &ServiceContainer) -> CliResult<()> {
    let store = container.store();
    let tree = store.load()?;
    output::header(&store.path().display());
    output::action("nodes", &tree.len());
    output::action("animals", &tree.animals().len());
    output::action("questions", &tree.questions().len());
    output::action("depth", &tree.depth());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("config", &path.display()),
                None => output::warning("no config directory on this system"),
            }
            output::action("tree", &container.settings.tree_file.display());
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path()
                .ok_or_else(|| CliError::Usage("no config directory on this system".into()))?;
            write_config_template(container.fs.as_ref(), &path, *force)?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}

/// Writes the default settings to `path`, refusing to replace a file unless `force`.
fn write_config_template(fs: &dyn FileSystem, path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }
    let template = Settings::default().to_toml()?;
    fs.ensure_parent(path)
        .with_path_context("create directory for", path)?;
    fs.write_atomic(path, template.as_bytes())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;

    #[test]
    fn given_no_config_when_writing_template_then_defaults_parse_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("guesstree").join("guesstree.toml");

        write_config_template(&RealFileSystem, &path, false).unwrap();

        let written: Settings = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, Settings::default());
    }

    #[test]
    fn given_existing_config_when_writing_template_without_force_then_kept() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("guesstree.toml");
        std::fs::write(&path, "seed_animal = \"owl\"\n").unwrap();

        let result = write_config_template(&RealFileSystem, &path, false);

        assert!(matches!(result, Err(CliError::Usage(_))));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "seed_animal = \"owl\"\n"
        );
        write_config_template(&RealFileSystem, &path, true).unwrap();
        assert_ne!(
            std::fs::read_to_string(&path).unwrap(),
            "seed_animal = \"owl\"\n"
        );
    }

    #[test]
    fn given_failing_filesystem_when_writing_template_then_io_error() {
        struct NoWrites;

        impl FileSystem for NoWrites {
            fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
                std::fs::read(path)
            }

            fn ensure_parent(&self, _path: &Path) -> io::Result<()> {
                Ok(())
            }

            fn write_atomic(&self, _path: &Path, _content: &[u8]) -> io::Result<()> {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            }
        }

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("guesstree.toml");

        let result = write_config_template(&NoWrites, &path, false);

        assert!(matches!(result, Err(CliError::Infra(InfraError::Io { .. }))));
        assert!(!path.exists());
    }
}
