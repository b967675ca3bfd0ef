//! Tree persistence service
//!
//! Loads the tree once at session start and writes it back once at session end.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{Codec, CodecError, KnowledgeTree};
use crate::infrastructure::traits::FileSystem;

/// Service for reading and writing the tree file.
pub struct TreeStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    codec: Codec,
    seed: String,
}

impl TreeStore {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        path: impl Into<PathBuf>,
        codec: Codec,
        seed: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            path: path.into(),
            codec,
            seed: seed.into(),
        }
    }

    pub fn from_settings(fs: Arc<dyn FileSystem>, settings: &Settings) -> Self {
        Self::new(
            fs,
            settings.tree_file.clone(),
            Codec::new(settings.max_line_len),
            settings.seed_animal.clone(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the tree, or starts a fresh one from the seed if the file does not exist.
    ///
    /// A file that exists but cannot be decoded is an error; it is never replaced by a
    /// fresh tree.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> ApplicationResult<KnowledgeTree> {
        let bytes = match self.fs.read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "no tree at {}, starting with {:?}",
                    self.path.display(),
                    self.seed
                );
                return Ok(KnowledgeTree::with_seed(self.seed.as_str())?);
            }
            Err(e) => return Err(self.load_err(CodecError::Read(e))),
        };

        let tree = self
            .codec
            .decode_bytes(&bytes)
            .map_err(|e| self.load_err(e))?;
        debug!("loaded tree: {}", tree);
        Ok(tree)
    }

    /// Writes the whole tree, replacing the previous file atomically.
    #[instrument(level = "debug", skip(self, tree), fields(path = %self.path.display()))]
    pub fn save(&self, tree: &KnowledgeTree) -> ApplicationResult<()> {
        let bytes = self
            .codec
            .encode_to_vec(tree)
            .map_err(|e| self.save_err(e))?;
        self.fs
            .ensure_parent(&self.path)
            .and_then(|()| self.fs.write_atomic(&self.path, &bytes))
            .map_err(|e| self.save_err(CodecError::Write(e)))?;
        info!("saved tree ({}) to {}", tree, self.path.display());
        Ok(())
    }

    fn load_err(&self, source: CodecError) -> ApplicationError {
        ApplicationError::Load {
            path: self.path.clone(),
            source,
        }
    }

    fn save_err(&self, source: CodecError) -> ApplicationError {
        ApplicationError::Save {
            path: self.path.clone(),
            source,
        }
    }
}
