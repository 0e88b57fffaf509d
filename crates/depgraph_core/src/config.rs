use clap::Parser;
use log::{debug, info, trace};
use path_clean::clean;
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::constants::{DEFAULT_ALIAS, DEFAULT_SRC_DIR};
use crate::error::{AnalyzerError, Result};

#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Root directory of the project (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Source directory, relative to the root
    #[arg(long, default_value = DEFAULT_SRC_DIR)]
    pub src_dir: PathBuf,

    /// Import prefix that resolves against the source directory
    #[arg(long, default_value = DEFAULT_ALIAS)]
    pub alias: String,
}

impl Config {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            src_dir: PathBuf::from(DEFAULT_SRC_DIR),
            alias: DEFAULT_ALIAS.to_string(),
        }
    }

    /// Resolve and validate the root and source directories.
    ///
    /// Must run before any discovery: every later stage assumes a canonical
    /// root so that project-relative identities are stable.
    pub fn initialize(&mut self) -> Result<()> {
        let root = match self.root.take() {
            Some(r) => {
                debug!("Using provided root directory: {:?}", r);
                r
            }
            None => {
                debug!("No root provided, searching for git root");
                find_git_root()?
            }
        };

        if !root.is_dir() {
            return Err(AnalyzerError::InvalidRoot(root));
        }
        let root = root.canonicalize().map_err(|_| AnalyzerError::InvalidRoot(root.clone()))?;
        info!("Using root directory: {}", root.display());

        let src = clean(root.join(&self.src_dir));
        if !src.is_dir() {
            return Err(AnalyzerError::MissingSourceDir(src));
        }
        debug!("Using source directory: {}", src.display());

        self.root = Some(root);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or_else(|| AnalyzerError::InvalidRoot(PathBuf::new()))
    }

    pub fn src_root(&self) -> Result<PathBuf> {
        Ok(clean(self.root()?.join(&self.src_dir)))
    }
}

pub fn find_git_root() -> Result<PathBuf> {
    find_git_root_from(&env::current_dir()?)
}

pub fn find_git_root_from(start: &Path) -> Result<PathBuf> {
    debug!("Searching for git root");
    let mut current_dir = start.to_path_buf();
    trace!("Starting search from: {:?}", current_dir);

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("Could not find .git directory in any parent folder");
                return Err(AnalyzerError::GitRootNotFound);
            }
        }
    }
}
