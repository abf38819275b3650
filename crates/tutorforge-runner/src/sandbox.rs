//! Per-job workspace: a uniquely named, RAII-cleaned directory bind-mounted
//! into the sandbox container. Exclusively owned by one investigation; its
//! `Drop` always removes the directory, including on panic unwind (I4).

use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;
use uuid::Uuid;

use tutorforge_core::model::Language;

/// Returns the canonical in-workspace filename for a language's source file.
pub fn source_filename(language: Language) -> &'static str {
    match language {
        Language::C => "main.c",
        Language::Cpp => "main.cpp",
        Language::Python => "main.py",
        Language::Java => "Main.java",
    }
}

/// A freshly created, globally-unique workspace directory for one
/// submission's investigation.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a new workspace rooted under `base_dir`, named with a random
    /// 128-bit identifier so concurrent investigations never collide.
    pub fn new(base_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(base_dir)
            .with_context(|| format!("failed to create workspace root: {}", base_dir.display()))?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("job-{}-", Uuid::new_v4()))
            .tempdir_in(base_dir)
            .context("failed to create per-job workspace")?;
        // The container runs as its own (usually non-root) user; the bind
        // mount needs to be writable for it to compile into and run from.
        std::fs::set_permissions(dir.path(), Permissions::from_mode(0o777))
            .with_context(|| format!("failed to set workspace permissions: {}", dir.path().display()))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `source` under this language's canonical filename.
    pub fn write_source(&self, language: Language, source: &str) -> Result<()> {
        let target = self.dir.path().join(source_filename(language));
        std::fs::write(&target, source)
            .with_context(|| format!("failed to write {}", target.display()))?;
        Ok(())
    }
}
