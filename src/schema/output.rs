//! Writing generated artifacts to the output tree.
//!
//! Generation is finished before the first write, so a run-level failure
//! never leaves a half-written tree. Individual write failures are logged
//! and counted; the caller decides what a non-zero count means.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, error};

use crate::schema::ir::codegen::Artifact;

/// Writes rendered artifacts under one output root, creating directories
/// as needed.
#[derive(Debug)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        OutputWriter { root: root.into() }
    }

    /// Write every artifact, returning the number of failed writes.
    pub fn write_artifacts(&self, artifacts: &[Artifact]) -> usize {
        let mut failures = 0;
        for artifact in artifacts {
            if let Err(err) = self.write_artifact(artifact) {
                error!(path = %artifact.path, %err, "failed to write artifact");
                failures += 1;
            }
        }
        failures
    }

    fn write_artifact(&self, artifact: &Artifact) -> io::Result<()> {
        let path = self.root.join(&artifact.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, artifact.render())?;
        debug!(path = %path.display(), "wrote artifact");
        Ok(())
    }

    /// Keep the raw schema document next to the bindings so a regeneration
    /// can be diffed against what the server actually sent.
    pub fn write_schema_snapshot(&self, module: &str, json: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(format!("{module}_schema.json"));
        fs::write(&path, json)?;
        debug!(path = %path.display(), "wrote schema snapshot");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::ir::codegen::ArtifactKind;
    use crate::schema::ir::types::GdClass;

    #[test]
    fn test_writes_into_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());
        let artifacts = vec![Artifact {
            kind: ArtifactKind::Table,
            path: "tables/player.gd".to_string(),
            class: GdClass::resource("Player"),
        }];
        assert_eq!(writer.write_artifacts(&artifacts), 0);
        let written = fs::read_to_string(dir.path().join("tables/player.gd")).unwrap();
        assert!(written.contains("class_name Player extends Resource"));
    }

    #[test]
    fn test_schema_snapshot_path() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());
        writer.write_schema_snapshot("game", "{}").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("game_schema.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path());
        let artifacts = vec![Artifact {
            kind: ArtifactKind::SharedType,
            path: "spacetime_types/color.gd".to_string(),
            class: GdClass::resource("Color"),
        }];
        writer.write_artifacts(&artifacts);
        let first = fs::read_to_string(dir.path().join("spacetime_types/color.gd")).unwrap();
        writer.write_artifacts(&artifacts);
        let second =
            fs::read_to_string(dir.path().join("spacetime_types/color.gd")).unwrap();
        assert_eq!(first, second);
    }
}
