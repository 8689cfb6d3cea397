//! Atomic output transaction.
//!
//! All emission goes to a sibling `.tmp-{uuid}` directory; the target is
//! only ever touched by the commit rename. A killed process leaves either
//! the previous target intact or no target at all, and the next run reaps
//! any `.tmp-*` residue.

mod manifest;

pub use manifest::{StagedFile, kind_for, manifest_json};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::emit::paths;
use crate::error::{MsggenError, Result};

/// Free-space collaborator. The default probe cannot answer; a configured
/// positive threshold then fails closed.
pub trait SpaceProbe {
    fn free_bytes(&self, path: &Path) -> Option<u64>;
}

/// Probe that never knows. Platform-specific probes can be injected where
/// the answer matters; tests use fixed ones.
pub struct UnknownSpaceProbe;

impl SpaceProbe for UnknownSpaceProbe {
    fn free_bytes(&self, _path: &Path) -> Option<u64> {
        None
    }
}

/// Everything `commit` verifies before the swap.
pub struct CommitPreconditions<'a> {
    pub consistency_passed: bool,
    /// Result of the external message validator, when that step is enabled.
    pub message_validation_passed: Option<bool>,
    pub min_free_bytes: u64,
    pub keep_backup: bool,
    pub probe: &'a dyn SpaceProbe,
}

/// A staged, not-yet-committed output tree.
pub struct OutputTransaction {
    id: Uuid,
    target_dir: PathBuf,
    temp_dir: PathBuf,
    files: Vec<StagedFile>,
}

impl OutputTransaction {
    /// Create the staging directory next to `target_dir`.
    pub fn begin(target_dir: &Path) -> Result<Self> {
        let id = Uuid::new_v4();
        let parent = parent_of(target_dir);
        fs::create_dir_all(&parent).map_err(|e| {
            MsggenError::output_io(
                format!("cannot create output parent {}", parent.display()),
                e,
            )
        })?;
        let temp_dir = parent.join(format!(".tmp-{}", id));
        fs::create_dir(&temp_dir).map_err(|e| {
            MsggenError::output_io(
                format!("cannot create staging directory {}", temp_dir.display()),
                e,
            )
        })?;
        debug!(temp = %temp_dir.display(), "transaction started");
        Ok(Self {
            id,
            target_dir: target_dir.to_path_buf(),
            temp_dir,
            files: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn staged_root(&self) -> &Path {
        &self.temp_dir
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Stage one file, recording its size and content hash.
    pub fn add(&mut self, rel_path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.temp_dir.join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MsggenError::output_io(
                    format!("cannot create staging subdirectory {}", parent.display()),
                    e,
                )
            })?;
        }
        fs::write(&full, bytes).map_err(|e| {
            MsggenError::output_io(format!("cannot stage file {}", rel_path), e)
        })?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let sha256 = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();

        self.files.push(StagedFile {
            rel_path: rel_path.to_string(),
            size: bytes.len() as u64,
            sha256,
            kind: kind_for(rel_path),
        });
        Ok(())
    }

    /// Validate the preconditions, write the manifest, and swap the staged
    /// tree into place. Any failure rolls the transaction back.
    pub fn commit(self, preconditions: &CommitPreconditions<'_>) -> Result<()> {
        if let Err(err) = self.check_preconditions(preconditions) {
            self.rollback()?;
            return Err(err);
        }

        let manifest = manifest_json(self.id, &self.files);
        if let Err(e) = fs::write(self.temp_dir.join(paths::MANIFEST), manifest) {
            let err = MsggenError::output_io("cannot write manifest".to_string(), e);
            self.rollback()?;
            return Err(err);
        }

        let backup = self.target_dir.with_file_name(format!(
            "{}.bak-{}",
            self.target_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string()),
            self.id
        ));

        let had_previous = self.target_dir.exists();
        if had_previous {
            if let Err(e) = fs::rename(&self.target_dir, &backup) {
                let err = MsggenError::output_io(
                    format!("cannot move previous output to {}", backup.display()),
                    e,
                );
                self.rollback()?;
                return Err(err);
            }
        }

        if let Err(e) = move_dir(&self.temp_dir, &self.target_dir) {
            // Restore the previous output before reporting.
            if had_previous {
                let _ = fs::rename(&backup, &self.target_dir);
            }
            let err = MsggenError::output_io(
                format!("cannot move staged tree into {}", self.target_dir.display()),
                e,
            );
            self.rollback()?;
            return Err(err);
        }

        if had_previous && !preconditions.keep_backup {
            if let Err(e) = fs::remove_dir_all(&backup) {
                warn!(backup = %backup.display(), error = %e, "cannot delete backup");
            }
        }

        debug!(target = %self.target_dir.display(), "transaction committed");
        Ok(())
    }

    /// Delete the staged tree; the target directory is untouched.
    pub fn rollback(self) -> Result<()> {
        if self.temp_dir.exists() {
            fs::remove_dir_all(&self.temp_dir).map_err(|e| {
                MsggenError::output_io(
                    format!("cannot delete staging directory {}", self.temp_dir.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    fn check_preconditions(&self, preconditions: &CommitPreconditions<'_>) -> Result<()> {
        if !preconditions.consistency_passed {
            return Err(MsggenError::output(
                "consistency validation failed; not committing",
            ));
        }
        if preconditions.message_validation_passed == Some(false) {
            return Err(MsggenError::output(
                "message validation failed; not committing",
            ));
        }

        let parent = parent_of(&self.target_dir);
        let probe_path = parent.join(format!(".probe-{}", self.id));
        fs::write(&probe_path, b"")
            .and_then(|_| fs::remove_file(&probe_path))
            .map_err(|e| {
                MsggenError::output_io(
                    format!("output parent {} is not writable", parent.display()),
                    e,
                )
            })?;

        if preconditions.min_free_bytes > 0 {
            match preconditions.probe.free_bytes(&parent) {
                Some(free) if free >= preconditions.min_free_bytes => {}
                Some(free) => {
                    return Err(MsggenError::output(format!(
                        "insufficient free space: {} bytes available, {} required",
                        free, preconditions.min_free_bytes
                    )));
                }
                None => {
                    return Err(MsggenError::output(
                        "free space cannot be determined but a minimum is configured",
                    ));
                }
            }
        }
        Ok(())
    }
}

fn parent_of(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Atomic rename, falling back to copy-then-delete across filesystems. The
/// copy completes fully before the source is removed.
fn move_dir(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(libc_exdev()) => {
            copy_dir(from, to)?;
            fs::remove_dir_all(from)
        }
        Err(e) => Err(e),
    }
}

// EXDEV without pulling in libc: stable on Linux and close enough
// elsewhere; a non-EXDEV rename failure surfaces as-is.
fn libc_exdev() -> i32 {
    18
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let dest = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// Reap `.tmp-*` residue next to the target (prior crashes).
pub fn cleanup_orphans(target_dir: &Path) -> Result<usize> {
    let parent = parent_of(target_dir);
    if !parent.exists() {
        return Ok(0);
    }
    let mut reaped = 0;
    let entries = fs::read_dir(&parent).map_err(|e| {
        MsggenError::output_io(format!("cannot scan {}", parent.display()), e)
    })?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(".tmp-") && entry.path().is_dir() {
            warn!(orphan = %entry.path().display(), "removing stale staging directory");
            fs::remove_dir_all(entry.path()).map_err(|e| {
                MsggenError::output_io(
                    format!("cannot delete orphan {}", entry.path().display()),
                    e,
                )
            })?;
            reaped += 1;
        }
    }
    Ok(reaped)
}
