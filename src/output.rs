// src/output.rs

//! Persisting a failed command's output.
//!
//! The file is created fresh (never overwritten), made owner-read-only and
//! filled with exactly the captured bytes. When that is not possible the
//! output is printed to stderr instead so the operator does not lose it,
//! unless it was flagged sensitive.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, error};

use crate::errors::{CronnerError, Result};

/// Save `out` to `path`, falling back to stderr on failure.
///
/// Returns `false` if the file could not be written; the caller should
/// treat that as fatal.
pub fn write_output(path: &Path, out: &[u8], sensitive: bool) -> bool {
    write_output_with_fallback(path, out, sensitive, &mut io::stderr())
}

/// [`write_output`] with the fallback stream supplied by the caller.
pub fn write_output_with_fallback<W: Write>(
    path: &Path,
    out: &[u8],
    sensitive: bool,
    fallback: &mut W,
) -> bool {
    match persist(path, out) {
        Ok(()) => {
            debug!(path = %path.display(), bytes = out.len(), "saved command output");
            true
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to save command output");
            bail_out(&err, out, sensitive, fallback);
            false
        }
    }
}

fn bail_out<W: Write>(err: &CronnerError, out: &[u8], sensitive: bool, fallback: &mut W) {
    let _ = writeln!(fallback, "{err}");
    if sensitive {
        return;
    }
    let _ = write!(fallback, "here is the output in hopes you are looking here:\n\n");
    let _ = fallback.write_all(out);
    let _ = fallback.flush();
}

/// Create `path` (which must not exist), restrict it to 0400 and write `out`.
pub fn persist(path: &Path, out: &[u8]) -> Result<()> {
    if path.symlink_metadata().is_ok() {
        return Err(CronnerError::OutputExists {
            path: path.to_path_buf(),
        });
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| match source.kind() {
            io::ErrorKind::AlreadyExists => CronnerError::OutputExists {
                path: path.to_path_buf(),
            },
            _ => CronnerError::OutputCreate {
                path: path.to_path_buf(),
                source,
            },
        })?;

    restrict_to_owner_read(&file).map_err(|source| CronnerError::OutputPermissions {
        path: path.to_path_buf(),
        source,
    })?;

    let written = write_fully(&mut file, out).map_err(|source| CronnerError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;

    if written != out.len() {
        return Err(CronnerError::OutputShortWrite {
            path: path.to_path_buf(),
            total: out.len(),
            written,
        });
    }

    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner_read(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o400))
}

#[cfg(not(unix))]
fn restrict_to_owner_read(file: &File) -> io::Result<()> {
    let mut perms = file.metadata()?.permissions();
    perms.set_readonly(true);
    file.set_permissions(perms)
}

/// Write until done or the file stops accepting bytes; returns the count.
fn write_fully(file: &mut File, out: &[u8]) -> io::Result<usize> {
    let mut written = 0;
    while written < out.len() {
        match file.write(&out[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}
