//! Output file naming and writing.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::RenderError;

/// Used when nothing survives sanitisation.
pub const FALLBACK_CLIENT_NAME: &str = "cliente";

/// Reduce a client name to `[A-Za-z0-9_]`: non-ASCII characters and
/// punctuation are dropped, whitespace becomes `_`, and leading/trailing
/// underscores are trimmed.
pub fn sanitize_client_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    let trimmed = kept.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_CLIENT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Highest numeric suffix tried before giving up on a file name.
pub const MAX_NAME_SUFFIX: u32 = 999;

/// `cuenta_cobro_<client>_<timestamp>`, the file name without `.pdf`.
pub fn invoice_file_stem(client_name: &str, timestamp: &str) -> String {
    format!(
        "cuenta_cobro_{}_{}",
        sanitize_client_name(client_name),
        timestamp
    )
}

pub fn ensure_output_dir(dir: &Path) -> Result<(), RenderError> {
    fs::create_dir_all(dir).map_err(|source| RenderError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `bytes` to a new file `<stem>.pdf` in `dir`.
///
/// If that name is taken, `<stem>_1.pdf`, `<stem>_2.pdf`, ... are tried in
/// turn. Files are opened with `create_new`, so an existing file is never
/// replaced, even by a concurrent writer. If writing fails half-way the
/// partial file is removed.
pub fn write_new_file(dir: &Path, stem: &str, bytes: &[u8]) -> Result<PathBuf, RenderError> {
    for n in 0..=MAX_NAME_SUFFIX {
        let path = if n == 0 {
            dir.join(format!("{stem}.pdf"))
        } else {
            dir.join(format!("{stem}_{n}.pdf"))
        };
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("'{}' already exists, trying the next name", path.display());
                continue;
            }
            Err(source) => return Err(RenderError::Write { path, source }),
        };
        return write_into(file, path, bytes);
    }

    Err(RenderError::Write {
        path: dir.join(format!("{stem}.pdf")),
        source: io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{stem}.pdf and its {MAX_NAME_SUFFIX} numbered variants all exist"),
        ),
    })
}

fn write_into(mut file: File, path: PathBuf, bytes: &[u8]) -> Result<PathBuf, RenderError> {
    if let Err(source) = file.write_all(bytes).and_then(|()| file.sync_all()) {
        drop(file);
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("Could not remove partial file '{}': {e}", path.display());
        }
        return Err(RenderError::Write { path, source });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_ascii_and_punctuation() {
        assert_eq!(sanitize_client_name("José Ñúñez #1!"), "Jos_ez_1");
        assert_eq!(sanitize_client_name("Acme SA"), "Acme_SA");
    }

    #[test]
    fn falls_back_when_nothing_survives() {
        assert_eq!(sanitize_client_name("###"), "cliente");
        assert_eq!(sanitize_client_name("   "), "cliente");
        assert_eq!(sanitize_client_name(""), "cliente");
    }

    #[test]
    fn trims_underscores_and_maps_all_whitespace() {
        assert_eq!(sanitize_client_name("  _Foo\tBar_ "), "Foo_Bar");
        let s = sanitize_client_name("día\nnoche  2");
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(!s.starts_with('_') && !s.ends_with('_'));
    }

    #[test]
    fn file_name_pattern() {
        assert_eq!(
            invoice_file_stem("Acme SA", "20240115103000"),
            "cuenta_cobro_Acme_SA_20240115103000"
        );
    }

    #[test]
    fn taken_name_gets_a_numeric_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_new_file(dir.path(), "a", b"first").unwrap();
        let second = write_new_file(dir.path(), "a", b"second").unwrap();
        let third = write_new_file(dir.path(), "a", b"third").unwrap();

        assert_eq!(first, dir.path().join("a.pdf"));
        assert_eq!(second, dir.path().join("a_1.pdf"));
        assert_eq!(third, dir.path().join("a_2.pdf"));
        assert_eq!(fs::read(&first).unwrap(), b"first");
        assert_eq!(fs::read(&second).unwrap(), b"second");
    }

    #[test]
    fn suffix_skips_every_taken_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        fs::write(dir.path().join("a_1.pdf"), b"x").unwrap();
        let path = write_new_file(dir.path(), "a", b"new").unwrap();
        assert_eq!(path, dir.path().join("a_2.pdf"));
        assert_eq!(fs::read(dir.path().join("a.pdf")).unwrap(), b"x");
    }

    #[test]
    fn missing_dir_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_new_file(&dir.path().join("nope"), "a", b"x").unwrap_err();
        assert!(matches!(err, RenderError::Write { .. }));
    }

    #[test]
    fn ensure_output_dir_fails_under_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let err = ensure_output_dir(&blocker.join("generated")).unwrap_err();
        assert!(matches!(err, RenderError::CreateDir { .. }));
    }
}
