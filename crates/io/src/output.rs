// Output path naming and locked-file fallback

use std::path::{Path, PathBuf};

/// Numbered alternates tried after the preferred path fails.
pub const FALLBACK_ATTEMPTS: usize = 9;

/// `<dir>/<stem><suffix>.<ext>` next to the input file.
pub fn default_output_path(input: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}{suffix}.{ext}"))
}

/// `report.xlsx` -> `report_3.xlsx`
pub fn alternate_path(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{n}"),
    };
    path.with_file_name(name)
}

/// Call `write` with `target`, then with `_1` .. `_attempts` alternates until one
/// succeeds. Returns the path actually written. A file held open by a
/// spreadsheet application is the usual reason the first write fails.
pub fn save_with_fallback<F>(target: &Path, attempts: usize, mut write: F) -> Result<PathBuf, String>
where
    F: FnMut(&Path) -> Result<(), String>,
{
    let first_err = match write(target) {
        Ok(()) => return Ok(target.to_path_buf()),
        Err(e) => e,
    };
    log::warn!("cannot write {}: {}", target.display(), first_err);

    for n in 1..=attempts {
        let candidate = alternate_path(target, n);
        match write(&candidate) {
            Ok(()) => {
                log::warn!("saved to {} instead", candidate.display());
                return Ok(candidate);
            }
            Err(e) => log::debug!("cannot write {}: {}", candidate.display(), e),
        }
    }

    Err(format!(
        "{} (also tried {} numbered alternatives)",
        first_err, attempts
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_sits_next_to_input() {
        let p = default_output_path(Path::new("/data/сотрудники.xlsx"), "_результат", "xlsx");
        assert_eq!(p, PathBuf::from("/data/сотрудники_результат.xlsx"));

        let p = default_output_path(Path::new("list.csv"), "_out", "csv");
        assert_eq!(p, PathBuf::from("list_out.csv"));
    }

    #[test]
    fn alternates_are_numbered() {
        assert_eq!(alternate_path(Path::new("/d/r.xlsx"), 3), PathBuf::from("/d/r_3.xlsx"));
        assert_eq!(alternate_path(Path::new("r"), 1), PathBuf::from("r_1"));
    }

    #[test]
    fn fallback_skips_failing_targets() {
        let mut tried = Vec::new();
        let written = save_with_fallback(Path::new("out.xlsx"), 9, |p| {
            tried.push(p.to_path_buf());
            if tried.len() < 3 { Err("locked".into()) } else { Ok(()) }
        })
        .unwrap();
        assert_eq!(written, PathBuf::from("out_2.xlsx"));
        assert_eq!(
            tried,
            vec![PathBuf::from("out.xlsx"), PathBuf::from("out_1.xlsx"), PathBuf::from("out_2.xlsx")]
        );
    }

    #[test]
    fn fallback_gives_up_after_attempts() {
        let mut calls = 0;
        let err = save_with_fallback(Path::new("out.xlsx"), 2, |_| {
            calls += 1;
            Err("permission denied".into())
        })
        .unwrap_err();
        assert_eq!(calls, 3);
        assert!(err.starts_with("permission denied"));
    }

    #[test]
    fn fallback_writes_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("result.csv");
        let written = save_with_fallback(&target, FALLBACK_ATTEMPTS, |p| {
            std::fs::write(p, "a,b\n").map_err(|e| e.to_string())
        })
        .unwrap();
        assert_eq!(written, target);
        assert!(target.exists());
    }
}
