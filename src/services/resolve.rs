use std::path::{Path, PathBuf};

use tracing::debug;

/// Finds `<name>_<locale>.ts` in `dir`, retrying with the locale cut back at
/// its last `_`, `-`, `.` or `@` until a file exists, so `fi_FI.UTF-8`
/// ends up at `fi_FI` and then `fi`.
pub fn resolve(dir: &Path, name: &str, locale: &str) -> Option<PathBuf> {
    let mut tag = locale.trim();

    while !tag.is_empty() {
        let candidate = dir.join(format!("{name}_{tag}.ts"));
        if candidate.is_file() {
            debug!(locale, path = %candidate.display(), "resolved catalog");
            return Some(candidate);
        }

        match tag.rfind(['_', '-', '.', '@']) {
            Some(pos) => tag = &tag[..pos],
            None => break,
        }
    }

    debug!(locale, dir = %dir.display(), "no catalog for locale");
    None
}
