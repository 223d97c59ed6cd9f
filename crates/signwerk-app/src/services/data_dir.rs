// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data and cache directory resolution.

use std::path::{Path, PathBuf};

use tracing::warn;

const APP_DIR: &str = "signwerk";

/// Return the application data directory (config, saved signature list),
/// creating it if needed.
///
/// On desktop this uses a conventional location. On mobile the host should
/// pass its own documents directory to the services instead.
pub fn data_dir() -> PathBuf {
    ensure_dir(data_base(env_var).join(APP_DIR))
}

/// Return the application-private cache root for composites and captured
/// signatures, creating it if needed.
pub fn cache_dir() -> PathBuf {
    ensure_dir(cache_base(env_var).join(APP_DIR))
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn ensure_dir(dir: PathBuf) -> PathBuf {
    if let Err(err) = std::fs::create_dir_all(&dir) {
        warn!(dir = %dir.display(), %err, "Could not create directory");
    }
    dir
}

/// `$XDG_DATA_HOME`, else `$HOME/.local/share`, else the temp dir.
fn data_base(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    xdg_or_home(env, "XDG_DATA_HOME", Path::new(".local/share"))
}

/// `$XDG_CACHE_HOME`, else `$HOME/.cache`, else the temp dir.
fn cache_base(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    xdg_or_home(env, "XDG_CACHE_HOME", Path::new(".cache"))
}

fn xdg_or_home(env: impl Fn(&str) -> Option<String>, xdg_key: &str, under_home: &Path) -> PathBuf {
    if let Some(xdg) = env(xdg_key) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = env("HOME") {
        return PathBuf::from(home).join(under_home);
    }
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn xdg_variables_win_over_home() {
        let env = vars(&[
            ("XDG_DATA_HOME", "/xdg/data"),
            ("XDG_CACHE_HOME", "/xdg/cache"),
            ("HOME", "/home/ada"),
        ]);
        assert_eq!(data_base(&env), PathBuf::from("/xdg/data"));
        assert_eq!(cache_base(&env), PathBuf::from("/xdg/cache"));
    }

    #[test]
    fn home_is_the_fallback() {
        let env = vars(&[("HOME", "/home/ada")]);
        assert_eq!(data_base(&env), PathBuf::from("/home/ada/.local/share"));
        assert_eq!(cache_base(&env), PathBuf::from("/home/ada/.cache"));
    }

    #[test]
    fn bare_environment_uses_the_temp_dir() {
        let env = vars(&[]);
        assert_eq!(data_base(&env), std::env::temp_dir());
        assert_eq!(cache_base(&env), std::env::temp_dir());
    }

    #[test]
    fn resolved_directories_end_in_app_name() {
        let env = vars(&[("HOME", "/home/ada")]);
        assert!(data_base(&env).join(APP_DIR).ends_with(APP_DIR));
        assert!(cache_base(&env).join(APP_DIR).ends_with(APP_DIR));
    }

    #[test]
    fn ensure_dir_creates_missing_parents() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("share").join(APP_DIR);

        let created = ensure_dir(nested.clone());

        assert_eq!(created, nested);
        assert!(nested.is_dir());
    }
}
