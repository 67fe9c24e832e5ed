use std::{env, io, path::PathBuf};

use anyhow::{Context, Result};

const APPLICATION_NAME: &str = "habitual";

/// Default name of the file holding all habits inside the application directory.
pub const HABITS_FILE_NAME: &str = "habits.json";

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        fn state_home() -> Result<PathBuf> {
            env::var("APPDATA")
                .map(PathBuf::from)
                .context("APPDATA should be present on Windows")
        }
    } else {
        fn state_home() -> Result<PathBuf> {
            env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .context("Couldn't find neither XDG_STATE_HOME nor HOME")
        }
    }
}

/// Returns the directory used for habits and logs, creating it if needed.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = state_home()?;
    path.push(APPLICATION_NAME);

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
