/*
 * Locates the per-user directory where movie_explorer keeps its files: the persisted
 * client state, the optional API configuration and the log file. All of them live side by
 * side in the platform's local (non-roaming) configuration directory for the application.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/*
 * Retrieves the application's local configuration directory, creating it when missing.
 * The path is derived without an organization qualifier (e.g. `~/.config/<app_name>` on
 * Linux, `AppData/Local/<app_name>/config` on Windows).
 *
 * Returns `None` if the platform offers no home directory or the directory cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving config dir for '{app_name}'");
    let proj_dirs = ProjectDirs::from("", "", app_name)?;
    ensure_dir(proj_dirs.config_local_dir())
}

/*
 * Joins `file_name` onto the application's config directory. The directory is created if
 * needed; the file itself is not touched.
 */
pub fn app_file_path(app_name: &str, file_name: &str) -> Option<PathBuf> {
    get_base_app_config_local_dir(app_name).map(|dir| dir.join(file_name))
}

fn ensure_dir(dir: &Path) -> Option<PathBuf> {
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(dir) {
            log::error!("PathUtils: Failed to create config directory {dir:?}: {e}");
            return None;
        }
        log::debug!("PathUtils: Created config directory: {dir:?}");
    }
    Some(dir.to_path_buf())
}
