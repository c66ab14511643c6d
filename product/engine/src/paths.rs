use std::path::{Path, PathBuf};

/// Layout of the bundled third-party tools and the preference directory.
///
/// Only BBDown is run by this crate; the ffmpeg and aria2c locations are
/// resolved for the GUI's download code and reported by `bbdown_streams --tools`.
///
/// `base_dir` is the directory the GUI ships from; the tools live under
/// `<base_dir>/utils/` exactly as they are unpacked from their release archives.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub base_dir: PathBuf,
}

impl AppPaths {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.base_dir.join("config")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir().join("preferences.json")
    }

    pub fn utils_dir(&self) -> PathBuf {
        self.base_dir.join("utils")
    }

    pub fn bbdown_dir(&self) -> PathBuf {
        self.utils_dir().join("BBDown")
    }

    pub fn bbdown_bin_path(&self) -> PathBuf {
        with_exe_extension(self.bbdown_dir().join("BBDown"))
    }

    pub fn ffmpeg_bin_path(&self) -> PathBuf {
        with_exe_extension(
            self.utils_dir()
                .join("ffmpeg-7.1-essentials_build")
                .join("bin")
                .join("ffmpeg"),
        )
    }

    pub fn aria2c_bin_path(&self) -> PathBuf {
        with_exe_extension(
            self.utils_dir()
                .join("aria2-1.37.0-win-64bit-build1")
                .join("aria2c"),
        )
    }

    pub fn bbdown_cmd(&self) -> PathBuf {
        bundled_or_path_lookup(self.bbdown_bin_path(), "BBDown")
    }

    pub fn ffmpeg_cmd(&self) -> PathBuf {
        bundled_or_path_lookup(self.ffmpeg_bin_path(), "ffmpeg")
    }

    pub fn aria2c_cmd(&self) -> PathBuf {
        bundled_or_path_lookup(self.aria2c_bin_path(), "aria2c")
    }

    /// True only when `program` is the bundled BBDown and it is present.
    pub fn is_bundled_bbdown(&self, program: &Path) -> bool {
        program == self.bbdown_bin_path() && program.exists()
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.config_dir())?;
        Ok(())
    }

    /// Directory of the running executable, falling back to the current dir.
    pub fn default_resource_dir() -> PathBuf {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(parent) = exe_path.parent() {
                return parent.to_path_buf();
            }
        }
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

fn with_exe_extension(mut path: PathBuf) -> PathBuf {
    if cfg!(windows) {
        path.set_extension("exe");
    }
    path
}

fn bundled_or_path_lookup(bundled: PathBuf, program: &str) -> PathBuf {
    if bundled.exists() {
        bundled
    } else {
        PathBuf::from(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_paths_follow_bundled_layout() {
        let paths = AppPaths::new(PathBuf::from("root"));
        let bbdown = paths.bbdown_bin_path();
        assert!(bbdown.starts_with(Path::new("root").join("utils").join("BBDown")));
        assert_eq!(
            bbdown.file_stem().and_then(|s| s.to_str()),
            Some("BBDown")
        );
        assert!(paths
            .ffmpeg_bin_path()
            .ends_with(Path::new("bin").join(if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" })));
        assert!(paths
            .aria2c_bin_path()
            .starts_with(Path::new("root").join("utils").join("aria2-1.37.0-win-64bit-build1")));
    }

    #[test]
    fn missing_bundled_tools_fall_back_to_path_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(dir.path().to_path_buf());

        assert_eq!(paths.bbdown_cmd(), PathBuf::from("BBDown"));
        assert_eq!(paths.ffmpeg_cmd(), PathBuf::from("ffmpeg"));
        assert_eq!(paths.aria2c_cmd(), PathBuf::from("aria2c"));
        assert!(!paths.is_bundled_bbdown(&paths.bbdown_cmd()));
    }

    #[test]
    fn present_bundled_tool_is_preferred() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(dir.path().to_path_buf());
        std::fs::create_dir_all(paths.bbdown_dir()).expect("mkdir");
        std::fs::write(paths.bbdown_bin_path(), b"").expect("write");

        assert_eq!(paths.bbdown_cmd(), paths.bbdown_bin_path());
        assert!(paths.is_bundled_bbdown(&paths.bbdown_cmd()));
    }

    #[test]
    fn user_override_is_not_reported_as_bundled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(dir.path().to_path_buf());
        let custom = dir.path().join("custom").join("BBDown");
        std::fs::create_dir_all(custom.parent().expect("parent")).expect("mkdir");
        std::fs::write(&custom, b"").expect("write");

        assert!(!paths.is_bundled_bbdown(&custom));
        assert!(!paths.is_bundled_bbdown(&paths.bbdown_bin_path()));
    }
}
