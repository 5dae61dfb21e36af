//! Platform defaults for locating and running per-project scripts

use std::env;

/// How scripts are named and launched on the current platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    /// Script file extension (e.g., "sh", "bat")
    pub script_extension: &'static str,
    /// Program and leading arguments a non-executable script path is appended to
    pub interpreter: &'static [&'static str],
    /// Program and leading arguments a shell command string is appended to
    pub shell: &'static [&'static str],
}

const UNIX: PlatformInfo = PlatformInfo {
    script_extension: "sh",
    interpreter: &["sh"],
    shell: &["sh", "-c"],
};

const WINDOWS: PlatformInfo = PlatformInfo {
    script_extension: "bat",
    interpreter: &["cmd", "/C"],
    shell: &["cmd", "/C"],
};

impl PlatformInfo {
    /// Detect the current platform
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    /// Create platform info from an OS name as reported by `std::env::consts::OS`
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => WINDOWS,
            _ => UNIX,
        }
    }

    pub fn interpreter_argv(&self) -> Vec<String> {
        self.interpreter.iter().map(|s| s.to_string()).collect()
    }

    pub fn shell_argv(&self) -> Vec<String> {
        self.shell.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let platform = PlatformInfo::current();
        assert!(!platform.script_extension.is_empty());
        assert!(!platform.interpreter.is_empty());
    }

    #[test]
    fn test_linux() {
        let platform = PlatformInfo::from_os("linux");
        assert_eq!(platform.script_extension, "sh");
        assert_eq!(platform.interpreter_argv(), vec!["sh".to_string()]);
    }

    #[test]
    fn test_macos_uses_unix_defaults() {
        assert_eq!(PlatformInfo::from_os("macos"), PlatformInfo::from_os("linux"));
    }

    #[test]
    fn test_windows() {
        let platform = PlatformInfo::from_os("windows");
        assert_eq!(platform.script_extension, "bat");
        assert_eq!(platform.shell_argv(), vec!["cmd".to_string(), "/C".to_string()]);
    }
}
