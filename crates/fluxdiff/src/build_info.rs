//! Build metadata shown by `fluxdiff version`.

/// Immutable build metadata, captured at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_date: &'static str,
    pub license: &'static str,
}

impl BuildInfo {
    /// Metadata for this binary; release builds set `FLUXDIFF_GIT_COMMIT`
    /// and `FLUXDIFF_BUILD_DATE`
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: match option_env!("FLUXDIFF_GIT_COMMIT") {
                Some(commit) => commit,
                None => "unknown",
            },
            build_date: match option_env!("FLUXDIFF_BUILD_DATE") {
                Some(date) => date,
                None => "unknown",
            },
            license: "Apache 2.0",
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Version:\t {}\nGit commit:\t {}\nDate:\t\t {}\nLicense:\t {}\n",
            self.version, self.git_commit, self.build_date, self.license
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let info = BuildInfo {
            version: "1.2.3",
            git_commit: "abc123",
            build_date: "2026-01-01",
            license: "Apache 2.0",
        };
        assert_eq!(
            info.render(),
            "Version:\t 1.2.3\nGit commit:\t abc123\nDate:\t\t 2026-01-01\nLicense:\t Apache 2.0\n"
        );
    }

    #[test]
    fn test_current_uses_package_version() {
        assert_eq!(BuildInfo::current().version, env!("CARGO_PKG_VERSION"));
    }
}
