//! Service version string
//!
//! Combines the package version with the git revision captured at build time,
//! e.g. `v0.1.0 (abcdef1)`. Build metadata is read through [`BuildInfoSource`]
//! so tests can substitute their own.

/// Version reported when the build carries none
pub const DEFAULT_VERSION: &str = "(devel)";

/// Revision reported when the build carries none
pub const UNKNOWN_REVISION: &str = "unknown";

/// Length of the displayed revision
pub const REVISION_LEN: usize = 7;

/// Build metadata as reported by a [`BuildInfoSource`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInfo {
    /// Release version, e.g. `v1.2.3`
    pub version: Option<String>,
    /// VCS revision, usually a full commit hash
    pub revision: Option<String>,
}

/// Something that reports build metadata
pub trait BuildInfoSource: Send + Sync {
    /// `None` when no metadata is available at all
    fn read(&self) -> Option<BuildInfo>;
}

/// Metadata compiled into this binary by cargo and `build.rs`
#[derive(Debug, Clone, Copy, Default)]
pub struct CompiledBuildInfo;

impl BuildInfoSource for CompiledBuildInfo {
    fn read(&self) -> Option<BuildInfo> {
        Some(BuildInfo {
            version: Some(format!("v{}", env!("CARGO_PKG_VERSION"))),
            revision: option_env!("TEXT_MIRROR_GIT_REVISION").map(str::to_string),
        })
    }
}

/// Format the service version from `source`.
///
/// With a release version: `"<version> (<revision>)"`. Without one:
/// `"<revision> (devel)"`. The revision is cut to [`REVISION_LEN`]
/// characters and defaults to `unknown`.
pub fn service_version(source: &dyn BuildInfoSource) -> String {
    let Some(info) = source.read() else {
        return format!("{UNKNOWN_REVISION} {DEFAULT_VERSION}");
    };

    let revision = info
        .revision
        .as_deref()
        .filter(|rev| !rev.is_empty())
        .unwrap_or(UNKNOWN_REVISION);
    let revision = short_revision(revision);

    match info
        .version
        .as_deref()
        .filter(|v| !v.is_empty() && *v != DEFAULT_VERSION)
    {
        Some(version) => format!("{version} ({revision})"),
        None => format!("{revision} {DEFAULT_VERSION}"),
    }
}

fn short_revision(revision: &str) -> &str {
    match revision.char_indices().nth(REVISION_LEN) {
        Some((end, _)) => &revision[..end],
        None => revision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeBuildInfo(Option<BuildInfo>);

    impl BuildInfoSource for FakeBuildInfo {
        fn read(&self) -> Option<BuildInfo> {
            self.0.clone()
        }
    }

    fn info(version: &str, revision: Option<&str>) -> Option<BuildInfo> {
        Some(BuildInfo {
            version: Some(version.to_string()),
            revision: revision.map(str::to_string),
        })
    }

    #[test]
    fn test_service_version_table() {
        let cases = [
            ("has_version_and_revision", info("v1.2.3", Some("abcdef1234567890")), "v1.2.3 (abcdef1)"),
            ("no_version_has_revision", info("", Some("abcdef1234567890")), "abcdef1 (devel)"),
            ("has_version_no_revision", info("v2.0.0", None), "v2.0.0 (unknown)"),
            ("no_version_no_revision", info("", None), "unknown (devel)"),
            ("devel_version", info("(devel)", Some("1234567")), "1234567 (devel)"),
            ("short_revision", info("v0.1.0", Some("abc")), "v0.1.0 (abc)"),
            ("empty_revision", info("v0.1.0", Some("")), "v0.1.0 (unknown)"),
            ("no_build_info", None, "unknown (devel)"),
        ];

        for (index, (name, build, expected)) in cases.into_iter().enumerate() {
            let actual = service_version(&FakeBuildInfo(build));
            assert_eq!(actual, expected, "case #{} ({})", index + 1, name);
        }
    }

    #[test]
    fn test_compiled_build_info_has_package_version() {
        let build = CompiledBuildInfo.read().unwrap();
        assert_eq!(build.version, Some(format!("v{}", env!("CARGO_PKG_VERSION"))));

        let version = service_version(&CompiledBuildInfo);
        assert!(version.starts_with(&format!("v{} (", env!("CARGO_PKG_VERSION"))));
        assert!(version.ends_with(')'));
    }
}
