use current_platform::CURRENT_PLATFORM;

/// Version line for `--version`, e.g. `iiifmagick 0.1.0 x86_64 https://...`.
pub fn version_string() -> String {
    let cpu = CURRENT_PLATFORM.split('-').next().unwrap_or("unknown");
    let version = env!("CARGO_PKG_VERSION");
    let repo = env!("CARGO_PKG_REPOSITORY");

    format!("iiifmagick {version} {cpu} {repo}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_the_version() {
        let version = version_string();
        assert!(version.starts_with("iiifmagick "));
        assert!(version.contains(env!("CARGO_PKG_VERSION")));
    }
}
