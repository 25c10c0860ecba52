// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    // Re-run build script if git HEAD changes
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=DUAL_CAMERA_VERSION");

    // Packagers may pin the version explicitly
    let version = match std::env::var("DUAL_CAMERA_VERSION") {
        Ok(v) => v,
        Err(_) => describe_version(),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// "0.1.0-abcdef1" for a tagged build, "0.1.0-dirty-abcdef1" past a tag,
/// falling back to the crate version when git is unavailable.
fn describe_version() -> String {
    let crate_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    let Some(describe) = git(&["describe", "--tags", "--always", "--match", "v*"]) else {
        return crate_version;
    };
    let describe = describe.strip_prefix('v').unwrap_or(&describe).to_string();
    let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    let parts: Vec<&str> = describe.rsplitn(3, '-').collect();
    if parts.len() >= 3 {
        let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
        format!("{}-dirty-{}", parts[2], hash)
    } else if describe.contains('.') {
        format!("{}-{}", describe, hash)
    } else {
        // No tags yet, describe returned a bare hash
        format!("{}-{}", crate_version, hash)
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;

    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}
