//! Stamps the CLI version string with the commit it was built from.
//!
//! Release tarballs have no `.git`; packagers set `SLIDEKIT_BUILD_COMMIT`
//! instead.

use std::process::Command;

const COMMIT_VAR: &str = "SLIDEKIT_BUILD_COMMIT";

fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn main() {
    let commit = std::env::var(COMMIT_VAR)
        .ok()
        .filter(|c| !c.trim().is_empty())
        .or_else(git_commit)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={}={}", COMMIT_VAR, commit);
    println!("cargo:rerun-if-env-changed={}", COMMIT_VAR);
    println!("cargo:rerun-if-changed=.git/HEAD");
}
