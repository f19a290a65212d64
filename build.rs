use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_default();
    let dirty = git(&["status", "--porcelain"])
        .map(|out| !out.is_empty())
        .unwrap_or(false);

    // A build is a release when HEAD carries the `v<version>` tag and the tree is clean.
    let tag = format!("v{}", env!("CARGO_PKG_VERSION"));
    let tagged = git(&["tag", "--points-at", "HEAD"])
        .map(|tags| tags.lines().any(|t| t == tag))
        .unwrap_or(false);

    println!("cargo:rustc-env=MAILADM_GIT_HASH={}", hash);
    println!("cargo:rustc-env=MAILADM_IS_RELEASE={}", tagged && !dirty);
}
