use std::process::Command;

fn main() {
    let commit_count = get_git_commit_count().unwrap_or(0);
    let is_dirty = is_git_dirty().unwrap_or(false);

    // 0.1.{commit_count}[+dirty]
    let version = if is_dirty {
        format!("0.1.{}+dirty", commit_count)
    } else {
        format!("0.1.{}", commit_count)
    };

    println!("cargo:rustc-env=CLIPPY_VERSION={}", version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-changed=.git/index");
}

fn get_git_commit_count() -> Option<u32> {
    let output = Command::new("git")
        .args(["rev-list", "--count", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse::<u32>().ok()
}

fn is_git_dirty() -> Option<bool> {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}
