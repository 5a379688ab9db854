use std::process::Command;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Capture the git revision for the service version string.
    // Builds outside a git checkout simply report "unknown".
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    if let Ok(output) = Command::new("git").args(["rev-parse", "HEAD"]).output() {
        if output.status.success() {
            let revision = String::from_utf8(output.stdout)?;
            let revision = revision.trim();
            if !revision.is_empty() {
                println!("cargo:rustc-env=TEXT_MIRROR_GIT_REVISION={}", revision);
            }
        }
    }

    Ok(())
}
