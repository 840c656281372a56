use git2::Repository;
use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("git_sha.rs");
    let mut f = File::create(&dest_path).unwrap();

    let git_sha = Repository::open(".")
        .ok()
        .and_then(|repo| {
            let head = repo.head().ok()?;
            let commit = head.peel_to_commit().ok()?;
            Some(commit.id().to_string()[..7].to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    writeln!(&mut f, "pub const GIT_SHA: &str = \"{}\";", git_sha).unwrap();
}
