#![deny(unused_must_use)]

use std::{env, fs, path::PathBuf};

use xshell::cmd;

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let args = args.iter().map(|s| &**s).collect::<Vec<_>>();

    match &args[..] {
        ["ci"] => test_ci(),
        ["test"] => test_device(),
        ["update"] => update(),
        _ => {
            println!("USAGE cargo xtask [ci|test|update]");
            Ok(())
        }
    }
}

fn update() -> Result<(), anyhow::Error> {
    let _p = xshell::pushd(root_dir())?;
    cmd!("cargo update").run()?;
    Ok(())
}

fn test_ci() -> Result<(), anyhow::Error> {
    // config! falls back to "CI" for unset keys
    let _e = xshell::pushenv("CI", "true");
    test_device()?;
    check_no_std()?;
    do_demos(demos_dir(), &build_demo)?;
    Ok(())
}

fn test_device() -> Result<(), anyhow::Error> {
    let _p = xshell::pushd(root_dir())?;
    cmd!("cargo test -p rain-node --features std,log").run()?;
    cmd!("cargo test -p rain-node-macros").run()?;
    Ok(())
}

fn check_no_std() -> Result<(), anyhow::Error> {
    let _p = xshell::pushd(root_dir())?;
    cmd!("cargo check -p rain-node --no-default-features").run()?;
    Ok(())
}

fn do_demos<F: Fn(PathBuf) -> Result<(), anyhow::Error>>(
    current_dir: PathBuf,
    f: &F,
) -> Result<(), anyhow::Error> {
    for entry in fs::read_dir(current_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.ends_with("Cargo.toml") {
            f(path.clone())?;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() && !path.ends_with("target") {
            do_demos(path, f)?;
        }
    }

    Ok(())
}

fn build_demo(project_file: PathBuf) -> Result<(), anyhow::Error> {
    println!("Building demo {}", project_file.display());
    let dir = project_file
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent for {}", project_file.display()))?;
    let _p = xshell::pushd(dir)?;
    cmd!("cargo build --release").run()?;
    Ok(())
}

fn demos_dir() -> PathBuf {
    root_dir().join("demos")
}

fn root_dir() -> PathBuf {
    let mut xtask_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    xtask_dir.pop();
    xtask_dir
}
