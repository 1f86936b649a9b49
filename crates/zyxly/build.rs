use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

// cli.rs only depends on clap, clap_complete and humantime (all listed as
// build-dependencies), so it compiles here without the rest of the crate.
#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR").map(PathBuf::from) else {
        println!("cargo::warning=OUT_DIR not set, skipping man pages");
        return;
    };
    let man_dir = out_dir.join("man");
    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo::warning=failed to create {}: {e}", man_dir.display());
        return;
    }

    generate_manpages(&cli::Cli::command(), &man_dir);
}

/// Recursively generate man pages for a command and all its subcommands.
fn generate_manpages(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();
    let path = dir.join(format!("{name}.1"));

    let mut buf = Vec::new();
    if let Err(e) = clap_mangen::Man::new(cmd.clone()).render(&mut buf) {
        println!("cargo::warning=failed to render man page for `{name}`: {e}");
        return;
    }
    if let Err(e) = fs::write(&path, buf) {
        println!("cargo::warning=failed to write {}: {e}", path.display());
        return;
    }

    for sub in cmd.get_subcommands() {
        if sub.is_hide_set() {
            continue;
        }
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        generate_manpages(&sub, dir);
    }
}
