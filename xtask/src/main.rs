use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const CORE_PACKAGE: &str = "stitch_job_core";
const LAMBDA_PACKAGE: &str = "stitch_job_lambda";
const LAMBDA_BINARY: &str = "trigger_lambda";
const DIST_DIR: &str = "infra/stitch_trigger/dist";

#[derive(Parser)]
#[command(name = "xtask", about = "Task runner for the stitch trigger workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks
    Ci {
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build `trigger_lambda` and zip it as a Lambda `bootstrap`
    ServerlessPackage {
        /// Linux target triple the Lambda runs on
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build without `--release`
        #[arg(long)]
        debug: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// rustfmt and clippy
    Lint,
    /// Tests for both crates
    Test,
    /// Lint, then test
    Check,
}

fn cargo(args: &[&str]) {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo");
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn ci_lint() {
    cargo(&["fmt", "--all", "--", "--check"]);
    cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    cargo(&["test", "-p", CORE_PACKAGE]);
    cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

fn package_trigger_lambda(target: &str, debug: bool) -> PathBuf {
    let mut build_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--bin",
        LAMBDA_BINARY,
        "--target",
        target,
    ];
    if !debug {
        build_args.push("--release");
    }
    cargo(&build_args);

    let profile_dir = if debug { "debug" } else { "release" };
    let binary_path = Path::new("target")
        .join(target)
        .join(profile_dir)
        .join(LAMBDA_BINARY);
    let zip_path = Path::new(DIST_DIR).join("trigger.zip");
    fs::create_dir_all(DIST_DIR).expect("failed to create lambda dist directory");
    write_bootstrap_zip(&binary_path, &zip_path);
    zip_path
}

fn write_bootstrap_zip(binary_path: &Path, zip_path: &Path) {
    let binary = fs::read(binary_path)
        .unwrap_or_else(|error| panic!("failed to read '{}': {error}", binary_path.display()));
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);

    let mut zip = ZipWriter::new(file);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

fn main() {
    match Cli::parse().command {
        Commands::Ci { job: CiJob::Lint } => ci_lint(),
        Commands::Ci { job: CiJob::Test } => ci_test(),
        Commands::Ci { job: CiJob::Check } => {
            ci_lint();
            ci_test();
        }
        Commands::ServerlessPackage { target, debug } => {
            let zip_path = package_trigger_lambda(&target, debug);
            eprintln!("packaged {}", zip_path.display());
        }
    }
}
