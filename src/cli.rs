//! Command-line interface.
//!
//! `vaultlint scan` loads an optional scan plan, scans the given package
//! descriptor files, and renders one report per check. The process exits
//! nonzero when any violation meets the fail severity, and with a distinct
//! code when the scan aborts outright.

use crate::core::error::PlanError;
use crate::core::hooks::InstallHookPolicy;
use crate::core::package::Package;
use crate::core::plan::ScanPlan;
use crate::core::report::{CheckReport, Severity};
use crate::core::scanner::Scanner;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Exit code for a scan that aborted with no report.
pub const EXIT_ABORTED: i32 = 2;
/// Exit code for a completed scan with violations at or above the fail
/// severity.
pub const EXIT_VIOLATIONS: i32 = 1;

#[derive(Parser, Debug)]
#[clap(
    name = "vaultlint",
    version = env!("CARGO_PKG_VERSION"),
    about = "Scan content-package archives against configurable checks"
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan package descriptor files and report violations
    Scan(ScanCli),
}

#[derive(clap::Args, Debug)]
struct ScanCli {
    /// Package descriptor files, scanned in order.
    packages: Vec<PathBuf>,

    /// Scan plan file configuring checks, init state, and preinstalls.
    #[clap(long)]
    plan: Option<PathBuf>,

    /// Active run modes for deferred installs; repeatable.
    #[clap(long = "run-mode")]
    run_modes: Vec<String>,

    /// Install hook policy: prohibit, report, abort, or skip. Overrides the
    /// plan when given.
    #[clap(long)]
    hook_policy: Option<String>,

    /// Minimum severity that fails the scan.
    #[clap(long, default_value = "major")]
    fail_severity: String,

    /// Emit reports as JSON instead of text.
    #[clap(long)]
    json: bool,
}

pub fn run() -> Result<i32, anyhow::Error> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan(scan) => run_scan(scan),
    }
}

fn run_scan(args: ScanCli) -> Result<i32, anyhow::Error> {
    let fail_severity = Severity::by_name(&args.fail_severity)
        .ok_or_else(|| anyhow::anyhow!("unknown severity: {:?}", args.fail_severity))?;
    let hook_policy = match &args.hook_policy {
        Some(name) => Some(
            InstallHookPolicy::for_name(name)
                .ok_or_else(|| anyhow::anyhow!("unknown hook policy: {:?}", name))?,
        ),
        None => None,
    };

    let mut plan = match &args.plan {
        Some(path) => ScanPlan::from_file(path)?,
        None => ScanPlan::default(),
    };
    if !args.run_modes.is_empty() {
        plan.run_modes = args.run_modes.iter().cloned().collect::<BTreeSet<String>>();
    }
    if let Some(policy) = hook_policy {
        plan.install_hook_policy = Some(policy);
    }

    let mut scanner: Scanner = plan.build_scanner()?;
    let packages = args
        .packages
        .iter()
        .map(|path| Package::from_file(path))
        .collect::<Result<Vec<Package>, PlanError>>()?;

    let reports = match scanner.scan_packages(&packages) {
        Ok(reports) => reports,
        Err(error) => {
            eprintln!("{} {}", "scan aborted:".bright_red().bold(), error);
            return Ok(EXIT_ABORTED);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        render_text(&reports);
    }

    let failing = reports
        .iter()
        .any(|report| !report.violations_meeting(Some(fail_severity)).is_empty());
    Ok(if failing { EXIT_VIOLATIONS } else { 0 })
}

fn render_text(reports: &[CheckReport]) {
    let mut total = 0usize;
    for report in reports {
        if report.violations.is_empty() {
            continue;
        }
        println!("{}", report.check_name.bright_white().bold());
        for violation in &report.violations {
            let severity = match violation.severity {
                Severity::Minor => "MINOR".bright_blue(),
                Severity::Major => "MAJOR".bright_yellow(),
                Severity::Severe => "SEVERE".bright_red(),
            };
            print!("  [{}] {}", severity.bold(), violation.description);
            if !violation.packages.is_empty() {
                let ids: Vec<&str> = violation
                    .packages
                    .iter()
                    .map(|id| id.as_str())
                    .collect();
                print!(" {}", format!("({})", ids.join(", ")).bright_black());
            }
            println!();
            total += 1;
        }
    }
    if total == 0 {
        println!("{}", "No violations reported.".bright_green());
    } else {
        println!();
        println!("{} violation(s) reported.", total.to_string().bold());
    }
}
