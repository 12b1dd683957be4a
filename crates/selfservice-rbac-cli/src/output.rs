use std::path::Path;

use colored::Colorize;
use selfservice_rbac::ownership::SkipReason;
use selfservice_rbac::{BootstrapReport, ReconcileReport};
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn baseline_table(report: &ReconcileReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Change", "Count"]);
    builder.push_record(["Roles created".to_string(), report.roles_created.to_string()]);
    builder.push_record([
        "Permissions granted".to_string(),
        report.permissions_granted.to_string(),
    ]);
    builder.push_record(["Groups created".to_string(), report.groups_created.to_string()]);
    builder.push_record([
        "Group roles assigned".to_string(),
        report.group_roles_assigned.to_string(),
    ]);
    builder.push_record(["Members added".to_string(), report.members_added.to_string()]);
    builder.push_record([
        "Needs manual review".to_string(),
        report.anomalies.len().to_string(),
    ]);
    builder.build().with(Style::rounded()).to_string()
}

pub fn print_baseline_report(report: &ReconcileReport) {
    println!("{}", baseline_table(report));
    for anomaly in &report.anomalies {
        print_warning(&anomaly.to_string());
    }
    print_success(&format!(
        "Baseline permissions setup completed ({} changes)",
        report.changes()
    ));
}

pub fn ownership_table(report: &BootstrapReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Capabilities", "Owner grants", "Contributor grants", "Skipped"]);
    builder.push_record([
        report.processed.to_string(),
        report.owner_grants.to_string(),
        report.contributor_grants.to_string(),
        report.skipped.len().to_string(),
    ]);
    builder.build().with(Style::rounded()).to_string()
}

pub fn print_ownership_report(report: &BootstrapReport) {
    println!("{}", ownership_table(report));

    let failures: Vec<_> = report
        .skipped
        .iter()
        .filter(|(_, reason)| !matches!(reason, SkipReason::Deleted))
        .collect();
    if !failures.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Capability", "Reason"]);
        for (id, reason) in failures {
            builder.push_record([id.clone(), reason.to_string()]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    print_success(&format!(
        "Capability ownership bootstrap completed ({} grants)",
        report.grants()
    ));
}

pub fn print_seed_written(roles: &Path, grants: &Path) {
    print_success(&format!("Wrote {}", roles.display()));
    print_success(&format!("Wrote {}", grants.display()));
}
