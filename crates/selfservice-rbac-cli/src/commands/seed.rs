use std::fs;

use anyhow::{Context, Result};
use selfservice_rbac::seed::build_seed;
use time::OffsetDateTime;

use crate::cli::SeedCli;
use crate::output::print_seed_written;

/// Write the seed CSVs for every declared role. Needs no credential.
pub fn run(args: &SeedCli) -> Result<()> {
    let config = super::load_config(&args.config.config)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let seed = build_seed(&config.roles, OffsetDateTime::now_utc())?;
    let (roles, grants) = seed
        .write_to_dir(&args.out_dir)
        .with_context(|| format!("Failed to write seed files to {}", args.out_dir.display()))?;

    print_seed_written(&roles, &grants);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;

    #[test]
    fn test_writes_seed_files_into_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"roles":[{"name":"Owner","existingId":"R1","permissions":{"topics":["read"]}}]}"#,
        )
        .unwrap();
        let out_dir = dir.path().join("seed");

        run(&SeedCli {
            config: ConfigArgs {
                config: config_path,
            },
            out_dir: out_dir.clone(),
        })
        .unwrap();

        let roles = fs::read_to_string(out_dir.join("RbacRole.csv")).unwrap();
        assert!(roles.lines().nth(1).unwrap().starts_with("R1;"));
        let grants = fs::read_to_string(out_dir.join("RbacPermissionGrants.csv")).unwrap();
        assert!(grants.lines().nth(1).unwrap().contains(";Role;R1;topics;read;Global;"));
    }

    #[test]
    fn test_missing_config_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&SeedCli {
            config: ConfigArgs {
                config: dir.path().join("absent.json"),
            },
            out_dir: dir.path().to_path_buf(),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
