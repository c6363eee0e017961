//! Package convergence
//!
//! Compare desired packages against what a host reports as installed and
//! produce the commands needed to converge. Pure: no I/O, no shared state,
//! safe to call concurrently for many hosts.

use crate::error::{Error, Result};
use crate::types::{
    CurrentPackages, EnsureOptions, PackageAction, PackageCommand, PackageEntry, Packages,
};

/// Desired entries split by what must happen to them
#[derive(Debug, Default)]
struct Classified<'a> {
    /// Install (present) or uninstall (absent) candidates
    diff: Vec<&'a PackageEntry>,
    /// Present, unpinned entries (install mode only)
    upgrade: Vec<&'a PackageEntry>,
}

fn classify<'a>(
    entries: &'a [PackageEntry],
    current: &CurrentPackages,
    present: bool,
) -> Classified<'a> {
    let mut classified = Classified::default();

    for entry in entries {
        let installed = current.get(&entry.name);

        let in_diff = match (&entry.version, installed, present) {
            (Some(_), None, true) => true,
            (Some(wanted), Some(have), true) => wanted != have,
            (None, installed, true) => installed.is_none(),
            (Some(wanted), Some(have), false) => wanted == have,
            (Some(_), None, false) => false,
            (None, installed, false) => installed.is_some(),
        };

        if in_diff {
            classified.diff.push(entry);
        }
        if present && entry.version.is_none() && installed.is_some() {
            classified.upgrade.push(entry);
        }
    }

    classified
}

/// Parse desired tokens into entries, applying lowercasing and version splitting.
pub fn parse_packages(packages: Packages, options: &EnsureOptions) -> Vec<PackageEntry> {
    let version_join = options.version_join.as_deref();
    packages
        .into_tokens()
        .iter()
        .map(|token| {
            let mut entry = PackageEntry::parse(token, version_join);
            if options.lower {
                entry.name = entry.name.to_lowercase();
            }
            entry
        })
        .collect()
}

/// Compute the commands that converge `current` to the desired packages.
///
/// Returns at most two commands, in this order: the install (or uninstall)
/// command, then the upgrade command when `latest` is set. Either is omitted
/// when it would name no packages. `None` packages yield no commands.
pub fn ensure_packages_plan(
    packages: Option<Packages>,
    current: Option<&CurrentPackages>,
    present: bool,
    options: &EnsureOptions,
) -> Result<Vec<PackageCommand>> {
    let upgrade_command = options.upgrade_prefix();
    if options.latest && upgrade_command.is_none() {
        return Err(Error::LatestWithoutUpgradeCommand);
    }

    let Some(packages) = packages else {
        return Ok(Vec::new());
    };

    let empty = CurrentPackages::new();
    let current = current.unwrap_or(&empty);

    let entries = parse_packages(packages, options);
    let classified = classify(&entries, current, present);
    let version_join = options.version_join.as_deref();

    let mut commands = Vec::with_capacity(2);

    if !classified.diff.is_empty() {
        let (action, prefix) = if present {
            (PackageAction::Install, options.install_command.as_str())
        } else {
            (PackageAction::Uninstall, options.uninstall_command.as_str())
        };
        let tokens = classified
            .diff
            .iter()
            .map(|entry| entry.render(version_join))
            .collect();
        commands.push(PackageCommand::new(action, prefix, tokens));
    }

    if let Some(prefix) = upgrade_command
        && options.latest
        && !classified.upgrade.is_empty()
    {
        let tokens = classified
            .upgrade
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        commands.push(PackageCommand::new(PackageAction::Upgrade, prefix, tokens));
    }

    Ok(commands)
}

/// Same as [`ensure_packages_plan`], returning only the command strings.
pub fn ensure_packages(
    packages: Option<Packages>,
    current: Option<&CurrentPackages>,
    present: bool,
    options: &EnsureOptions,
) -> Result<Vec<String>> {
    Ok(ensure_packages_plan(packages, current, present, options)?
        .into_iter()
        .map(|command| command.command)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(pairs: &[(&str, &str)]) -> CurrentPackages {
        pairs
            .iter()
            .map(|(name, version)| ((*name).to_string(), (*version).to_string()))
            .collect()
    }

    fn apt() -> EnsureOptions {
        EnsureOptions::new("apt-get install -y", "apt-get remove -y").with_version_join("=")
    }

    #[test]
    fn test_install_missing_and_mismatched() {
        let current = current(&[("nginx", "1.18"), ("vim", "8.0")]);
        let commands = ensure_packages(
            Some(vec!["nginx", "bash=5.0"].into()),
            Some(&current),
            true,
            &apt(),
        )
        .unwrap();

        assert_eq!(commands, vec!["apt-get install -y bash=5.0"]);
    }

    #[test]
    fn test_install_with_latest_upgrades_present() {
        let current = current(&[("nginx", "1.18"), ("vim", "8.0")]);
        let options = apt().with_latest(true).with_upgrade_command("upgrade");
        let commands =
            ensure_packages(Some(vec!["nginx", "bash=5.0"].into()), Some(&current), true, &options)
                .unwrap();

        assert_eq!(commands, vec!["apt-get install -y bash=5.0", "upgrade nginx"]);
    }

    #[test]
    fn test_uninstall_present() {
        let current = current(&[("vim", "8.0")]);
        let commands =
            ensure_packages(Some("vim".into()), Some(&current), false, &apt()).unwrap();

        assert_eq!(commands, vec!["apt-get remove -y vim"]);
    }

    #[test]
    fn test_uninstall_versioned_requires_matching_version() {
        let current = current(&[("vim", "8.0"), ("git", "2.40")]);
        let commands = ensure_packages(
            Some(vec!["vim=9.0", "git=2.40", "curl"].into()),
            Some(&current),
            false,
            &apt(),
        )
        .unwrap();

        assert_eq!(commands, vec!["apt-get remove -y git=2.40"]);
    }

    #[test]
    fn test_already_converged_is_empty() {
        let current = current(&[("nginx", "1.18"), ("bash", "5.0")]);
        let commands = ensure_packages(
            Some(vec!["nginx", "bash=5.0", "NGINX"].into()),
            Some(&current),
            true,
            &apt(),
        )
        .unwrap();

        assert!(commands.is_empty());
    }

    #[test]
    fn test_latest_without_upgrade_command_fails() {
        let options = apt().with_latest(true);
        for packages in [None, Some(Packages::from("vim")), Some(Vec::<String>::new().into())] {
            assert_eq!(
                ensure_packages(packages, None, true, &options),
                Err(Error::LatestWithoutUpgradeCommand)
            );
        }
    }

    #[test]
    fn test_latest_with_blank_upgrade_command_fails() {
        let current = current(&[("nginx", "1.18")]);
        for prefix in ["", "   "] {
            let options = apt().with_latest(true).with_upgrade_command(prefix);
            assert_eq!(
                ensure_packages(Some("nginx".into()), Some(&current), true, &options),
                Err(Error::LatestWithoutUpgradeCommand)
            );
        }
    }

    #[test]
    fn test_latest_upgrade_names_only_present_unpinned() {
        let current = current(&[("vim", "8.0"), ("git", "2.40")]);
        let options = apt().with_latest(true).with_upgrade_command("apt-get upgrade -y");
        let plan = ensure_packages_plan(
            Some(vec!["vim", "git=2.40"].into()),
            Some(&current),
            true,
            &options,
        )
        .unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].action, PackageAction::Upgrade);
        assert_eq!(plan[0].packages, vec!["vim"]);
        assert_eq!(plan[0].command, "apt-get upgrade -y vim");
    }

    #[test]
    fn test_latest_ignored_when_uninstalling() {
        let current = current(&[("vim", "8.0")]);
        let options = apt().with_latest(true).with_upgrade_command("upgrade");
        let commands = ensure_packages(Some("vim".into()), Some(&current), false, &options).unwrap();

        assert_eq!(commands, vec!["apt-get remove -y vim"]);
    }

    #[test]
    fn test_unset_packages_yield_nothing() {
        let current = current(&[("vim", "8.0")]);
        assert!(ensure_packages(None, Some(&current), true, &apt()).unwrap().is_empty());
        assert!(ensure_packages(None, Some(&current), false, &apt()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_current_treated_as_empty() {
        let commands =
            ensure_packages(Some(vec!["vim", "git=2.40"].into()), None, true, &apt()).unwrap();
        assert_eq!(commands, vec!["apt-get install -y vim git=2.40"]);

        let commands = ensure_packages(Some("vim".into()), None, false, &apt()).unwrap();
        assert!(commands.is_empty());
    }

    #[test]
    fn test_order_follows_desired_list() {
        let current = current(&[("aaa", "1"), ("zzz", "1")]);
        let options = apt().with_latest(true).with_upgrade_command("upgrade");
        let commands = ensure_packages(
            Some(vec!["zzz", "mmm", "aaa", "bbb"].into()),
            Some(&current),
            true,
            &options,
        )
        .unwrap();

        assert_eq!(
            commands,
            vec!["apt-get install -y mmm bbb", "upgrade zzz aaa"]
        );
    }

    #[test]
    fn test_lowercase_name_only() {
        let current = current(&[("python3", "3.11")]);
        let commands = ensure_packages(
            Some(vec!["Python3", "LibFoo=1.0-RC1"].into()),
            Some(&current),
            true,
            &apt(),
        )
        .unwrap();

        assert_eq!(commands, vec!["apt-get install -y libfoo=1.0-RC1"]);
    }

    #[test]
    fn test_no_lowercase_keeps_case() {
        let current = current(&[("python3", "3.11")]);
        let options = apt().with_lower(false);
        let commands =
            ensure_packages(Some("Python3".into()), Some(&current), true, &options).unwrap();

        assert_eq!(commands, vec!["apt-get install -y Python3"]);
    }

    #[test]
    fn test_without_version_join_token_is_a_name() {
        let current = current(&[("bash", "5.0")]);
        let options = EnsureOptions::new("pkg install", "pkg remove");
        let commands =
            ensure_packages(Some("bash=5.0".into()), Some(&current), true, &options).unwrap();

        assert_eq!(commands, vec!["pkg install bash=5.0"]);
    }

    #[test]
    fn test_emitted_versioned_tokens_reparse() {
        let current = current(&[("bash", "4.4")]);
        let plan = ensure_packages_plan(
            Some(vec!["bash=5.0", "zlib=1.3=r1"].into()),
            Some(&current),
            true,
            &apt(),
        )
        .unwrap();

        let expected = [
            PackageEntry::new("bash").with_version("5.0"),
            PackageEntry::new("zlib").with_version("1.3=r1"),
        ];
        for (token, entry) in plan[0].packages.iter().zip(expected.iter()) {
            assert_eq!(&PackageEntry::parse(token, Some("=")), entry);
        }
    }
}
