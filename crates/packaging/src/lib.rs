//! # Packaging
//!
//! Compute the commands that converge a host's installed packages to a
//! desired list.
//!
//! The reconciler is a pure function: it takes the desired packages, the
//! packages a host reports as installed, and package-manager specific
//! command prefixes, and returns command strings. Running them is somebody
//! else's job.
//!
//! ## Example
//!
//! ```
//! use packaging::{CurrentPackages, EnsureOptions, ensure_packages};
//!
//! let mut current = CurrentPackages::new();
//! current.insert("nginx".into(), "1.18".into());
//!
//! let options = EnsureOptions::new("apt-get install -y", "apt-get remove -y")
//!     .with_version_join("=")
//!     .with_latest(true)
//!     .with_upgrade_command("apt-get install -y --only-upgrade");
//!
//! let commands = ensure_packages(
//!     Some(vec!["nginx", "bash=5.0"].into()),
//!     Some(&current),
//!     true,
//!     &options,
//! )?;
//!
//! assert_eq!(
//!     commands,
//!     vec![
//!         "apt-get install -y bash=5.0",
//!         "apt-get install -y --only-upgrade nginx",
//!     ]
//! );
//! # Ok::<(), packaging::Error>(())
//! ```

pub mod ensure;
pub mod error;
pub mod types;

pub use ensure::{ensure_packages, ensure_packages_plan, parse_packages};
pub use error::{Error, Result};
pub use types::{
    CurrentPackages, EnsureOptions, PackageAction, PackageCommand, PackageEntry, Packages,
};
