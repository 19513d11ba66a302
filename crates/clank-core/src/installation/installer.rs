//! Download and installation of the managed server
//!
//! Installs one pinned release into the managed storage root. The sequence is
//! download → extract in a staging scope → remove any prior installation →
//! move the new tree into place → restore the executable bit. The staging
//! scope is a [`tempfile::TempDir`] created next to the managed root, so it
//! is removed on every exit path and the final move stays on one filesystem.
//! Re-running after an interrupted attempt converges: stale state is cleared
//! unconditionally before the new tree is committed.

use crate::config::SESSION_NAME;
use crate::errors::ManagerError;
use crate::installation::ServerProvisioner;
use crate::platform::Platform;
use async_trait::async_trait;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use zip::ZipArchive;

const DOWNLOAD_BASE_URL: &str = "https://github.com/clangd/clangd/releases/download";
const DOWNLOAD_USER_AGENT: &str = "clank-installer";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Downloads and installs a pinned server release into the managed root
#[derive(Debug, Clone)]
pub struct Installer {
    client: reqwest::Client,
    managed_root: PathBuf,
    platform: Platform,
    download_base: String,
}

impl Installer {
    pub fn new(managed_root: PathBuf) -> Result<Self, ManagerError> {
        let client = reqwest::Client::builder()
            .user_agent(DOWNLOAD_USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| ManagerError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            managed_root,
            platform: Platform::current(),
            download_base: DOWNLOAD_BASE_URL.to_string(),
        })
    }

    /// Override the detected platform (used by tests)
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Point downloads at a different host (used by tests)
    pub fn with_download_base(mut self, download_base: String) -> Self {
        self.download_base = download_base;
        self
    }

    pub fn managed_root(&self) -> &Path {
        &self.managed_root
    }

    fn archive_name(&self, version: &str) -> String {
        format!(
            "{}-{}-{}.zip",
            SESSION_NAME,
            self.platform.artifact_token(),
            version
        )
    }

    fn download_url(&self, version: &str) -> String {
        format!(
            "{}/{}/{}",
            self.download_base,
            version,
            self.archive_name(version)
        )
    }

    /// Download and install `version`, returning the new binary path
    pub async fn install(&self, version: &str) -> Result<PathBuf, ManagerError> {
        let url = self.download_url(version);
        log::info!("{}: Downloading server from {}", SESSION_NAME, url);

        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| ManagerError::Download {
                    message: e.to_string(),
                })?;
        if !response.status().is_success() {
            return Err(ManagerError::Download {
                message: format!("{} returned status {}", url, response.status()),
            });
        }
        let archive = response.bytes().await.map_err(|e| ManagerError::Download {
            message: e.to_string(),
        })?;

        self.install_archive(version, &archive).await
    }

    /// Extraction and commit tail of [`install`](Self::install): everything
    /// after the archive bytes have been fetched.
    pub async fn install_archive(
        &self,
        version: &str,
        archive: &[u8],
    ) -> Result<PathBuf, ManagerError> {
        let staging_parent = match self.managed_root.parent() {
            Some(parent) => parent.to_path_buf(),
            None => self.managed_root.clone(),
        };
        fs::create_dir_all(&staging_parent)?;

        // Removed on drop, success or failure.
        let staging = tempfile::Builder::new()
            .prefix("clangd-install")
            .tempdir_in(&staging_parent)?;

        let archive_path = staging.path().join(self.archive_name(version));
        fs::write(&archive_path, archive)?;

        log::info!("{}: Extracting server...", SESSION_NAME);
        let extract_dir = staging.path().join("extracted");
        fs::create_dir_all(&extract_dir)?;
        extract_zip(&archive_path, &extract_dir)?;

        // The archive carries a single clangd_<version>/ tree at its root.
        let versioned_dir = format!("{}_{}", SESSION_NAME, version);
        let extracted_tree = extract_dir.join(&versioned_dir);
        if !extracted_tree.is_dir() {
            return Err(ManagerError::Extraction {
                message: format!("archive did not contain a {} directory", versioned_dir),
            });
        }

        // Any prior installation goes away wholesale; the managed root holds
        // at most one installation and is never merged into.
        if self.managed_root.exists() {
            fs::remove_dir_all(&self.managed_root)?;
        }
        fs::create_dir_all(&self.managed_root)?;

        let installed_tree = self.managed_root.join(&versioned_dir);
        fs::rename(&extracted_tree, &installed_tree)?;

        let binary_path = installed_tree
            .join("bin")
            .join(self.platform.binary_name(SESSION_NAME));
        if !binary_path.is_file() {
            // The archive layout changed upstream; nothing to retry.
            return Err(ManagerError::InstallationInvariant {
                message: format!(
                    "server binary missing at {} after extraction",
                    binary_path.display()
                ),
            });
        }
        make_executable(&binary_path)?;

        log::info!(
            "{}: Installed release {} at {}",
            SESSION_NAME,
            version,
            binary_path.display()
        );
        Ok(binary_path)
    }
}

#[async_trait]
impl ServerProvisioner for Installer {
    async fn provision(&self, version: &str) -> Result<PathBuf, ManagerError> {
        self.install(version).await
    }
}

fn extract_zip(archive_path: &Path, target_dir: &Path) -> Result<(), ManagerError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ManagerError::Extraction {
        message: format!("failed to read zip archive: {}", e),
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| ManagerError::Extraction {
            message: format!("failed to read archive entry: {}", e),
        })?;

        let outpath = match entry.enclosed_name() {
            Some(path) => target_dir.join(path),
            None => continue,
        };

        if entry.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }
    Ok(())
}

/// Restore the executable bit; zip archives may not preserve it
fn make_executable(binary_path: &Path) -> Result<(), ManagerError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(binary_path)?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(binary_path, permissions)?;
    }
    #[cfg(not(unix))]
    {
        let _ = binary_path;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    /// Build a release-shaped archive: clangd_<version>/bin/clangd [+ extras]
    pub(crate) fn release_archive(version: &str, binary_mode: u32) -> Vec<u8> {
        let cursor = io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(cursor);
        let tree = format!("clangd_{}", version);

        writer
            .add_directory(format!("{}/bin/", tree), SimpleFileOptions::default())
            .unwrap();
        writer
            .start_file(
                format!("{}/bin/clangd", tree),
                SimpleFileOptions::default().unix_permissions(binary_mode),
            )
            .unwrap();
        writer.write_all(b"#!/bin/sh\nexit 0\n").unwrap();
        writer
            .start_file(
                format!("{}/lib/clang/{}/include/stddef.h", tree, version),
                SimpleFileOptions::default(),
            )
            .unwrap();
        writer.write_all(b"/* fixture */\n").unwrap();

        writer.finish().unwrap().into_inner()
    }

    fn test_installer(managed_root: PathBuf) -> Installer {
        Installer::new(managed_root).unwrap().with_platform(Platform {
            os: "linux".to_string(),
        })
    }

    fn installed_dirs(managed_root: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(managed_root)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn install_archive_commits_a_complete_tree() {
        let temp_dir = tempdir().unwrap();
        let managed_root = temp_dir.path().join("LSP-clangd");
        let installer = test_installer(managed_root.clone());

        let archive = release_archive("15.0.1", 0o755);
        let binary = installer.install_archive("15.0.1", &archive).await.unwrap();

        assert_eq!(binary, managed_root.join("clangd_15.0.1/bin/clangd"));
        assert!(binary.is_file());
        assert!(managed_root
            .join("clangd_15.0.1/lib/clang/15.0.1/include/stddef.h")
            .is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn lost_executable_bit_is_repaired() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let installer = test_installer(temp_dir.path().join("LSP-clangd"));

        // Archive stored the binary without any execute bits.
        let archive = release_archive("15.0.1", 0o644);
        let binary = installer.install_archive("15.0.1", &archive).await.unwrap();

        let mode = fs::metadata(&binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o755, 0o755);
    }

    #[tokio::test]
    async fn repeated_install_leaves_exactly_one_installation() {
        let temp_dir = tempdir().unwrap();
        let managed_root = temp_dir.path().join("LSP-clangd");
        let installer = test_installer(managed_root.clone());

        let archive = release_archive("15.0.1", 0o755);
        installer.install_archive("15.0.1", &archive).await.unwrap();
        installer.install_archive("15.0.1", &archive).await.unwrap();

        assert_eq!(installed_dirs(&managed_root), vec!["clangd_15.0.1"]);
    }

    #[tokio::test]
    async fn prior_version_is_replaced_not_merged() {
        let temp_dir = tempdir().unwrap();
        let managed_root = temp_dir.path().join("LSP-clangd");
        let installer = test_installer(managed_root.clone());

        installer
            .install_archive("14.0.0", &release_archive("14.0.0", 0o755))
            .await
            .unwrap();
        installer
            .install_archive("15.0.1", &release_archive("15.0.1", 0o755))
            .await
            .unwrap();

        assert_eq!(installed_dirs(&managed_root), vec!["clangd_15.0.1"]);
    }

    #[tokio::test]
    async fn interrupted_leftovers_are_cleared_by_the_next_run() {
        let temp_dir = tempdir().unwrap();
        let managed_root = temp_dir.path().join("LSP-clangd");

        // Simulate a half-finished prior attempt inside the managed root.
        fs::create_dir_all(managed_root.join("clangd_15.0.1")).unwrap();
        fs::write(managed_root.join("clangd_15.0.1/partial"), b"junk").unwrap();

        let installer = test_installer(managed_root.clone());
        installer
            .install_archive("15.0.1", &release_archive("15.0.1", 0o755))
            .await
            .unwrap();

        assert_eq!(installed_dirs(&managed_root), vec!["clangd_15.0.1"]);
        assert!(!managed_root.join("clangd_15.0.1/partial").exists());
        assert!(managed_root.join("clangd_15.0.1/bin/clangd").is_file());
    }

    #[tokio::test]
    async fn garbage_bytes_fail_extraction_and_leave_no_staging() {
        let temp_dir = tempdir().unwrap();
        let managed_root = temp_dir.path().join("LSP-clangd");
        let installer = test_installer(managed_root.clone());

        let result = installer.install_archive("15.0.1", b"not a zip").await;
        assert!(matches!(result, Err(ManagerError::Extraction { .. })));

        // The staging scope is gone from the managed root's parent.
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("clangd-install"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn archive_without_the_binary_is_an_invariant_failure() {
        let temp_dir = tempdir().unwrap();
        let installer = test_installer(temp_dir.path().join("LSP-clangd"));

        // Versioned tree present, bin/clangd absent: layout changed upstream.
        let cursor = io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(cursor);
        writer
            .start_file("clangd_15.0.1/README.md", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"no binary here\n").unwrap();
        let archive = writer.finish().unwrap().into_inner();

        let result = installer.install_archive("15.0.1", &archive).await;
        assert!(matches!(
            result,
            Err(ManagerError::InstallationInvariant { .. })
        ));
    }

    #[tokio::test]
    async fn archive_missing_the_versioned_tree_is_an_extraction_failure() {
        let temp_dir = tempdir().unwrap();
        let installer = test_installer(temp_dir.path().join("LSP-clangd"));

        let cursor = io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(cursor);
        writer
            .start_file("bin/clangd", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"#!/bin/sh\n").unwrap();
        let archive = writer.finish().unwrap().into_inner();

        let result = installer.install_archive("15.0.1", &archive).await;
        assert!(matches!(result, Err(ManagerError::Extraction { .. })));
    }

    #[test]
    fn download_url_uses_the_artifact_naming_scheme() {
        let installer = Installer::new(PathBuf::from("/tmp/LSP-clangd"))
            .unwrap()
            .with_platform(Platform {
                os: "macos".to_string(),
            });
        assert_eq!(
            installer.download_url("15.0.1"),
            "https://github.com/clangd/clangd/releases/download/15.0.1/clangd-mac-15.0.1.zip"
        );
    }
}
