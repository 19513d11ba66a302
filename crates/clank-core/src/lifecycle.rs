//! Server start orchestration
//!
//! One pass per server start: CHECK the configured strategy for a usable
//! binary, INSTALL when the strategy permits it, COMPILE the launch command
//! from the current settings snapshot. The result is never cached across
//! cycles; settings may change between restarts.

use crate::command;
use crate::config::{BinaryStrategy, ClangdConfig, SESSION_NAME};
use crate::errors::ManagerError;
use crate::installation::{BinaryLocator, Installer, ServerProvisioner};
use std::path::PathBuf;
use std::sync::Arc;

/// Host's answer when the `system` strategy finds no binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    /// Widen this cycle to managed installation. The implementation persists
    /// the strategy change to `auto` in the host's settings.
    AutoInstall,
    /// Abort this start cycle without installing anything
    Decline,
}

/// Collaborator deciding whether a missing system binary may be auto-installed
pub trait InstallConsent: Send + Sync {
    fn system_binary_missing(&self) -> FallbackDecision;
}

/// Consent policy that never widens the strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverInstall;

impl InstallConsent for NeverInstall {
    fn system_binary_missing(&self) -> FallbackDecision {
        FallbackDecision::Decline
    }
}

/// Orchestrates resolution, installation, and command compilation
pub struct LifecycleController {
    locator: BinaryLocator,
    provisioner: Arc<dyn ServerProvisioner>,
    consent: Arc<dyn InstallConsent>,
    pinned_version: String,
}

impl LifecycleController {
    pub fn new(
        managed_root: PathBuf,
        pinned_version: impl Into<String>,
        consent: Arc<dyn InstallConsent>,
    ) -> Result<Self, ManagerError> {
        let pinned_version = pinned_version.into();
        let installer = Installer::new(managed_root.clone())?;
        Ok(Self {
            locator: BinaryLocator::new(managed_root, pinned_version.clone()),
            provisioner: Arc::new(installer),
            consent,
            pinned_version,
        })
    }

    /// Substitute the provisioner (used by tests)
    pub fn with_provisioner(mut self, provisioner: Arc<dyn ServerProvisioner>) -> Self {
        self.provisioner = provisioner;
        self
    }

    /// Whether the configured strategy currently resolves no binary.
    ///
    /// `custom` never needs installation; its command is taken verbatim.
    pub fn needs_installation(&self, config: &ClangdConfig) -> bool {
        if config.binary == BinaryStrategy::Custom {
            return false;
        }
        self.locator
            .resolve(config.binary, config.system_binary.as_deref())
            .is_none()
    }

    /// Resolve (installing when permitted) and compile the launch command.
    ///
    /// Returns `Ok(None)` when the host declines installation under the
    /// `system` strategy; that is an aborted start cycle, not a failure.
    pub async fn ensure_ready_and_build_command(
        &self,
        config: &ClangdConfig,
    ) -> Result<Option<Vec<String>>, ManagerError> {
        if config.binary == BinaryStrategy::Custom {
            let launch = command::compile(&config.custom_command, &config.settings)?;
            return Ok(Some(launch));
        }

        let mut strategy = config.binary;
        let system_hint = config.system_binary.as_deref();
        let mut resolved = self.locator.resolve(strategy, system_hint);

        if resolved.is_none() && strategy == BinaryStrategy::System {
            match self.consent.system_binary_missing() {
                // The consent implementation saves the new `auto` setting;
                // here it only widens the current cycle.
                FallbackDecision::AutoInstall => strategy = BinaryStrategy::Auto,
                FallbackDecision::Decline => {
                    log::info!(
                        "{}: no system binary and installation declined, start cycle aborted",
                        SESSION_NAME
                    );
                    return Ok(None);
                }
            }
        }

        if resolved.is_none() {
            self.provisioner.provision(&self.pinned_version).await?;
            resolved = self.locator.resolve(strategy, system_hint);
        }

        let binary = resolved.ok_or_else(|| ManagerError::NotInstalled {
            reason: format!(
                "no usable {} binary was found after installation",
                SESSION_NAME
            ),
        })?;

        let base_command = vec![binary.to_string_lossy().into_owned()];
        let launch = command::compile(&base_command, &config.settings)?;
        Ok(Some(launch))
    }
}
