//! Interactive consent for widening a `system` strategy to auto-install

use clank_core::{FallbackDecision, InstallConsent};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

/// Asks on the terminal whether a missing system binary may be auto-installed.
///
/// A one-shot CLI run has no settings store, so accepting only widens the
/// current cycle; hosts with persistent settings save the `auto` strategy in
/// their own `InstallConsent` implementation.
pub struct PromptConsent;

impl InstallConsent for PromptConsent {
    fn system_binary_missing(&self) -> FallbackDecision {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(
                "clangd was not found in your path. Would you like to auto-install clangd from GitHub?",
            )
            .interact()
            .unwrap_or(false);
        if confirmed {
            FallbackDecision::AutoInstall
        } else {
            FallbackDecision::Decline
        }
    }
}
