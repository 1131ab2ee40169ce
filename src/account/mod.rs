use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use validator::Validate;

use crate::error::AppError;
use crate::models::account::PreferenceKey;
use crate::models::{Account, AppSettings, Profile};
use crate::services::simulation::{FaultSite, Simulation, UNDEFINED};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNotice {
    pub message: String,
}

impl AccountNotice {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSaved {
    pub profile: Profile,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceToggled {
    pub key: PreferenceKey,
    pub enabled: bool,
}

/// Settings of the single demo user.
#[derive(Clone)]
pub struct AccountService {
    account: Arc<RwLock<Account>>,
    simulation: Simulation,
}

impl AccountService {
    pub fn new(account: Account, simulation: Simulation) -> Self {
        Self { account: Arc::new(RwLock::new(account)), simulation }
    }

    pub fn with_demo_user(simulation: Simulation) -> Self {
        Self::new(Account::default(), simulation)
    }

    pub async fn get(&self) -> Account {
        self.account.read().await.clone()
    }

    /// The profile is stored even when the confirmation message goes missing.
    pub async fn update_profile(&self, profile: Profile) -> Result<ProfileSaved, AppError> {
        profile.validate()?;
        info!("Saving profile for {} {}", profile.first_name, profile.last_name);
        self.account.write().await.profile = profile.clone();

        let message = if self.simulation.trips(FaultSite::ProfileSave) {
            UNDEFINED.to_string()
        } else {
            "Profile saved successfully!".to_string()
        };
        Ok(ProfileSaved { profile, message })
    }

    pub async fn toggle_preference(&self, key: PreferenceKey) -> PreferenceToggled {
        let enabled = self.account.write().await.preferences.toggle(key);
        debug!("Preference {:?} toggled to {}", key, enabled);
        PreferenceToggled { key, enabled }
    }

    pub async fn update_settings(&self, settings: AppSettings) -> Result<AppSettings, AppError> {
        settings.validate()?;
        self.account.write().await.settings = settings.clone();
        Ok(settings)
    }

    /// The theme selector never opens while its fault is active; the current
    /// settings come back unchanged.
    pub async fn set_theme(&self, theme: &str) -> Result<AppSettings, AppError> {
        let mut account = self.account.write().await;
        if self.simulation.trips(FaultSite::ThemeSelector) {
            return Ok(account.settings.clone());
        }
        let candidate = AppSettings { theme: theme.to_string(), ..account.settings.clone() };
        candidate.validate()?;
        account.settings = candidate;
        Ok(account.settings.clone())
    }

    pub async fn reset_settings(&self) -> AppSettings {
        let mut account = self.account.write().await;
        account.settings = AppSettings::default();
        info!("Application settings reset to defaults");
        account.settings.clone()
    }

    pub async fn request_password_reset(&self) -> AccountNotice {
        let email = self.account.read().await.profile.email.clone();
        info!("Password reset requested for {}", email);
        AccountNotice::new("Password reset email sent!")
    }

    pub async fn delete_account(&self, confirmed: bool) -> Result<AccountNotice, AppError> {
        if self.simulation.trips(FaultSite::AccountDelete) {
            return Err(AppError::Unavailable("Account deletion temporarily unavailable".to_string()));
        }
        if !confirmed {
            return Ok(AccountNotice::new("Account deletion cancelled"));
        }
        info!("Account deletion initiated");
        Ok(AccountNotice::new(
            "Account deletion initiated. You will receive a confirmation email.",
        ))
    }

    pub async fn export_data(&self) -> AccountNotice {
        info!("Exporting user data");
        AccountNotice::new("Data export will be emailed to you within 24 hours")
    }
}
