use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

pub const LANGUAGES: [&str; 5] = ["en", "es", "fr", "de", "ja"];
pub const TIMEZONES: [&str; 5] = [
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "UTC",
];
pub const CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "CAD", "JPY"];
pub const THEMES: [&str; 3] = ["light", "dark", "auto"];
/// Minutes; 0 means never.
pub const AUTO_LOGOUT_MINUTES: [u32; 5] = [15, 30, 60, 120, 0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
}

impl Profile {
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub marketing_emails: bool,
    pub event_reminders: bool,
    pub weekly_digest: bool,
    pub push_notifications: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreferenceKey {
    EmailNotifications,
    SmsNotifications,
    MarketingEmails,
    EventReminders,
    WeeklyDigest,
    PushNotifications,
}

impl FromStr for PreferenceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emailNotifications" => Ok(PreferenceKey::EmailNotifications),
            "smsNotifications" => Ok(PreferenceKey::SmsNotifications),
            "marketingEmails" => Ok(PreferenceKey::MarketingEmails),
            "eventReminders" => Ok(PreferenceKey::EventReminders),
            "weeklyDigest" => Ok(PreferenceKey::WeeklyDigest),
            "pushNotifications" => Ok(PreferenceKey::PushNotifications),
            other => Err(format!("unknown preference '{other}'")),
        }
    }
}

impl Preferences {
    fn slot(&mut self, key: PreferenceKey) -> &mut bool {
        match key {
            PreferenceKey::EmailNotifications => &mut self.email_notifications,
            PreferenceKey::SmsNotifications => &mut self.sms_notifications,
            PreferenceKey::MarketingEmails => &mut self.marketing_emails,
            PreferenceKey::EventReminders => &mut self.event_reminders,
            PreferenceKey::WeeklyDigest => &mut self.weekly_digest,
            PreferenceKey::PushNotifications => &mut self.push_notifications,
        }
    }

    /// Flips one preference and returns its new value.
    pub fn toggle(&mut self, key: PreferenceKey) -> bool {
        let slot = self.slot(key);
        *slot = !*slot;
        *slot
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            email_notifications: true,
            sms_notifications: false,
            marketing_emails: true,
            event_reminders: true,
            weekly_digest: false,
            push_notifications: true,
        }
    }
}

fn one_of(value: &str, allowed: &[&str], code: &'static str) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(code))
    }
}

fn known_language(value: &str) -> Result<(), ValidationError> {
    one_of(value, &LANGUAGES, "unsupported_language")
}

fn known_timezone(value: &str) -> Result<(), ValidationError> {
    one_of(value, &TIMEZONES, "unsupported_timezone")
}

fn known_currency(value: &str) -> Result<(), ValidationError> {
    one_of(value, &CURRENCIES, "unsupported_currency")
}

fn known_theme(value: &str) -> Result<(), ValidationError> {
    one_of(value, &THEMES, "unsupported_theme")
}

fn known_auto_logout(value: u32) -> Result<(), ValidationError> {
    if AUTO_LOGOUT_MINUTES.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_auto_logout"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[validate(custom(function = "known_language"))]
    pub language: String,
    #[validate(custom(function = "known_timezone"))]
    pub timezone: String,
    #[validate(custom(function = "known_currency"))]
    pub currency: String,
    #[validate(custom(function = "known_theme"))]
    pub theme: String,
    #[validate(custom(function = "known_auto_logout"))]
    pub auto_logout: u32,
    pub two_factor_auth: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            language: "en".to_string(),
            timezone: "America/New_York".to_string(),
            currency: "USD".to_string(),
            theme: "light".to_string(),
            auto_logout: 30,
            two_factor_auth: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub profile: Profile,
    pub preferences: Preferences,
    pub settings: AppSettings,
}

impl Default for Account {
    fn default() -> Self {
        Account {
            profile: Profile {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                phone: "+1 (555) 123-4567".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15),
                address: "123 Main St, New York, NY 10001".to_string(),
            },
            preferences: Preferences::default(),
            settings: AppSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_a_preference_flips_only_that_flag() {
        let mut prefs = Preferences::default();
        assert!(prefs.toggle(PreferenceKey::SmsNotifications));
        assert!(prefs.sms_notifications);
        assert!(prefs.email_notifications);
        assert!(!prefs.toggle(PreferenceKey::SmsNotifications));
    }

    #[test]
    fn preference_keys_parse_from_camel_case() {
        assert_eq!("weeklyDigest".parse(), Ok(PreferenceKey::WeeklyDigest));
        assert!("weekly_digest".parse::<PreferenceKey>().is_err());
    }

    #[test]
    fn settings_reject_unknown_choices() {
        let mut settings = AppSettings::default();
        assert!(settings.validate().is_ok());
        settings.currency = "BTC".to_string();
        settings.auto_logout = 45;
        let errors = settings.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("currency"));
        assert!(fields.contains_key("auto_logout"));
    }

    #[test]
    fn default_profile_is_valid_and_has_initials() {
        let account = Account::default();
        assert!(account.profile.validate().is_ok());
        assert_eq!(account.profile.initials(), "JD");
    }
}
