use anyhow::Result;
use serde::Serialize;

use bistro_core::models::{NotificationPrefs, ProfileUpdate};
use bistro_core::service::BistroService;

use crate::config::Config;

use super::helpers::print_session;

pub(crate) fn cmd_onboard(
    svc: &BistroService,
    first_name: &str,
    email: &str,
    json: bool,
) -> Result<()> {
    let session = svc.onboard(first_name, email)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        let name = session.first_name.as_deref().unwrap_or(first_name);
        println!("Welcome, {name}! Run `bistro menu` to browse the menu.");
    }

    Ok(())
}

pub(crate) fn cmd_profile_show(svc: &BistroService, json: bool) -> Result<()> {
    let session = svc.session()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else if !session.onboarding_completed {
        println!("Not onboarded. Run `bistro onboard` to get started.");
    } else {
        print_session(&session);
    }

    Ok(())
}

/// Notification flag overrides from the command line. `None` keeps the
/// stored value.
#[derive(Debug, Default, Clone, Copy)]
#[allow(clippy::struct_field_names)]
pub(crate) struct NotificationFlags {
    pub order_statuses: Option<bool>,
    pub password_changes: Option<bool>,
    pub special_offers: Option<bool>,
    pub newsletter: Option<bool>,
}

impl NotificationFlags {
    fn is_empty(&self) -> bool {
        self.order_statuses.is_none()
            && self.password_changes.is_none()
            && self.special_offers.is_none()
            && self.newsletter.is_none()
    }

    fn merge(&self, current: NotificationPrefs) -> NotificationPrefs {
        NotificationPrefs {
            order_statuses: self.order_statuses.unwrap_or(current.order_statuses),
            password_changes: self.password_changes.unwrap_or(current.password_changes),
            special_offers: self.special_offers.unwrap_or(current.special_offers),
            newsletter: self.newsletter.unwrap_or(current.newsletter),
        }
    }
}

pub(crate) fn cmd_profile_update(
    svc: &BistroService,
    mut update: ProfileUpdate,
    flags: NotificationFlags,
    json: bool,
) -> Result<()> {
    if !flags.is_empty() {
        let current = svc.session()?.notifications;
        update.notifications = Some(flags.merge(current));
    }
    let session = svc.update_profile(&update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("Profile saved.");
        print_session(&session);
    }

    Ok(())
}

pub(crate) fn cmd_logout(svc: &BistroService, json: bool) -> Result<()> {
    svc.logout()?;

    if json {
        println!(r#"{{"logged_out":true}}"#);
    } else {
        println!("Logged out. Profile and cached menu cleared.");
    }

    Ok(())
}

pub(crate) fn cmd_status(svc: &BistroService, config: &Config, json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct Status<'a> {
        onboarded: bool,
        cached_items: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        menu_store_error: Option<String>,
        data_dir: String,
        menu_url: &'a str,
    }

    let (cached_items, menu_store_error) = match svc.cached_item_count() {
        Ok(count) => (Some(count), None),
        Err(e) if e.is_storage_init() => (None, Some(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    let status = Status {
        onboarded: svc.is_onboarded()?,
        cached_items,
        menu_store_error,
        data_dir: config.data_dir.display().to_string(),
        menu_url: &config.menu_url,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("Onboarded:     {}", if status.onboarded { "yes" } else { "no" });
        match (status.cached_items, &status.menu_store_error) {
            (Some(count), _) => println!("Cached items:  {count}"),
            (None, Some(err)) => println!("Cached items:  unavailable ({err})"),
            (None, None) => println!("Cached items:  unavailable"),
        }
        println!("Data dir:      {}", status.data_dir);
        println!("Menu source:   {}", status.menu_url);
    }

    Ok(())
}
