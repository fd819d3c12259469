mod helpers;
mod menu;
mod profile;

use anyhow::{Result, bail};

use bistro_core::service::BistroService;

use crate::config::Config;

pub(crate) use menu::{cmd_categories, cmd_menu};
pub(crate) use profile::{
    NotificationFlags, cmd_logout, cmd_onboard, cmd_profile_show, cmd_profile_update, cmd_status,
};

pub(crate) fn open_service(config: &Config) -> Result<BistroService> {
    Ok(BistroService::new(
        &config.menu_db_path,
        &config.profile_db_path,
    )?)
}

/// Menu screens are only reachable after onboarding.
pub(super) fn require_onboarding(svc: &BistroService) -> Result<()> {
    if !svc.is_onboarded()? {
        bail!("Complete onboarding first: bistro onboard --first-name <NAME> --email <EMAIL>");
    }
    Ok(())
}
