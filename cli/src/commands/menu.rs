use std::process;

use anyhow::Result;

use bistro_core::ErrorKind;
use bistro_core::filter::{MenuFilter, SearchOutcome};
use bistro_core::service::BistroService;
use bistro_core::sync::MenuEvent;

use crate::menu_client::HttpMenuClient;

use super::helpers::{json_error, print_menu_table};
use super::require_onboarding;

/// What to tell the user when no menu could be loaded.
fn unavailable_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Network => "Menu unavailable. Check your connection and try again.",
        ErrorKind::Parse => "Menu unavailable. The menu document could not be read.",
        _ => "Menu unavailable.",
    }
}

/// Run the sync flow, printing a loading line when a fetch will happen.
/// Returns `false` when no menu could be loaded.
async fn load_menu(svc: &mut BistroService, client: &HttpMenuClient, json: bool) -> Result<bool> {
    if !json {
        svc.subscribe(|event: &MenuEvent| {
            if let MenuEvent::Error { kind, message } = event {
                eprintln!("Warning ({kind}): {message}");
            }
        });
        if matches!(svc.cached_item_count(), Ok(0)) {
            eprintln!("Loading menu...");
        }
    }

    match svc.start(client).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_storage_init() => Err(e.into()),
        Err(e) => {
            if json {
                println!("{}", json_error(&e.to_string()));
            } else {
                eprintln!("{}", unavailable_message(e.kind()));
            }
            Ok(false)
        }
    }
}

pub(crate) async fn cmd_menu(
    svc: &mut BistroService,
    client: &HttpMenuClient,
    categories: &[String],
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    require_onboarding(svc)?;
    if !load_menu(svc, client, json).await? {
        process::exit(2);
    }

    let filter = MenuFilter::new()
        .with_categories(categories.iter().map(String::as_str))
        .with_search(search.unwrap_or_default());

    let outcome = svc.search(&filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        if outcome.is_no_results() {
            process::exit(2);
        }
        return Ok(());
    }

    match outcome {
        SearchOutcome::Matches { items } => print_menu_table(&items),
        SearchOutcome::NoResults { message } => {
            eprintln!("{message}");
            process::exit(2);
        }
    }

    Ok(())
}

pub(crate) async fn cmd_categories(
    svc: &mut BistroService,
    client: &HttpMenuClient,
    json: bool,
) -> Result<()> {
    require_onboarding(svc)?;
    if !load_menu(svc, client, json).await? {
        process::exit(2);
    }

    let categories = svc.categories()?;

    if categories.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No categories found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else {
        for category in &categories {
            println!("{category}");
        }
    }

    Ok(())
}
