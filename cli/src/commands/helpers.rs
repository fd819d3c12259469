use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use bistro_core::models::{MenuItem, Session};

pub(crate) fn print_menu_table(items: &[MenuItem]) {
    #[derive(Tabled)]
    struct MenuRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Dish")]
        title: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Description")]
        description: String,
    }

    let rows: Vec<MenuRow> = items
        .iter()
        .map(|item| MenuRow {
            id: item.id,
            title: truncate(&item.title, 30),
            category: item.category.clone(),
            price: format_price(&item.price),
            description: truncate(&item.description, 50),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_session(session: &Session) {
    let show = |v: Option<&str>| v.unwrap_or("-").to_string();
    let flag = |on: bool| if on { "on" } else { "off" };

    println!("First name:     {}", show(session.first_name.as_deref()));
    println!("Email:          {}", show(session.email.as_deref()));
    println!("Phone:          {}", show(session.phone.as_deref()));
    match session.profile_image.as_deref() {
        Some(uri) => println!("Profile image:  {uri}"),
        None => println!("Profile image:  ({})", session.initials()),
    }
    let n = session.notifications;
    println!("Notifications:");
    println!("  order statuses:   {}", flag(n.order_statuses));
    println!("  password changes: {}", flag(n.password_changes));
    println!("  special offers:   {}", flag(n.special_offers));
    println!("  newsletter:       {}", flag(n.newsletter));
}

/// Prefix a bare price with `$`; leave already-formatted prices alone.
pub(crate) fn format_price(price: &str) -> String {
    let price = price.trim();
    if price.is_empty() {
        "-".to_string()
    } else if price.starts_with(|c: char| c.is_ascii_digit()) {
        format!("${price}")
    } else {
        price.to_string()
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Greek salad", 30), "Greek salad");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("crème brûlée tart", 10), "crème b...");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("12.99"), "$12.99");
        assert_eq!(format_price("$5.00"), "$5.00");
        assert_eq!(format_price(""), "-");
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("offline"), r#"{"error":"offline"}"#);
        assert_eq!(json_error("say \"hi\""), r#"{"error":"say \"hi\""}"#);
    }
}
