//! CSV export of the current view. Local only; no network involved.

use chrono::NaiveDate;

use crate::agent::AgentRecord;

const HEADERS: [&str; 24] = [
    "ID",
    "Full Name",
    "Gender",
    "Email",
    "Phone",
    "National ID",
    "Address",
    "Address Line 2",
    "City",
    "State",
    "Postcode",
    "Tax",
    "Bank",
    "Account",
    "Agent Code",
    "User Type",
    "Upline Email",
    "Referred By",
    "IC Front S3",
    "IC Back S3",
    "Application Status",
    "Account Status",
    "Sales Support",
    "Created At",
];

fn row(r: &AgentRecord) -> [String; 24] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        r.id.to_string(),
        text(&r.full_name),
        r.gender.map(|g| g.to_string()).unwrap_or_default(),
        text(&r.email),
        text(&r.phone),
        text(&r.national_id),
        text(&r.address),
        text(&r.addr_line2),
        text(&r.city),
        text(&r.state),
        text(&r.postcode),
        text(&r.tax),
        text(&r.bank),
        text(&r.account),
        text(&r.agent_code),
        text(&r.user_type),
        text(&r.upline_email),
        text(&r.referred_by),
        text(&r.icfront_s3),
        text(&r.icback_s3),
        r.application_status.to_string(),
        r.account_status.map(|s| s.to_string()).unwrap_or_default(),
        text(&r.sales_support_name),
        text(&r.created_at),
    ]
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Header row plus one row per record. Every value is double-quoted.
pub fn render_csv(records: &[&AgentRecord]) -> String {
    let header = HEADERS.join(",");
    let rows = records.iter().map(|record| {
        row(record)
            .iter()
            .map(|value| quote(value))
            .collect::<Vec<_>>()
            .join(",")
    });
    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `agents-<YYYY-MM-DD>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("agents-{}.csv", date.format("%Y-%m-%d"))
}
