//! Delivery-manifest schema (bulk reconciliation input).
//!
//! A manifest is the delivery notification pasted or uploaded by an
//! operator: boxes, each with dishes, each with the customers and bowl
//! codes packed for them.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryManifest {
    /// Some feeds carry the delivery/company name directly; when absent it
    /// is derived per box from `unique_identifier`.
    pub delivery_name: Option<String>,
    pub boxes: Vec<ManifestBox>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestBox {
    pub unique_identifier: String,
    pub dishes: Vec<ManifestDish>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestDish {
    pub label: String,
    pub users: Vec<ManifestUser>,
    pub bowl_codes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestUser {
    pub username: String,
}

impl ManifestDish {
    /// Comma-joined customer names, falsy entries filtered out.
    pub fn customers(&self) -> String {
        self.users
            .iter()
            .map(|u| u.username.trim())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Derived once at reconciliation time; drives display color coding.
    pub fn multiple_customers(&self) -> bool {
        self.users.len() > 1
    }
}

/// Derive a company name from a box `unique_identifier`.
///
/// Identifiers look like `<channel>-<seq>-<Company Name>-<date>` with the
/// company words and the date `-`-separated. Drops the first two tokens,
/// strips the trailing all-digit date tokens, and rejoins the rest with
/// spaces. An empty result means the bowls of that box are skipped.
pub fn company_from_identifier(unique_identifier: &str) -> String {
    let tokens: Vec<&str> = unique_identifier
        .split('-')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() <= 2 {
        return String::new();
    }
    let mut rest = &tokens[2..];
    while let Some((last, head)) = rest.split_last() {
        if !last.is_empty() && last.chars().all(|c| c.is_ascii_digit()) {
            rest = head;
        } else {
            break;
        }
    }
    rest.join(" ")
}
