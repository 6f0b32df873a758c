//! Person model with the derived fields the browser client displays.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Birth date assigned to a person when none was ever provided.
/// The change-list protocol has no `birthDate` field, so this is also the
/// birth date of every person created through the API.
pub fn default_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid constant date")
}

/// A single person in the directory.
///
/// The address renderings, age and display birth date are derived from the
/// stored fields when the record is assembled; the client treats them as
/// read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub person_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    /// GUID of the person's image; `"0"` means no image assigned.
    #[serde(rename = "imageGUID")]
    pub image_guid: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state_or_territory: String,
    pub zip_code: String,
    pub country: String,
    /// Interests loaded from the interest table, owned by this person.
    #[serde(default)]
    pub interests: Vec<String>,

    // Derived, read-only
    pub age: i64,
    pub display_birth_date: String,
    pub address_as_text: String,
    #[serde(rename = "addressAsHTML")]
    pub address_as_html: String,
    pub address_comma_separated: String,
}

impl Person {
    /// Assemble a person from its stored fields, computing the derived ones.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        person_id: i64,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
        image_guid: String,
        address_line1: String,
        address_line2: String,
        city: String,
        state_or_territory: String,
        zip_code: String,
        country: String,
        interests: Vec<String>,
    ) -> Self {
        let address = AddressParts {
            line1: &address_line1,
            line2: &address_line2,
            city: &city,
            state: &state_or_territory,
            zip: &zip_code,
            country: &country,
        };

        Self {
            age: age_in_years(birth_date),
            display_birth_date: birth_date.format("%m/%d/%Y").to_string(),
            address_as_text: address.format("\n"),
            address_as_html: address.format("<br/>"),
            address_comma_separated: address.format(", "),
            person_id,
            first_name,
            last_name,
            birth_date,
            image_guid,
            address_line1,
            address_line2,
            city,
            state_or_territory,
            zip_code,
            country,
            interests,
        }
    }
}

/// Whole years between the birth date and today (days alive / 365).
fn age_in_years(birth_date: NaiveDate) -> i64 {
    let days_alive = (Utc::now().date_naive() - birth_date).num_days();
    days_alive / 365
}

/// Borrowed view of the address fields, used to render the three
/// line-separator variants the client displays.
struct AddressParts<'a> {
    line1: &'a str,
    line2: &'a str,
    city: &'a str,
    state: &'a str,
    zip: &'a str,
    country: &'a str,
}

impl AddressParts<'_> {
    /// Format the address using the given line separator. Blank parts are
    /// skipped; city and state share a line joined by ", ".
    fn format(&self, separator: &str) -> String {
        let city_state = format!(
            "{}{}",
            part_with_separator(self.city, if self.state.trim().is_empty() { "" } else { ", " }),
            part_with_separator(self.state, ""),
        );

        let mut result = String::new();
        result.push_str(&part_with_separator(self.line1, separator));
        result.push_str(&part_with_separator(self.line2, separator));
        result.push_str(&part_with_separator(&city_state, separator));
        result.push_str(&part_with_separator(self.zip, separator));
        result.push_str(self.country);
        result
    }
}

/// The part followed by the separator, or empty if the part is blank.
fn part_with_separator(part: &str, separator: &str) -> String {
    if part.trim().is_empty() {
        String::new()
    } else {
        format!("{}{}", part, separator)
    }
}
