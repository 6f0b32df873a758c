//! Change-list codec: the flat `field=value@field=value` protocol used
//! between the browser client and the server.
//!
//! Only changed (or, for a new record, supplied) fields are encoded, so the
//! server applies a sparse patch instead of a full record replace. Values
//! are not escaped; a value containing `@` or `=` corrupts its token, which
//! is then dropped during decode. That trade-off is confined to this module
//! so the encoding could be swapped without touching callers.

/// Field names recognized on the wire.
pub mod fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const ADDRESS_LINE1: &str = "addressLine1";
    pub const ADDRESS_LINE2: &str = "addressLine2";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const COUNTRY: &str = "country";
    pub const ZIP: &str = "zip";
    pub const IMAGE_GUID: &str = "imageGuid";
    pub const ADD_INTEREST: &str = "AddInterest";
    pub const DELETE_INTEREST: &str = "DeleteInterest";
}

/// Token separator between `field=value` pairs.
pub const TOKEN_SEPARATOR: char = '@';

/// Sparse set of person field updates decoded from a change list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state_or_territory: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub image_guid: Option<String>,
}

/// Result of decoding a change-list string.
#[derive(Debug, Clone, Default)]
pub struct DecodedChanges {
    /// Plain field assignments.
    pub patch: PersonPatch,
    /// Interest directives in `Add:<text>` / `Del:<text>` form, in wire order.
    pub interest_changes: Vec<String>,
    /// Whether any token was recognized. Distinguishes a no-op update from
    /// one that changed at least one field.
    pub any_recognized: bool,
}

/// Decode a change-list string into field assignments and interest
/// directives. Malformed tokens (not exactly one `=`) and unknown field
/// names are silently dropped.
pub fn decode(changes: &str) -> DecodedChanges {
    let mut decoded = DecodedChanges::default();

    for token in changes.split(TOKEN_SEPARATOR) {
        let parts: Vec<&str> = token.split('=').collect();
        if parts.len() != 2 {
            continue;
        }

        let (field, value) = (parts[0], parts[1]);
        let slot = match field {
            fields::FIRST_NAME => &mut decoded.patch.first_name,
            fields::LAST_NAME => &mut decoded.patch.last_name,
            fields::ADDRESS_LINE1 => &mut decoded.patch.address_line1,
            fields::ADDRESS_LINE2 => &mut decoded.patch.address_line2,
            fields::CITY => &mut decoded.patch.city,
            fields::STATE => &mut decoded.patch.state_or_territory,
            fields::COUNTRY => &mut decoded.patch.country,
            fields::ZIP => &mut decoded.patch.zip_code,
            fields::IMAGE_GUID => &mut decoded.patch.image_guid,
            fields::ADD_INTEREST => {
                decoded.interest_changes.push(format!("Add:{}", value));
                decoded.any_recognized = true;
                continue;
            }
            fields::DELETE_INTEREST => {
                decoded.interest_changes.push(format!("Del:{}", value));
                decoded.any_recognized = true;
                continue;
            }
            _ => continue,
        };

        *slot = Some(value.to_string());
        decoded.any_recognized = true;
    }

    decoded
}

/// Builds a change-list string from old/new field values, emitting a token
/// only for fields that actually changed (or were supplied at all, for the
/// add-new-record case).
#[derive(Debug, Default)]
pub struct ChangeListBuilder {
    tokens: Vec<String>,
}

impl ChangeListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a token when the new value differs from the prior one.
    pub fn field_changed(mut self, field: &str, old: &str, new: &str) -> Self {
        if new != old {
            self.tokens.push(format!("{}={}", field, new));
        }
        self
    }

    /// Emit a token when a value was supplied at all (add-new-record case).
    pub fn field_provided(mut self, field: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.tokens.push(format!("{}={}", field, value));
        }
        self
    }

    /// Append an already-encoded interest fragment (see
    /// [`crate::interests::InterestDiffTracker::encode`]).
    pub fn interest_fragment(mut self, fragment: &str) -> Self {
        if !fragment.is_empty() {
            self.tokens.push(fragment.to_string());
        }
        self
    }

    /// Join all tokens into the wire string. Empty when nothing changed.
    pub fn encode(&self) -> String {
        self.tokens.join(&TOKEN_SEPARATOR.to_string())
    }
}
