//! Image model: JPEG bytes stored under a GUID with a reference count.

/// GUID used when a person has no image assigned. The placeholder row with
/// this id is seeded by the migration and is never deleted or ref-counted.
pub const UNKNOWN_IMAGE_GUID: &str = "0";

/// Real image GUIDs are UUID strings; anything shorter is treated as
/// unknown/invalid and served the placeholder.
pub const MINIMUM_GUID_LENGTH: usize = 32;

/// A stored image and the number of people it is assigned to.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: String,
    pub jpeg: Vec<u8>,
    pub ref_count: i64,
}

impl Image {
    /// Create a new image from JPEG bytes with a fresh GUID and no references.
    pub fn from_bytes(jpeg: Vec<u8>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            jpeg,
            ref_count: 0,
        }
    }
}

/// True when the guid should resolve to the unknown placeholder image.
pub fn is_unknown_guid(guid: Option<&str>) -> bool {
    match guid {
        None => true,
        Some(g) => g == UNKNOWN_IMAGE_GUID || g.len() < MINIMUM_GUID_LENGTH,
    }
}
