//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity. People and
//! interests share one database; image blobs live in a second one, so person
//! writes and image ref-count updates are separate commits.

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::changes::PersonPatch;
use crate::errors::AppError;
use crate::models::{default_birth_date, is_unknown_guid, Image, Person, UNKNOWN_IMAGE_GUID};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    people: SqlitePool,
    images: SqlitePool,
}

impl Repository {
    pub fn new(people: SqlitePool, images: SqlitePool) -> Self {
        Self { people, images }
    }

    // ==================== PERSON OPERATIONS ====================

    /// List all people, optionally filtered by a case-insensitive substring
    /// match on first or last name.
    pub async fn list_people(&self, search: Option<&str>) -> Result<Vec<Person>, AppError> {
        let rows = match search.filter(|term| !term.is_empty()) {
            Some(term) => {
                let pattern = format!("%{}%", term.to_lowercase());
                sqlx::query(
                    "SELECT * FROM person \
                     WHERE lower(first_name) LIKE ? OR lower(last_name) LIKE ? \
                     ORDER BY last_name, first_name",
                )
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.people)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM person ORDER BY last_name, first_name")
                    .fetch_all(&self.people)
                    .await?
            }
        };

        let mut people = Vec::with_capacity(rows.len());
        for row in rows {
            let person_id: i64 = row.get("person_id");
            let interests = self.load_interests(person_id).await?;
            people.push(person_from_row(&row, interests));
        }
        Ok(people)
    }

    /// Get a person by id, with interests loaded.
    pub async fn get_person(&self, person_id: i64) -> Result<Option<Person>, AppError> {
        let row = sqlx::query("SELECT * FROM person WHERE person_id = ?")
            .bind(person_id)
            .fetch_optional(&self.people)
            .await?;

        match row {
            Some(row) => {
                let interests = self.load_interests(person_id).await?;
                Ok(Some(person_from_row(&row, interests)))
            }
            None => Ok(None),
        }
    }

    /// Create a new person from a decoded patch, applying any interest
    /// directives in the same transaction. The new image reference is
    /// counted after the person commit succeeds.
    pub async fn create_person(
        &self,
        patch: &PersonPatch,
        interest_changes: &[String],
    ) -> Result<Person, AppError> {
        let birth_date = default_birth_date();
        let image_guid = patch.image_guid.as_deref().unwrap_or(UNKNOWN_IMAGE_GUID);

        let mut tx = self.people.begin().await?;

        let result = sqlx::query(
            "INSERT INTO person (first_name, last_name, birth_date, image_guid, \
             address_line1, address_line2, city, state_or_territory, zip_code, country) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(patch.first_name.as_deref().unwrap_or(""))
        .bind(patch.last_name.as_deref().unwrap_or(""))
        .bind(birth_date)
        .bind(image_guid)
        .bind(patch.address_line1.as_deref().unwrap_or(""))
        .bind(patch.address_line2.as_deref().unwrap_or(""))
        .bind(patch.city.as_deref().unwrap_or(""))
        .bind(patch.state_or_territory.as_deref().unwrap_or(""))
        .bind(patch.zip_code.as_deref().unwrap_or(""))
        .bind(patch.country.as_deref().unwrap_or(""))
        .execute(&mut *tx)
        .await?;

        let person_id = result.last_insert_rowid();

        apply_interest_changes(&mut tx, person_id, interest_changes).await?;

        tx.commit().await?;

        self.update_image_count(image_guid, 1).await?;

        self.get_person(person_id)
            .await?
            .ok_or_else(|| AppError::Internal("Created person not readable".to_string()))
    }

    /// Apply a decoded patch and interest directives to an existing person.
    /// Field updates and interest changes commit as one transaction; if the
    /// image changed the old reference is released afterwards.
    pub async fn update_person(
        &self,
        person_id: i64,
        patch: &PersonPatch,
        interest_changes: &[String],
    ) -> Result<Person, AppError> {
        let existing = self
            .get_person(person_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Person {} not found", person_id)))?;

        let old_image_guid = existing.image_guid.clone();
        let new_image_guid = patch
            .image_guid
            .clone()
            .unwrap_or_else(|| old_image_guid.clone());

        let mut tx = self.people.begin().await?;

        sqlx::query(
            "UPDATE person SET first_name = ?, last_name = ?, image_guid = ?, \
             address_line1 = ?, address_line2 = ?, city = ?, state_or_territory = ?, \
             zip_code = ?, country = ? WHERE person_id = ?",
        )
        .bind(patch.first_name.as_deref().unwrap_or(&existing.first_name))
        .bind(patch.last_name.as_deref().unwrap_or(&existing.last_name))
        .bind(&new_image_guid)
        .bind(patch.address_line1.as_deref().unwrap_or(&existing.address_line1))
        .bind(patch.address_line2.as_deref().unwrap_or(&existing.address_line2))
        .bind(patch.city.as_deref().unwrap_or(&existing.city))
        .bind(
            patch
                .state_or_territory
                .as_deref()
                .unwrap_or(&existing.state_or_territory),
        )
        .bind(patch.zip_code.as_deref().unwrap_or(&existing.zip_code))
        .bind(patch.country.as_deref().unwrap_or(&existing.country))
        .bind(person_id)
        .execute(&mut *tx)
        .await?;

        apply_interest_changes(&mut tx, person_id, interest_changes).await?;

        tx.commit().await?;

        // If the image was changed, count the new reference and release the
        // old one (possibly deleting the old image).
        if new_image_guid != old_image_guid {
            self.update_image_count(&new_image_guid, 1).await?;
            self.update_image_count(&old_image_guid, -1).await?;
        }

        self.get_person(person_id)
            .await?
            .ok_or_else(|| AppError::Internal("Updated person not readable".to_string()))
    }

    /// Delete a person and all their interests, releasing the image
    /// reference. Returns the deleted person's last state.
    pub async fn delete_person(&self, person_id: i64) -> Result<Person, AppError> {
        let person = self
            .get_person(person_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Person {} not found", person_id)))?;

        let mut tx = self.people.begin().await?;

        sqlx::query("DELETE FROM interest WHERE person_id = ?")
            .bind(person_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM person WHERE person_id = ?")
            .bind(person_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.update_image_count(&person.image_guid, -1).await?;

        Ok(person)
    }

    async fn load_interests(&self, person_id: i64) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query(
            "SELECT the_interest FROM interest WHERE person_id = ? ORDER BY interest_id",
        )
        .bind(person_id)
        .fetch_all(&self.people)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("the_interest")).collect())
    }

    // ==================== IMAGE OPERATIONS ====================

    /// Fetch an image by guid. Unknown, too-short, or missing guids resolve
    /// to the placeholder image so the client always gets bytes to show.
    pub async fn get_image(&self, guid: Option<&str>) -> Result<Image, AppError> {
        let lookup = if is_unknown_guid(guid) {
            UNKNOWN_IMAGE_GUID
        } else {
            guid.unwrap_or(UNKNOWN_IMAGE_GUID)
        };

        let row = sqlx::query("SELECT id, jpeg, ref_count FROM image WHERE id = ?")
            .bind(lookup)
            .fetch_optional(&self.images)
            .await?;

        match row {
            Some(row) => Ok(image_from_row(&row)),
            None => {
                // Guid looked valid but isn't stored; fall back to the placeholder.
                let row = sqlx::query("SELECT id, jpeg, ref_count FROM image WHERE id = ?")
                    .bind(UNKNOWN_IMAGE_GUID)
                    .fetch_one(&self.images)
                    .await?;
                Ok(image_from_row(&row))
            }
        }
    }

    /// Store uploaded JPEG bytes under a fresh guid with no references yet.
    pub async fn create_image(&self, jpeg: Vec<u8>) -> Result<String, AppError> {
        let image = Image::from_bytes(jpeg);

        sqlx::query("INSERT INTO image (id, jpeg, ref_count) VALUES (?, ?, 0)")
            .bind(&image.id)
            .bind(&image.jpeg)
            .execute(&self.images)
            .await?;

        Ok(image.id)
    }

    /// Adjust the number of people using an image. When the count reaches
    /// zero the image is deleted. The unknown placeholder is never touched.
    /// A missing image is logged and reported as count 0 rather than failing
    /// the caller.
    pub async fn update_image_count(&self, guid: &str, delta: i64) -> Result<i64, AppError> {
        if guid == UNKNOWN_IMAGE_GUID {
            return Ok(0);
        }

        let mut tx = self.images.begin().await?;

        let row = sqlx::query("SELECT ref_count FROM image WHERE id = ?")
            .bind(guid)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tracing::warn!(guid, "Image not found while updating reference count");
            return Ok(0);
        };

        let current: i64 = row.get("ref_count");
        let new_count = current + delta;

        if new_count <= 0 {
            sqlx::query("DELETE FROM image WHERE id = ?")
                .bind(guid)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("UPDATE image SET ref_count = ? WHERE id = ?")
                .bind(new_count)
                .bind(guid)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(new_count.max(0))
    }
}

// ==================== INTEREST RECONCILIATION ====================

/// Apply decoded interest directives (`Add:<text>` / `Del:<text>`) to the
/// person's persisted interests, inside the caller's transaction.
///
/// `Add` inserts without a duplicate check (applying the same add twice
/// creates two rows); `Del` removes every row matching the text
/// case-insensitively. Unknown verbs are logged and skipped; malformed
/// entries are skipped silently. Returns the number of directives attempted.
pub async fn apply_interest_changes(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    person_id: i64,
    changes: &[String],
) -> Result<i64, AppError> {
    let mut number_changed = 0;

    for change in changes {
        let parts: Vec<&str> = change.split(':').collect();
        if parts.len() != 2 {
            continue;
        }

        let (verb, interest) = (parts[0], parts[1]);
        match verb {
            "Add" => {
                sqlx::query("INSERT INTO interest (person_id, the_interest) VALUES (?, ?)")
                    .bind(person_id)
                    .bind(interest)
                    .execute(&mut **tx)
                    .await?;
                number_changed += 1;
            }
            "Del" => {
                sqlx::query(
                    "DELETE FROM interest WHERE person_id = ? AND lower(the_interest) = lower(?)",
                )
                .bind(person_id)
                .bind(interest)
                .execute(&mut **tx)
                .await?;
                number_changed += 1;
            }
            other => {
                tracing::warn!(verb = other, "Invalid verb in interest change list");
            }
        }
    }

    Ok(number_changed)
}

// ==================== ROW MAPPERS ====================

fn person_from_row(row: &sqlx::sqlite::SqliteRow, interests: Vec<String>) -> Person {
    let birth_date: NaiveDate = row.get("birth_date");
    Person::assemble(
        row.get("person_id"),
        row.get("first_name"),
        row.get("last_name"),
        birth_date,
        row.get("image_guid"),
        row.get("address_line1"),
        row.get("address_line2"),
        row.get("city"),
        row.get("state_or_territory"),
        row.get("zip_code"),
        row.get("country"),
        interests,
    )
}

fn image_from_row(row: &sqlx::sqlite::SqliteRow) -> Image {
    Image {
        id: row.get("id"),
        jpeg: row.get("jpeg"),
        ref_count: row.get("ref_count"),
    }
}
