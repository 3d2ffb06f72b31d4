//! Hall Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Hall, HallCreate, HallUpdate};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct HallRepository {
    base: BaseRepository,
}

impl HallRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all halls
    pub async fn find_all(&self) -> RepoResult<Vec<Hall>> {
        let halls: Vec<Hall> = self
            .base
            .db()
            .query("SELECT * FROM hall ORDER BY name")
            .await?
            .take(0)?;
        Ok(halls)
    }

    /// Find hall by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Hall>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let hall: Option<Hall> = self.base.db().select(thing).await?;
        Ok(hall)
    }

    /// Find hall by record id
    pub async fn find_by_record(&self, id: &RecordId) -> RepoResult<Option<Hall>> {
        let hall: Option<Hall> = self.base.db().select(id.clone()).await?;
        Ok(hall)
    }

    /// Find all halls owned by a manager
    pub async fn find_by_manager(&self, manager: &RecordId) -> RepoResult<Vec<Hall>> {
        let halls: Vec<Hall> = self
            .base
            .db()
            .query("SELECT * FROM hall WHERE manager = $manager ORDER BY name")
            .bind(("manager", manager.clone()))
            .await?
            .take(0)?;
        Ok(halls)
    }

    /// Create a new hall
    pub async fn create(&self, data: HallCreate, manager: RecordId) -> RepoResult<Hall> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE hall SET
                    name = $name,
                    location = $location,
                    description = $description,
                    manager = $manager,
                    capacity = $capacity,
                    price = $price,
                    amenities = $amenities,
                    image = $image,
                    booked_dates = [],
                    menu = $menu,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("location", data.location))
            .bind(("description", data.description))
            .bind(("manager", manager))
            .bind(("capacity", data.capacity))
            .bind(("price", data.price))
            .bind(("amenities", data.amenities))
            .bind(("image", data.image.unwrap_or_default()))
            .bind(("menu", data.menu))
            .bind(("now", now))
            .await?;

        let created: Option<Hall> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create hall".to_string()))
    }

    /// Update a hall (partial; absent fields keep their value)
    pub async fn update(&self, id: &str, data: HallUpdate) -> RepoResult<Hall> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    location = $location OR location,
                    description = IF $has_description THEN $description ELSE description END,
                    capacity = IF $has_capacity THEN $capacity ELSE capacity END,
                    price = IF $has_price THEN $price ELSE price END,
                    amenities = IF $has_amenities THEN $amenities ELSE amenities END,
                    image = IF $has_image THEN $image ELSE image END,
                    booked_dates = IF $has_booked_dates THEN $booked_dates ELSE booked_dates END,
                    menu = IF $has_menu THEN $menu ELSE menu END,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("name", data.name))
            .bind(("location", data.location))
            .bind(("has_description", data.description.is_some()))
            .bind(("description", data.description))
            .bind(("has_capacity", data.capacity.is_some()))
            .bind(("capacity", data.capacity))
            .bind(("has_price", data.price.is_some()))
            .bind(("price", data.price))
            .bind(("has_amenities", data.amenities.is_some()))
            .bind(("amenities", data.amenities))
            .bind(("has_image", data.image.is_some()))
            .bind(("image", data.image))
            .bind(("has_booked_dates", data.booked_dates.is_some()))
            .bind(("booked_dates", data.booked_dates))
            .bind(("has_menu", data.menu.is_some()))
            .bind(("menu", data.menu))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Hall>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Hall {} not found", id)))
    }

    /// Hard delete a hall
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        self.find_by_record(&thing)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Hall {} not found", id)))?;

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Delete every hall owned by a manager; returns how many went away.
    /// Idempotent: zero matches is a success.
    pub async fn delete_by_manager(&self, manager: &RecordId) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query("DELETE hall WHERE manager = $manager RETURN VALUE id")
            .bind(("manager", manager.clone()))
            .await?;
        let deleted: Vec<Option<RecordId>> = result.take(0)?;
        Ok(deleted.len())
    }
}
