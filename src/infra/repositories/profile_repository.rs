//! Tutoring profile repository: preferences, weekly grid, exceptions.
//!
//! Also assembles the candidate pool the eligibility engine filters.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::entities::availability_exception::{
    self, ActiveModel as ExceptionActiveModel, Entity as ExceptionEntity,
};
use super::entities::tutor_profile::{
    self, ActiveModel as ProfileActiveModel, Entity as ProfileEntity,
};
use super::entities::user::{self, Entity as UserEntity};
use super::entities::weekly_slot::{self, ActiveModel as SlotActiveModel, Entity as SlotEntity};
use crate::config::ROLE_STUDENT;
use crate::domain::{
    AvailabilityException, Candidate, NewException, SlotRef, TutorPreferences, TutorProfile, User,
    WeekSchedule,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Profile repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a user's tutoring profile, None when never configured
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<TutorProfile>>;

    /// Save preferences; creates a disabled profile on first save
    async fn upsert_preferences(
        &self,
        user_id: Uuid,
        prefs: TutorPreferences,
    ) -> AppResult<TutorProfile>;

    /// Flip the master tutoring switch, creating an empty profile if needed
    async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<TutorProfile>;

    /// The user's weekly availability grid
    async fn week(&self, user_id: Uuid) -> AppResult<WeekSchedule>;

    /// Replace the whole weekly grid atomically
    async fn replace_week(&self, user_id: Uuid, week: WeekSchedule) -> AppResult<()>;

    /// Dated exceptions, ascending by date
    async fn exceptions(&self, user_id: Uuid) -> AppResult<Vec<AvailabilityException>>;

    /// Record a dated exception
    async fn add_exception(
        &self,
        user_id: Uuid,
        exception: NewException,
    ) -> AppResult<AvailabilityException>;

    /// Assemble every student with an enabled profile, plus their
    /// preferences and weekly grid, ready for eligibility filtering
    async fn candidate_pool(&self) -> AppResult<Vec<Candidate>>;
}

/// Concrete implementation of ProfileRepository
pub struct ProfileStore {
    db: DatabaseConnection,
}

impl ProfileStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn encode_profile(user_id: Uuid, prefs: &TutorPreferences, enabled: bool) -> ProfileActiveModel {
    ProfileActiveModel {
        user_id: Set(user_id),
        enabled: Set(enabled),
        subjects: Set(serde_json::json!(prefs.subjects)),
        levels: Set(serde_json::json!(prefs.levels)),
        available_outside_hours: Set(prefs.available_outside_hours),
        updated_at: Set(chrono::Utc::now()),
    }
}

#[async_trait]
impl ProfileRepository for ProfileStore {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<TutorProfile>> {
        let result = ProfileEntity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(TutorProfile::from))
    }

    async fn upsert_preferences(
        &self,
        user_id: Uuid,
        prefs: TutorPreferences,
    ) -> AppResult<TutorProfile> {
        let existing = ProfileEntity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        let model = match existing {
            Some(profile) => {
                let mut active: ProfileActiveModel = profile.into();
                active.subjects = Set(serde_json::json!(prefs.subjects));
                active.levels = Set(serde_json::json!(prefs.levels));
                active.available_outside_hours = Set(prefs.available_outside_hours);
                active.updated_at = Set(chrono::Utc::now());
                active.update(&self.db).await.map_err(AppError::from)?
            }
            // First save never enables the offer by itself
            None => encode_profile(user_id, &prefs, false)
                .insert(&self.db)
                .await
                .map_err(AppError::from)?,
        };

        Ok(TutorProfile::from(model))
    }

    async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<TutorProfile> {
        let existing = ProfileEntity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        let model = match existing {
            Some(profile) => {
                let mut active: ProfileActiveModel = profile.into();
                active.enabled = Set(enabled);
                active.updated_at = Set(chrono::Utc::now());
                active.update(&self.db).await.map_err(AppError::from)?
            }
            None => {
                let empty = TutorPreferences {
                    subjects: Default::default(),
                    levels: Default::default(),
                    available_outside_hours: false,
                };
                encode_profile(user_id, &empty, enabled)
                    .insert(&self.db)
                    .await
                    .map_err(AppError::from)?
            }
        };

        Ok(TutorProfile::from(model))
    }

    async fn week(&self, user_id: Uuid) -> AppResult<WeekSchedule> {
        let models = SlotEntity::find()
            .filter(weekly_slot::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(SlotRef::from).collect())
    }

    async fn replace_week(&self, user_id: Uuid, week: WeekSchedule) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        SlotEntity::delete_many()
            .filter(weekly_slot::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(AppError::from)?;

        if !week.is_empty() {
            let rows = week.into_iter().map(|slot| SlotActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                day: Set(slot.day.to_string()),
                time_code: Set(slot.time.to_string()),
            });
            SlotEntity::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(AppError::from)?;
        }

        txn.commit().await.map_err(AppError::from)?;
        Ok(())
    }

    async fn exceptions(&self, user_id: Uuid) -> AppResult<Vec<AvailabilityException>> {
        let models = ExceptionEntity::find()
            .filter(availability_exception::Column::UserId.eq(user_id))
            .order_by_asc(availability_exception::Column::Date)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(AvailabilityException::from).collect())
    }

    async fn add_exception(
        &self,
        user_id: Uuid,
        exception: NewException,
    ) -> AppResult<AvailabilityException> {
        let active_model = ExceptionActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            date: Set(exception.date),
            is_available: Set(exception.is_available),
            reason: Set(exception.reason),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(AvailabilityException::from(model))
    }

    async fn candidate_pool(&self) -> AppResult<Vec<Candidate>> {
        let profiles = ProfileEntity::find()
            .filter(tutor_profile::Column::Enabled.eq(true))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        if profiles.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Uuid> = profiles.iter().map(|p| p.user_id).collect();

        let users = UserEntity::find()
            .filter(user::Column::Id.is_in(user_ids.clone()))
            .filter(user::Column::Role.eq(ROLE_STUDENT))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        let slots = SlotEntity::find()
            .filter(weekly_slot::Column::UserId.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        let mut profile_by_user: HashMap<Uuid, TutorProfile> = profiles
            .into_iter()
            .map(|p| (p.user_id, TutorProfile::from(p)))
            .collect();

        let mut week_by_user: HashMap<Uuid, WeekSchedule> = HashMap::new();
        for slot in slots {
            week_by_user
                .entry(slot.user_id)
                .or_default()
                .insert(SlotRef::from(slot));
        }

        let pool = users
            .into_iter()
            .filter_map(|model| {
                let user = User::from(model);
                let profile = profile_by_user.remove(&user.id)?;
                let week = week_by_user.remove(&user.id).unwrap_or_default();
                Some(Candidate {
                    user,
                    profile,
                    week,
                })
            })
            .collect();

        Ok(pool)
    }
}
