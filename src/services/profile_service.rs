//! Tutoring profile service - Offer preferences and availability.
//!
//! SOLID (SRP): Handles the tutor side of an account only.
//! DDD: Orchestrates domain operations via Unit of Work.
//!
//! A user with no stored profile is simply a user who never opted in;
//! reads return a disabled, empty view rather than 404.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    AvailabilityException, NewException, Subject, TutorPreferences, TutorProfile, WeekSchedule,
};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Tutoring offer as shown to its owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct PreferencesView {
    /// Subjects the user offers to tutor
    pub subjects: Vec<Subject>,
    /// Levels the user accepts, as displayed to students
    #[schema(example = json!(["2nde", "1ère"]))]
    pub levels: Vec<String>,
    pub available_outside_hours: bool,
    /// Master switch; false until the user opts in
    pub enabled: bool,
}

impl PreferencesView {
    /// The empty, disabled offer shown before a user ever saved one.
    fn empty() -> Self {
        Self {
            subjects: Vec::new(),
            levels: Vec::new(),
            available_outside_hours: false,
            enabled: false,
        }
    }
}

impl From<TutorProfile> for PreferencesView {
    fn from(profile: TutorProfile) -> Self {
        Self {
            subjects: profile.subjects.into_iter().collect(),
            levels: profile
                .levels
                .into_iter()
                .map(|l| l.wire_label().to_string())
                .collect(),
            available_outside_hours: profile.available_outside_hours,
            enabled: profile.enabled,
        }
    }
}

/// A dated availability exception.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExceptionView {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub is_available: bool,
    #[schema(example = "Stage en entreprise")]
    pub reason: Option<String>,
}

impl From<AvailabilityException> for ExceptionView {
    fn from(exception: AvailabilityException) -> Self {
        Self {
            id: exception.id,
            date: exception.date,
            is_available: exception.is_available,
            reason: exception.reason,
        }
    }
}

/// Weekly grid plus dated exceptions.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityView {
    /// Slot ids of the weekly grid, day then time
    #[schema(example = json!(["Lundi_S3", "Mardi_M1"]))]
    pub available_slots: Vec<String>,
    /// Dated exceptions, ascending by date
    pub exceptions: Vec<ExceptionView>,
}

/// Tutoring profile service trait for dependency injection.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Current offer, empty and disabled if never saved
    async fn preferences(&self, user_id: Uuid) -> AppResult<PreferencesView>;

    /// Save subjects, levels and the outside-hours flag.
    /// Never touches the enabled switch.
    async fn update_preferences(
        &self,
        user_id: Uuid,
        prefs: TutorPreferences,
    ) -> AppResult<PreferencesView>;

    /// Flip the master tutoring switch
    async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<bool>;

    /// Weekly grid plus dated exceptions
    async fn availability(&self, user_id: Uuid) -> AppResult<AvailabilityView>;

    /// Replace the whole weekly grid
    async fn replace_availability(
        &self,
        user_id: Uuid,
        week: WeekSchedule,
    ) -> AppResult<AvailabilityView>;

    /// Record a dated exception
    async fn add_exception(
        &self,
        user_id: Uuid,
        exception: NewException,
    ) -> AppResult<ExceptionView>;
}

/// Concrete implementation of ProfileService using Unit of Work.
pub struct ProfileManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ProfileManager<U> {
    /// Create new profile service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProfileService for ProfileManager<U> {
    async fn preferences(&self, user_id: Uuid) -> AppResult<PreferencesView> {
        Ok(self
            .uow
            .profiles()
            .find_by_user(user_id)
            .await?
            .map(PreferencesView::from)
            .unwrap_or_else(PreferencesView::empty))
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        prefs: TutorPreferences,
    ) -> AppResult<PreferencesView> {
        let profile = self.uow.profiles().upsert_preferences(user_id, prefs).await?;

        tracing::info!(user_id = %user_id, "Tutoring preferences updated");
        Ok(PreferencesView::from(profile))
    }

    async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<bool> {
        let profile = self.uow.profiles().set_enabled(user_id, enabled).await?;

        tracing::info!(user_id = %user_id, enabled = enabled, "Tutoring switch flipped");
        Ok(profile.enabled)
    }

    async fn availability(&self, user_id: Uuid) -> AppResult<AvailabilityView> {
        let week = self.uow.profiles().week(user_id).await?;
        let exceptions = self.uow.profiles().exceptions(user_id).await?;

        Ok(AvailabilityView {
            available_slots: week.iter().map(|slot| slot.to_string()).collect(),
            exceptions: exceptions.into_iter().map(ExceptionView::from).collect(),
        })
    }

    async fn replace_availability(
        &self,
        user_id: Uuid,
        week: WeekSchedule,
    ) -> AppResult<AvailabilityView> {
        self.uow.profiles().replace_week(user_id, week.clone()).await?;

        tracing::info!(user_id = %user_id, slots = week.len(), "Weekly availability replaced");

        // Exceptions are untouched by a grid rewrite, so the echo skips them
        Ok(AvailabilityView {
            available_slots: week.iter().map(|slot| slot.to_string()).collect(),
            exceptions: Vec::new(),
        })
    }

    async fn add_exception(
        &self,
        user_id: Uuid,
        exception: NewException,
    ) -> AppResult<ExceptionView> {
        let stored = self.uow.profiles().add_exception(user_id, exception).await?;
        Ok(ExceptionView::from(stored))
    }
}
