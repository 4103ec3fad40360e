//! In-memory persistence for service-level tests.
//!
//! Implements the same repository and transaction contracts as the SQL
//! store, over a single mutex-guarded state. Transactions snapshot the
//! state up front and restore it on error, so rollback behavior can be
//! asserted without a database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use agora::domain::{
    normalize_pair, AbuseReport, AvailabilityException, Candidate, ClassLevel, Conversation,
    LevelSet, Message, NewException, NewNotification, NewReport, NewRequest, NewUser,
    Notification, ReportStatus, RequestStatus, Subject, SubjectSet, TutorPreferences,
    TutorProfile, TutoringRequest, User, UserRole, WeekSchedule,
};
use agora::errors::{AppError, AppResult};
use agora::infra::{
    AuthToken, ConversationRepository, ConversationTx, NotificationRepository, NotificationTx,
    ProfileRepository, ReportRepository, ReportTx, RequestRepository, RequestTx, TokenRepository,
    TxContext, UnitOfWork, UserRepository,
};

/// Everything the store holds, cloneable for transaction snapshots.
#[derive(Default, Clone)]
struct State {
    users: Vec<User>,
    profiles: HashMap<Uuid, TutorProfile>,
    weeks: HashMap<Uuid, WeekSchedule>,
    exceptions: Vec<AvailabilityException>,
    requests: Vec<TutoringRequest>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    notifications: Vec<Notification>,
    reports: Vec<AbuseReport>,
    verification_tokens: HashMap<String, AuthToken>,
    reset_tokens: HashMap<String, AuthToken>,
}

/// Shared in-memory backend implementing every repository trait.
pub struct MemoryStore {
    state: Mutex<State>,
    /// One-shot failure switch for rollback tests; consumed by the next
    /// transactional notification write.
    fail_next_notification_write: AtomicBool,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            fail_next_notification_write: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn conversation_get_or_create(
        &self,
        a: Uuid,
        b: Uuid,
        request_hint: Option<Uuid>,
    ) -> Conversation {
        let (lo, hi) = normalize_pair(a, b);
        let mut state = self.lock();

        if let Some(existing) = state
            .conversations
            .iter()
            .find(|c| c.participant_lo == lo && c.participant_hi == hi)
        {
            return existing.clone();
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            participant_lo: lo,
            participant_hi: hi,
            request_id: request_hint,
            updated_at: now,
            created_at: now,
        };
        state.conversations.push(conversation.clone());
        conversation
    }
}

/// In-memory UnitOfWork over a [`MemoryStore`].
pub struct MemoryUow {
    store: Arc<MemoryStore>,
}

impl Default for MemoryUow {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUow {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Make the next transactional notification insert fail, to observe
    /// the rollback path.
    pub fn fail_next_notification_write(&self) {
        self.store
            .fail_next_notification_write
            .store(true, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.store.lock().requests.len()
    }

    pub fn conversation_count(&self) -> usize {
        self.store.lock().conversations.len()
    }

    pub fn notification_count(&self) -> usize {
        self.store.lock().notifications.len()
    }

    pub fn notifications_for(&self, user_id: Uuid) -> Vec<Notification> {
        self.store
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Insert a verified student account.
    pub fn add_student(&self, first_name: &str, level: ClassLevel) -> User {
        self.insert_user(first_name, level, UserRole::Student)
    }

    /// Insert a moderator account.
    pub fn add_moderator(&self, first_name: &str) -> User {
        self.insert_user(first_name, ClassLevel::Terminale, UserRole::Moderator)
    }

    /// Insert a student with an enabled tutoring offer, covering the
    /// given subjects and levels and free on the given slots.
    pub fn add_tutor(
        &self,
        first_name: &str,
        level: ClassLevel,
        subjects: impl IntoIterator<Item = Subject>,
        levels: impl IntoIterator<Item = ClassLevel>,
        slots: &[&str],
    ) -> User {
        let user = self.add_student(first_name, level);
        let mut state = self.store.lock();
        state.profiles.insert(
            user.id,
            TutorProfile {
                user_id: user.id,
                enabled: true,
                subjects: SubjectSet::from_iter(subjects),
                levels: LevelSet::from_iter(levels),
                available_outside_hours: false,
                updated_at: Utc::now(),
            },
        );
        state.weeks.insert(user.id, parse_week(slots));
        user
    }

    fn insert_user(&self, first_name: &str, level: ClassLevel, role: UserRole) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{}@lycee.fr", first_name.to_lowercase()),
            password_hash: "hash".to_string(),
            first_name: first_name.to_string(),
            last_name: "Test".to_string(),
            class_level: level,
            specialties: vec![],
            options: vec![],
            avatar_url: None,
            role,
            email_verified: true,
            created_at: now,
            updated_at: now,
        };
        self.store.lock().users.push(user.clone());
        user
    }
}

/// Parse grid slots given as `"Lundi_S3"` style ids.
pub fn parse_week(slots: &[&str]) -> WeekSchedule {
    slots.iter().map(|s| s.parse().unwrap()).collect()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict("User"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            class_level: new_user.class_level,
            specialties: new_user.specialties,
            options: new_user.options,
            avatar_url: new_user.avatar_url,
            role: new_user.role,
            email_verified: new_user.email_verified,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn set_email_verified(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.email_verified = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list_moderators(&self) -> AppResult<Vec<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| u.role == UserRole::Moderator)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<TutorProfile>> {
        Ok(self.lock().profiles.get(&user_id).cloned())
    }

    async fn upsert_preferences(
        &self,
        user_id: Uuid,
        prefs: TutorPreferences,
    ) -> AppResult<TutorProfile> {
        let mut state = self.lock();
        let profile = state
            .profiles
            .entry(user_id)
            .or_insert_with(|| TutorProfile::disabled(user_id));
        profile.subjects = prefs.subjects;
        profile.levels = prefs.levels;
        profile.available_outside_hours = prefs.available_outside_hours;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<TutorProfile> {
        let mut state = self.lock();
        let profile = state
            .profiles
            .entry(user_id)
            .or_insert_with(|| TutorProfile::disabled(user_id));
        profile.enabled = enabled;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn week(&self, user_id: Uuid) -> AppResult<WeekSchedule> {
        Ok(self.lock().weeks.get(&user_id).cloned().unwrap_or_default())
    }

    async fn replace_week(&self, user_id: Uuid, week: WeekSchedule) -> AppResult<()> {
        self.lock().weeks.insert(user_id, week);
        Ok(())
    }

    async fn exceptions(&self, user_id: Uuid) -> AppResult<Vec<AvailabilityException>> {
        let mut found: Vec<AvailabilityException> = self
            .lock()
            .exceptions
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.date);
        Ok(found)
    }

    async fn add_exception(
        &self,
        user_id: Uuid,
        exception: NewException,
    ) -> AppResult<AvailabilityException> {
        let row = AvailabilityException {
            id: Uuid::new_v4(),
            user_id,
            date: exception.date,
            is_available: exception.is_available,
            reason: exception.reason,
            created_at: Utc::now(),
        };
        self.lock().exceptions.push(row.clone());
        Ok(row)
    }

    async fn candidate_pool(&self) -> AppResult<Vec<Candidate>> {
        let state = self.lock();
        Ok(state
            .profiles
            .values()
            .filter(|p| p.enabled)
            .filter_map(|profile| {
                let user = state
                    .users
                    .iter()
                    .find(|u| u.id == profile.user_id && u.role == UserRole::Student)?;
                Some(Candidate {
                    user: user.clone(),
                    profile: profile.clone(),
                    week: state.weeks.get(&profile.user_id).cloned().unwrap_or_default(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl RequestRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TutoringRequest>> {
        Ok(self.lock().requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_for_student(&self, user_id: Uuid) -> AppResult<Vec<TutoringRequest>> {
        Ok(self
            .lock()
            .requests
            .iter()
            .rev()
            .filter(|r| r.student_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_for_tutor(&self, user_id: Uuid) -> AppResult<Vec<TutoringRequest>> {
        Ok(self
            .lock()
            .requests
            .iter()
            .rev()
            .filter(|r| r.tutor_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let mut found: Vec<Conversation> = self
            .lock()
            .conversations
            .iter()
            .filter(|c| c.includes(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(found)
    }

    async fn get_or_create(
        &self,
        a: Uuid,
        b: Uuid,
        request_hint: Option<Uuid>,
    ) -> AppResult<Conversation> {
        Ok(self.conversation_get_or_create(a, b, request_hint))
    }

    async fn messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn append_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> AppResult<Message> {
        let mut state = self.lock();
        let now = Utc::now();

        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or(AppError::NotFound)?;
        conversation.updated_at = now;

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content,
            read: false,
            created_at: now,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> AppResult<u64> {
        let mut state = self.lock();
        let mut touched = 0;
        for message in state
            .messages
            .iter_mut()
            .filter(|m| m.conversation_id == conversation_id && m.sender_id != reader_id && !m.read)
        {
            message.read = true;
            touched += 1;
        }
        Ok(touched)
    }

    async fn unread_count(&self, conversation_id: Uuid, viewer_id: Uuid) -> AppResult<u64> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.sender_id != viewer_id && !m.read)
            .count() as u64)
    }

    async fn last_message(&self, conversation_id: Uuid) -> AppResult<Option<Message>> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .next_back()
            .cloned())
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        Ok(self
            .lock()
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<Notification> {
        let mut state = self.lock();
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or(AppError::NotFound)?;
        notification.read = true;
        Ok(notification.clone())
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<AbuseReport>> {
        Ok(self.lock().reports.iter().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AbuseReport>> {
        Ok(self.lock().reports.iter().find(|r| r.id == id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: ReportStatus) -> AppResult<AbuseReport> {
        let mut state = self.lock();
        let report = state
            .reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound)?;
        report.status = status;
        report.updated_at = Utc::now();
        Ok(report.clone())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn issue_verification(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AuthToken> {
        let mut state = self.lock();
        state.verification_tokens.retain(|_, t| t.user_id != user_id);
        let auth_token = AuthToken {
            user_id,
            token: token.clone(),
            expires_at,
        };
        state.verification_tokens.insert(token, auth_token.clone());
        Ok(auth_token)
    }

    async fn find_verification(&self, token: &str) -> AppResult<Option<AuthToken>> {
        Ok(self.lock().verification_tokens.get(token).cloned())
    }

    async fn delete_verification(&self, token: &str) -> AppResult<()> {
        self.lock().verification_tokens.remove(token);
        Ok(())
    }

    async fn issue_reset(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AuthToken> {
        let mut state = self.lock();
        state.reset_tokens.retain(|_, t| t.user_id != user_id);
        let auth_token = AuthToken {
            user_id,
            token: token.clone(),
            expires_at,
        };
        state.reset_tokens.insert(token, auth_token.clone());
        Ok(auth_token)
    }

    async fn find_reset(&self, token: &str) -> AppResult<Option<AuthToken>> {
        Ok(self.lock().reset_tokens.get(token).cloned())
    }

    async fn delete_reset(&self, token: &str) -> AppResult<()> {
        self.lock().reset_tokens.remove(token);
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.store.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileRepository> {
        self.store.clone()
    }

    fn requests(&self) -> Arc<dyn RequestRepository> {
        self.store.clone()
    }

    fn conversations(&self) -> Arc<dyn ConversationRepository> {
        self.store.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.store.clone()
    }

    fn reports(&self) -> Arc<dyn ReportRepository> {
        self.store.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.store.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                &'a dyn TxContext,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let snapshot = self.store.lock().clone();
        let ctx = MemoryTxContext::new(&self.store);

        match f(&ctx).await {
            Ok(value) => Ok(value),
            Err(e) => {
                *self.store.lock() = snapshot;
                Err(e)
            }
        }
    }
}

/// Transaction context writing straight into the shared state. The
/// enclosing `transaction` call restores the snapshot on error.
struct MemoryTxContext<'a> {
    requests: MemoryRequestTx<'a>,
    conversations: MemoryConversationTx<'a>,
    notifications: MemoryNotificationTx<'a>,
    reports: MemoryReportTx<'a>,
}

impl<'a> MemoryTxContext<'a> {
    fn new(store: &'a MemoryStore) -> Self {
        Self {
            requests: MemoryRequestTx { store },
            conversations: MemoryConversationTx { store },
            notifications: MemoryNotificationTx { store },
            reports: MemoryReportTx { store },
        }
    }
}

impl TxContext for MemoryTxContext<'_> {
    fn requests(&self) -> &dyn RequestTx {
        &self.requests
    }

    fn conversations(&self) -> &dyn ConversationTx {
        &self.conversations
    }

    fn notifications(&self) -> &dyn NotificationTx {
        &self.notifications
    }

    fn reports(&self) -> &dyn ReportTx {
        &self.reports
    }
}

struct MemoryRequestTx<'a> {
    store: &'a MemoryStore,
}

fn request_row(request: NewRequest) -> TutoringRequest {
    let now = Utc::now();
    TutoringRequest {
        id: Uuid::new_v4(),
        student_id: request.student_id,
        tutor_id: request.tutor_id,
        subject: request.subject,
        level: request.level,
        slot: request.slot,
        date: request.date,
        status: RequestStatus::Pending,
        is_broadcast: request.is_broadcast,
        conversation_id: request.conversation_id,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl RequestTx for MemoryRequestTx<'_> {
    async fn insert(&self, request: NewRequest) -> AppResult<TutoringRequest> {
        let row = request_row(request);
        self.store.lock().requests.push(row.clone());
        Ok(row)
    }

    async fn insert_many(&self, requests: Vec<NewRequest>) -> AppResult<u64> {
        let mut state = self.store.lock();
        let count = requests.len() as u64;
        state.requests.extend(requests.into_iter().map(request_row));
        Ok(count)
    }

    async fn set_status(&self, id: Uuid, status: RequestStatus) -> AppResult<TutoringRequest> {
        let mut state = self.store.lock();
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound)?;
        request.status = status;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn link_conversation(&self, id: Uuid, conversation_id: Uuid) -> AppResult<()> {
        let mut state = self.store.lock();
        if let Some(request) = state.requests.iter_mut().find(|r| r.id == id) {
            request.conversation_id = Some(conversation_id);
            request.updated_at = Utc::now();
        }
        Ok(())
    }
}

struct MemoryConversationTx<'a> {
    store: &'a MemoryStore,
}

#[async_trait]
impl ConversationTx for MemoryConversationTx<'_> {
    async fn get_or_create(
        &self,
        a: Uuid,
        b: Uuid,
        request_hint: Option<Uuid>,
    ) -> AppResult<Conversation> {
        Ok(self.store.conversation_get_or_create(a, b, request_hint))
    }

    async fn link_request(&self, id: Uuid, request_id: Uuid) -> AppResult<()> {
        let mut state = self.store.lock();
        if let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == id) {
            conversation.request_id = Some(request_id);
        }
        Ok(())
    }
}

struct MemoryNotificationTx<'a> {
    store: &'a MemoryStore,
}

impl MemoryNotificationTx<'_> {
    fn check_failure_switch(&self) -> AppResult<()> {
        if self
            .store
            .fail_next_notification_write
            .swap(false, Ordering::SeqCst)
        {
            return Err(AppError::internal("Injected notification failure"));
        }
        Ok(())
    }
}

fn notification_row(notification: NewNotification) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        user_id: notification.user_id,
        kind: notification.kind,
        title: notification.title,
        message: notification.message,
        read: false,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl NotificationTx for MemoryNotificationTx<'_> {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        self.check_failure_switch()?;
        let row = notification_row(notification);
        self.store.lock().notifications.push(row.clone());
        Ok(row)
    }

    async fn insert_many(&self, notifications: Vec<NewNotification>) -> AppResult<u64> {
        self.check_failure_switch()?;
        let mut state = self.store.lock();
        let count = notifications.len() as u64;
        state
            .notifications
            .extend(notifications.into_iter().map(notification_row));
        Ok(count)
    }
}

struct MemoryReportTx<'a> {
    store: &'a MemoryStore,
}

#[async_trait]
impl ReportTx for MemoryReportTx<'_> {
    async fn insert(&self, reporter_id: Uuid, report: NewReport) -> AppResult<AbuseReport> {
        let now = Utc::now();
        let row = AbuseReport {
            id: Uuid::new_v4(),
            reporter_id,
            conversation_id: report.conversation_id,
            message_id: report.message_id,
            reason: report.reason,
            description: report.description,
            status: ReportStatus::Open,
            created_at: now,
            updated_at: now,
        };
        self.store.lock().reports.push(row.clone());
        Ok(row)
    }
}
