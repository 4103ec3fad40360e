//! Authentication service unit tests over mocked repositories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockall::predicate::eq;
use uuid::Uuid;

use agora::config::Config;
use agora::domain::{ClassLevel, LevelSet, Password, SubjectSet, TutorProfile, User, UserRole};
use agora::errors::{AppError, AppResult};
use agora::infra::{
    AuthToken, ConversationRepository, Mailer, MockConversationRepository,
    MockNotificationRepository, MockProfileRepository, MockReportRepository,
    MockRequestRepository, MockTokenRepository, MockUserRepository, NotificationRepository,
    ProfileRepository, ReportRepository, RequestRepository, TokenRepository, TxContext,
    UnitOfWork, UserRepository,
};
use agora::services::{AuthService, Authenticator, RegisterInput};

fn student(email: &str, password: &str, verified: bool) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: Password::new(password).unwrap().into_string(),
        first_name: "Lucas".to_string(),
        last_name: "Bernard".to_string(),
        class_level: ClassLevel::Seconde,
        specialties: vec![],
        options: vec![],
        avatar_url: None,
        role: UserRole::Student,
        email_verified: verified,
        created_at: now,
        updated_at: now,
    }
}

fn register_input() -> RegisterInput {
    RegisterInput {
        email: "lucas@lycee.fr".to_string(),
        password: "motdepasse".to_string(),
        first_name: "Lucas".to_string(),
        last_name: "Bernard".to_string(),
        class_level: ClassLevel::Seconde,
        specialties: vec!["Maths".to_string()],
        options: vec![],
        avatar_url: None,
    }
}

/// UnitOfWork over mock repositories.
///
/// Accessors a test did not configure hand out empty mocks, so any
/// unexpected repository call fails the test.
#[derive(Default)]
struct TestUnitOfWork {
    users: Option<Arc<MockUserRepository>>,
    profiles: Option<Arc<MockProfileRepository>>,
    tokens: Option<Arc<MockTokenRepository>>,
}

impl TestUnitOfWork {
    fn new() -> Self {
        Self::default()
    }

    fn with_users(mut self, users: MockUserRepository) -> Self {
        self.users = Some(Arc::new(users));
        self
    }

    fn with_profiles(mut self, profiles: MockProfileRepository) -> Self {
        self.profiles = Some(Arc::new(profiles));
        self
    }

    fn with_tokens(mut self, tokens: MockTokenRepository) -> Self {
        self.tokens = Some(Arc::new(tokens));
        self
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        match &self.users {
            Some(users) => users.clone(),
            None => Arc::new(MockUserRepository::new()),
        }
    }

    fn profiles(&self) -> Arc<dyn ProfileRepository> {
        match &self.profiles {
            Some(profiles) => profiles.clone(),
            None => Arc::new(MockProfileRepository::new()),
        }
    }

    fn requests(&self) -> Arc<dyn RequestRepository> {
        Arc::new(MockRequestRepository::new())
    }

    fn conversations(&self) -> Arc<dyn ConversationRepository> {
        Arc::new(MockConversationRepository::new())
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        Arc::new(MockNotificationRepository::new())
    }

    fn reports(&self) -> Arc<dyn ReportRepository> {
        Arc::new(MockReportRepository::new())
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        match &self.tokens {
            Some(tokens) => tokens.clone(),
            None => Arc::new(MockTokenRepository::new()),
        }
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                &'a dyn TxContext,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // The auth service never opens transactions
        Err(AppError::internal("Transactions not supported in this test double"))
    }
}

fn service(uow: TestUnitOfWork) -> Authenticator<TestUnitOfWork> {
    // Without SMTP settings the mailer only logs, so no relay is needed
    let mailer = Arc::new(Mailer::from_env("http://localhost:5173".to_string()));
    Authenticator::new(Arc::new(uow), mailer, Config::from_env())
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .with(eq("lucas@lycee.fr"))
        .returning(|_| Ok(Some(student("lucas@lycee.fr", "motdepasse", true))));

    let service = service(TestUnitOfWork::new().with_users(users));
    let result = service.register(register_input()).await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn register_opens_a_session_with_an_unverified_student_account() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    users.expect_create().times(1).returning(|new_user| {
        let now = Utc::now();
        Ok(User {
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
        })
    });

    let mut tokens = MockTokenRepository::new();
    tokens
        .expect_issue_verification()
        .times(1)
        .returning(|user_id, token, expires_at| {
            Ok(AuthToken {
                user_id,
                token,
                expires_at,
            })
        });

    let service = service(TestUnitOfWork::new().with_users(users).with_tokens(tokens));
    let session = service.register(register_input()).await.unwrap();

    assert_eq!(session.user.email, "lucas@lycee.fr");
    assert_eq!(session.user.role, "STUDENT");
    assert!(!session.user.email_verified);
    assert!(!session.user.is_tutor_enabled);
    assert_eq!(session.token.token_type, "Bearer");

    // The issued JWT identifies the freshly created account
    let claims = service.verify_token(&session.token.access_token).unwrap();
    assert_eq!(claims.sub, session.user.id);
    assert_eq!(claims.email, "lucas@lycee.fr");
}

#[tokio::test]
async fn login_rejects_bad_password_and_unknown_email_alike() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(|_| Ok(Some(student("lucas@lycee.fr", "motdepasse", true))));

    let known = service(TestUnitOfWork::new().with_users(users));
    let result = known
        .login("lucas@lycee.fr".to_string(), "pas-le-bon".to_string())
        .await;
    assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));

    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let unknown = service(TestUnitOfWork::new().with_users(users));
    let result = unknown
        .login("personne@lycee.fr".to_string(), "motdepasse".to_string())
        .await;
    assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));
}

#[tokio::test]
async fn login_reports_the_tutoring_flag_from_the_profile() {
    let account = student("lucas@lycee.fr", "motdepasse", true);
    let account_id = account.id;

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(account.clone())));

    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_user()
        .with(eq(account_id))
        .returning(|user_id| {
            Ok(Some(TutorProfile {
                user_id,
                enabled: true,
                subjects: SubjectSet::new(),
                levels: LevelSet::new(),
                available_outside_hours: false,
                updated_at: Utc::now(),
            }))
        });

    let service = service(TestUnitOfWork::new().with_users(users).with_profiles(profiles));
    let session = service
        .login("lucas@lycee.fr".to_string(), "motdepasse".to_string())
        .await
        .unwrap();

    assert!(session.user.is_tutor_enabled);
}

#[tokio::test]
async fn unknown_reset_requests_answer_ok_without_issuing_tokens() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let mut tokens = MockTokenRepository::new();
    tokens.expect_issue_reset().times(0);

    let service = service(TestUnitOfWork::new().with_users(users).with_tokens(tokens));
    let result = service
        .request_password_reset("personne@lycee.fr".to_string())
        .await;

    // Same outcome as for a known address, so emails cannot be probed
    assert!(result.is_ok());
}

#[tokio::test]
async fn verify_email_consumes_the_token() {
    let user_id = Uuid::new_v4();

    let mut tokens = MockTokenRepository::new();
    tokens
        .expect_find_verification()
        .with(eq("tok-123"))
        .returning(move |_| {
            Ok(Some(AuthToken {
                user_id,
                token: "tok-123".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            }))
        });
    tokens
        .expect_delete_verification()
        .with(eq("tok-123"))
        .times(1)
        .returning(|_| Ok(()));

    let mut users = MockUserRepository::new();
    users
        .expect_set_email_verified()
        .with(eq(user_id))
        .times(1)
        .returning(|_| Ok(()));

    let service = service(TestUnitOfWork::new().with_users(users).with_tokens(tokens));
    assert!(service.verify_email("tok-123".to_string()).await.is_ok());
}

#[tokio::test]
async fn expired_verification_token_is_rejected_and_deleted() {
    let mut tokens = MockTokenRepository::new();
    tokens.expect_find_verification().returning(|_| {
        Ok(Some(AuthToken {
            user_id: Uuid::new_v4(),
            token: "tok-vieux".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
        }))
    });
    tokens
        .expect_delete_verification()
        .times(1)
        .returning(|_| Ok(()));

    let service = service(TestUnitOfWork::new().with_tokens(tokens));
    let result = service.verify_email("tok-vieux".to_string()).await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn reset_password_replaces_the_stored_hash() {
    let user_id = Uuid::new_v4();

    let mut tokens = MockTokenRepository::new();
    tokens.expect_find_reset().returning(move |_| {
        Ok(Some(AuthToken {
            user_id,
            token: "tok-reset".to_string(),
            expires_at: Utc::now() + Duration::minutes(30),
        }))
    });
    tokens.expect_delete_reset().times(1).returning(|_| Ok(()));

    let mut users = MockUserRepository::new();
    users
        .expect_update_password()
        .withf(move |id, hash| *id == user_id && !hash.is_empty())
        .times(1)
        .returning(|_, _| Ok(()));

    let service = service(TestUnitOfWork::new().with_users(users).with_tokens(tokens));
    let result = service
        .reset_password("tok-reset".to_string(), "nouveaumotdepasse".to_string())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn ensure_verified_gates_unverified_accounts() {
    let unverified = student("jean@lycee.fr", "motdepasse", false);
    let unverified_id = unverified.id;

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(unverified.clone())));

    let auth = service(TestUnitOfWork::new().with_users(users));
    let result = auth.ensure_verified(unverified_id).await;
    assert!(matches!(result.unwrap_err(), AppError::EmailNotVerified));

    let verified = student("lucas@lycee.fr", "motdepasse", true);
    let verified_id = verified.id;

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(verified.clone())));

    let auth = service(TestUnitOfWork::new().with_users(users));
    assert!(auth.ensure_verified(verified_id).await.is_ok());
}
