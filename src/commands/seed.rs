//! Seed command - Demo fixture for local development.
//!
//! Wipes every table and loads the demo accounts: one moderator, three
//! tutors covering the three class levels, two students seeking help and
//! one unverified account for testing the verification gate. Every
//! account shares the password `demo123`.

use sea_orm::{DatabaseConnection, EntityTrait};

use crate::config::Config;
use crate::domain::{
    ClassLevel, LevelSet, NewUser, Password, Subject, SubjectSet, TutorPreferences, UserRole,
    WeekSchedule,
};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::{
    abuse_report, availability_exception, conversation, email_verification_token, message,
    notification, password_reset_token, tutor_profile, tutoring_request, user, weekly_slot,
};
use crate::infra::{Database, Persistence, UnitOfWork};

const DEMO_PASSWORD: &str = "demo123";

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    tracing::info!("Seeding database...");

    let db = Database::connect(&config).await;
    let conn = db.get_connection();

    wipe(&conn).await?;

    let persistence = Persistence::new(conn);
    let users = persistence.users();
    let profiles = persistence.profiles();

    // Argon2 is deliberately slow; hash the shared demo password once.
    let password_hash = Password::new(DEMO_PASSWORD)?.into_string();

    let moderator = users
        .create(NewUser {
            email: "admin@lycee.fr".to_string(),
            password_hash: password_hash.clone(),
            first_name: "M.".to_string(),
            last_name: "Directeur".to_string(),
            class_level: ClassLevel::Terminale,
            specialties: vec![],
            options: vec![],
            avatar_url: avatar("Admin"),
            role: UserRole::Moderator,
            email_verified: true,
        })
        .await?;
    tracing::info!("Created moderator: {}", moderator.email);

    // One tutor per class level, each with preferences and weekly slots.
    let lucas = users
        .create(NewUser {
            email: "lucas@lycee.fr".to_string(),
            password_hash: password_hash.clone(),
            first_name: "Lucas".to_string(),
            last_name: "Bernard".to_string(),
            class_level: ClassLevel::Seconde,
            specialties: vec!["Maths".to_string(), "Physique".to_string()],
            options: vec![],
            avatar_url: avatar("Lucas"),
            role: UserRole::Student,
            email_verified: true,
        })
        .await?;
    profiles
        .upsert_preferences(
            lucas.id,
            TutorPreferences {
                subjects: SubjectSet::from([Subject::Mathematiques, Subject::PhysiqueChimie]),
                levels: LevelSet::from([ClassLevel::Seconde]),
                available_outside_hours: false,
            },
        )
        .await?;
    profiles.set_enabled(lucas.id, true).await?;
    profiles
        .replace_week(lucas.id, week(&["Lundi_S3", "Mardi_M4", "Mercredi_S1"])?)
        .await?;
    tracing::info!("Created tutor (2nde): {}", lucas.email);

    let emma = users
        .create(NewUser {
            email: "emma@lycee.fr".to_string(),
            password_hash: password_hash.clone(),
            first_name: "Emma".to_string(),
            last_name: "Petit".to_string(),
            class_level: ClassLevel::Premiere,
            specialties: vec!["SVT".to_string(), "Anglais".to_string()],
            options: vec![],
            avatar_url: avatar("Emma"),
            role: UserRole::Student,
            email_verified: true,
        })
        .await?;
    profiles
        .upsert_preferences(
            emma.id,
            TutorPreferences {
                subjects: SubjectSet::from([Subject::Svt, Subject::Anglais]),
                levels: LevelSet::from([ClassLevel::Seconde, ClassLevel::Premiere]),
                available_outside_hours: true,
            },
        )
        .await?;
    profiles.set_enabled(emma.id, true).await?;
    profiles
        .replace_week(emma.id, week(&["Lundi_S3", "Jeudi_S2", "Vendredi_M3"])?)
        .await?;
    tracing::info!("Created tutor (1ère): {}", emma.email);

    let hugo = users
        .create(NewUser {
            email: "hugo@lycee.fr".to_string(),
            password_hash: password_hash.clone(),
            first_name: "Hugo".to_string(),
            last_name: "Leroy".to_string(),
            class_level: ClassLevel::Terminale,
            specialties: vec!["Maths".to_string(), "NSI".to_string()],
            options: vec![],
            avatar_url: avatar("Hugo"),
            role: UserRole::Student,
            email_verified: true,
        })
        .await?;
    profiles
        .upsert_preferences(
            hugo.id,
            TutorPreferences {
                subjects: SubjectSet::from([Subject::Mathematiques]),
                levels: LevelSet::from([
                    ClassLevel::Seconde,
                    ClassLevel::Premiere,
                    ClassLevel::Terminale,
                ]),
                available_outside_hours: false,
            },
        )
        .await?;
    profiles.set_enabled(hugo.id, true).await?;
    profiles
        .replace_week(hugo.id, week(&["Lundi_S3", "Mardi_S4", "Vendredi_S4"])?)
        .await?;
    tracing::info!("Created tutor (Terminale): {}", hugo.email);

    // Students looking for help, no tutoring profile.
    for (email, first_name, last_name, seed) in [
        ("thomas@lycee.fr", "Thomas", "Dubois", "Thomas"),
        ("sophie@lycee.fr", "Sophie", "Martin", "Sophie"),
    ] {
        let student = users
            .create(NewUser {
                email: email.to_string(),
                password_hash: password_hash.clone(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                class_level: ClassLevel::Seconde,
                specialties: vec![],
                options: vec![],
                avatar_url: avatar(seed),
                role: UserRole::Student,
                email_verified: true,
            })
            .await?;
        tracing::info!("Created student: {}", student.email);
    }

    let unverified = users
        .create(NewUser {
            email: "unverified@lycee.fr".to_string(),
            password_hash,
            first_name: "Jean".to_string(),
            last_name: "NonVérifié".to_string(),
            class_level: ClassLevel::Seconde,
            specialties: vec![],
            options: vec![],
            avatar_url: avatar("Jean"),
            role: UserRole::Student,
            email_verified: false,
        })
        .await?;
    tracing::info!("Created unverified user: {}", unverified.email);

    println!("Seed completed. Demo credentials (password: {}):", DEMO_PASSWORD);
    println!("  Moderator:  admin@lycee.fr");
    println!("  Tutors:     lucas@lycee.fr (2nde)");
    println!("              emma@lycee.fr (1ère)");
    println!("              hugo@lycee.fr (Terminale)");
    println!("  Students:   thomas@lycee.fr, sophie@lycee.fr");
    println!("  Unverified: unverified@lycee.fr");

    Ok(())
}

/// Delete all rows, children before parents to satisfy foreign keys.
async fn wipe(conn: &DatabaseConnection) -> AppResult<()> {
    tracing::info!("Clearing existing data...");

    abuse_report::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    notification::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    message::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    conversation::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    tutoring_request::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    availability_exception::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    weekly_slot::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    tutor_profile::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    password_reset_token::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    email_verification_token::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    user::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(AppError::from)?;

    Ok(())
}

fn avatar(seed: &str) -> Option<String> {
    Some(format!(
        "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
        seed
    ))
}

fn week(slots: &[&str]) -> AppResult<WeekSchedule> {
    slots.iter().map(|s| s.parse()).collect()
}
