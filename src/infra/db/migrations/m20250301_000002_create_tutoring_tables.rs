//! Migration: Create tutoring offer and request tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TutorProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TutorProfiles::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TutorProfiles::Enabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TutorProfiles::Subjects)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TutorProfiles::Levels)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TutorProfiles::AvailableOutsideHours)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TutorProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tutor_profiles_user")
                            .from(TutorProfiles::Table, TutorProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WeeklySlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WeeklySlots::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WeeklySlots::UserId).uuid().not_null())
                    .col(ColumnDef::new(WeeklySlots::Day).string().not_null())
                    .col(ColumnDef::new(WeeklySlots::TimeCode).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_weekly_slots_user")
                            .from(WeeklySlots::Table, WeeklySlots::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (user, slot); replace-all rewrites rely on this
        manager
            .create_index(
                Index::create()
                    .name("idx_weekly_slots_user_day_time")
                    .table(WeeklySlots::Table)
                    .col(WeeklySlots::UserId)
                    .col(WeeklySlots::Day)
                    .col(WeeklySlots::TimeCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AvailabilityExceptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AvailabilityExceptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AvailabilityExceptions::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AvailabilityExceptions::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AvailabilityExceptions::IsAvailable)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AvailabilityExceptions::Reason).string().null())
                    .col(
                        ColumnDef::new(AvailabilityExceptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_availability_exceptions_user")
                            .from(
                                AvailabilityExceptions::Table,
                                AvailabilityExceptions::UserId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_availability_exceptions_user_id")
                    .table(AvailabilityExceptions::Table)
                    .col(AvailabilityExceptions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TutoringRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TutoringRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TutoringRequests::StudentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TutoringRequests::TutorId).uuid().not_null())
                    .col(ColumnDef::new(TutoringRequests::Subject).string().not_null())
                    .col(ColumnDef::new(TutoringRequests::Level).string().not_null())
                    .col(ColumnDef::new(TutoringRequests::SlotId).string().not_null())
                    .col(
                        ColumnDef::new(TutoringRequests::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TutoringRequests::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(TutoringRequests::IsBroadcast)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // No FK: the conversations table lands in a later migration
                    .col(
                        ColumnDef::new(TutoringRequests::ConversationId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TutoringRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TutoringRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tutoring_requests_student")
                            .from(TutoringRequests::Table, TutoringRequests::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tutoring_requests_tutor")
                            .from(TutoringRequests::Table, TutoringRequests::TutorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tutoring_requests_student_id")
                    .table(TutoringRequests::Table)
                    .col(TutoringRequests::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tutoring_requests_tutor_id")
                    .table(TutoringRequests::Table)
                    .col(TutoringRequests::TutorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TutoringRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(AvailabilityExceptions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(WeeklySlots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TutorProfiles::Table).to_owned())
            .await
    }
}

/// Table and column identifiers for tutoring offers
#[derive(Iden)]
enum TutorProfiles {
    Table,
    UserId,
    Enabled,
    Subjects,
    Levels,
    AvailableOutsideHours,
    UpdatedAt,
}

/// Table and column identifiers for weekly availability
#[derive(Iden)]
enum WeeklySlots {
    Table,
    Id,
    UserId,
    Day,
    TimeCode,
}

/// Table and column identifiers for dated exceptions
#[derive(Iden)]
enum AvailabilityExceptions {
    Table,
    Id,
    UserId,
    Date,
    IsAvailable,
    Reason,
    CreatedAt,
}

/// Table and column identifiers for tutoring requests
#[derive(Iden)]
enum TutoringRequests {
    Table,
    Id,
    StudentId,
    TutorId,
    Subject,
    Level,
    SlotId,
    Date,
    Status,
    IsBroadcast,
    ConversationId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
