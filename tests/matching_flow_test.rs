//! Matching lifecycle tests against the in-memory store.
//!
//! Covers eligibility filtering, direct requests, broadcast fan-out and
//! the acceptance flow, including transaction rollback.

mod common;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use agora::domain::{
    ClassLevel, MatchQuery, NotificationKind, RequestMode, RequestStatus, Subject,
};
use agora::errors::AppError;
use agora::services::{BroadcastInput, DirectRequestInput, Matchmaker, MatchingService};

use common::MemoryUow;

fn direct_input(tutor_id: Uuid) -> DirectRequestInput {
    DirectRequestInput {
        tutor_id,
        subject: Subject::Mathematiques,
        level: ClassLevel::Seconde,
        slot: "Lundi_S3".parse().unwrap(),
        date: Utc::now(),
    }
}

fn broadcast_input() -> BroadcastInput {
    BroadcastInput {
        subject: Subject::Mathematiques,
        level: ClassLevel::Seconde,
        slot: "Lundi_S3".parse().unwrap(),
        date: Utc::now(),
    }
}

#[tokio::test]
async fn find_tutors_returns_only_eligible_candidates() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);

    let lucas = uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3", "Mardi_M4"],
    );
    // Wrong subject
    uow.add_tutor(
        "Emma",
        ClassLevel::Premiere,
        [Subject::Svt],
        [ClassLevel::Seconde, ClassLevel::Premiere],
        &["Lundi_S3"],
    );
    // Right subject, not free on the queried slot
    uow.add_tutor(
        "Hugo",
        ClassLevel::Terminale,
        [Subject::Mathematiques],
        [ClassLevel::Terminale],
        &["Vendredi_S4"],
    );

    let service = Matchmaker::new(uow.clone());
    let query = MatchQuery {
        subject: Subject::Mathematiques,
        level: ClassLevel::Seconde,
        slot: "Lundi_S3".parse().unwrap(),
    };

    let cards = service.find_tutors(thomas.id, query).await.unwrap();

    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, lucas.id);
    assert_eq!(cards[0].email, lucas.email);
    assert_eq!(cards[0].class_level, "2nde");
}

#[tokio::test]
async fn find_tutors_never_offers_the_requester() {
    let uow = Arc::new(MemoryUow::new());
    // The requester is an eligible tutor for their own query
    let lucas = uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3"],
    );

    let service = Matchmaker::new(uow.clone());
    let query = MatchQuery {
        subject: Subject::Mathematiques,
        level: ClassLevel::Seconde,
        slot: "Lundi_S3".parse().unwrap(),
    };

    let cards = service.find_tutors(lucas.id, query).await.unwrap();
    assert!(cards.is_empty());
}

#[tokio::test]
async fn direct_request_opens_a_conversation_and_notifies_the_tutor() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3"],
    );

    let service = Matchmaker::new(uow.clone());
    let view = service
        .create_direct_request(thomas.id, direct_input(lucas.id))
        .await
        .unwrap();

    assert_eq!(view.student_id, thomas.id);
    assert_eq!(view.tutor_id, lucas.id);
    assert_eq!(view.status, RequestStatus::Pending);
    assert!(!view.is_broadcast);
    assert!(view.conversation_id.is_some());
    assert_eq!(view.level, "2nde");
    assert_eq!(view.slot_id, "Lundi_S3");

    assert_eq!(uow.conversation_count(), 1);

    let notifications = uow.notifications_for(lucas.id);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::NewRequest);
    assert!(notifications[0].message.contains("Thomas"));
}

#[tokio::test]
async fn direct_request_to_self_is_rejected_before_any_write() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);

    let service = Matchmaker::new(uow.clone());
    let result = service
        .create_direct_request(thomas.id, direct_input(thomas.id))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::SelfTarget));
    assert_eq!(uow.request_count(), 0);
    assert_eq!(uow.conversation_count(), 0);
}

#[tokio::test]
async fn direct_request_to_unknown_tutor_is_not_found() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);

    let service = Matchmaker::new(uow.clone());
    let result = service
        .create_direct_request(thomas.id, direct_input(Uuid::new_v4()))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
    assert_eq!(uow.request_count(), 0);
}

#[tokio::test]
async fn broadcast_fans_out_to_every_eligible_tutor() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);

    let lucas = uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3"],
    );
    let hugo = uow.add_tutor(
        "Hugo",
        ClassLevel::Terminale,
        [Subject::Mathematiques],
        [ClassLevel::Seconde, ClassLevel::Premiere, ClassLevel::Terminale],
        &["Lundi_S3"],
    );
    // Not free on the queried slot, must be skipped
    uow.add_tutor(
        "Emma",
        ClassLevel::Premiere,
        [Subject::Mathematiques],
        [ClassLevel::Seconde, ClassLevel::Premiere],
        &["Jeudi_S2"],
    );

    let service = Matchmaker::new(uow.clone());
    let outcome = service
        .create_broadcast_call(thomas.id, broadcast_input())
        .await
        .unwrap();

    assert_eq!(outcome.count, 2);
    assert_eq!(outcome.message, "Appel envoyé à 2 tuteurs");
    assert!(outcome.notified_tutor_ids.contains(&lucas.id));
    assert!(outcome.notified_tutor_ids.contains(&hugo.id));

    assert_eq!(uow.request_count(), 2);
    // Fan-out rows carry no conversation until acceptance
    assert_eq!(uow.conversation_count(), 0);

    for tutor in [lucas.id, hugo.id] {
        let notifications = uow.notifications_for(tutor);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::BroadcastCall);
    }
}

#[tokio::test]
async fn broadcast_without_eligible_tutor_writes_nothing() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);

    let service = Matchmaker::new(uow.clone());
    let result = service.create_broadcast_call(thomas.id, broadcast_input()).await;

    assert!(matches!(result.unwrap_err(), AppError::NoEligibleTutor));
    assert_eq!(uow.request_count(), 0);
    assert_eq!(uow.notification_count(), 0);
}

#[tokio::test]
async fn failed_fanout_rolls_back_every_write() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3"],
    );

    uow.fail_next_notification_write();

    let service = Matchmaker::new(uow.clone());
    let result = service.create_broadcast_call(thomas.id, broadcast_input()).await;

    assert!(result.is_err());
    // The request rows written before the failure must be gone too
    assert_eq!(uow.request_count(), 0);
    assert_eq!(uow.notification_count(), 0);
}

#[tokio::test]
async fn accepting_a_broadcast_request_spawns_the_conversation() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3"],
    );

    let service = Matchmaker::new(uow.clone());
    service
        .create_broadcast_call(thomas.id, broadcast_input())
        .await
        .unwrap();

    let pending = service
        .list_requests(lucas.id, RequestMode::Tutorant)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    let request_id = pending[0].id;

    let status = service
        .update_request_status(lucas.id, request_id, RequestStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(status.status, RequestStatus::Accepted);

    // Conversation created and linked both ways
    assert_eq!(uow.conversation_count(), 1);
    let accepted = service
        .list_requests(thomas.id, RequestMode::Tutore)
        .await
        .unwrap();
    assert_eq!(accepted[0].status, RequestStatus::Accepted);
    assert!(accepted[0].conversation_id.is_some());

    let student_notifications = uow.notifications_for(thomas.id);
    assert_eq!(student_notifications.len(), 1);
    assert_eq!(
        student_notifications[0].kind,
        NotificationKind::RequestAccepted
    );
}

#[tokio::test]
async fn accepting_a_direct_request_reuses_its_conversation() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3"],
    );

    let service = Matchmaker::new(uow.clone());
    let view = service
        .create_direct_request(thomas.id, direct_input(lucas.id))
        .await
        .unwrap();

    service
        .update_request_status(lucas.id, view.id, RequestStatus::Accepted)
        .await
        .unwrap();

    assert_eq!(uow.conversation_count(), 1);
}

#[tokio::test]
async fn only_the_designated_tutor_may_change_the_status() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let sophie = uow.add_student("Sophie", ClassLevel::Seconde);
    let lucas = uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3"],
    );

    let service = Matchmaker::new(uow.clone());
    let view = service
        .create_direct_request(thomas.id, direct_input(lucas.id))
        .await
        .unwrap();

    // Neither the student nor a bystander may act on it
    for actor in [thomas.id, sophie.id] {
        let result = service
            .update_request_status(actor, view.id, RequestStatus::Accepted)
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Forbidden));
    }

    let listed = service
        .list_requests(lucas.id, RequestMode::Tutorant)
        .await
        .unwrap();
    assert_eq!(listed[0].status, RequestStatus::Pending);
}

#[tokio::test]
async fn request_lists_are_hydrated_with_both_parties() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_tutor(
        "Lucas",
        ClassLevel::Seconde,
        [Subject::Mathematiques],
        [ClassLevel::Seconde],
        &["Lundi_S3"],
    );

    let service = Matchmaker::new(uow.clone());
    service
        .create_direct_request(thomas.id, direct_input(lucas.id))
        .await
        .unwrap();

    let as_student = service
        .list_requests(thomas.id, RequestMode::Tutore)
        .await
        .unwrap();
    assert_eq!(as_student.len(), 1);
    let student_party = as_student[0].student.as_ref().unwrap();
    let tutor_party = as_student[0].tutor.as_ref().unwrap();
    assert_eq!(student_party.first_name, "Thomas");
    assert_eq!(tutor_party.first_name, "Lucas");

    // The same request shows up on the tutor side
    let as_tutor = service
        .list_requests(lucas.id, RequestMode::Tutorant)
        .await
        .unwrap();
    assert_eq!(as_tutor.len(), 1);
    assert_eq!(as_tutor[0].id, as_student[0].id);

    // And nothing leaks into an uninvolved listing
    let none = service
        .list_requests(lucas.id, RequestMode::Tutore)
        .await
        .unwrap();
    assert!(none.is_empty());
}
