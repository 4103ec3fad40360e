//! Conversation and messaging tests against the in-memory store.

mod common;

use std::sync::Arc;

use uuid::Uuid;

use agora::domain::ClassLevel;
use agora::errors::AppError;
use agora::services::{Messenger, MessagingService};

use common::MemoryUow;

#[tokio::test]
async fn opening_a_conversation_is_idempotent_for_the_pair() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_student("Lucas", ClassLevel::Seconde);

    let service = Messenger::new(uow.clone());

    let first = service
        .open_conversation(thomas.id, lucas.id, None)
        .await
        .unwrap();
    // Same pair from the other side resolves to the same conversation
    let second = service
        .open_conversation(lucas.id, thomas.id, None)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(uow.conversation_count(), 1);
    assert!(first.participant_lo <= first.participant_hi);
}

#[tokio::test]
async fn opening_a_conversation_with_yourself_is_rejected() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);

    let service = Messenger::new(uow.clone());
    let result = service.open_conversation(thomas.id, thomas.id, None).await;

    assert!(matches!(result.unwrap_err(), AppError::SelfTarget));
}

#[tokio::test]
async fn opening_a_conversation_with_an_unknown_user_is_not_found() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);

    let service = Messenger::new(uow.clone());
    let result = service
        .open_conversation(thomas.id, Uuid::new_v4(), None)
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn messages_are_sanitized_and_listed_in_order() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_student("Lucas", ClassLevel::Seconde);

    let service = Messenger::new(uow.clone());
    let conversation = service
        .open_conversation(thomas.id, lucas.id, None)
        .await
        .unwrap();

    let sent = service
        .send_message(
            thomas.id,
            conversation.id,
            "  <b>Salut</b>, tu es dispo lundi ?  ".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(sent.content, "Salut, tu es dispo lundi ?");
    assert_eq!(sent.sender.first_name, "Thomas");

    service
        .send_message(lucas.id, conversation.id, "Oui, en S3".to_string())
        .await
        .unwrap();

    let history = service.messages(thomas.id, conversation.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender_id, thomas.id);
    assert_eq!(history[1].sender_id, lucas.id);
    assert_eq!(history[1].sender.first_name, "Lucas");
}

#[tokio::test]
async fn empty_message_after_sanitization_is_rejected() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_student("Lucas", ClassLevel::Seconde);

    let service = Messenger::new(uow.clone());
    let conversation = service
        .open_conversation(thomas.id, lucas.id, None)
        .await
        .unwrap();

    let result = service
        .send_message(thomas.id, conversation.id, "<p>   </p>".to_string())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn outsiders_cannot_read_or_write_a_conversation() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_student("Lucas", ClassLevel::Seconde);
    let sophie = uow.add_student("Sophie", ClassLevel::Seconde);

    let service = Messenger::new(uow.clone());
    let conversation = service
        .open_conversation(thomas.id, lucas.id, None)
        .await
        .unwrap();

    let read = service.messages(sophie.id, conversation.id).await;
    assert!(matches!(read.unwrap_err(), AppError::Forbidden));

    let write = service
        .send_message(sophie.id, conversation.id, "Coucou".to_string())
        .await;
    assert!(matches!(write.unwrap_err(), AppError::Forbidden));

    let mark = service.mark_read(sophie.id, conversation.id).await;
    assert!(matches!(mark.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn unread_counts_track_the_other_participant_only() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_student("Lucas", ClassLevel::Seconde);

    let service = Messenger::new(uow.clone());
    let conversation = service
        .open_conversation(thomas.id, lucas.id, None)
        .await
        .unwrap();

    service
        .send_message(thomas.id, conversation.id, "Premier".to_string())
        .await
        .unwrap();
    service
        .send_message(thomas.id, conversation.id, "Deuxième".to_string())
        .await
        .unwrap();
    service
        .send_message(lucas.id, conversation.id, "Réponse".to_string())
        .await
        .unwrap();

    // Lucas has two unread from Thomas; his own reply does not count
    let for_lucas = service.list_conversations(lucas.id).await.unwrap();
    assert_eq!(for_lucas.len(), 1);
    assert_eq!(for_lucas[0].unread_count, 2);
    assert_eq!(for_lucas[0].participant.first_name, "Thomas");

    let for_thomas = service.list_conversations(thomas.id).await.unwrap();
    assert_eq!(for_thomas[0].unread_count, 1);
    assert_eq!(
        for_thomas[0].last_message.as_ref().unwrap().content,
        "Réponse"
    );

    // Reading clears the counter for the reader only
    let marked = service.mark_read(lucas.id, conversation.id).await.unwrap();
    assert_eq!(marked, 2);

    let for_lucas = service.list_conversations(lucas.id).await.unwrap();
    assert_eq!(for_lucas[0].unread_count, 0);
    let for_thomas = service.list_conversations(thomas.id).await.unwrap();
    assert_eq!(for_thomas[0].unread_count, 1);

    // Marking again touches nothing
    let marked = service.mark_read(lucas.id, conversation.id).await.unwrap();
    assert_eq!(marked, 0);
}

#[tokio::test]
async fn conversation_list_is_scoped_to_the_viewer() {
    let uow = Arc::new(MemoryUow::new());
    let thomas = uow.add_student("Thomas", ClassLevel::Seconde);
    let lucas = uow.add_student("Lucas", ClassLevel::Seconde);
    let sophie = uow.add_student("Sophie", ClassLevel::Seconde);

    let service = Messenger::new(uow.clone());
    service
        .open_conversation(thomas.id, lucas.id, None)
        .await
        .unwrap();
    service
        .open_conversation(thomas.id, sophie.id, None)
        .await
        .unwrap();

    assert_eq!(service.list_conversations(thomas.id).await.unwrap().len(), 2);
    assert_eq!(service.list_conversations(lucas.id).await.unwrap().len(), 1);
    assert_eq!(service.list_conversations(sophie.id).await.unwrap().len(), 1);
}
