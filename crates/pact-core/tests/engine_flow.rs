//! End-to-end flows through the engine facade, with independent
//! "client sessions" modeled as separate engine instances sharing one
//! store and one notifier.

use async_trait::async_trait;
use pact_core::{
    CompletionStatus, EventKind, MemoryStore, NotificationKind, Notifier, NotifyError,
    PactDraft, PactEngine, PactSummary, SubmitError,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(NotificationKind, Vec<String>)>>,
}

impl RecordingNotifier {
    fn count(&self, kind: NotificationKind) -> usize {
        self.sent.lock().iter().filter(|(k, _)| *k == kind).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        kind: NotificationKind,
        recipients: &[String],
        _pact: &PactSummary,
    ) -> Result<(), NotifyError> {
        self.sent.lock().push((kind, recipients.to_vec()));
        Ok(())
    }
}

struct World {
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
}

impl World {
    fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    /// A fresh client session against the shared backend.
    fn client(&self) -> PactEngine {
        PactEngine::new(self.store.clone(), self.notifier.clone())
    }
}

fn draft(title: &str) -> PactDraft {
    PactDraft {
        title: title.to_string(),
        body: "What is shared in this group stays in this group.".to_string(),
        duration_days: 0,
    }
}

#[tokio::test]
async fn invite_only_pact_runs_to_exactly_one_completion() -> anyhow::Result<()> {
    let world = World::new();
    let owner = world.client();

    let pact = owner.create_pact(&draft("Weekend Trip")).await?;
    assert!(pact.slug.starts_with("pact-"));
    owner.send_invites(&pact.slug, "a@x.com", Some("Jane")).await?;

    let signer = world.client();
    let err = signer.submit_signature(&pact.slug, "Ada", None).await.unwrap_err();
    assert!(matches!(err, SubmitError::EmailRequired));

    let err = signer
        .submit_signature(&pact.slug, "Ben", Some("b@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::NotInvited));

    let receipt = signer
        .submit_signature(&pact.slug, "Ada", Some("a@x.com"))
        .await?;
    assert_eq!(receipt.completion, CompletionStatus::Complete);
    assert!(receipt.copy_sent);

    // Exactly one completion mail, to the invited set.
    assert_eq!(world.notifier.count(NotificationKind::Completion), 1);
    let stored = owner.get_pact(&pact.slug).await?.unwrap();
    assert!(stored.all_signed_notified);
    assert!(stored.completed_at.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_final_signatures_notify_once() -> anyhow::Result<()> {
    let world = World::new();
    let owner = world.client();
    let pact = owner.create_pact(&draft("Book Club")).await?;
    owner.send_invites(&pact.slug, "a@x.com, b@x.com", None).await?;

    let slug_a = pact.slug.clone();
    let client_a = world.client();
    let a = tokio::spawn(async move {
        client_a.submit_signature(&slug_a, "Ada", Some("a@x.com")).await
    });
    let slug_b = pact.slug.clone();
    let client_b = world.client();
    let b = tokio::spawn(async move {
        client_b.submit_signature(&slug_b, "Ben", Some("b@x.com")).await
    });

    a.await.unwrap()?;
    b.await.unwrap()?;

    assert_eq!(world.notifier.count(NotificationKind::Completion), 1);
    let stored = owner.get_pact(&pact.slug).await?.unwrap();
    assert_eq!(stored.completion(), CompletionStatus::Complete);
    assert!(stored.completed_at.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_same_name_lands_once() -> anyhow::Result<()> {
    let world = World::new();
    let owner = world.client();
    let pact = owner.create_pact(&draft("Open Pact")).await?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = world.client();
            let slug = pact.slug.clone();
            tokio::spawn(async move {
                client.submit_signature(&slug, " Jane Doe ", None).await
            })
        })
        .collect();

    let mut accepted = 0;
    let mut duplicates = 0;
    for outcome in futures::future::join_all(handles).await {
        match outcome.unwrap() {
            Ok(_) => accepted += 1,
            Err(SubmitError::AlreadySigned) => duplicates += 1,
            Err(other) => panic!("unexpected rejection: {other}"),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 3);
    assert_eq!(owner.list_signatures(&pact.slug).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn resubmitting_any_casing_reports_already_signed() -> anyhow::Result<()> {
    let world = World::new();
    let owner = world.client();
    let pact = owner.create_pact(&draft("Open Pact")).await?;

    world
        .client()
        .submit_signature(&pact.slug, "Jane Doe", None)
        .await?;
    let err = world
        .client()
        .submit_signature(&pact.slug, "  JANE doe ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::AlreadySigned));
    Ok(())
}

#[tokio::test]
async fn open_pact_accumulates_and_never_completes() -> anyhow::Result<()> {
    let world = World::new();
    let owner = world.client();
    let pact = owner.create_pact(&draft("Open Pact")).await?;

    for name in ["One", "Two", "Three", "Four", "Five"] {
        let receipt = world.client().submit_signature(&pact.slug, name, None).await?;
        assert_eq!(receipt.completion, CompletionStatus::Open);
    }
    assert_eq!(owner.evaluate_completion(&pact.slug).await?, CompletionStatus::Open);
    assert_eq!(world.notifier.count(NotificationKind::Completion), 0);
    Ok(())
}

#[tokio::test]
async fn owner_feed_replays_bounded_backlog_then_streams_live() -> anyhow::Result<()> {
    let world = World::new();
    let owner = world.client();
    let pact = owner.create_pact(&draft("Open Pact")).await?;

    for name in ["One", "Two", "Three"] {
        world.client().submit_signature(&pact.slug, name, None).await?;
    }

    let mut sub = owner.subscribe_feed(&pact.slug, &pact.owner_key).await?;
    let backlog: Vec<_> = sub
        .backlog
        .iter()
        .filter_map(|event| match &event.kind {
            EventKind::Agree { name } => Some(name.clone()),
            EventKind::Invite { .. } => None,
        })
        .collect();
    assert_eq!(backlog, vec!["One", "Two", "Three"]);
    assert!(sub
        .backlog
        .windows(2)
        .all(|w| w[0].created_at <= w[1].created_at));
    // The backlog is not replayed on the live side.
    assert!(sub.live.try_recv().is_err());

    world.client().submit_signature(&pact.slug, "Four", None).await?;
    let event = sub.live.recv().await.unwrap();
    assert!(matches!(event.kind, EventKind::Agree { ref name } if name == "Four"));
    assert!(sub.live.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn slugs_are_unique_and_unguessable_from_title() -> anyhow::Result<()> {
    let world = World::new();
    let owner = world.client();
    let a = owner.create_pact(&draft("Same Title")).await?;
    let b = owner.create_pact(&draft("Same Title")).await?;
    assert_ne!(a.slug, b.slug);
    // Random allocation: the public identifier carries nothing of the
    // title.
    assert!(!a.slug.contains("same"));
    assert_ne!(a.owner_key, b.owner_key);
    Ok(())
}
