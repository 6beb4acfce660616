use actor_framework::mock::{create_mock_client, expect_update, MockClient};
use actor_framework::{ActorEntity, FrameworkError, ResourceActor};
use async_trait::async_trait;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Counter {
    id: u32,
    label: String,
    value: u32,
}

#[derive(Debug)]
struct CounterCreate {
    label: String,
}

#[derive(Debug)]
struct CounterUpdate {
    label: String,
    value: u32,
}

#[derive(Debug)]
enum CounterAction {
    Increment,
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum CounterError {
    #[error("label must not be empty")]
    EmptyLabel,
    #[error("value {0} is too large")]
    TooLarge(u32),
}

#[async_trait]
impl ActorEntity for Counter {
    type Id = u32;
    type Create = CounterCreate;
    type Update = CounterUpdate;
    type Action = CounterAction;
    type ActionResult = u32;
    type Context = ();
    type Error = CounterError;

    fn from_create_params(id: u32, params: CounterCreate) -> Result<Self, Self::Error> {
        if params.label.is_empty() {
            return Err(CounterError::EmptyLabel);
        }
        Ok(Self {
            id,
            label: params.label,
            value: 0,
        })
    }

    async fn on_update(&mut self, update: CounterUpdate, _ctx: &()) -> Result<(), Self::Error> {
        // Mutate first, validate second: the actor must roll this back on error.
        self.label = update.label;
        if update.value > 100 {
            return Err(CounterError::TooLarge(update.value));
        }
        self.value = update.value;
        Ok(())
    }

    async fn handle_action(&mut self, action: CounterAction, _ctx: &()) -> Result<u32, Self::Error> {
        match action {
            CounterAction::Increment => {
                self.value += 1;
                Ok(self.value)
            }
        }
    }
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (actor, client) = ResourceActor::new(10);
    tokio::spawn(actor.run(()));

    // 1. Create
    let id: u32 = client
        .create(CounterCreate {
            label: "orders".into(),
        })
        .await
        .unwrap();
    assert_eq!(id, 1); // First ID should be 1

    // 2. Action
    assert_eq!(client.perform_action(id, CounterAction::Increment).await.unwrap(), 1);
    assert_eq!(client.perform_action(id, CounterAction::Increment).await.unwrap(), 2);

    // 3. Update
    let updated = client
        .update(
            id,
            CounterUpdate {
                label: "renamed".into(),
                value: 40,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.value, 40);
    assert_eq!(updated.label, "renamed");

    // 4. List
    let second = client
        .create(CounterCreate {
            label: "deliveries".into(),
        })
        .await
        .unwrap();
    assert_eq!(second, 2);
    let mut all = client.list().await.unwrap();
    all.sort_by_key(|c| c.id);
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].label, "deliveries");
}

#[tokio::test]
async fn test_failed_update_leaves_row_untouched() {
    let (actor, client) = ResourceActor::new(10);
    tokio::spawn(actor.run(()));

    let id: u32 = client
        .create(CounterCreate { label: "a".into() })
        .await
        .unwrap();

    let err = client
        .update(
            id,
            CounterUpdate {
                label: "b".into(),
                value: 500,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_entity::<CounterError>().unwrap(),
        CounterError::TooLarge(500)
    );

    let stored = client.get(id).await.unwrap().unwrap();
    assert_eq!(stored.label, "a");
    assert_eq!(stored.value, 0);
}

#[tokio::test]
async fn test_missing_rows_and_rejected_creates() {
    let (actor, client) = ResourceActor::<Counter>::new(10);
    tokio::spawn(actor.run(()));

    assert!(client.get(42).await.unwrap().is_none());
    assert!(matches!(
        client.perform_action(42, CounterAction::Increment).await,
        Err(FrameworkError::NotFound(id)) if id == "42"
    ));

    let err = client
        .create(CounterCreate { label: String::new() })
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_entity::<CounterError>().unwrap(),
        CounterError::EmptyLabel
    );
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_client_reports_closed_actor() {
    let (actor, client) = ResourceActor::<Counter>::new(10);
    drop(actor);

    let err = client.get(1).await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_mock_client_expectations() {
    let mut mock = MockClient::<Counter>::new();
    mock.expect_list().return_ok(vec![Counter {
        id: 3,
        label: "x".into(),
        value: 9,
    }]);
    mock.expect_action(3).return_ok(10);

    let client = mock.client();
    let rows = client.list().await.unwrap();
    assert_eq!(rows[0].value, 9);
    assert_eq!(client.perform_action(3, CounterAction::Increment).await.unwrap(), 10);

    mock.verify();
}

#[tokio::test]
async fn test_receiver_driven_mock_sees_payload() {
    let (client, mut receiver) = create_mock_client::<Counter>(10);

    let task = tokio::spawn(async move {
        client
            .update(
                7,
                CounterUpdate {
                    label: "y".into(),
                    value: 1,
                },
            )
            .await
    });

    let (id, update, responder) = expect_update(&mut receiver).await.expect("Expected Update");
    assert_eq!(id, 7);
    assert_eq!(update.value, 1);
    responder
        .send(Ok(Counter {
            id: 7,
            label: update.label,
            value: update.value,
        }))
        .unwrap();

    let counter = task.await.unwrap().unwrap();
    assert_eq!(counter.label, "y");
}
