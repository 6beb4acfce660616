//! # ActorEntity Trait
//!
//! The contract a stored row type (an order, a delivery assignment, ...) implements so
//! that a generic [`ResourceActor`](crate::ResourceActor) can own and mutate it.
//!
//! Associated types pin down the payload of every request at compile time: an order
//! actor only ever accepts `OrderCreate` / `OrderUpdate`, an assignment actor only its
//! own actions. The hooks run inside the actor task, one request at a time, so an
//! entity can validate against its current state without any locking.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any stored entity must implement to be managed by `ResourceActor`.
///
/// # Async & Context
/// Hooks are `async` so they may call other actors. The `Context` type is handed to
/// `ResourceActor::run` and passed into every hook ("late binding" of dependencies).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Identifier for this entity. Built from the actor's sequential `u32` counter.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Payload used to create a new row.
    type Create: Send + Sync + Debug;

    /// Payload used to overwrite part of an existing row.
    type Update: Send + Sync + Debug;

    /// Entity-specific operations that don't fit create/update.
    type Action: Send + Sync + Debug;

    /// Result returned by [`ActorEntity::handle_action`].
    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected at `run()` time. `()` when there are none.
    type Context: Send + Sync;

    /// One error enum per entity; the actor boxes it into
    /// [`FrameworkError::EntityError`](crate::FrameworkError::EntityError) and
    /// clients downcast it back.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the row from its freshly allocated id and the create payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Runs after construction, before the row is stored. An error discards the row.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply an update. On error the row must be left untouched.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Handle a custom action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
