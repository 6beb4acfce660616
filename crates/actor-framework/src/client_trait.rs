//! # ActorClient Trait
//!
//! Domain clients (`OrderClient`, `DeliveryClient`, ...) wrap a [`ResourceClient`] and
//! translate [`FrameworkError`] into their own error type. Implementing this trait gives
//! them traced `get` and `list` for free.
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the standard read operations.
///
/// # Example
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Driver { id: u32 }
/// #[derive(Debug)] struct DriverCreate;
/// #[derive(Debug)] struct DriverUpdate;
/// #[derive(Debug)] enum DriverAction {}
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct DriverError(String);
///
/// impl From<String> for DriverError {
///     fn from(s: String) -> Self { DriverError(s) }
/// }
///
/// #[async_trait]
/// impl ActorEntity for Driver {
///     type Id = u32; type Create = DriverCreate; type Update = DriverUpdate;
///     type Action = DriverAction; type ActionResult = (); type Context = (); type Error = DriverError;
///     fn from_create_params(id: u32, _: DriverCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
///     async fn on_update(&mut self, _: DriverUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: DriverAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct DriverClient { inner: ResourceClient<Driver> }
///
/// #[async_trait]
/// impl ActorClient<Driver> for DriverClient {
///     type Error = DriverError;
///     fn inner(&self) -> &ResourceClient<Driver> { &self.inner }
///     fn map_error(e: FrameworkError) -> Self::Error { DriverError(e.to_string()) }
/// }
///
/// async fn usage(client: DriverClient) {
///     // get() and list() are provided
///     let _ = client.get(1).await;
///     let _ = client.list().await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every stored entity.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }
}
