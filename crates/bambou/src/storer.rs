use std::future::Future;

use tokio::sync::mpsc;

use crate::error::Error;
use crate::fetching::FetchingInfo;
use crate::identity::{Identifiable, Identity, Rootable};
use crate::notification::Notification;

/// Something that can perform CRUD operations on remote resources.
///
/// [`Session`](crate::Session) is the HTTP implementation; the trait is the
/// seam the [`SessionContext`](crate::SessionContext) and the
/// [`PushCenter`](crate::PushCenter) are written against.
pub trait Storer: Send + Sync {
    type Root: Rootable;

    /// Authenticate by fetching the root object, which stores the API key.
    fn start(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Forget the API key. No network call.
    fn reset(&self) -> impl Future<Output = ()> + Send;

    /// Snapshot of the root object.
    fn root(&self) -> impl Future<Output = Self::Root> + Send;

    fn fetch_entity<T: Identifiable>(
        &self,
        object: &mut T,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn save_entity<T: Identifiable>(
        &self,
        object: &mut T,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn delete_entity<T: Identifiable>(
        &self,
        object: &T,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// List the `identity` children of `parent` into `dest`.
    ///
    /// `dest` is replaced by the server's listing, or left untouched when
    /// the server answers with no content.
    fn fetch_children<P: Identifiable, C: Identifiable>(
        &self,
        parent: &P,
        identity: &Identity,
        dest: &mut Vec<C>,
        info: Option<&mut FetchingInfo>,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn create_child<P: Identifiable, C: Identifiable>(
        &self,
        parent: &P,
        child: &mut C,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Replace the `identity` children of `parent` with `children`.
    fn assign_children<P: Identifiable, C: Identifiable>(
        &self,
        parent: &P,
        children: &[C],
        identity: &Identity,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Long-poll for the next notification and forward it to `channel`
    /// if it carries any events.
    fn next_event(
        &self,
        channel: &mpsc::Sender<Notification>,
        last_event_id: Option<&str>,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}
