// CRUD operations: the `Storer` implementation for `Session`.
//
// Every operation resolves a URL, sends through `dispatch`, and hands the
// decoded body to the destination's own decode contract.

use reqwest::Method;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::Session;
use crate::decode;
use crate::error::Error;
use crate::fetching::FetchingInfo;
use crate::identity::{Identifiable, Identity, Rootable};
use crate::notification::Notification;
use crate::storer::Storer;

impl<R: Rootable + Clone> Storer for Session<R> {
    type Root = R;

    /// Fetch the root object; its API key is used from here on.
    ///
    /// `GET {base}/{root name}`
    async fn start(&self) -> Result<(), Error> {
        let url = self.root_url()?;
        info!(url = %url, "starting session");

        let reply = self.send(Method::GET, url, None, None).await?;
        if let Some(value) = decode::single(&reply.body)? {
            self.root
                .write()
                .await
                .absorb(value)
                .map_err(|e| decode::deserialization(&e, &reply.body))?;
        }

        debug!("session started");
        Ok(())
    }

    async fn reset(&self) {
        self.root.write().await.set_api_key(String::new());
        debug!("session reset");
    }

    async fn root(&self) -> R {
        self.root.read().await.clone()
    }

    /// `GET {personal url}`
    async fn fetch_entity<T: Identifiable>(&self, object: &mut T) -> Result<(), Error> {
        let url = self.personal_url(object)?;
        let reply = self.send(Method::GET, url, None, None).await?;
        absorb(object, &reply.body)
    }

    /// `PUT {personal url}` with the object's JSON encoding.
    async fn save_entity<T: Identifiable>(&self, object: &mut T) -> Result<(), Error> {
        let url = self.personal_url(object)?;
        let body = encode(object)?;
        let reply = self.send(Method::PUT, url, Some(body), None).await?;
        absorb(object, &reply.body)
    }

    /// `DELETE {personal url}`
    async fn delete_entity<T: Identifiable>(&self, object: &T) -> Result<(), Error> {
        let url = self.personal_url(object)?;
        self.send(Method::DELETE, url, None, None).await?;
        Ok(())
    }

    /// `GET {children url}` with pagination headers from `info`.
    async fn fetch_children<P: Identifiable, C: Identifiable>(
        &self,
        parent: &P,
        identity: &Identity,
        dest: &mut Vec<C>,
        info: Option<&mut FetchingInfo>,
    ) -> Result<(), Error> {
        let url = self.children_url(parent, identity)?;
        let reply = self.send(Method::GET, url, None, info).await?;

        if reply.is_empty() {
            debug!(category = %identity, "no children");
            return Ok(());
        }

        *dest = decode::list(&reply.body)?
            .into_iter()
            .map(|value| C::decode(identity, value))
            .collect::<Result<_, _>>()
            .map_err(|e| decode::deserialization(&e, &reply.body))?;

        debug!(category = %identity, count = dest.len(), "fetched children");
        Ok(())
    }

    /// `POST {children url}` with the child's JSON encoding.
    async fn create_child<P: Identifiable, C: Identifiable>(
        &self,
        parent: &P,
        child: &mut C,
    ) -> Result<(), Error> {
        let url = self.children_url(parent, &child.identity())?;
        let body = encode(child)?;
        let reply = self.send(Method::POST, url, Some(body), None).await?;
        absorb(child, &reply.body)
    }

    /// `PUT {children url}` with the JSON array of the children's IDs.
    ///
    /// Nothing is sent if any child is missing its identifier.
    async fn assign_children<P: Identifiable, C: Identifiable>(
        &self,
        parent: &P,
        children: &[C],
        identity: &Identity,
    ) -> Result<(), Error> {
        let url = self.children_url(parent, identity)?;

        let ids = children
            .iter()
            .map(|child| match child.identifier() {
                "" => Err(Error::UnassignedChild {
                    category: identity.category.to_string(),
                }),
                id => Ok(id),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let body = encode(&ids)?;
        self.send(Method::PUT, url, Some(body), None).await?;
        Ok(())
    }

    async fn next_event(
        &self,
        channel: &mpsc::Sender<Notification>,
        last_event_id: Option<&str>,
    ) -> Result<(), Error> {
        let notification = self.poll_events(last_event_id).await?;
        if !notification.is_empty() {
            channel
                .send(notification)
                .await
                .map_err(|_| Error::EventChannelClosed)?;
        }
        Ok(())
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    Ok(serde_json::to_vec(value)?)
}

fn absorb<T: Identifiable>(object: &mut T, body: &str) -> Result<(), Error> {
    match decode::single(body)? {
        Some(value) => object
            .absorb(value)
            .map_err(|e| decode::deserialization(&e, body)),
        None => Ok(()),
    }
}
