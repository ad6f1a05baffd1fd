// Event long-poll
//
// `GET {base}/events` blocks server-side until something changes, then
// returns a notification whose `uuid` resumes the stream on the next call.

use reqwest::Method;
use tracing::debug;

use super::Session;
use crate::decode;
use crate::error::Error;
use crate::identity::Rootable;
use crate::notification::Notification;

impl<R: Rootable> Session<R> {
    /// Wait for the next notification.
    ///
    /// `GET {base}/events[?uuid={last_event_id}]`
    pub async fn poll_events(&self, last_event_id: Option<&str>) -> Result<Notification, Error> {
        let mut url = self.url(&["events"])?;
        if let Some(id) = last_event_id.filter(|id| !id.is_empty()) {
            url.query_pairs_mut().append_pair("uuid", id);
        }

        let reply = self.send(Method::GET, url, None, None).await?;
        if reply.is_empty() {
            return Ok(Notification::default());
        }

        let notification: Notification = serde_json::from_str(&reply.body)
            .map_err(|e| decode::deserialization(&e, &reply.body))?;

        debug!(
            uuid = %notification.uuid,
            events = notification.events.len(),
            "received notification"
        );
        Ok(notification)
    }
}
