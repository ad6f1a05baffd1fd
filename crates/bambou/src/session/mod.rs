// VSD session
//
// Wraps `reqwest::Client` with VSD-specific URL resolution, XREST
// authentication, and `X-Nuage-*` header handling. The CRUD surface lives
// in `crud.rs` (the `Storer` impl) and the long-poll in `events.rs`, so this
// module stays focused on construction and addressing.

mod crud;
mod dispatch;
mod events;

use tokio::sync::RwLock;
use url::{ParseError, Url};

use crate::config::{Credentials, DEFAULT_PAGE_SIZE, SessionConfig};
use crate::error::Error;
use crate::identity::{Identifiable, Identity, Rootable};

/// An authenticated conversation with one VSD.
///
/// Owns the HTTP client, the credentials, and the root object whose API key
/// replaces the password once [`start`](crate::Storer::start) succeeds.
/// Cheap to share behind an `Arc`; the client is never reconfigured after
/// construction.
pub struct Session<R: Rootable> {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    page_size: u32,
    root_identity: Identity,
    root: RwLock<R>,
}

impl<R: Rootable> Session<R> {
    /// Create a session from a `SessionConfig`.
    ///
    /// In certificate mode the client certificate is loaded into the
    /// transport here; in password mode nothing is sent until `start`.
    pub fn new(config: SessionConfig, root: R) -> Result<Self, Error> {
        let http = config.transport().build_client()?;
        let mut session = Self::with_client(http, config.url.as_str(), config.credentials, root)?;
        session.page_size = config.page_size;
        Ok(session)
    }

    /// Create a session with a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for any TLS setup on `http`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Credentials,
        root: R,
    ) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        base_url
            .path_segments_mut()
            .map_err(|()| Error::InvalidUrl(ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty();
        let root_identity = root.identity();

        Ok(Self {
            http,
            base_url,
            credentials,
            page_size: DEFAULT_PAGE_SIZE,
            root_identity,
            root: RwLock::new(root),
        })
    }

    /// Override the default `X-Nuage-PageSize` sent with every request.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size;
    }

    /// The API base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The root object's API key, empty before `start`.
    pub async fn api_key(&self) -> String {
        self.root.read().await.api_key().to_owned()
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn is_root<T: Identifiable>(&self, object: &T) -> bool {
        object.identity() == self.root_identity
    }

    /// Collection URL of a resource type: `{base}/{category}`.
    pub fn general_url<T: Identifiable>(&self, object: &T) -> Result<Url, Error> {
        self.url(&[object.identity().category.as_ref()])
    }

    /// URL of one resource instance.
    ///
    /// The root lives at `{base}/{name}`; anything else needs an
    /// identifier and lives at `{base}/{category}/{id}`.
    pub fn personal_url<T: Identifiable>(&self, object: &T) -> Result<Url, Error> {
        let identity = object.identity();
        if self.is_root(object) {
            return self.url(&[identity.name.as_ref()]);
        }

        let id = object.identifier();
        if id.is_empty() {
            return Err(Error::MissingIdentifier {
                category: identity.category.into_owned(),
            });
        }

        self.url(&[identity.category.as_ref(), id])
    }

    /// URL of the `identity` collection below `parent`.
    ///
    /// Children of the root hang directly off the base URL.
    pub fn children_url<P: Identifiable>(&self, parent: &P, identity: &Identity) -> Result<Url, Error> {
        if self.is_root(parent) {
            return self.url(&[identity.category.as_ref()]);
        }

        append(self.personal_url(parent)?, &[identity.category.as_ref()])
    }

    /// Root object URL: `{base}/{root name}`.
    pub(crate) fn root_url(&self) -> Result<Url, Error> {
        self.url(&[self.root_identity.name.as_ref()])
    }

    /// `{base}/{segments...}`, each segment percent-encoded on its own.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        append(self.base_url.clone(), segments)
    }
}

fn append(mut url: Url, segments: &[&str]) -> Result<Url, Error> {
    url.path_segments_mut()
        .map_err(|()| Error::InvalidUrl(ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dynamic::{DynamicEntity, DynamicRoot};

    fn session() -> Session<DynamicRoot> {
        Session::with_client(
            reqwest::Client::new(),
            "https://vsd.example.com:8443/nuage/api/v6/",
            Credentials::password("csproot", "csproot", "csp"),
            DynamicRoot::default(),
        )
        .unwrap()
    }

    fn enterprise(id: &str) -> DynamicEntity {
        DynamicEntity::new(Identity::new("enterprise", "enterprises")).with_id(id)
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        assert_eq!(session().base_url(), "https://vsd.example.com:8443/nuage/api/v6");
    }

    #[test]
    fn personal_url_is_general_url_plus_id() {
        let s = session();
        let ent = enterprise("e-42");

        let general = s.general_url(&ent).unwrap();
        let personal = s.personal_url(&ent).unwrap();

        assert_eq!(general.as_str(), "https://vsd.example.com:8443/nuage/api/v6/enterprises");
        assert_eq!(personal.as_str(), format!("{general}/e-42"));
    }

    #[test]
    fn root_personal_url_ignores_identifier() {
        let s = session();
        let root = DynamicRoot::default().with_id("anything");

        assert_eq!(
            s.personal_url(&root).unwrap().as_str(),
            "https://vsd.example.com:8443/nuage/api/v6/me"
        );
    }

    #[test]
    fn personal_url_requires_identifier() {
        let s = session();
        let err = s.personal_url(&enterprise("")).unwrap_err();
        assert!(matches!(err, Error::MissingIdentifier { ref category } if category == "enterprises"));
    }

    #[test]
    fn children_of_root_hang_off_base() {
        let s = session();
        let url = s
            .children_url(&DynamicRoot::default(), &Identity::new("enterprise", "enterprises"))
            .unwrap();
        assert_eq!(url.as_str(), "https://vsd.example.com:8443/nuage/api/v6/enterprises");
    }

    #[test]
    fn children_of_instance_hang_off_personal_url() {
        let s = session();
        let url = s
            .children_url(&enterprise("e-42"), &Identity::new("domain", "domains"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://vsd.example.com:8443/nuage/api/v6/enterprises/e-42/domains"
        );
    }

    #[test]
    fn children_of_unsaved_parent_fail() {
        let s = session();
        let result = s.children_url(&enterprise(""), &Identity::new("domain", "domains"));
        assert!(matches!(result, Err(Error::MissingIdentifier { .. })));
    }

    #[test]
    fn identifiers_are_escaped_as_one_segment() {
        let s = session();
        let url = s.personal_url(&enterprise("e?1#x/y")).unwrap();

        assert_eq!(
            url.as_str(),
            "https://vsd.example.com:8443/nuage/api/v6/enterprises/e%3F1%23x%2Fy"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn base_url_without_path() {
        let s = Session::with_client(
            reqwest::Client::new(),
            "https://vsd.example.com",
            Credentials::password("csproot", "csproot", "csp"),
            DynamicRoot::default(),
        )
        .unwrap();

        assert_eq!(
            s.general_url(&enterprise("e-1")).unwrap().as_str(),
            "https://vsd.example.com/enterprises"
        );
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        let result = Session::with_client(
            reqwest::Client::new(),
            "mailto:csproot@example.com",
            Credentials::password("csproot", "csproot", "csp"),
            DynamicRoot::default(),
        );
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = Session::with_client(
            reqwest::Client::new(),
            "not a url",
            Credentials::password("csproot", "csproot", "csp"),
            DynamicRoot::default(),
        );
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
