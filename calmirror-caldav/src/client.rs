//! CalDAV client construction helpers.

use calmirror_core::{MirrorError, MirrorResult};
use http::Uri;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{client::legacy::Client, rt::TokioExecutor};
use libdav::CalDavClient;
use libdav::dav::WebDavClient;
use tower::ServiceBuilder;
use tower_http::auth::AddAuthorization;
use tower_http::follow_redirect::FollowRedirect;

/// HTTP client with auth and redirect following.
pub(crate) type HttpClient = FollowRedirect<
    AddAuthorization<
        Client<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>, String>,
    >,
>;

pub(crate) type DavClient = CalDavClient<HttpClient>;

/// Create a CalDAV client for the given server.
///
/// The client is configured with basic authentication and automatic
/// redirect following (providers commonly redirect to user-specific hosts).
pub(crate) fn create_client(
    base_url: &str,
    username: &str,
    password: &str,
) -> MirrorResult<DavClient> {
    let uri: Uri = base_url
        .parse()
        .map_err(|_| MirrorError::Config(format!("Invalid server URL: {}", base_url)))?;

    let https_connector = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| MirrorError::Store(format!("Failed to load native TLS roots: {}", e)))?
        .https_or_http()
        .enable_http1()
        .build();

    let http_client = Client::builder(TokioExecutor::new()).build(https_connector);

    let auth_client = AddAuthorization::basic(http_client, username, password);

    let client = ServiceBuilder::new()
        .layer(tower_http::follow_redirect::FollowRedirectLayer::new())
        .service(auth_client);

    let webdav = WebDavClient::new(uri, client);
    Ok(CalDavClient::new(webdav))
}

/// Build the resource href for a record inside a collection.
pub(crate) fn resource_href(collection_href: &str, uid: &str) -> String {
    format!("{}/{}.ics", collection_href.trim_end_matches('/'), uid)
}

pub(crate) fn store_err<E: std::fmt::Debug>(err: E) -> MirrorError {
    MirrorError::Store(format!("{:?}", err))
}
