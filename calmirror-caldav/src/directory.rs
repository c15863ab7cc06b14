//! CalDAV-backed collection directory.

use std::sync::Arc;

use calmirror_core::store::{Collection, Directory, RawDocument, SerializedRecord};
use calmirror_core::window::SyncWindow;
use calmirror_core::{MirrorError, MirrorResult};
use http::StatusCode;
use libdav::caldav::{FindCalendarHomeSet, FindCalendars, GetCalendarResources};
use libdav::dav::{Delete, GetProperty, PutResource, WebDavError};
use libdav::names;

use crate::client::{DavClient, create_client, resource_href, store_err};
use crate::requests::EventsInRange;

/// The account's calendar collections, discovered once at connect time.
pub struct CalDavDirectory {
    client: Arc<DavClient>,
    /// (display name, collection href) pairs.
    calendars: Vec<(String, String)>,
}

impl CalDavDirectory {
    /// Connect to a CalDAV server and discover the account's calendars:
    /// principal → calendar-home-set → calendar collections, each matched to
    /// its display name.
    pub async fn connect(base_url: &str, username: &str, password: &str) -> MirrorResult<Self> {
        let client = create_client(base_url, username, password)?;

        let principal = client
            .find_current_user_principal()
            .await
            .map_err(store_err)?
            .ok_or_else(|| MirrorError::Store("Server reported no principal".to_string()))?;

        let home_response = client
            .request(FindCalendarHomeSet::new(principal.path()))
            .await
            .map_err(store_err)?;
        let home = home_response
            .home_sets
            .first()
            .ok_or_else(|| MirrorError::Store("Account has no calendar home".to_string()))?;

        let found = client
            .request(FindCalendars::new(home.path()))
            .await
            .map_err(store_err)?;

        let mut calendars = Vec::new();
        for collection in found.calendars {
            let name = client
                .request(GetProperty::new(&collection.href, &names::DISPLAY_NAME))
                .await
                .ok()
                .and_then(|r| r.value)
                .unwrap_or_else(|| collection.href.clone());
            calendars.push((name, collection.href));
        }

        Ok(CalDavDirectory {
            client: Arc::new(client),
            calendars,
        })
    }

    /// Display names of every discovered calendar.
    pub fn calendar_names(&self) -> Vec<&str> {
        self.calendars.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Directory for CalDavDirectory {
    type Collection = CalDavCollection;

    async fn find(&self, name: &str) -> MirrorResult<Option<CalDavCollection>> {
        Ok(self
            .calendars
            .iter()
            .find(|(display_name, _)| display_name == name)
            .map(|(display_name, href)| CalDavCollection {
                client: Arc::clone(&self.client),
                name: display_name.clone(),
                href: href.clone(),
            }))
    }
}

/// One CalDAV calendar collection.
pub struct CalDavCollection {
    client: Arc<DavClient>,
    name: String,
    href: String,
}

impl Collection for CalDavCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, window: &SyncWindow) -> MirrorResult<Vec<RawDocument>> {
        if window.is_unbounded() {
            let response = self
                .client
                .request(GetCalendarResources::new(&self.href))
                .await
                .map_err(store_err)?;

            Ok(response
                .resources
                .into_iter()
                .filter_map(|resource| {
                    resource.content.ok().map(|content| RawDocument {
                        doc_ref: resource.href,
                        data: content.data,
                    })
                })
                .collect())
        } else {
            let start = window.from_or_epoch().format("%Y%m%dT%H%M%SZ").to_string();
            let end = window.to_or_horizon().format("%Y%m%dT%H%M%SZ").to_string();

            let response = self
                .client
                .request(EventsInRange::new(&self.href, start, end))
                .await
                .map_err(store_err)?;

            Ok(response
                .resources
                .into_iter()
                .map(|resource| RawDocument {
                    doc_ref: resource.href,
                    data: resource.data,
                })
                .collect())
        }
    }

    async fn append(&self, record: &SerializedRecord) -> MirrorResult<()> {
        let href = resource_href(&self.href, &record.uid);

        // Create-only PUT (If-None-Match: *), so an existing resource is
        // never overwritten.
        self.client
            .request(PutResource::new(&href).create(record.ics.clone(), "text/calendar"))
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn delete(&self, doc_ref: &str) -> MirrorResult<()> {
        match self.client.request(Delete::new(doc_ref).force()).await {
            Ok(_) => Ok(()),
            // Already gone is fine.
            Err(WebDavError::BadStatusCode(StatusCode::NOT_FOUND)) => Ok(()),
            Err(e) => Err(store_err(e)),
        }
    }
}
