//! Custom CalDAV requests not covered by libdav's built-ins.

use http::uri::PathAndQuery;
use http::{Method, Request, Uri};
use libdav::requests::{DavRequest, ParseResponseError};

/// Request to fetch calendar resources with server-side time-range
/// filtering.
///
/// Uses the CalDAV calendar-query REPORT with a time-range filter, which is
/// much cheaper than fetching every event and filtering locally.
pub(crate) struct EventsInRange<'a> {
    collection_href: &'a str,
    start: String,
    end: String,
}

impl<'a> EventsInRange<'a> {
    /// `start` and `end` must be in CalDAV format: `YYYYMMDDTHHMMSSZ`.
    pub(crate) fn new(collection_href: &'a str, start: String, end: String) -> Self {
        Self {
            collection_href,
            start,
            end,
        }
    }
}

/// A fetched calendar resource with its ICS data.
#[derive(Debug)]
pub(crate) struct FetchedResource {
    pub href: String,
    pub data: String,
}

/// Response from an [`EventsInRange`] request.
#[derive(Debug)]
pub(crate) struct EventsInRangeResponse {
    pub resources: Vec<FetchedResource>,
}

impl DavRequest for EventsInRange<'_> {
    type Response = EventsInRangeResponse;
    type ParseError = ParseResponseError;
    type Error<E> = libdav::dav::WebDavError<E>;

    fn prepare_request(&self, base_url: Uri) -> Result<Request<String>, http::Error> {
        let body = format!(
            r#"<C:calendar-query xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
    <prop>
        <getetag/>
        <C:calendar-data/>
    </prop>
    <C:filter>
        <C:comp-filter name="VCALENDAR">
            <C:comp-filter name="VEVENT">
                <C:time-range start="{}" end="{}"/>
            </C:comp-filter>
        </C:comp-filter>
    </C:filter>
</C:calendar-query>"#,
            self.start, self.end
        );

        let mut parts = base_url.into_parts();
        parts.path_and_query = Some(PathAndQuery::try_from(self.collection_href)?);

        Request::builder()
            .method(Method::from_bytes(b"REPORT")?)
            .uri(Uri::from_parts(parts)?)
            .header("Depth", "1")
            .body(body)
    }

    fn parse_response(
        &self,
        parts: &http::response::Parts,
        body: &[u8],
    ) -> Result<Self::Response, ParseResponseError> {
        if !parts.status.is_success() {
            return Err(ParseResponseError::BadStatusCode(parts.status));
        }

        let resources = parse_multistatus(body)?;
        Ok(EventsInRangeResponse { resources })
    }
}

/// Parse calendar resources out of a CalDAV multistatus response.
fn parse_multistatus(body: &[u8]) -> Result<Vec<FetchedResource>, ParseResponseError> {
    let text = std::str::from_utf8(body)?;
    let doc = roxmltree::Document::parse(text)?;
    let root = doc.root_element();

    let mut resources = Vec::new();

    for response in root
        .descendants()
        .filter(|n| n.tag_name().name() == "response")
    {
        let href = response
            .descendants()
            .find(|n| n.tag_name().name() == "href")
            .and_then(|n| n.text())
            .map(|s| s.to_string());

        let Some(href) = href else { continue };

        let data = response
            .descendants()
            .find(|n| n.tag_name().name() == "calendar-data")
            .and_then(|n| n.text())
            .map(|s| s.to_string());

        // Only resources that actually carry calendar data
        if let Some(data) = data {
            resources.push(FetchedResource { href, data });
        }
    }

    Ok(resources)
}
