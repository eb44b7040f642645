//! Cursor-based pagination over REST collections.
//!
//! A [`Paginator`] walks a collection one item at a time. Pages are fetched
//! lazily: the first request is made on the first call to
//! [`Paginator::next`], and the following page only once every item of the
//! current page has been handed out and the caller asks for more. Exactly one
//! request is in flight at a time.
//!
//! The cursor for the next page is the `starting_after` query parameter of
//! the server's `links.next`. Items are returned in server order, page after
//! page. Nothing is deduplicated: if the collection changes while it is being
//! walked, the server may return overlapping pages and the duplicates are
//! passed through.

use std::{collections::HashSet, sync::Arc};

use futures::Stream;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    client::{Api, Client},
    query::ListOptions,
    response::Response,
    types::{Page, PaginatedLinks},
    Error,
};

/// Query parameter carrying the continuation cursor.
const STARTING_AFTER: &str = "starting_after";

/// Origin used to resolve relative `next` links; only the query is read.
const LINK_BASE: &str = "https://api.snyk.io/";

enum State<T> {
    /// The page described by the current options has not been requested yet.
    Idle,
    /// Handing out the items of a fetched page.
    Yielding {
        items: std::vec::IntoIter<T>,
        response: Arc<Response>,
    },
    /// The last page has been consumed.
    Terminated,
    /// A request, decode or cursor step failed.
    Failed,
}

/// Lazy iterator over every item of a paginated collection.
///
/// Created with [`Client::paginate`]. The paginator owns its copy of the
/// [`ListOptions`] and overwrites `starting_after` between pages;
/// `ending_before` is sent unchanged on every request.
///
/// Stopping early is just not calling [`next`](Self::next) again (or
/// dropping the paginator): no further request is made.
pub struct Paginator<'c, T> {
    client: &'c Client,
    api: Api,
    endpoint: String,
    opts: ListOptions,
    cancel: Option<CancellationToken>,
    max_pages: Option<usize>,
    pages_fetched: usize,
    /// Every cursor sent so far; the first page counts as the empty cursor.
    sent_cursors: HashSet<String>,
    state: State<T>,
    error: Option<Error>,
}

impl<'c, T> Paginator<'c, T>
where
    T: DeserializeOwned,
{
    pub(crate) fn new(client: &'c Client, api: Api, endpoint: &str, opts: ListOptions) -> Self {
        Self {
            client,
            api,
            endpoint: endpoint.to_string(),
            opts,
            cancel: None,
            max_pages: None,
            pages_fetched: 0,
            sent_cursors: HashSet::new(),
            state: State::Idle,
            error: None,
        }
    }

    /// Stops pagination once `token` is cancelled. The token is checked
    /// before every page request and aborts a request already in flight.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fails with [`Error::TooManyPages`] instead of requesting more than
    /// `max_pages` pages.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Returns the next item with the response of the page it came from.
    ///
    /// `None` means the collection is exhausted *or* pagination failed; check
    /// [`error`](Self::error) afterwards to tell the two apart.
    pub async fn next(&mut self) -> Option<(T, Arc<Response>)> {
        match self.try_next().await {
            Ok(item) => item,
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    /// Like [`next`](Self::next), but returns the error that ended pagination
    /// directly instead of keeping it for [`error`](Self::error).
    ///
    /// After an error every further call returns `Ok(None)`.
    pub async fn try_next(&mut self) -> Result<Option<(T, Arc<Response>)>, Error> {
        loop {
            match &mut self.state {
                State::Yielding { items, response } => {
                    if let Some(item) = items.next() {
                        return Ok(Some((item, Arc::clone(response))));
                    }
                    let next = response
                        .links
                        .as_ref()
                        .and_then(PaginatedLinks::next_link)
                        .map(str::to_string);
                    match next {
                        Some(link) => {
                            if let Err(e) = self.advance_cursor(&link) {
                                self.state = State::Failed;
                                return Err(e);
                            }
                            self.state = State::Idle;
                        }
                        None => {
                            tracing::trace!(endpoint = %self.endpoint, pages = self.pages_fetched, "pagination finished");
                            self.state = State::Terminated;
                            return Ok(None);
                        }
                    }
                }
                State::Idle => match self.fetch().await {
                    Ok((page, response)) => {
                        self.state = State::Yielding {
                            items: page.data.into_iter(),
                            response: Arc::new(response),
                        };
                    }
                    Err(e) => {
                        self.state = State::Failed;
                        return Err(e);
                    }
                },
                State::Terminated | State::Failed => return Ok(None),
            }
        }
    }

    /// The error that ended pagination, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Takes the error that ended pagination, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Cursor that will be (or was last) sent as `starting_after`.
    pub fn current_cursor(&self) -> Option<&str> {
        self.opts.starting_after.as_deref()
    }

    /// Number of page requests issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Converts the paginator into a stream of items. An error is yielded
    /// once as the last element.
    pub fn into_stream(self) -> impl Stream<Item = Result<(T, Arc<Response>), Error>> + 'c
    where
        T: 'c,
    {
        futures::stream::unfold(self, |mut paginator| async move {
            match paginator.try_next().await {
                Ok(Some(item)) => Some((Ok(item), paginator)),
                Ok(None) => None,
                Err(e) => Some((Err(e), paginator)),
            }
        })
    }

    async fn fetch(&mut self) -> Result<(Page<T>, Response), Error> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(Error::Cancelled);
        }
        if let Some(max_pages) = self.max_pages {
            if self.pages_fetched >= max_pages {
                return Err(Error::TooManyPages {
                    endpoint: self.endpoint.clone(),
                    max_pages,
                });
            }
        }
        self.pages_fetched += 1;
        self.sent_cursors
            .insert(self.opts.starting_after.clone().unwrap_or_default());
        self.client
            .fetch_page(self.api, &self.endpoint, &self.opts, self.cancel.as_ref())
            .await
    }

    fn advance_cursor(&mut self, next_link: &str) -> Result<(), Error> {
        let cursor = extract_starting_after(next_link)?;
        if self.sent_cursors.contains(&cursor) {
            return Err(Error::PaginationStalled {
                endpoint: self.endpoint.clone(),
                cursor,
            });
        }
        tracing::trace!(endpoint = %self.endpoint, cursor = %cursor, "advancing to next page");
        self.opts.starting_after = Some(cursor).filter(|c| !c.is_empty());
        Ok(())
    }
}

/// Extracts the `starting_after` cursor from a pagination link.
///
/// The link may be absolute or relative (`/orgs?starting_after=...`). The
/// value is returned as sent by the server; a link without the parameter
/// yields an empty string.
pub fn extract_starting_after(link: &str) -> Result<String, Error> {
    let url = match Url::parse(link) {
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(LINK_BASE).and_then(|base| base.join(link))
        }
        parsed => parsed,
    }
    .map_err(|source| Error::InvalidCursorLink {
        link: link.to_string(),
        source,
    })?;

    Ok(url
        .query_pairs()
        .find(|(key, _)| key == STARTING_AFTER)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default())
}
