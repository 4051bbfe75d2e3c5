use crate::app::Result;
use crate::domain::{ItemFilter, Source};
use crate::remote::{FetchedPage, RemoteSource};
use crate::sync::Snapshot;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Result of a "load more" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMore {
    /// The page was appended. `end_of_data` is set for a short page.
    Appended { count: usize, end_of_data: bool },
    /// An earlier short page already reached the end.
    Exhausted,
    /// Another page is still being fetched.
    InFlight,
    /// The displayed snapshot was replaced while the page was in flight.
    Superseded,
}

/// A page to request from the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
    /// Identifies the request to `finish` and `abort`.
    pub ticket: u64,
}

/// Fixed-size paging over the displayed snapshot.
///
/// The offset always advances by `page_size`, never by the number of items
/// a page actually returned. At most one request is in flight; completions
/// for any other request are ignored.
#[derive(Debug, Clone)]
pub struct Paginator {
    page_size: usize,
    next_offset: usize,
    exhausted: bool,
    in_flight: Option<u64>,
    issued: u64,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            next_offset: 0,
            exhausted: false,
            in_flight: None,
            issued: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn next_offset(&self) -> usize {
        self.next_offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Displayed now holds exactly the first page. Any request still in
    /// flight belongs to the old list.
    pub fn reset_to_first_page(&mut self) {
        self.next_offset = self.page_size;
        self.exhausted = false;
        self.in_flight = None;
    }

    pub fn begin(&mut self) -> std::result::Result<PageRequest, LoadMore> {
        if self.exhausted {
            return Err(LoadMore::Exhausted);
        }
        if self.in_flight.is_some() {
            return Err(LoadMore::InFlight);
        }
        self.issued += 1;
        self.in_flight = Some(self.issued);
        Ok(PageRequest {
            limit: self.page_size,
            offset: self.next_offset,
            ticket: self.issued,
        })
    }

    /// Record a successful page of `fetched` items.
    pub fn finish(&mut self, request: PageRequest, fetched: usize) -> bool {
        if self.in_flight != Some(request.ticket) {
            return false;
        }
        self.in_flight = None;
        self.next_offset += self.page_size;
        self.exhausted = fetched < self.page_size;
        true
    }

    /// The page was not applied; the same offset is requested next time.
    pub fn abort(&mut self, request: PageRequest) {
        if self.in_flight == Some(request.ticket) {
            self.in_flight = None;
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Fetch one further page and return `displayed` with it appended.
///
/// Earlier pages are never fetched again and nothing is de-duplicated:
/// the remote side guarantees disjoint windows by offset.
pub async fn load_more(
    remote: &dyn RemoteSource,
    subscriptions: &[Source],
    displayed: &Snapshot,
    request: PageRequest,
    filter: &ItemFilter,
) -> Result<(Snapshot, FetchedPage)> {
    let page = remote
        .fetch_items(
            subscriptions,
            request.limit,
            request.offset,
            filter.remote_scope(),
        )
        .await?;
    let grown = displayed.appended(page.items.clone());
    Ok((grown, page))
}
