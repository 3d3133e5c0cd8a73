use tracing::debug;
use crate::config::PagingConfig;

/// Which slice of the listing to fetch next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    pub start: usize,
    pub page_size: usize,
    pub total: usize,
}

impl PaginationCursor {
    pub fn new(page_size: usize, total: usize) -> Self {
        Self {
            start: 0,
            page_size: page_size.max(1),
            total,
        }
    }

    pub fn advanced(self) -> Self {
        Self {
            start: self.start.saturating_add(self.page_size),
            ..self
        }
    }

    pub fn has_more(&self) -> bool {
        self.start < self.total
    }

    /// The cursor for the following page, or `None` once it would run past `total`.
    pub fn next(self) -> Option<Self> {
        let next = self.advanced();
        next.has_more().then_some(next)
    }
}

/// Geometry of the scrolled document, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportMetrics {
    /// Bottom edge of the document relative to the top of the viewport.
    pub document_bottom: i64,
    pub client_height: i64,
}

impl ViewportMetrics {
    pub fn new(document_bottom: i64, client_height: i64) -> Self {
        Self {
            document_bottom,
            client_height,
        }
    }

    /// Document scrolled all the way down.
    pub fn at_bottom(client_height: i64) -> Self {
        Self::new(client_height, client_height)
    }

    pub fn near_bottom(&self, threshold: i64) -> bool {
        self.document_bottom < self.client_height + threshold
    }
}

/// One issued page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub seq: u64,
    pub start: usize,
    pub page_size: usize,
}

/// Decides when the next page is requested and which responses may be applied.
///
/// Only one page request is outstanding at a time. Every ticket carries a
/// sequence number and a completion is accepted only for the ticket currently
/// in flight, so responses that were cancelled or superseded are dropped.
#[derive(Debug)]
pub struct PaginationController {
    cursor: PaginationCursor,
    threshold: i64,
    in_flight: Option<PageTicket>,
    retry: bool,
    next_seq: u64,
}

impl PaginationController {
    pub fn new(config: PagingConfig, total: usize) -> Self {
        Self {
            cursor: PaginationCursor::new(config.page_size, total),
            threshold: config.scroll_threshold,
            in_flight: None,
            retry: false,
            next_seq: 0,
        }
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn in_flight(&self) -> Option<PageTicket> {
        self.in_flight
    }

    /// First page, issued regardless of scroll position or total.
    pub fn initial(&mut self) -> PageTicket {
        self.cursor = PaginationCursor::new(self.cursor.page_size, self.cursor.total);
        self.retry = false;
        self.issue()
    }

    /// React to a scroll event.
    pub fn on_scroll(&mut self, metrics: ViewportMetrics) -> Option<PageTicket> {
        if !metrics.near_bottom(self.threshold) {
            return None;
        }
        if let Some(pending) = self.in_flight {
            debug!(seq = pending.seq, start = pending.start, "page request already in flight");
            return None;
        }
        if self.retry {
            self.retry = false;
            debug!(start = self.cursor.start, "retrying failed page");
            return Some(self.issue());
        }
        let next = self.cursor.next()?;
        self.cursor = next;
        Some(self.issue())
    }

    /// Returns true if the response for `ticket` should be applied.
    pub fn complete(&mut self, ticket: PageTicket) -> bool {
        match self.in_flight {
            Some(current) if current.seq == ticket.seq => {
                self.in_flight = None;
                true
            }
            _ => {
                debug!(seq = ticket.seq, start = ticket.start, "discarding stale page");
                false
            }
        }
    }

    /// The request for `ticket` failed; the same page is requested on the next scroll.
    pub fn fail(&mut self, ticket: PageTicket) {
        if matches!(self.in_flight, Some(current) if current.seq == ticket.seq) {
            self.in_flight = None;
            self.retry = true;
        }
    }

    /// Drop the outstanding request; a late response for it will be discarded.
    pub fn cancel(&mut self) -> Option<PageTicket> {
        let cancelled = self.in_flight.take();
        if cancelled.is_some() {
            self.retry = true;
        }
        cancelled
    }

    fn issue(&mut self) -> PageTicket {
        let ticket = PageTicket {
            seq: self.next_seq,
            start: self.cursor.start,
            page_size: self.cursor.page_size,
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket);
        ticket
    }
}
