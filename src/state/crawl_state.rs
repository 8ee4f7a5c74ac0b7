/// Crawl state for one run of the page loop
///
/// The state owns the page cursor, the accepted records and the identity
/// set. It is created fresh by every run and never shared.
use crate::record::{Record, RequiredFields};
use crate::state::{SeenSet, SessionId};
use std::fmt;

/// Why a crawl run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page at `page` signaled that there are no more results
    EndOfData { page: u32 },

    /// The page at `page` produced no records without an explicit end signal
    EmptyPage { page: u32 },

    /// The configured page ceiling was reached
    MaxPages { max_pages: u32 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfData { page } => write!(f, "no more results at page {}", page),
            Self::EmptyPage { page } => write!(f, "no records extracted from page {}", page),
            Self::MaxPages { max_pages } => write!(f, "reached page limit of {}", max_pages),
        }
    }
}

/// Outcome of filtering one page's records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTally {
    /// Records appended to the result
    pub accepted: usize,

    /// Records missing a required field
    pub incomplete: usize,

    /// Records with an empty identity value
    pub unidentified: usize,

    /// Records whose identity was already accepted
    pub duplicates: usize,
}

#[derive(Debug)]
pub struct CrawlState {
    page: u32,
    fetches: u32,
    records: Vec<Record>,
    seen: SeenSet,
    session_id: SessionId,
    stop: Option<StopReason>,
}

impl CrawlState {
    /// Creates the state for a new run, positioned at page 1
    pub fn new(session_id: SessionId) -> Self {
        Self {
            page: 1,
            fetches: 0,
            records: Vec::new(),
            seen: SeenSet::new(),
            session_id,
            stop: None,
        }
    }

    /// Current page index (1-based)
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of page fetches that completed so far
    pub fn fetches(&self) -> u32 {
        self.fetches
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Records accepted so far, in acceptance order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    pub fn is_finished(&self) -> bool {
        self.stop.is_some()
    }

    /// Notes that the fetch for the current page returned
    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    /// Filters one page of records into the accumulated result
    ///
    /// Each candidate is checked in order:
    /// 1. Missing required fields: dropped, identity not recorded
    /// 2. Empty identity value: dropped
    /// 3. Identity already seen: dropped
    /// 4. Otherwise the identity is marked seen and the record appended
    pub fn absorb(
        &mut self,
        candidates: Vec<Record>,
        identity_field: &str,
        required: &RequiredFields,
    ) -> PageTally {
        let mut tally = PageTally::default();

        for record in candidates {
            if !required.is_satisfied_by(&record) {
                tracing::debug!(
                    "Dropping incomplete record on page {} (missing: {})",
                    self.page,
                    required.missing_from(&record).join(", ")
                );
                tally.incomplete += 1;
                continue;
            }

            let Some(key) = record.identity(identity_field) else {
                tally.unidentified += 1;
                continue;
            };

            if !self.seen.is_new(&key) {
                tracing::debug!("Duplicate record '{}' found. Skipping.", key);
                tally.duplicates += 1;
                continue;
            }

            self.seen.mark_seen(key);
            self.records.push(record);
            tally.accepted += 1;
        }

        tally
    }

    /// Moves to the next page
    ///
    /// Returns false, and marks the run finished, once the next page would
    /// exceed `max_pages`.
    pub fn advance(&mut self, max_pages: u32) -> bool {
        self.page += 1;
        if self.page > max_pages {
            self.finish(StopReason::MaxPages { max_pages });
            return false;
        }
        true
    }

    /// Marks the run finished; the first reason recorded wins
    pub fn finish(&mut self, reason: StopReason) {
        if self.stop.is_none() {
            self.stop = Some(reason);
        }
    }

    /// Consumes the state, returning the accepted records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
