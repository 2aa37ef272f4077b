use crate::store::{RequesterRecord, RequesterStore, ScanRequest, StoreError};

/// Lazy, restartable walk over every requester record, one page at a time.
///
/// Ends after the last page or after the first failed read. `cursor()` is the
/// resume point after the last page that was read successfully.
pub struct RecordPages<'a> {
    store: &'a dyn RequesterStore,
    page_size: usize,
    cursor: Option<String>,
    done: bool,
}

impl<'a> RecordPages<'a> {
    pub fn new(store: &'a dyn RequesterStore, page_size: usize) -> Self {
        Self::resume(store, page_size, None)
    }

    /// Start after `cursor` instead of at the beginning.
    pub fn resume(store: &'a dyn RequesterStore, page_size: usize, cursor: Option<String>) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            cursor,
            done: false,
        }
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// True once iteration has ended, after the last page or a failed read.
    pub fn is_exhausted(&self) -> bool {
        self.done
    }
}

impl Iterator for RecordPages<'_> {
    type Item = Result<Vec<RequesterRecord>, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let request = match &self.cursor {
            Some(after) => ScanRequest::after(after.clone(), self.page_size),
            None => ScanRequest::first(self.page_size),
        };

        match self.store.scan(&request) {
            Ok(page) => {
                match page.next_cursor {
                    Some(next) => self.cursor = Some(next),
                    None => self.done = true,
                }
                Some(Ok(page.records))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
