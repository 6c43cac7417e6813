use std::io;

use thiserror::Error;

use super::{ProjectionError, RowProjector};
use crate::{
    logging::{projector_log, LogContext},
    record::{NativeRecord, OutputRecord},
    schema::OutputSchema,
};

/// Error surfaced by a [`RecordReader`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// The pull was interrupted before a record was available.
    #[error("reader interrupted: {0}")]
    Interrupted(#[source] io::Error),
    /// Any other I/O failure in the storage read path.
    #[error("reader io error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for ReadError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::Interrupted {
            ReadError::Interrupted(err)
        } else {
            ReadError::Io(err)
        }
    }
}

/// Pull interface over the rows of one segment split.
pub trait RecordReader {
    /// Row type produced by the reader.
    type Record: NativeRecord;

    /// Advance to the next row, `Ok(None)` once the split is exhausted.
    fn next_record(&mut self) -> Result<Option<Self::Record>, ReadError>;
}

/// In-memory reader yielding a fixed sequence of rows or failures.
#[derive(Debug)]
pub struct VecReader<T> {
    items: std::vec::IntoIter<Result<T, ReadError>>,
}

impl<T: NativeRecord> VecReader<T> {
    /// Reader over `rows`.
    pub fn new(rows: Vec<T>) -> Self {
        Self::from_results(rows.into_iter().map(Ok).collect())
    }

    /// Reader replaying `items`, failures included.
    pub fn from_results(items: Vec<Result<T, ReadError>>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl<T: NativeRecord> RecordReader for VecReader<T> {
    type Record = T;

    fn next_record(&mut self) -> Result<Option<T>, ReadError> {
        self.items.next().transpose()
    }
}

/// Lifecycle of a [`ProjectingReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Rows are pulled from the underlying reader.
    Open,
    /// The reader signalled the end; no further pulls happen.
    Exhausted,
}

/// Pairs a [`RecordReader`] with a [`RowProjector`], yielding one output row
/// per native row.
///
/// Holds at most the row in flight. Once the reader reports exhaustion every
/// later call returns `Ok(None)` without touching the reader again.
pub struct ProjectingReader<R> {
    reader: R,
    projector: RowProjector,
    state: ReaderState,
    records: u64,
    log_ctx: LogContext,
}

impl<R: RecordReader> ProjectingReader<R> {
    /// Start projecting rows from `reader`.
    pub fn new(reader: R, projector: RowProjector) -> Self {
        Self {
            reader,
            projector,
            state: ReaderState::Open,
            records: 0,
            log_ctx: LogContext::default(),
        }
    }

    pub(crate) fn with_log_context(mut self, log_ctx: LogContext) -> Self {
        self.log_ctx = log_ctx;
        self
    }

    /// Current state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Rows projected so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Schema of the rows this reader yields.
    pub fn schema(&self) -> OutputSchema {
        self.projector.schema()
    }

    /// Pull and project the next row.
    pub fn next_record(&mut self) -> Result<Option<OutputRecord>, ProjectionError> {
        if self.state == ReaderState::Exhausted {
            return Ok(None);
        }

        let row = match self.reader.next_record() {
            Ok(Some(row)) => row,
            Ok(None) => {
                self.state = ReaderState::Exhausted;
                projector_log!(
                    log::Level::Debug,
                    ctx: &self.log_ctx,
                    "reader_exhausted",
                    "records={}",
                    self.records
                );
                return Ok(None);
            }
            Err(err) => {
                projector_log!(
                    log::Level::Warn,
                    ctx: &self.log_ctx,
                    "read_failed",
                    "records={} error={}",
                    self.records,
                    err
                );
                return Err(err.into());
            }
        };

        let record = self.projector.project(&row).inspect_err(|err| {
            projector_log!(
                log::Level::Warn,
                ctx: &self.log_ctx,
                "projection_failed",
                "records={} error={}",
                self.records,
                err
            );
        })?;
        self.records += 1;
        Ok(Some(record))
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: RecordReader> Iterator for ProjectingReader<R> {
    type Item = Result<OutputRecord, ProjectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
