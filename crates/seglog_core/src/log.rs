//! The segmented log.
//!
//! A [`Log`] owns an ordered run of [`Segment`]s. The last one is active and
//! takes every append; the others are sealed and only serve reads until
//! [`truncate`](Log::truncate) deletes them.
//!
//! ## Locking
//!
//! One reader-writer lock guards the segment list. Appends, truncation and
//! the lifecycle operations take it exclusively, so rotation is atomic with
//! respect to other appends. Reads and bounds queries share it.

use crate::config::Config;
use crate::dir::LogDir;
use crate::error::{CoreError, CoreResult};
use crate::reader::LogReader;
use crate::record::Record;
use crate::segment::{Segment, SegmentInfo};
use parking_lot::RwLock;
use std::iter;
use std::mem;
use std::path::Path;
use tracing::{debug, info, warn};

/// An append-only, offset-addressed record log stored in a directory.
///
/// # Example
///
/// ```no_run
/// use seglog_core::{Config, Log, Record};
///
/// let log = Log::open("/tmp/events", Config::default()).unwrap();
/// let offset = log.append(Record::new("hello")).unwrap();
/// assert_eq!(log.read(offset).unwrap().value, b"hello");
/// log.close().unwrap();
/// ```
#[derive(Debug)]
pub struct Log {
    dir: LogDir,
    config: Config,
    /// `None` once the log is closed or removed.
    state: RwLock<Option<Segments>>,
}

/// The open segments. There is always an active segment.
#[derive(Debug)]
struct Segments {
    sealed: Vec<Segment>,
    active: Segment,
}

impl Segments {
    fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.sealed.iter().chain(iter::once(&self.active))
    }

    /// Closes every segment, returning the first failure.
    fn close(self) -> CoreResult<()> {
        let mut result = Ok(());
        for segment in self.iter() {
            if let Err(e) = segment.close() {
                result = result.and(Err(e));
            }
        }
        result
    }
}

impl Log {
    /// Opens the log in `path`, creating the directory if needed.
    ///
    /// Zero limits in `config` are replaced by their defaults. Existing
    /// segments are reopened in base-offset order; a fresh directory gets
    /// one empty segment at `config.initial_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for an unusable configuration,
    /// [`CoreError::InvalidFormat`] if the directory holds anything other
    /// than segment files or segments overlap, or an I/O error.
    pub fn open(path: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let config = config.normalized();
        config.validate()?;

        let dir = LogDir::create(path.as_ref())?;
        let segments = Self::load(&dir, &config)?;

        info!(
            path = %dir.path().display(),
            segments = segments.sealed.len() + 1,
            lowest_offset = segments.sealed.first().unwrap_or(&segments.active).base_offset(),
            next_offset = segments.active.next_offset(),
            "opened log"
        );

        Ok(Self {
            dir,
            config,
            state: RwLock::new(Some(segments)),
        })
    }

    fn load(dir: &LogDir, config: &Config) -> CoreResult<Segments> {
        let mut opened: Vec<Segment> = Vec::new();

        for base_offset in dir.scan()? {
            let segment = Segment::open(dir, base_offset, config)?;

            if let Some(prev) = opened.last() {
                if segment.base_offset() < prev.next_offset() {
                    return Err(CoreError::invalid_format(format!(
                        "segment {} overlaps segment {} which ends at {}",
                        segment.base_offset(),
                        prev.base_offset(),
                        prev.next_offset()
                    )));
                }
                if segment.base_offset() > prev.next_offset() {
                    warn!(
                        from = prev.next_offset(),
                        to = segment.base_offset(),
                        "gap between segments"
                    );
                }
            }

            opened.push(segment);
        }

        let mut segments = match opened.pop() {
            Some(active) => Segments {
                sealed: opened,
                active,
            },
            None => {
                debug!(base_offset = config.initial_offset, "creating first segment");
                let active = Segment::open(dir, config.initial_offset, config)?;
                dir.sync()?;
                Segments {
                    sealed: Vec::new(),
                    active,
                }
            }
        };

        if segments.active.is_maxed() {
            warn!(
                base_offset = segments.active.base_offset(),
                "active segment is full, rotating"
            );
            Self::rotate(dir, config, &mut segments)?;
        }

        Ok(segments)
    }

    /// Seals the active segment and starts a new one at its next offset.
    fn rotate(dir: &LogDir, config: &Config, segments: &mut Segments) -> CoreResult<()> {
        segments.active.flush()?;

        let base_offset = segments.active.next_offset();
        let fresh = Segment::open(dir, base_offset, config)?;
        dir.sync()?;

        let sealed = mem::replace(&mut segments.active, fresh);

        info!(
            sealed = sealed.base_offset(),
            active = base_offset,
            "rotated segment"
        );
        segments.sealed.push(sealed);
        Ok(())
    }

    /// Returns the log directory.
    #[must_use]
    pub fn dir(&self) -> &LogDir {
        &self.dir
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns whether the log is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.read().is_some()
    }

    /// Appends a record and returns the offset it was assigned.
    ///
    /// When the append fills the active segment, a new active segment is
    /// created at the next offset before the lock is released. The record
    /// that filled the segment stays in it.
    ///
    /// A full active segment is also rotated before the write, so a failed
    /// rotation is retried by the next append.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log is closed, or an I/O
    /// error. The record is not stored when an error is returned.
    pub fn append(&self, record: Record) -> CoreResult<u64> {
        let mut guard = self.state.write();
        let segments = guard.as_mut().ok_or(CoreError::LogClosed)?;

        if segments.active.is_maxed() {
            Self::rotate(&self.dir, &self.config, segments)?;
        }

        let offset = segments.active.append(record)?;

        if segments.active.is_maxed() {
            if let Err(e) = Self::rotate(&self.dir, &self.config, segments) {
                // The record is stored; the next append rotates again
                warn!(
                    base_offset = segments.active.base_offset(),
                    error = %e,
                    "rotation failed"
                );
            }
        }

        Ok(offset)
    }

    /// Reads the record at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OffsetOutOfRange`] if no segment holds the
    /// offset, [`CoreError::LogClosed`] if the log is closed, or a decode
    /// error for damaged data.
    pub fn read(&self, offset: u64) -> CoreResult<Record> {
        let guard = self.state.read();
        let segments = guard.as_ref().ok_or(CoreError::LogClosed)?;

        let record = segments
            .iter()
            .find(|segment| segment.contains(offset))
            .ok_or_else(|| CoreError::out_of_range(offset))?
            .read(offset);
        record
    }

    /// Returns the base offset of the oldest segment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log is closed.
    pub fn lowest_offset(&self) -> CoreResult<u64> {
        let guard = self.state.read();
        let segments = guard.as_ref().ok_or(CoreError::LogClosed)?;

        Ok(segments
            .sealed
            .first()
            .unwrap_or(&segments.active)
            .base_offset())
    }

    /// Returns the offset of the last appended record.
    ///
    /// Returns `0` when nothing has ever been appended at or above offset
    /// zero; check [`next_offset`](Self::next_offset) to tell an empty log
    /// from one holding only offset `0`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log is closed.
    pub fn highest_offset(&self) -> CoreResult<u64> {
        Ok(self.next_offset()?.saturating_sub(1))
    }

    /// Returns the offset the next append will be assigned.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log is closed.
    pub fn next_offset(&self) -> CoreResult<u64> {
        let guard = self.state.read();
        let segments = guard.as_ref().ok_or(CoreError::LogClosed)?;
        Ok(segments.active.next_offset())
    }

    /// Deletes every segment whose records are all at or below `lowest`.
    ///
    /// Only whole segments are removed, so records at or below `lowest`
    /// that share a segment with a later record stay readable. If the
    /// active segment qualifies it is replaced by an empty one at the same
    /// next offset, and numbering continues.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log is closed, or an I/O
    /// error while deleting files.
    pub fn truncate(&self, lowest: u64) -> CoreResult<()> {
        let mut guard = self.state.write();
        let segments = guard.as_mut().ok_or(CoreError::LogClosed)?;

        let watermark = lowest.saturating_add(1);
        let mut removed = 0usize;

        // A segment leaves the list only once its files are gone
        while let Some(segment) = segments.sealed.first() {
            if segment.next_offset() > watermark {
                break;
            }
            segment.remove(&self.dir)?;
            segments.sealed.remove(0);
            removed += 1;
        }

        if !segments.active.is_empty() && segments.active.next_offset() <= watermark {
            let next_offset = segments.active.next_offset();
            let fresh = Segment::open(&self.dir, next_offset, &self.config)?;
            segments.active.remove(&self.dir)?;
            segments.active = fresh;
            removed += 1;
        }

        if removed > 0 {
            self.dir.sync()?;
        }

        info!(lowest, removed, "truncated log");
        Ok(())
    }

    /// Returns a reader over the raw bytes of every segment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log is closed.
    pub fn reader(&self) -> CoreResult<LogReader> {
        let guard = self.state.read();
        let segments = guard.as_ref().ok_or(CoreError::LogClosed)?;
        Ok(LogReader::new(segments.iter().map(Segment::store).collect()))
    }

    /// Returns a snapshot of every segment, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log is closed.
    pub fn segments(&self) -> CoreResult<Vec<SegmentInfo>> {
        let guard = self.state.read();
        let segments = guard.as_ref().ok_or(CoreError::LogClosed)?;
        Ok(segments.iter().map(Segment::info).collect())
    }

    /// Drains buffered writes of every segment to the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log is closed, or an I/O
    /// error.
    pub fn flush(&self) -> CoreResult<()> {
        let guard = self.state.read();
        let segments = guard.as_ref().ok_or(CoreError::LogClosed)?;
        let result = segments.iter().try_for_each(Segment::flush);
        result
    }

    /// Closes every segment, keeping the files.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LogClosed`] if the log was already closed.
    pub fn close(&self) -> CoreResult<()> {
        let segments = self.state.write().take().ok_or(CoreError::LogClosed)?;
        segments.close()?;
        debug!(path = %self.dir.path().display(), "closed log");
        Ok(())
    }

    /// Closes the log if it is open and deletes its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment cannot be closed or the directory
    /// cannot be deleted.
    pub fn remove(&self) -> CoreResult<()> {
        let mut guard = self.state.write();
        self.remove_locked(&mut guard)?;
        info!(path = %self.dir.path().display(), "removed log");
        Ok(())
    }

    /// Deletes every record and reopens as an empty log at the initial
    /// offset.
    ///
    /// Also reopens a closed log.
    ///
    /// # Errors
    ///
    /// Returns an error if the old files cannot be deleted or the new
    /// segment cannot be created.
    pub fn reset(&self) -> CoreResult<()> {
        let mut guard = self.state.write();
        self.remove_locked(&mut guard)?;

        self.dir.recreate()?;
        *guard = Some(Self::load(&self.dir, &self.config)?);

        info!(
            path = %self.dir.path().display(),
            initial_offset = self.config.initial_offset,
            "reset log"
        );
        Ok(())
    }

    fn remove_locked(&self, state: &mut Option<Segments>) -> CoreResult<()> {
        if let Some(segments) = state.take() {
            segments.close()?;
        }
        self.dir.remove_all()
    }
}
