use anyhow::{Context, Result};
use async_trait::async_trait;
use critmon_common::record::RawRecord;
use std::collections::VecDeque;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader};

/// One poll of the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPoll {
    Record(RawRecord),
    /// Nothing available right now; the caller waits and polls again.
    Empty,
}

/// Ordered source of critical records.
///
/// `next_record` must not block indefinitely: an idle feed answers
/// [`FeedPoll::Empty`]. An `Err` means the feed is gone for good.
#[async_trait]
pub trait RecordFeed: Send {
    async fn next_record(&mut self) -> Result<FeedPoll>;
}

/// Feed backed by an in-memory queue. Answers `Empty` once drained.
#[derive(Debug, Default)]
pub struct MemoryFeed {
    records: VecDeque<RawRecord>,
}

impl MemoryFeed {
    pub fn new(records: impl IntoIterator<Item = RawRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    pub fn push(&mut self, record: RawRecord) {
        self.records.push_back(record);
    }
}

#[async_trait]
impl RecordFeed for MemoryFeed {
    async fn next_record(&mut self) -> Result<FeedPoll> {
        Ok(self
            .records
            .pop_front()
            .map_or(FeedPoll::Empty, FeedPoll::Record))
    }
}

/// Tails a file holding one JSON record per line.
///
/// Reading starts `backlog` lines before the current end of file so a
/// restart replays only recent history. A trailing line without its
/// newline is held back until the producer finishes writing it.
pub struct JsonLinesFeed {
    path: PathBuf,
    reader: BufReader<File>,
    pending: Vec<u8>,
    line_no: u64,
}

impl JsonLinesFeed {
    pub async fn open(path: impl AsRef<Path>, backlog: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)
            .await
            .with_context(|| format!("Failed to open feed file '{}'", path.display()))?;

        let offset = tail_start(&mut file, backlog, TAIL_CHUNK)
            .await
            .with_context(|| format!("Failed to scan feed file '{}'", path.display()))?;
        file.seek(SeekFrom::Start(offset)).await?;

        tracing::info!(
            path = %path.display(),
            start_offset = offset,
            backlog,
            "Feed opened"
        );

        Ok(Self {
            path,
            reader: BufReader::new(file),
            pending: Vec::new(),
            line_no: 0,
        })
    }
}

#[async_trait]
impl RecordFeed for JsonLinesFeed {
    async fn next_record(&mut self) -> Result<FeedPoll> {
        loop {
            let read = self
                .reader
                .read_until(b'\n', &mut self.pending)
                .await
                .with_context(|| format!("Failed to read feed file '{}'", self.path.display()))?;

            if read == 0 || !self.pending.ends_with(b"\n") {
                return Ok(FeedPoll::Empty);
            }

            self.line_no += 1;
            let bytes = std::mem::take(&mut self.pending);
            let text = String::from_utf8_lossy(&bytes);
            let line = text.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<RawRecord>(line) {
                Ok(record) => return Ok(FeedPoll::Record(record)),
                Err(e) => {
                    tracing::debug!(line = self.line_no, error = %e, "Skipping undecodable feed line");
                }
            }
        }
    }
}

const TAIL_CHUNK: usize = 64 * 1024;

/// Byte offset at which the last `backlog` complete or partial lines begin.
///
/// Reads backwards from the end in `chunk_size` pieces, so only the tail of
/// the file is touched.
async fn tail_start(file: &mut File, backlog: usize, chunk_size: usize) -> Result<u64> {
    let len = file.seek(SeekFrom::End(0)).await?;
    if backlog == 0 || len == 0 {
        return Ok(len);
    }

    // A trailing newline terminates the last line rather than starting a new one.
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1)).await?;
    file.read_exact(&mut last).await?;
    let mut end = if last[0] == b'\n' { len - 1 } else { len };

    let mut remaining = backlog;
    let mut buf = vec![0u8; chunk_size.max(1)];
    while end > 0 {
        let start = end.saturating_sub(buf.len() as u64);
        let chunk = &mut buf[..(end - start) as usize];
        file.seek(SeekFrom::Start(start)).await?;
        file.read_exact(chunk).await?;
        match scan_back(chunk, remaining) {
            Ok(idx) => return Ok(start + idx as u64),
            Err(seen) => remaining -= seen,
        }
        end = start;
    }
    Ok(0)
}

/// Finds the `wanted`-th newline from the end of `chunk` and returns the
/// index just past it, or the number of newlines seen if there are fewer.
fn scan_back(chunk: &[u8], wanted: usize) -> std::result::Result<usize, usize> {
    let mut seen = 0;
    for (idx, byte) in chunk.iter().enumerate().rev() {
        if *byte == b'\n' {
            seen += 1;
            if seen == wanted {
                return Ok(idx + 1);
            }
        }
    }
    Err(seen)
}
