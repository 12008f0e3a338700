//! First-match signature scanning over a memory region

use super::pattern::Pattern;
use super::MemoryAccess;
use crate::config::ScannerConfig;
use crate::core::types::{Address, MemoryError, MemoryRegion, MemoryResult};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, trace};

/// Order in which candidate offsets are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Ascending offsets; the lowest matching address wins
    #[default]
    Forward,
}

/// Options for pattern scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Distance between candidate offsets; 1 is exhaustive
    pub step: usize,
    /// Bytes fetched per read
    pub chunk_size: usize,
    pub mode: SearchMode,
    /// Buffers at least this large are scanned on the rayon pool
    pub parallel_threshold: usize,
    pub max_threads: usize,
}

impl ScanOptions {
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    fn validate(&self) -> MemoryResult<()> {
        if self.step == 0 {
            return Err(MemoryError::InvalidArgument(
                "scan step must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions::from(&ScannerConfig::default())
    }
}

impl From<&ScannerConfig> for ScanOptions {
    fn from(config: &ScannerConfig) -> Self {
        ScanOptions {
            step: 1,
            chunk_size: config.chunk_size.max(1),
            mode: SearchMode::Forward,
            parallel_threshold: config.parallel_threshold,
            max_threads: config.max_threads.max(1),
        }
    }
}

/// Work done by one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Candidate offsets compared against the pattern
    pub windows_examined: usize,
    pub bytes_fetched: usize,
    pub reads_issued: usize,
}

/// Scans regions of one address space
pub struct PatternScanner<'a, M: MemoryAccess + ?Sized> {
    memory: &'a M,
    options: ScanOptions,
}

impl<'a, M: MemoryAccess + ?Sized> PatternScanner<'a, M> {
    /// Create a new scanner with default options
    pub fn new(memory: &'a M) -> Self {
        Self::with_options(memory, ScanOptions::default())
    }

    pub fn with_options(memory: &'a M, options: ScanOptions) -> Self {
        PatternScanner { memory, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Address of the first window in `region` matching `pattern`
    pub fn scan(&self, region: MemoryRegion, pattern: &Pattern) -> MemoryResult<Option<Address>> {
        self.scan_with_stats(region, pattern).map(|(found, _)| found)
    }

    /// Like [`PatternScanner::scan`], also reporting how much work was done.
    ///
    /// Windows start at `region.base() + k * step` and must lie entirely inside
    /// the region. Memory is fetched `chunk_size` bytes at a time and refetched
    /// from the current offset whenever a window runs past the buffered bytes.
    /// A chunk that cannot be read whole is retried as the single window at the
    /// current offset, so a match before an unreadable tail is still reported.
    /// The scan fails only when that window itself is unreadable.
    pub fn scan_with_stats(
        &self,
        region: MemoryRegion,
        pattern: &Pattern,
    ) -> MemoryResult<(Option<Address>, ScanStats)> {
        self.options.validate()?;

        let mut stats = ScanStats::default();
        let len = pattern.len();
        let size = region.size();
        if len > size {
            return Ok((None, stats));
        }

        let last = size - len;
        let chunk_size = self.options.chunk_size.max(len);
        let mut buffer: Vec<u8> = Vec::with_capacity(chunk_size);
        let mut buffer_start = 0usize;
        let mut offset = 0usize;

        loop {
            if offset < buffer_start || offset + len > buffer_start + buffer.len() {
                let fetch = chunk_size.min(size - offset);
                let at = region.base().wrapping_add(offset);
                buffer.resize(fetch, 0);
                stats.reads_issued += 1;
                if let Err(err) = self.memory.read_into(at, &mut buffer) {
                    if fetch == len {
                        return Err(err);
                    }
                    trace!(
                        "Chunk of {} bytes at {} unreadable ({}), reading one window",
                        fetch, at, err
                    );
                    buffer.truncate(len);
                    stats.reads_issued += 1;
                    self.memory.read_into(at, &mut buffer)?;
                }
                trace!("Fetched {} bytes at {}", buffer.len(), at);

                buffer_start = offset;
                stats.bytes_fetched += buffer.len();
            }

            stats.windows_examined += 1;
            if pattern.matches(&buffer[offset - buffer_start..]) {
                let found = region.base().wrapping_add(offset);
                debug!("Pattern {} matched at {}", pattern, found);
                return Ok((Some(found), stats));
            }

            match offset.checked_add(self.options.step) {
                Some(next) if next <= last => offset = next,
                _ => break,
            }
        }

        debug!(
            "Pattern {} not found in {} ({} windows)",
            pattern, region, stats.windows_examined
        );
        Ok((None, stats))
    }
}

/// Offset of the first match in an in-process buffer
pub fn scan_slice(bytes: &[u8], pattern: &Pattern, step: usize) -> MemoryResult<Option<usize>> {
    let Some(count) = window_count(bytes, pattern, step)? else {
        return Ok(None);
    };
    Ok((0..count)
        .map(|k| k * step)
        .find(|&offset| pattern.matches(&bytes[offset..])))
}

/// Same result as [`scan_slice`], comparing windows on the rayon pool
pub fn scan_slice_parallel(
    bytes: &[u8],
    pattern: &Pattern,
    step: usize,
) -> MemoryResult<Option<usize>> {
    let Some(count) = window_count(bytes, pattern, step)? else {
        return Ok(None);
    };
    Ok((0..count)
        .into_par_iter()
        .map(|k| k * step)
        .find_first(|&offset| pattern.matches(&bytes[offset..])))
}

/// Scans a buffer mapped at `base`, in parallel above the options' threshold
pub fn scan_buffer(
    base: Address,
    bytes: &[u8],
    pattern: &Pattern,
    options: &ScanOptions,
) -> MemoryResult<Option<Address>> {
    options.validate()?;

    let found = if bytes.len() < options.parallel_threshold {
        scan_slice(bytes, pattern, options.step)?
    } else {
        match scan_pool(options.max_threads)? {
            Some(pool) => pool.install(|| scan_slice_parallel(bytes, pattern, options.step))?,
            None => scan_slice_parallel(bytes, pattern, options.step)?,
        }
    };
    Ok(found.map(|offset| base.wrapping_add(offset)))
}

static SCAN_POOLS: OnceLock<Mutex<HashMap<usize, Arc<ThreadPool>>>> = OnceLock::new();

/// Pool capped at `threads` workers, built once per distinct cap.
///
/// `None` when the global rayon pool is already no larger than the cap.
fn scan_pool(threads: usize) -> MemoryResult<Option<Arc<ThreadPool>>> {
    let threads = threads.max(1);
    if threads >= rayon::current_num_threads() {
        return Ok(None);
    }

    let mut pools = SCAN_POOLS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(pool) = pools.get(&threads) {
        return Ok(Some(Arc::clone(pool)));
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("procmem-scan-{}", index))
        .build()
        .map_err(|err| MemoryError::TaskFailed(err.to_string()))?;
    debug!("Built scan pool with {} threads", threads);
    let pool = Arc::new(pool);
    pools.insert(threads, Arc::clone(&pool));
    Ok(Some(pool))
}

fn window_count(bytes: &[u8], pattern: &Pattern, step: usize) -> MemoryResult<Option<usize>> {
    if step == 0 {
        return Err(MemoryError::InvalidArgument(
            "scan step must be at least 1".to_string(),
        ));
    }
    if pattern.len() > bytes.len() {
        return Ok(None);
    }
    Ok(Some((bytes.len() - pattern.len()) / step + 1))
}
