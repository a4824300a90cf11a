//! Chunk planning for paginated table scans.

use std::num::NonZeroU64;

/// One bounded page of a table scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position of the chunk
    pub index: u64,
    /// First row of the page
    pub offset: u64,
    /// Rows requested (`LIMIT`), the configured chunk size
    pub limit: u64,
    /// Rows the page is expected to hold given the counted total
    pub rows: u64,
}

impl Chunk {
    /// `SELECT *` page query for `table`.
    pub fn select_sql(&self, table: &str) -> String {
        format!(
            "SELECT * FROM {} LIMIT {} OFFSET {}",
            table, self.limit, self.offset
        )
    }
}

/// Chunks covering `[0, total_rows)` in ascending offset order.
///
/// The plan is a value; each call to [`ChunkPlan::iter`] starts over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPlan {
    total_rows: u64,
    chunk_size: NonZeroU64,
}

/// Plans `ceil(total_rows / chunk_size)` chunks.
pub fn plan(total_rows: u64, chunk_size: NonZeroU64) -> ChunkPlan {
    ChunkPlan {
        total_rows,
        chunk_size,
    }
}

impl ChunkPlan {
    /// Number of chunks in the plan.
    pub fn chunk_count(&self) -> u64 {
        self.total_rows.div_ceil(self.chunk_size.get())
    }

    /// Rows covered by the plan.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Lazily yields the chunks in order.
    pub fn iter(&self) -> Chunks {
        Chunks {
            plan: *self,
            next: 0,
        }
    }
}

impl IntoIterator for ChunkPlan {
    type Item = Chunk;
    type IntoIter = Chunks;

    fn into_iter(self) -> Chunks {
        self.iter()
    }
}

/// Iterator over the chunks of a [`ChunkPlan`].
#[derive(Clone, Debug)]
pub struct Chunks {
    plan: ChunkPlan,
    next: u64,
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.next >= self.plan.chunk_count() {
            return None;
        }
        let size = self.plan.chunk_size.get();
        let index = self.next;
        let offset = index * size;
        self.next += 1;
        Some(Chunk {
            index,
            offset,
            limit: size,
            rows: size.min(self.plan.total_rows - offset),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.plan.chunk_count().saturating_sub(self.next);
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
