use std::num::NonZeroUsize;

use crate::notion::Block;

/// Notion accepts at most this many children per request.
pub const MAX_BLOCKS_PER_REQUEST: usize = 100;

/// How a document's blocks are split across API calls: the page-creation
/// request carries `initial`, then each entry of `appends` is one append call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    pub initial: Vec<Block>,
    pub appends: Vec<Vec<Block>>,
}

impl UploadPlan {
    pub fn new(blocks: Vec<Block>, limit: NonZeroUsize) -> Self {
        let limit = limit.get();
        let mut initial = blocks;
        let tail = initial.split_off(limit.min(initial.len()));
        let appends = tail.chunks(limit).map(<[Block]>::to_vec).collect();
        Self { initial, appends }
    }

    /// Number of API calls, page creation included.
    pub fn calls(&self) -> usize {
        1 + self.appends.len()
    }

    pub fn total_blocks(&self) -> usize {
        self.initial.len() + self.appends.iter().map(Vec::len).sum::<usize>()
    }
}
