use crate::engine::NodeId;

/// Hands out engine node ids for synths.
///
/// Ids only need to be unique for the life of the process; they increase
/// monotonically from [`NodeIdAllocator::FIRST_ID`], leaving the low range
/// to statically numbered groups.
#[derive(Debug, Clone)]
pub struct NodeIdAllocator {
    next: i32,
}

impl NodeIdAllocator {
    pub const FIRST_ID: i32 = 1000;

    pub fn new() -> Self {
        Self::starting_at(Self::FIRST_ID)
    }

    pub fn starting_at(first: i32) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        // wrap back to the start rather than into negative ids
        self.next = self.next.checked_add(1).unwrap_or(Self::FIRST_ID);
        id
    }
}

impl Default for NodeIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
