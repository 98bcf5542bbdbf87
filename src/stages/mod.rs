pub mod candidate_edges;
pub mod group_merge;
pub mod grouping;
pub mod leftovers;
pub mod link;
pub mod undergrounds;

pub use candidate_edges::CandidateEdgeStage;
pub use group_merge::GroupMergeStage;
pub use grouping::GroupingStage;
pub use leftovers::LeftoverStage;
pub use undergrounds::UndergroundStage;

use crate::stage::RoutingStage;

/// Build the default stage stack.
///
/// 1. CandidateEdgeStage -- neighbour pairs and straight connectors
/// 2. GroupingStage -- greedy group growth, searched seed if nothing grew
/// 3. GroupMergeStage -- turn-bounded linking with retries
/// 4. LeftoverStage -- attach ungrouped pumpjacks to the final network
/// 5. UndergroundStage -- replace straight runs with underground pairs
pub fn default_stages() -> Vec<Box<dyn RoutingStage>> {
    vec![
        Box::new(CandidateEdgeStage),
        Box::new(GroupingStage),
        Box::new(GroupMergeStage),
        Box::new(LeftoverStage),
        Box::new(UndergroundStage),
    ]
}
