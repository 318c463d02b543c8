//! Per-file and per-group counts.

use crate::point::Divisors;

/// Counts for one group id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupSummary {
    pub group_id: u8,
    pub navmesh_vertices: usize,
    pub navmesh_faces: usize,
    pub navmesh_quads: usize,
    pub waypoints: usize,
    pub waypoint_edges: usize,
    pub segment_points: usize,
    pub segment_edges: usize,
    pub segment_chunks: usize,
}

/// Overview of a decoded file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileSummary {
    pub version: u32,
    pub file_length: u32,
    pub origin: [f32; 3],
    pub divisors: Divisors,
    pub entries: usize,
    pub skipped_entries: usize,
    pub manifest_groups: usize,
    pub section2_records: usize,
    pub groups: Vec<GroupSummary>,
}

impl FileSummary {
    /// Sum of the per-group counts.
    pub fn totals(&self) -> GroupSummary {
        self.groups
            .iter()
            .fold(GroupSummary::default(), |acc, group| GroupSummary {
                group_id: 0,
                navmesh_vertices: acc.navmesh_vertices + group.navmesh_vertices,
                navmesh_faces: acc.navmesh_faces + group.navmesh_faces,
                navmesh_quads: acc.navmesh_quads + group.navmesh_quads,
                waypoints: acc.waypoints + group.waypoints,
                waypoint_edges: acc.waypoint_edges + group.waypoint_edges,
                segment_points: acc.segment_points + group.segment_points,
                segment_edges: acc.segment_edges + group.segment_edges,
                segment_chunks: acc.segment_chunks + group.segment_chunks,
            })
    }
}
