pub mod canonical;
pub mod company_clustering;
pub mod union_find;

pub use canonical::{assign_canonical_names, select_canonical};
pub use company_clustering::{cluster_records, Cluster, ClusteringOutcome};
pub use union_find::DisjointSet;
