//! C-DBSCAN core library.
//!
//! Density-based clustering that honours pairwise must-link and cannot-link
//! constraints. A run builds a spatial index, seeds local clusters per leaf,
//! turns must-link classes into alpha clusters, and grows those alpha
//! clusters until no cannot-link-safe merge remains.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod cdbscan;
mod constraints;
mod dataset;
mod datasource;
mod distance;
mod error;
mod local;
mod merge;
mod neighborhood;
mod result;
mod spatial;
mod telemetry;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    builder::{CdbscanBuilder, ExecutionStrategy},
    cdbscan::{Cdbscan, cluster},
    constraints::{ConstraintGraph, ConstraintKind, Constraints},
    dataset::DenseSource,
    datasource::DataSource,
    distance::{DistanceError, VectorKind, euclidean_distance},
    error::{
        CdbscanError, CdbscanErrorCode, ConstraintDefect, DataSourceError, DataSourceErrorCode,
        Result,
    },
    neighborhood::NeighborhoodOracle,
    result::{ClusterId, ClusteringResult, NonContiguousClusterIds, RunStats},
    spatial::{DEFAULT_LEAF_SIZE, ExhaustiveIndex, IndexKind, KdTree, Leaf, SpatialIndex},
};
