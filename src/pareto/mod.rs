//! Pareto machinery: dominance, sorting, crowding, archive, hypervolume.
//!
//! # Key Types
//!
//! - [`ArchiveManager`]: bounded elite archive rebuilt each generation
//! - [`HypervolumeMethod`]: rectangle-sum or exact hypervolume
//!
//! # Functions
//!
//! - [`dominates`] / [`dominance_cmp`]: maximization dominance relation
//! - [`non_dominated_sort`]: fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: diversity measure used for trimming
//!
//! # References
//!
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*
//! - While et al. (2006), *A Faster Algorithm for Calculating Hypervolume*

mod archive;
mod dominance;
mod hypervolume;

pub use archive::ArchiveManager;
pub use dominance::{
    crowding_distance, crowding_order, dominance_cmp, dominates, non_dominated_sort, Dominance,
    NondominatedSortResult,
};
pub use hypervolume::{exact as exact_hypervolume, rectangle_sum, HypervolumeMethod};
