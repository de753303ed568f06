//! vcatalog dereplicates a collection of viral genome assemblies into a
//! non-redundant catalog of vOTU representatives.
//!
//! The core is a greedy star clustering over an ANI similarity graph:
//! the longest unassigned genome becomes a representative and claims the
//! still-unassigned genomes directly connected to it. Pairwise ANI comes
//! from an external skani run; the final catalog extraction is delegated
//! to seqkit.

pub mod cluster;
pub mod fasta;
pub mod graph;
pub mod params;
pub mod pipeline;
pub mod reformat;
pub mod slurm;

pub use params::*;
