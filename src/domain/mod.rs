//! Domain aggregates: vertices, their child elements, and changesets.

pub mod changeset;
pub mod vertex;

pub use changeset::{Changeset, VerificationFailure, VerificationOutcome, VerifiedChangeset};
pub use vertex::{Alias, ChildElement, Edge, Resource, Vertex};
