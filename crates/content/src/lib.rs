//! `stackassign-content` — slugs and publishable site content.
//!
//! Covers the titled entities of the public site (blog posts, sample papers,
//! service pages): URL slugs derived from titles with collision probing, and
//! a draft/publish lifecycle with a set-once publication timestamp.

pub mod publication;
pub mod slug;

pub use publication::{
    CreatePublication, EditPublication, Publication, PublicationCommand, PublicationEvent,
    PublicationId, PublicationKind, PublicationPatch, Publish, Unpublish,
};
pub use slug::{slugify, unique_slug, MAX_SLUG_ATTEMPTS};
