//! `stackassign-inquiries` — customer inquiry lifecycle.
//!
//! Inquiries arrive unauthenticated from the public site. `new` is the only
//! entry state and is never re-entered; the first departure from it stamps
//! `responded_at` exactly once.

pub mod inquiry;

pub use inquiry::{
    AddNote, Inquiry, InquiryCommand, InquiryEvent, InquiryId, InquiryPriority, InquirySource,
    InquiryStatus, SetPriority, SubmitInquiry, UpdateStatus,
};
