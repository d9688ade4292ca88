//! `stackassign-orders` — the order aggregate and its lifecycle.
//!
//! An order moves `pending -> confirmed -> in_progress -> review -> completed`,
//! with self-service cancellation from the first two states and refunds from
//! anywhere. Content edits that change the page count recompute the stored
//! price atomically with the edit. Who may do what is decided at the command
//! boundary; the aggregate itself is auth-agnostic.

pub mod number;
pub mod order;

pub use number::OrderNumber;
pub use order::{
    AssignWriter, ChangeStatus, ContentPatch, EditContent, Order, OrderCommand, OrderEvent,
    OrderId, OrderStatus, PaperType, PaymentStatus, RecordPayment, SubmitOrder,
};
