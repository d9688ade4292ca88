//! Request/response DTOs and JSON mapping helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stackassign_content::{Publication, PublicationKind, PublicationPatch};
use stackassign_core::UserId;
use stackassign_inquiries::{Inquiry, InquiryPriority, InquirySource, InquiryStatus};
use stackassign_orders::{ContentPatch, Order, OrderStatus, PaperType, PaymentStatus};
use stackassign_pricing::{days_until, AcademicLevel, PriceQuote, PriceTier, CURRENCY};

// ─── pricing ────────────────────────────────────────────────────────────────

/// A deadline supplied either as days-to-go or as an absolute timestamp.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeadlineInput {
    Days(i64),
    Date(DateTime<Utc>),
}

impl DeadlineInput {
    /// Days until the deadline as seen from `now` (ceil for timestamps).
    pub fn days_from(&self, now: DateTime<Utc>) -> i64 {
        match self {
            DeadlineInput::Days(days) => *days,
            DeadlineInput::Date(deadline) => days_until(*deadline, now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalculatePriceRequest {
    pub academic_level: AcademicLevel,
    pub deadline: DeadlineInput,
    pub pages: u32,
}

#[derive(Debug, Serialize)]
pub struct PricingBody {
    pub price_per_page: i64,
    pub urgency_multiplier: f64,
    pub total_price: i64,
    pub currency: &'static str,
    pub days_until_deadline: i64,
    pub formatted_price: String,
}

impl PricingBody {
    pub fn from_quote(quote: &PriceQuote, days_until_deadline: i64) -> Self {
        Self {
            price_per_page: quote.price_per_page,
            urgency_multiplier: quote.urgency_multiplier,
            total_price: quote.total_price,
            currency: CURRENCY,
            days_until_deadline,
            formatted_price: format_inr(quote.total_price),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TiersQuery {
    /// Unknown levels deliberately price at the fallback rate here, matching
    /// the public calculator's historical behavior.
    pub academic_level: Option<String>,
    pub pages: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TierBody {
    pub days: i64,
    pub label: &'static str,
    pub urgency_multiplier: f64,
    pub price_per_page: i64,
    pub total_price: i64,
    pub formatted_price: String,
}

impl From<PriceTier> for TierBody {
    fn from(tier: PriceTier) -> Self {
        Self {
            days: tier.days,
            label: tier.label,
            urgency_multiplier: tier.urgency_multiplier,
            price_per_page: tier.price_per_page,
            total_price: tier.total_price,
            formatted_price: format_inr(tier.total_price),
        }
    }
}

/// Format a rupee amount with Indian digit grouping (`₹12,34,567`).
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        // Last three digits stand alone; the rest groups in pairs.
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            parts.push(&head[end - 2..end]);
            end -= 2;
        }
        parts.push(&head[..end]);
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };

    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}₹{grouped}")
}

// ─── orders ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub academic_level: AcademicLevel,
    pub paper_type: PaperType,
    pub pages: u32,
    pub words: Option<u32>,
    pub deadline: DateTime<Utc>,
    pub requirements: Option<String>,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateOrderRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub pages: Option<u32>,
    pub words: Option<u32>,
    pub requirements: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl From<UpdateOrderRequest> for ContentPatch {
    fn from(req: UpdateOrderRequest) -> Self {
        ContentPatch {
            title: req.title,
            description: req.description,
            subject: req.subject,
            pages: req.pages,
            words: req.words,
            requirements: req.requirements,
            attachments: req.attachments,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignWriterRequest {
    pub writer: UserId,
}

#[derive(Debug, Deserialize, Default)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub customer_id: UserId,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub academic_level: AcademicLevel,
    pub paper_type: PaperType,
    pub pages: u32,
    pub words: Option<u32>,
    pub deadline: DateTime<Utc>,
    pub requirements: Option<String>,
    pub attachments: Vec<String>,
    pub notes: Option<String>,
    pub price_per_page: i64,
    pub urgency_multiplier: f64,
    pub total_price: i64,
    pub currency: &'static str,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub assigned_writer: Option<UserId>,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OrderView {
    /// Project a rehydrated aggregate; `None` until it has been created.
    pub fn from_order(order: &Order) -> Option<Self> {
        let quote = order.quote()?;
        Some(Self {
            id: order.id_typed().to_string(),
            order_number: order.order_number()?.to_string(),
            customer_id: order.customer_id()?,
            title: order.title().to_string(),
            description: order.description().to_string(),
            subject: order.subject().to_string(),
            academic_level: order.academic_level(),
            paper_type: order.paper_type(),
            pages: order.pages(),
            words: order.words(),
            deadline: order.deadline(),
            requirements: order.requirements().map(str::to_string),
            attachments: order.attachments().to_vec(),
            notes: order.notes().map(str::to_string),
            price_per_page: quote.price_per_page,
            urgency_multiplier: quote.urgency_multiplier,
            total_price: quote.total_price,
            currency: CURRENCY,
            status: order.status(),
            payment_status: order.payment_status(),
            assigned_writer: order.assigned_writer(),
            submitted_at: order.submitted_at()?,
            completed_at: order.completed_at(),
        })
    }
}

// ─── inquiries ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateInquiryRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub source: Option<InquirySource>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInquiryStatusRequest {
    pub status: InquiryStatus,
}

#[derive(Debug, Deserialize)]
pub struct SetInquiryPriorityRequest {
    pub priority: InquiryPriority,
}

#[derive(Debug, Deserialize)]
pub struct AddInquiryNoteRequest {
    pub note: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct InquiryListQuery {
    pub status: Option<InquiryStatus>,
    pub priority: Option<InquiryPriority>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InquiryView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub source: InquirySource,
    pub status: InquiryStatus,
    pub priority: InquiryPriority,
    pub notes: Option<String>,
    pub submitted_by: Option<UserId>,
    pub submitted_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl InquiryView {
    pub fn from_inquiry(inquiry: &Inquiry) -> Option<Self> {
        Some(Self {
            id: inquiry.id_typed().to_string(),
            name: inquiry.name().to_string(),
            email: inquiry.email().to_string(),
            phone: inquiry.phone().map(str::to_string),
            subject: inquiry.subject().to_string(),
            message: inquiry.message().to_string(),
            source: inquiry.source(),
            status: inquiry.status(),
            priority: inquiry.priority(),
            notes: inquiry.notes().map(str::to_string),
            submitted_by: inquiry.submitted_by(),
            submitted_at: inquiry.submitted_at()?,
            responded_at: inquiry.responded_at(),
        })
    }
}

// ─── publications ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreatePublicationRequest {
    pub kind: PublicationKind,
    pub title: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EditPublicationRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<EditPublicationRequest> for PublicationPatch {
    fn from(req: EditPublicationRequest) -> Self {
        PublicationPatch {
            title: req.title,
            body: req.body,
            excerpt: req.excerpt,
            category: req.category,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct PublicationListQuery {
    pub kind: Option<PublicationKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicationView {
    pub id: String,
    pub kind: PublicationKind,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<UserId>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

impl PublicationView {
    pub fn from_publication(publication: &Publication) -> Option<Self> {
        if !publication.is_created() {
            return None;
        }
        Some(Self {
            id: publication.id_typed().to_string(),
            kind: publication.kind(),
            title: publication.title().to_string(),
            slug: publication.slug().to_string(),
            body: publication.body().to_string(),
            excerpt: publication.excerpt().map(str::to_string),
            category: publication.category().map(str::to_string),
            tags: publication.tags().to_vec(),
            author: publication.author(),
            published: publication.is_published(),
            published_at: publication.published_at(),
        })
    }
}

// ─── shared ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> ListResponse<T> {
    /// Slice a fully sorted result set into the requested page.
    pub fn paginate(all: Vec<T>, page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(10).clamp(1, 100);
        let total = all.len();
        let total_pages = total.div_ceil(limit as usize);

        let items = all
            .into_iter()
            .skip(((page - 1) as usize) * limit as usize)
            .take(limit as usize)
            .collect();

        Self {
            items,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_orders: usize,
    pub active_orders: usize,
    pub completed_orders: usize,
    pub total_revenue: i64,
    pub new_inquiries: usize,
    pub published_publications: usize,
    pub recent_orders: Vec<OrderView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inr_formatting_uses_indian_grouping() {
        assert_eq!(format_inr(0), "₹0");
        assert_eq!(format_inr(750), "₹750");
        assert_eq!(format_inr(1750), "₹1,750");
        assert_eq!(format_inr(44500), "₹44,500");
        assert_eq!(format_inr(123456), "₹1,23,456");
        assert_eq!(format_inr(1234567), "₹12,34,567");
    }
}
