use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stackassign_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Event, UserId};
use stackassign_pricing::{compute_price, days_until, AcademicLevel, PriceQuote};

use crate::number::OrderNumber;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProgress,
    Review,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Review => "review",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Whether this status admits any outgoing edge besides a refund.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Legal edges of the lifecycle state machine.
    ///
    /// The happy path is linear; cancellation is reachable from the first two
    /// states only; a refund is reachable from every state but itself.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;

        if self == to {
            return false;
        }
        match (self, to) {
            (_, Refunded) => true,
            (Pending, Confirmed) => true,
            (Pending, Cancelled) => true,
            (Confirmed, InProgress) => true,
            (Confirmed, Cancelled) => true,
            (InProgress, Review) => true,
            (Review, Completed) => true,
            _ => false,
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state, tracked independently of the work lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// Kind of paper being ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperType {
    Essay,
    ResearchPaper,
    Dissertation,
    Thesis,
    Coursework,
    Other,
}

/// Partial update of customer-editable content fields.
///
/// Status, payment and writer assignment are deliberately not here: each is
/// its own command with its own authorization rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub pages: Option<u32>,
    pub words: Option<u32>,
    pub requirements: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl ContentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.subject.is_none()
            && self.pages.is_none()
            && self.words.is_none()
            && self.requirements.is_none()
            && self.attachments.is_none()
            && self.notes.is_none()
    }
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    order_number: Option<OrderNumber>,
    customer_id: Option<UserId>,
    title: String,
    description: String,
    subject: String,
    academic_level: AcademicLevel,
    paper_type: PaperType,
    pages: u32,
    words: Option<u32>,
    deadline: DateTime<Utc>,
    requirements: Option<String>,
    attachments: Vec<String>,
    notes: Option<String>,
    quote: Option<PriceQuote>,
    status: OrderStatus,
    payment_status: PaymentStatus,
    assigned_writer: Option<UserId>,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Order {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            order_number: None,
            customer_id: None,
            title: String::new(),
            description: String::new(),
            subject: String::new(),
            academic_level: AcademicLevel::HighSchool,
            paper_type: PaperType::Other,
            pages: 0,
            words: None,
            deadline: DateTime::UNIX_EPOCH,
            requirements: None,
            attachments: Vec::new(),
            notes: None,
            quote: None,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            assigned_writer: None,
            submitted_at: None,
            completed_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn order_number(&self) -> Option<&OrderNumber> {
        self.order_number.as_ref()
    }

    pub fn customer_id(&self) -> Option<UserId> {
        self.customer_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn academic_level(&self) -> AcademicLevel {
        self.academic_level
    }

    pub fn paper_type(&self) -> PaperType {
        self.paper_type
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn words(&self) -> Option<u32> {
        self.words
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn requirements(&self) -> Option<&str> {
        self.requirements.as_deref()
    }

    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn quote(&self) -> Option<&PriceQuote> {
        self.quote.as_ref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn assigned_writer(&self) -> Option<UserId> {
        self.assigned_writer
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SubmitOrder.
///
/// The order number is generated (and reserved) by the caller before the
/// command is built; it is never regenerated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrder {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
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
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditContent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditContent {
    pub order_id: OrderId,
    pub patch: ContentPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeStatus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub order_id: OrderId,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordPayment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub order_id: OrderId,
    pub payment_status: PaymentStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AssignWriter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignWriter {
    pub order_id: OrderId,
    pub writer: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderCommand {
    Submit(SubmitOrder),
    EditContent(EditContent),
    ChangeStatus(ChangeStatus),
    RecordPayment(RecordPayment),
    AssignWriter(AssignWriter),
}

/// Event: OrderSubmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
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
    pub quote: PriceQuote,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ContentEdited.
///
/// When the edit changed the page count, `reprice` carries the quote
/// recomputed for the new count; patch and price land in one event so the
/// persisted update is atomic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEdited {
    pub order_id: OrderId,
    pub patch: ContentPatch,
    pub reprice: Option<PriceQuote>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRecorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub order_id: OrderId,
    pub from: PaymentStatus,
    pub to: PaymentStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WriterAssigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterAssigned {
    pub order_id: OrderId,
    pub writer: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderSubmitted(OrderSubmitted),
    ContentEdited(ContentEdited),
    StatusChanged(StatusChanged),
    PaymentRecorded(PaymentRecorded),
    WriterAssigned(WriterAssigned),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderSubmitted(_) => "order.submitted",
            OrderEvent::ContentEdited(_) => "order.content_edited",
            OrderEvent::StatusChanged(_) => "order.status_changed",
            OrderEvent::PaymentRecorded(_) => "order.payment_recorded",
            OrderEvent::WriterAssigned(_) => "order.writer_assigned",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderSubmitted(e) => e.occurred_at,
            OrderEvent::ContentEdited(e) => e.occurred_at,
            OrderEvent::StatusChanged(e) => e.occurred_at,
            OrderEvent::PaymentRecorded(e) => e.occurred_at,
            OrderEvent::WriterAssigned(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderSubmitted(e) => {
                self.id = e.order_id;
                self.order_number = Some(e.order_number.clone());
                self.customer_id = Some(e.customer_id);
                self.title = e.title.clone();
                self.description = e.description.clone();
                self.subject = e.subject.clone();
                self.academic_level = e.academic_level;
                self.paper_type = e.paper_type;
                self.pages = e.pages;
                self.words = e.words;
                self.deadline = e.deadline;
                self.requirements = e.requirements.clone();
                self.attachments = e.attachments.clone();
                self.quote = Some(e.quote.clone());
                self.status = OrderStatus::Pending;
                self.payment_status = PaymentStatus::Pending;
                self.submitted_at = Some(e.occurred_at);
                self.created = true;
            }
            OrderEvent::ContentEdited(e) => {
                let patch = &e.patch;
                if let Some(title) = &patch.title {
                    self.title = title.clone();
                }
                if let Some(description) = &patch.description {
                    self.description = description.clone();
                }
                if let Some(subject) = &patch.subject {
                    self.subject = subject.clone();
                }
                if let Some(pages) = patch.pages {
                    self.pages = pages;
                }
                if let Some(words) = patch.words {
                    self.words = Some(words);
                }
                if let Some(requirements) = &patch.requirements {
                    self.requirements = Some(requirements.clone());
                }
                if let Some(attachments) = &patch.attachments {
                    self.attachments = attachments.clone();
                }
                if let Some(notes) = &patch.notes {
                    self.notes = Some(notes.clone());
                }
                if let Some(quote) = &e.reprice {
                    self.quote = Some(quote.clone());
                }
            }
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
                // Completion timestamp is stamped once and never re-stamped.
                if e.to == OrderStatus::Completed && self.completed_at.is_none() {
                    self.completed_at = Some(e.occurred_at);
                }
            }
            OrderEvent::PaymentRecorded(e) => {
                self.payment_status = e.to;
            }
            OrderEvent::WriterAssigned(e) => {
                self.assigned_writer = Some(e.writer);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::Submit(cmd) => self.handle_submit(cmd),
            OrderCommand::EditContent(cmd) => self.handle_edit_content(cmd),
            OrderCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            OrderCommand::RecordPayment(cmd) => self.handle_record_payment(cmd),
            OrderCommand::AssignWriter(cmd) => self.handle_assign_writer(cmd),
        }
    }
}

impl Order {
    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::validation("order_id mismatch"));
        }
        Ok(())
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_submit(&self, cmd: &SubmitOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("order already exists"));
        }

        validate_title(&cmd.title)?;
        validate_description(&cmd.description)?;
        validate_subject(&cmd.subject)?;

        if cmd.deadline <= cmd.occurred_at {
            return Err(DomainError::validation("deadline cannot be in the past"));
        }

        let days = days_until(cmd.deadline, cmd.occurred_at);
        let quote = compute_price(cmd.academic_level, days, cmd.pages)?;

        Ok(vec![OrderEvent::OrderSubmitted(OrderSubmitted {
            order_id: cmd.order_id,
            order_number: cmd.order_number.clone(),
            customer_id: cmd.customer_id,
            title: cmd.title.clone(),
            description: cmd.description.clone(),
            subject: cmd.subject.clone(),
            academic_level: cmd.academic_level,
            paper_type: cmd.paper_type,
            pages: cmd.pages,
            words: cmd.words,
            deadline: cmd.deadline,
            requirements: cmd.requirements.clone(),
            attachments: cmd.attachments.clone(),
            quote,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit_content(&self, cmd: &EditContent) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.order_id)?;

        let patch = &cmd.patch;
        if patch.is_empty() {
            return Ok(vec![]);
        }

        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(description) = &patch.description {
            validate_description(description)?;
        }
        if let Some(subject) = &patch.subject {
            validate_subject(subject)?;
        }
        if let Some(pages) = patch.pages {
            if pages < 1 {
                return Err(DomainError::validation("at least 1 page is required"));
            }
        }

        // A page-count change reprices against the stored deadline and the
        // new count; the event carries both so they persist together.
        let reprice = match patch.pages {
            Some(pages) if pages != self.pages => {
                let days = days_until(self.deadline, cmd.occurred_at);
                Some(compute_price(self.academic_level, days, pages)?)
            }
            _ => None,
        };

        Ok(vec![OrderEvent::ContentEdited(ContentEdited {
            order_id: cmd.order_id,
            patch: patch.clone(),
            reprice,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.order_id)?;

        if !self.status.can_transition(cmd.to) {
            return Err(DomainError::invalid_transition(
                self.status.as_str(),
                cmd.to.as_str(),
            ));
        }

        Ok(vec![OrderEvent::StatusChanged(StatusChanged {
            order_id: cmd.order_id,
            from: self.status,
            to: cmd.to,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_payment(&self, cmd: &RecordPayment) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.order_id)?;

        if cmd.payment_status == self.payment_status {
            return Ok(vec![]);
        }

        Ok(vec![OrderEvent::PaymentRecorded(PaymentRecorded {
            order_id: cmd.order_id,
            from: self.payment_status,
            to: cmd.payment_status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_assign_writer(&self, cmd: &AssignWriter) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.order_id)?;

        if self.assigned_writer == Some(cmd.writer) {
            return Ok(vec![]);
        }

        Ok(vec![OrderEvent::WriterAssigned(WriterAssigned {
            order_id: cmd.order_id,
            writer: cmd.writer,
            occurred_at: cmd.occurred_at,
        })])
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().chars().count() < 5 {
        return Err(DomainError::validation("title must be at least 5 characters"));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.trim().chars().count() < 20 {
        return Err(DomainError::validation(
            "description must be at least 20 characters",
        ));
    }
    Ok(())
}

fn validate_subject(subject: &str) -> Result<(), DomainError> {
    if subject.trim().chars().count() < 2 {
        return Err(DomainError::validation("subject is required"));
    }
    Ok(())
}
