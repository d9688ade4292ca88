use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stackassign_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Event, UserId};

/// Inquiry identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InquiryId(pub AggregateId);

impl InquiryId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InquiryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Inquiry status lifecycle.
///
/// `new` is the unique entry state. The other three form a freely connected
/// set: forward and lateral moves are all legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    New,
    InProgress,
    Resolved,
    Closed,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::InProgress => "in_progress",
            InquiryStatus::Resolved => "resolved",
            InquiryStatus::Closed => "closed",
        }
    }
}

impl core::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triage priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryPriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Channel the inquiry came in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquirySource {
    Website,
    Whatsapp,
    Email,
    Phone,
}

/// Aggregate root: Inquiry.
#[derive(Debug, Clone, PartialEq)]
pub struct Inquiry {
    id: InquiryId,
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
    source: InquirySource,
    status: InquiryStatus,
    priority: InquiryPriority,
    notes: Option<String>,
    /// Optional link to an authenticated submitter. Carries no access rights.
    submitted_by: Option<UserId>,
    submitted_at: Option<DateTime<Utc>>,
    responded_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Inquiry {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InquiryId) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            phone: None,
            subject: String::new(),
            message: String::new(),
            source: InquirySource::Website,
            status: InquiryStatus::New,
            priority: InquiryPriority::Normal,
            notes: None,
            submitted_by: None,
            submitted_at: None,
            responded_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InquiryId {
        self.id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> InquirySource {
        self.source
    }

    pub fn status(&self) -> InquiryStatus {
        self.status
    }

    pub fn priority(&self) -> InquiryPriority {
        self.priority
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn submitted_by(&self) -> Option<UserId> {
        self.submitted_by
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }
}

impl AggregateRoot for Inquiry {
    type Id = InquiryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SubmitInquiry (public, unauthenticated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitInquiry {
    pub inquiry_id: InquiryId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub source: Option<InquirySource>,
    pub submitted_by: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub inquiry_id: InquiryId,
    pub to: InquiryStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetPriority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPriority {
    pub inquiry_id: InquiryId,
    pub priority: InquiryPriority,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddNote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddNote {
    pub inquiry_id: InquiryId,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InquiryCommand {
    Submit(SubmitInquiry),
    UpdateStatus(UpdateStatus),
    SetPriority(SetPriority),
    AddNote(AddNote),
}

/// Event: InquirySubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquirySubmitted {
    pub inquiry_id: InquiryId,
    pub name: String,
    /// Normalized (lowercased) at decision time.
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub source: InquirySource,
    pub submitted_by: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdated {
    pub inquiry_id: InquiryId,
    pub from: InquiryStatus,
    pub to: InquiryStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PrioritySet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritySet {
    pub inquiry_id: InquiryId,
    pub priority: InquiryPriority,
    pub occurred_at: DateTime<Utc>,
}

/// Event: NoteAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAdded {
    pub inquiry_id: InquiryId,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InquiryEvent {
    InquirySubmitted(InquirySubmitted),
    StatusUpdated(StatusUpdated),
    PrioritySet(PrioritySet),
    NoteAdded(NoteAdded),
}

impl Event for InquiryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InquiryEvent::InquirySubmitted(_) => "inquiry.submitted",
            InquiryEvent::StatusUpdated(_) => "inquiry.status_updated",
            InquiryEvent::PrioritySet(_) => "inquiry.priority_set",
            InquiryEvent::NoteAdded(_) => "inquiry.note_added",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InquiryEvent::InquirySubmitted(e) => e.occurred_at,
            InquiryEvent::StatusUpdated(e) => e.occurred_at,
            InquiryEvent::PrioritySet(e) => e.occurred_at,
            InquiryEvent::NoteAdded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Inquiry {
    type Command = InquiryCommand;
    type Event = InquiryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InquiryEvent::InquirySubmitted(e) => {
                self.id = e.inquiry_id;
                self.name = e.name.clone();
                self.email = e.email.clone();
                self.phone = e.phone.clone();
                self.subject = e.subject.clone();
                self.message = e.message.clone();
                self.source = e.source;
                self.submitted_by = e.submitted_by;
                self.status = InquiryStatus::New;
                self.priority = InquiryPriority::Normal;
                self.submitted_at = Some(e.occurred_at);
                self.created = true;
            }
            InquiryEvent::StatusUpdated(e) => {
                self.status = e.to;
                // First departure from `new` stamps the response time; it is
                // never cleared or overwritten afterwards.
                if self.responded_at.is_none() && e.to != InquiryStatus::New {
                    self.responded_at = Some(e.occurred_at);
                }
            }
            InquiryEvent::PrioritySet(e) => {
                self.priority = e.priority;
            }
            InquiryEvent::NoteAdded(e) => {
                self.notes = Some(e.note.clone());
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InquiryCommand::Submit(cmd) => self.handle_submit(cmd),
            InquiryCommand::UpdateStatus(cmd) => self.handle_update_status(cmd),
            InquiryCommand::SetPriority(cmd) => self.handle_set_priority(cmd),
            InquiryCommand::AddNote(cmd) => self.handle_add_note(cmd),
        }
    }
}

impl Inquiry {
    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_inquiry_id(&self, inquiry_id: InquiryId) -> Result<(), DomainError> {
        if self.id != inquiry_id {
            return Err(DomainError::validation("inquiry_id mismatch"));
        }
        Ok(())
    }

    fn handle_submit(&self, cmd: &SubmitInquiry) -> Result<Vec<InquiryEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("inquiry already exists"));
        }

        if cmd.name.trim().chars().count() < 2 {
            return Err(DomainError::validation("name must be at least 2 characters"));
        }
        if !cmd.email.contains('@') {
            return Err(DomainError::validation("invalid email address"));
        }
        if cmd.subject.trim().chars().count() < 3 {
            return Err(DomainError::validation(
                "subject must be at least 3 characters",
            ));
        }
        if cmd.message.trim().chars().count() < 10 {
            return Err(DomainError::validation(
                "message must be at least 10 characters",
            ));
        }

        Ok(vec![InquiryEvent::InquirySubmitted(InquirySubmitted {
            inquiry_id: cmd.inquiry_id,
            name: cmd.name.clone(),
            email: cmd.email.to_lowercase(),
            phone: cmd.phone.clone(),
            subject: cmd.subject.clone(),
            message: cmd.message.clone(),
            source: cmd.source.unwrap_or(InquirySource::Website),
            submitted_by: cmd.submitted_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_status(&self, cmd: &UpdateStatus) -> Result<Vec<InquiryEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_inquiry_id(cmd.inquiry_id)?;

        if cmd.to == self.status {
            return Ok(vec![]);
        }
        if cmd.to == InquiryStatus::New {
            return Err(DomainError::invalid_transition(
                self.status.as_str(),
                cmd.to.as_str(),
            ));
        }

        Ok(vec![InquiryEvent::StatusUpdated(StatusUpdated {
            inquiry_id: cmd.inquiry_id,
            from: self.status,
            to: cmd.to,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_priority(&self, cmd: &SetPriority) -> Result<Vec<InquiryEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_inquiry_id(cmd.inquiry_id)?;

        if cmd.priority == self.priority {
            return Ok(vec![]);
        }

        Ok(vec![InquiryEvent::PrioritySet(PrioritySet {
            inquiry_id: cmd.inquiry_id,
            priority: cmd.priority,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_note(&self, cmd: &AddNote) -> Result<Vec<InquiryEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_inquiry_id(cmd.inquiry_id)?;

        Ok(vec![InquiryEvent::NoteAdded(NoteAdded {
            inquiry_id: cmd.inquiry_id,
            note: cmd.note.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    fn submit_cmd(inquiry_id: InquiryId) -> SubmitInquiry {
        SubmitInquiry {
            inquiry_id,
            name: "Priya Sharma".to_string(),
            email: "Priya.Sharma@Example.COM".to_string(),
            phone: None,
            subject: "Dissertation help".to_string(),
            message: "I need help with my literature review chapter.".to_string(),
            source: None,
            submitted_by: None,
            occurred_at: test_time(),
        }
    }

    fn submitted_inquiry() -> Inquiry {
        let id = InquiryId::new(AggregateId::new());
        let mut inquiry = Inquiry::empty(id);
        let events = inquiry
            .handle(&InquiryCommand::Submit(submit_cmd(id)))
            .unwrap();
        for event in &events {
            inquiry.apply(event);
        }
        inquiry
    }

    #[test]
    fn submission_starts_new_with_no_response_time() {
        let inquiry = submitted_inquiry();

        assert_eq!(inquiry.status(), InquiryStatus::New);
        assert_eq!(inquiry.priority(), InquiryPriority::Normal);
        assert_eq!(inquiry.source(), InquirySource::Website);
        assert_eq!(inquiry.responded_at(), None);
        // Email is normalized on intake.
        assert_eq!(inquiry.email(), "priya.sharma@example.com");
    }

    #[test]
    fn submission_validates_fields() {
        let id = InquiryId::new(AggregateId::new());
        let inquiry = Inquiry::empty(id);

        let mut cmd = submit_cmd(id);
        cmd.email = "not-an-email".to_string();
        assert!(matches!(
            inquiry.handle(&InquiryCommand::Submit(cmd)).unwrap_err(),
            DomainError::Validation(_)
        ));

        let mut cmd = submit_cmd(id);
        cmd.message = "too short".to_string();
        assert!(inquiry.handle(&InquiryCommand::Submit(cmd)).is_err());
    }

    #[test]
    fn first_departure_from_new_stamps_responded_at_once() {
        let mut inquiry = submitted_inquiry();
        let first = test_time() + Duration::hours(2);
        let second = test_time() + Duration::hours(5);

        let events = inquiry
            .handle(&InquiryCommand::UpdateStatus(UpdateStatus {
                inquiry_id: inquiry.id_typed(),
                to: InquiryStatus::InProgress,
                occurred_at: first,
            }))
            .unwrap();
        for event in &events {
            inquiry.apply(event);
        }
        assert_eq!(inquiry.responded_at(), Some(first));

        let events = inquiry
            .handle(&InquiryCommand::UpdateStatus(UpdateStatus {
                inquiry_id: inquiry.id_typed(),
                to: InquiryStatus::Resolved,
                occurred_at: second,
            }))
            .unwrap();
        for event in &events {
            inquiry.apply(event);
        }

        assert_eq!(inquiry.status(), InquiryStatus::Resolved);
        assert_eq!(inquiry.responded_at(), Some(first));
    }

    #[test]
    fn new_is_never_re_enterable() {
        let mut inquiry = submitted_inquiry();

        let events = inquiry
            .handle(&InquiryCommand::UpdateStatus(UpdateStatus {
                inquiry_id: inquiry.id_typed(),
                to: InquiryStatus::Closed,
                occurred_at: test_time(),
            }))
            .unwrap();
        for event in &events {
            inquiry.apply(event);
        }

        let err = inquiry
            .handle(&InquiryCommand::UpdateStatus(UpdateStatus {
                inquiry_id: inquiry.id_typed(),
                to: InquiryStatus::New,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[test]
    fn lateral_moves_between_worked_states_are_legal() {
        let mut inquiry = submitted_inquiry();

        for to in [
            InquiryStatus::Resolved,
            InquiryStatus::InProgress,
            InquiryStatus::Closed,
            InquiryStatus::Resolved,
        ] {
            let events = inquiry
                .handle(&InquiryCommand::UpdateStatus(UpdateStatus {
                    inquiry_id: inquiry.id_typed(),
                    to,
                    occurred_at: test_time(),
                }))
                .unwrap();
            for event in &events {
                inquiry.apply(event);
            }
            assert_eq!(inquiry.status(), to);
        }
    }

    #[test]
    fn same_status_update_is_a_no_op() {
        let inquiry = submitted_inquiry();

        let events = inquiry
            .handle(&InquiryCommand::UpdateStatus(UpdateStatus {
                inquiry_id: inquiry.id_typed(),
                to: InquiryStatus::New,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(inquiry.responded_at(), None);
    }

    #[test]
    fn priority_and_notes_update() {
        let mut inquiry = submitted_inquiry();

        let events = inquiry
            .handle(&InquiryCommand::SetPriority(SetPriority {
                inquiry_id: inquiry.id_typed(),
                priority: InquiryPriority::Urgent,
                occurred_at: test_time(),
            }))
            .unwrap();
        for event in &events {
            inquiry.apply(event);
        }
        assert_eq!(inquiry.priority(), InquiryPriority::Urgent);

        let events = inquiry
            .handle(&InquiryCommand::AddNote(AddNote {
                inquiry_id: inquiry.id_typed(),
                note: "Called back, waiting on documents.".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap();
        for event in &events {
            inquiry.apply(event);
        }
        assert_eq!(inquiry.notes(), Some("Called back, waiting on documents."));
    }
}
