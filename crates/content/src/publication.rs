use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stackassign_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Event, UserId};

/// Publication identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationId(pub AggregateId);

impl PublicationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PublicationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Kind of titled site content. All three share the slug + publish lifecycle
/// and differ only in metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationKind {
    Blog,
    Sample,
    Service,
}

impl PublicationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationKind::Blog => "blog",
            PublicationKind::Sample => "sample",
            PublicationKind::Service => "service",
        }
    }
}

/// Partial update of editable publication fields.
///
/// The slug is deliberately absent: it is assigned at creation and stable
/// thereafter, even when the title changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublicationPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PublicationPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.excerpt.is_none()
            && self.category.is_none()
            && self.tags.is_none()
    }
}

/// Aggregate root: Publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    id: PublicationId,
    kind: PublicationKind,
    title: String,
    slug: String,
    body: String,
    excerpt: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    author: Option<UserId>,
    published: bool,
    published_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Publication {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: PublicationId) -> Self {
        Self {
            id,
            kind: PublicationKind::Blog,
            title: String::new(),
            slug: String::new(),
            body: String::new(),
            excerpt: None,
            category: None,
            tags: Vec::new(),
            author: None,
            published: false,
            published_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PublicationId {
        self.id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn kind(&self) -> PublicationKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn author(&self) -> Option<UserId> {
        self.author
    }

    pub fn is_published(&self) -> bool {
        self.published
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }
}

impl AggregateRoot for Publication {
    type Id = PublicationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreatePublication.
///
/// The slug is resolved (and reserved) by the caller before the command is
/// built, via `unique_slug` against the live oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePublication {
    pub publication_id: PublicationId,
    pub kind: PublicationKind,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditPublication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPublication {
    pub publication_id: PublicationId,
    pub patch: PublicationPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publish {
    pub publication_id: PublicationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Unpublish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unpublish {
    pub publication_id: PublicationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationCommand {
    Create(CreatePublication),
    Edit(EditPublication),
    Publish(Publish),
    Unpublish(Unpublish),
}

/// Event: PublicationCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationCreated {
    pub publication_id: PublicationId,
    pub kind: PublicationKind,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PublicationEdited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationEdited {
    pub publication_id: PublicationId,
    pub patch: PublicationPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PublicationPublished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationPublished {
    pub publication_id: PublicationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PublicationUnpublished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationUnpublished {
    pub publication_id: PublicationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationEvent {
    Created(PublicationCreated),
    Edited(PublicationEdited),
    Published(PublicationPublished),
    Unpublished(PublicationUnpublished),
}

impl Event for PublicationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PublicationEvent::Created(_) => "publication.created",
            PublicationEvent::Edited(_) => "publication.edited",
            PublicationEvent::Published(_) => "publication.published",
            PublicationEvent::Unpublished(_) => "publication.unpublished",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PublicationEvent::Created(e) => e.occurred_at,
            PublicationEvent::Edited(e) => e.occurred_at,
            PublicationEvent::Published(e) => e.occurred_at,
            PublicationEvent::Unpublished(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Publication {
    type Command = PublicationCommand;
    type Event = PublicationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PublicationEvent::Created(e) => {
                self.id = e.publication_id;
                self.kind = e.kind;
                self.title = e.title.clone();
                self.slug = e.slug.clone();
                self.body = e.body.clone();
                self.excerpt = e.excerpt.clone();
                self.category = e.category.clone();
                self.tags = e.tags.clone();
                self.author = e.author;
                self.published = false;
                self.created = true;
            }
            PublicationEvent::Edited(e) => {
                let patch = &e.patch;
                if let Some(title) = &patch.title {
                    self.title = title.clone();
                }
                if let Some(body) = &patch.body {
                    self.body = body.clone();
                }
                if let Some(excerpt) = &patch.excerpt {
                    self.excerpt = Some(excerpt.clone());
                }
                if let Some(category) = &patch.category {
                    self.category = Some(category.clone());
                }
                if let Some(tags) = &patch.tags {
                    self.tags = tags.clone();
                }
            }
            PublicationEvent::Published(e) => {
                self.published = true;
                // First publish stamps the timestamp; later re-publishes keep it.
                if self.published_at.is_none() {
                    self.published_at = Some(e.occurred_at);
                }
            }
            PublicationEvent::Unpublished(_) => {
                self.published = false;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PublicationCommand::Create(cmd) => self.handle_create(cmd),
            PublicationCommand::Edit(cmd) => self.handle_edit(cmd),
            PublicationCommand::Publish(cmd) => self.handle_publish(cmd),
            PublicationCommand::Unpublish(cmd) => self.handle_unpublish(cmd),
        }
    }
}

impl Publication {
    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreatePublication) -> Result<Vec<PublicationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("publication already exists"));
        }

        if cmd.title.trim().chars().count() < 5 {
            return Err(DomainError::validation("title must be at least 5 characters"));
        }
        if cmd.slug.is_empty() {
            return Err(DomainError::validation("slug must not be empty"));
        }

        Ok(vec![PublicationEvent::Created(PublicationCreated {
            publication_id: cmd.publication_id,
            kind: cmd.kind,
            title: cmd.title.clone(),
            slug: cmd.slug.clone(),
            body: cmd.body.clone(),
            excerpt: cmd.excerpt.clone(),
            category: cmd.category.clone(),
            tags: cmd.tags.clone(),
            author: cmd.author,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit(&self, cmd: &EditPublication) -> Result<Vec<PublicationEvent>, DomainError> {
        self.ensure_created()?;

        if cmd.patch.is_empty() {
            return Ok(vec![]);
        }
        if let Some(title) = &cmd.patch.title {
            if title.trim().chars().count() < 5 {
                return Err(DomainError::validation("title must be at least 5 characters"));
            }
        }

        Ok(vec![PublicationEvent::Edited(PublicationEdited {
            publication_id: cmd.publication_id,
            patch: cmd.patch.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_publish(&self, cmd: &Publish) -> Result<Vec<PublicationEvent>, DomainError> {
        self.ensure_created()?;

        if self.published {
            return Ok(vec![]);
        }

        Ok(vec![PublicationEvent::Published(PublicationPublished {
            publication_id: cmd.publication_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_unpublish(&self, cmd: &Unpublish) -> Result<Vec<PublicationEvent>, DomainError> {
        self.ensure_created()?;

        if !self.published {
            return Ok(vec![]);
        }

        Ok(vec![PublicationEvent::Unpublished(PublicationUnpublished {
            publication_id: cmd.publication_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
