//! Application services: infrastructure wiring + the operations the HTTP
//! routes map onto.
//!
//! Every operation follows the same shape: resolve the aggregate, run the
//! actor/action pair through the policy table, dispatch the command, project
//! a view. Services are directly callable from tests; HTTP is just one
//! transport over them.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use stackassign_auth::Actor;
use stackassign_content::{
    unique_slug, CreatePublication, EditPublication, Publication, PublicationCommand,
    PublicationId, Publish, Unpublish,
};
use stackassign_core::{AggregateId, DomainError, DomainResult, UserId};
use stackassign_infra::{CommandDispatcher, EventStore, InMemoryEventStore, IndexError, UniqueIndex};
use stackassign_inquiries::{
    AddNote, Inquiry, InquiryCommand, InquiryId, InquiryStatus, SetPriority, SubmitInquiry,
    UpdateStatus,
};
use stackassign_orders::{
    AssignWriter, ChangeStatus, EditContent, Order, OrderCommand, OrderId, OrderNumber,
    OrderStatus, PaymentStatus, RecordPayment, SubmitOrder,
};

use crate::app::dto::{
    AddInquiryNoteRequest, AssignWriterRequest, CreateInquiryRequest, CreateOrderRequest,
    CreatePublicationRequest, DashboardStats, EditPublicationRequest, InquiryListQuery,
    InquiryView, ListResponse, OrderListQuery, OrderView, PublicationListQuery, PublicationView,
    SetInquiryPriorityRequest, UpdateInquiryStatusRequest, UpdateOrderRequest,
};
use crate::authz::{self, OrderAction};

const AGGREGATE_ORDER: &str = "order";
const AGGREGATE_INQUIRY: &str = "inquiry";
const AGGREGATE_PUBLICATION: &str = "publication";

/// Order-number generation is "practically unique"; a handful of retries
/// against the reservation index absorbs the rare timestamp collision.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// A slug that probed free can still lose the reservation to a concurrent
/// writer; on a lost race we re-probe from scratch.
const MAX_SLUG_RESERVE_ATTEMPTS: u32 = 3;

pub struct AppServices {
    dispatcher: CommandDispatcher<Arc<InMemoryEventStore>>,
    order_numbers: UniqueIndex,
    slugs: UniqueIndex,
    /// OrderId -> owning customer. Maintained synchronously after dispatch.
    orders_dir: RwLock<BTreeMap<OrderId, UserId>>,
    inquiries_dir: RwLock<Vec<InquiryId>>,
    /// slug -> publication. The slug is the public lookup key.
    publications_dir: RwLock<BTreeMap<String, PublicationId>>,
}

impl Default for AppServices {
    fn default() -> Self {
        Self::new()
    }
}

impl AppServices {
    pub fn new() -> Self {
        Self {
            dispatcher: CommandDispatcher::new(Arc::new(InMemoryEventStore::new())),
            order_numbers: UniqueIndex::new(),
            slugs: UniqueIndex::new(),
            orders_dir: RwLock::new(BTreeMap::new()),
            inquiries_dir: RwLock::new(Vec::new()),
            publications_dir: RwLock::new(BTreeMap::new()),
        }
    }

    // ─── orders ─────────────────────────────────────────────────────────

    pub fn create_order(&self, actor: Actor, req: CreateOrderRequest) -> DomainResult<OrderView> {
        let now = Utc::now();
        let order_number = self.reserve_order_number()?;

        let aggregate_id = AggregateId::new();
        let order_id = OrderId::new(aggregate_id);
        let command = OrderCommand::Submit(SubmitOrder {
            order_id,
            order_number: order_number.clone(),
            customer_id: actor.user_id,
            title: req.title,
            description: req.description,
            subject: req.subject,
            academic_level: req.academic_level,
            paper_type: req.paper_type,
            pages: req.pages,
            words: req.words,
            deadline: req.deadline,
            requirements: req.requirements,
            attachments: req.attachments.unwrap_or_default(),
            occurred_at: now,
        });

        if let Err(err) = self.dispatch_order(aggregate_id, command) {
            self.order_numbers.release(order_number.as_str());
            return Err(err);
        }

        self.orders_dir
            .write()
            .expect("orders directory lock poisoned")
            .insert(order_id, actor.user_id);

        tracing::info!(order_id = %order_id, order_number = %order_number, "order created");

        let order = self.load_order(order_id)?;
        order_view(&order)
    }

    pub fn get_order(&self, actor: Actor, order_id: OrderId) -> DomainResult<OrderView> {
        let order = self.load_order(order_id)?;
        self.authorize(actor, OrderAction::View, &order)?;
        order_view(&order)
    }

    pub fn list_orders(
        &self,
        actor: Actor,
        query: OrderListQuery,
    ) -> DomainResult<ListResponse<OrderView>> {
        let entries: Vec<(OrderId, UserId)> = self
            .orders_dir
            .read()
            .expect("orders directory lock poisoned")
            .iter()
            .map(|(id, owner)| (*id, *owner))
            .collect();

        let mut orders = Vec::new();
        for (order_id, owner) in entries {
            if !actor.is_admin() && !actor.owns(owner) {
                continue;
            }
            let order = self.load_order(order_id)?;
            if let Some(status) = query.status {
                if order.status() != status {
                    continue;
                }
            }
            orders.push(order);
        }

        orders.sort_by_key(|o| Reverse(o.submitted_at()));
        let views = orders
            .iter()
            .map(order_view)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(ListResponse::paginate(views, query.page, query.limit))
    }

    pub fn update_order_content(
        &self,
        actor: Actor,
        order_id: OrderId,
        req: UpdateOrderRequest,
    ) -> DomainResult<OrderView> {
        let order = self.load_order(order_id)?;
        self.authorize(actor, OrderAction::EditContent, &order)?;

        self.dispatch_order(
            order_id.0,
            OrderCommand::EditContent(EditContent {
                order_id,
                patch: req.into(),
                occurred_at: Utc::now(),
            }),
        )?;

        order_view(&self.load_order(order_id)?)
    }

    pub fn transition_order_status(
        &self,
        actor: Actor,
        order_id: OrderId,
        to: OrderStatus,
    ) -> DomainResult<OrderView> {
        let order = self.load_order(order_id)?;
        self.authorize(actor, OrderAction::EditStatus, &order)?;

        self.dispatch_order(
            order_id.0,
            OrderCommand::ChangeStatus(ChangeStatus {
                order_id,
                to,
                occurred_at: Utc::now(),
            }),
        )?;

        order_view(&self.load_order(order_id)?)
    }

    pub fn record_payment(
        &self,
        actor: Actor,
        order_id: OrderId,
        payment_status: PaymentStatus,
    ) -> DomainResult<OrderView> {
        let order = self.load_order(order_id)?;
        self.authorize(actor, OrderAction::RecordPayment, &order)?;

        self.dispatch_order(
            order_id.0,
            OrderCommand::RecordPayment(RecordPayment {
                order_id,
                payment_status,
                occurred_at: Utc::now(),
            }),
        )?;

        order_view(&self.load_order(order_id)?)
    }

    pub fn assign_writer(
        &self,
        actor: Actor,
        order_id: OrderId,
        req: AssignWriterRequest,
    ) -> DomainResult<OrderView> {
        let order = self.load_order(order_id)?;
        self.authorize(actor, OrderAction::AssignWriter, &order)?;

        self.dispatch_order(
            order_id.0,
            OrderCommand::AssignWriter(AssignWriter {
                order_id,
                writer: req.writer,
                occurred_at: Utc::now(),
            }),
        )?;

        order_view(&self.load_order(order_id)?)
    }

    /// Self-service (or admin) soft cancellation. Which states may cancel is
    /// the state machine's call, surfaced as `InvalidTransition`.
    pub fn cancel_order(&self, actor: Actor, order_id: OrderId) -> DomainResult<OrderView> {
        let order = self.load_order(order_id)?;
        self.authorize(actor, OrderAction::Cancel, &order)?;

        self.dispatch_order(
            order_id.0,
            OrderCommand::ChangeStatus(ChangeStatus {
                order_id,
                to: OrderStatus::Cancelled,
                occurred_at: Utc::now(),
            }),
        )?;

        order_view(&self.load_order(order_id)?)
    }

    /// Unconditional hard delete, distinct from cancellation: the stream is
    /// purged and the order number freed, exactly as a row delete would
    /// release the storage uniqueness constraint.
    pub fn delete_order(&self, actor: Actor, order_id: OrderId) -> DomainResult<()> {
        let order = self.load_order(order_id)?;
        self.authorize(actor, OrderAction::Delete, &order)?;

        self.dispatcher
            .store()
            .purge_stream(order_id.0)
            .map_err(|e| DomainError::conflict(e.to_string()))?;

        if let Some(number) = order.order_number() {
            self.order_numbers.release(number.as_str());
        }
        self.orders_dir
            .write()
            .expect("orders directory lock poisoned")
            .remove(&order_id);

        tracing::info!(order_id = %order_id, "order deleted");
        Ok(())
    }

    fn authorize(&self, actor: Actor, action: OrderAction, order: &Order) -> DomainResult<()> {
        let owner = order
            .customer_id()
            .ok_or_else(|| DomainError::conflict("order stream has no owner"))?;
        authz::authorize_order(actor, action, owner, order.status())
    }

    fn dispatch_order(&self, aggregate_id: AggregateId, command: OrderCommand) -> DomainResult<()> {
        self.dispatcher
            .dispatch::<Order>(aggregate_id, AGGREGATE_ORDER, command, |id| {
                Order::empty(OrderId::new(id))
            })
            .map(|_| ())
            .map_err(|e| e.into_domain())
    }

    fn load_order(&self, order_id: OrderId) -> DomainResult<Order> {
        let order = self
            .dispatcher
            .load::<Order>(order_id.0, |id| Order::empty(OrderId::new(id)))
            .map_err(|e| e.into_domain())?;
        if !order.is_created() {
            return Err(DomainError::not_found());
        }
        Ok(order)
    }

    fn reserve_order_number(&self) -> DomainResult<OrderNumber> {
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_ORDER_NUMBER_ATTEMPTS {
            let candidate = OrderNumber::generate(Utc::now(), &mut rng);
            match self.order_numbers.reserve(candidate.as_str()) {
                Ok(()) => return Ok(candidate),
                Err(IndexError::Duplicate(key)) => {
                    tracing::debug!(order_number = %key, "order number collision, regenerating");
                }
            }
        }
        Err(DomainError::conflict(
            "could not allocate a unique order number",
        ))
    }

    // ─── inquiries ──────────────────────────────────────────────────────

    /// Public submission; an authenticated caller is linked but gains no
    /// access from the link.
    pub fn create_inquiry(
        &self,
        actor: Option<Actor>,
        req: CreateInquiryRequest,
    ) -> DomainResult<InquiryView> {
        let aggregate_id = AggregateId::new();
        let inquiry_id = InquiryId::new(aggregate_id);

        self.dispatch_inquiry(
            aggregate_id,
            InquiryCommand::Submit(SubmitInquiry {
                inquiry_id,
                name: req.name,
                email: req.email,
                phone: req.phone,
                subject: req.subject,
                message: req.message,
                source: req.source,
                submitted_by: actor.map(|a| a.user_id),
                occurred_at: Utc::now(),
            }),
        )?;

        self.inquiries_dir
            .write()
            .expect("inquiries directory lock poisoned")
            .push(inquiry_id);

        inquiry_view(&self.load_inquiry(inquiry_id)?)
    }

    pub fn get_inquiry(&self, actor: Actor, inquiry_id: InquiryId) -> DomainResult<InquiryView> {
        authz::authorize_inquiry_manage(actor)?;
        inquiry_view(&self.load_inquiry(inquiry_id)?)
    }

    pub fn list_inquiries(
        &self,
        actor: Actor,
        query: InquiryListQuery,
    ) -> DomainResult<ListResponse<InquiryView>> {
        authz::authorize_inquiry_manage(actor)?;

        let ids: Vec<InquiryId> = self
            .inquiries_dir
            .read()
            .expect("inquiries directory lock poisoned")
            .clone();

        let mut inquiries = Vec::new();
        for inquiry_id in ids {
            let inquiry = self.load_inquiry(inquiry_id)?;
            if let Some(status) = query.status {
                if inquiry.status() != status {
                    continue;
                }
            }
            if let Some(priority) = query.priority {
                if inquiry.priority() != priority {
                    continue;
                }
            }
            inquiries.push(inquiry);
        }

        inquiries.sort_by_key(|i| Reverse(i.submitted_at()));
        let views = inquiries
            .iter()
            .map(inquiry_view)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(ListResponse::paginate(views, query.page, query.limit))
    }

    pub fn update_inquiry_status(
        &self,
        actor: Actor,
        inquiry_id: InquiryId,
        req: UpdateInquiryStatusRequest,
    ) -> DomainResult<InquiryView> {
        authz::authorize_inquiry_manage(actor)?;
        let _ = self.load_inquiry(inquiry_id)?;

        self.dispatch_inquiry(
            inquiry_id.0,
            InquiryCommand::UpdateStatus(UpdateStatus {
                inquiry_id,
                to: req.status,
                occurred_at: Utc::now(),
            }),
        )?;

        inquiry_view(&self.load_inquiry(inquiry_id)?)
    }

    pub fn set_inquiry_priority(
        &self,
        actor: Actor,
        inquiry_id: InquiryId,
        req: SetInquiryPriorityRequest,
    ) -> DomainResult<InquiryView> {
        authz::authorize_inquiry_manage(actor)?;
        let _ = self.load_inquiry(inquiry_id)?;

        self.dispatch_inquiry(
            inquiry_id.0,
            InquiryCommand::SetPriority(SetPriority {
                inquiry_id,
                priority: req.priority,
                occurred_at: Utc::now(),
            }),
        )?;

        inquiry_view(&self.load_inquiry(inquiry_id)?)
    }

    pub fn add_inquiry_note(
        &self,
        actor: Actor,
        inquiry_id: InquiryId,
        req: AddInquiryNoteRequest,
    ) -> DomainResult<InquiryView> {
        authz::authorize_inquiry_manage(actor)?;
        let _ = self.load_inquiry(inquiry_id)?;

        self.dispatch_inquiry(
            inquiry_id.0,
            InquiryCommand::AddNote(AddNote {
                inquiry_id,
                note: req.note,
                occurred_at: Utc::now(),
            }),
        )?;

        inquiry_view(&self.load_inquiry(inquiry_id)?)
    }

    pub fn delete_inquiry(&self, actor: Actor, inquiry_id: InquiryId) -> DomainResult<()> {
        authz::authorize_inquiry_manage(actor)?;
        let _ = self.load_inquiry(inquiry_id)?;

        self.dispatcher
            .store()
            .purge_stream(inquiry_id.0)
            .map_err(|e| DomainError::conflict(e.to_string()))?;
        self.inquiries_dir
            .write()
            .expect("inquiries directory lock poisoned")
            .retain(|id| *id != inquiry_id);
        Ok(())
    }

    fn dispatch_inquiry(
        &self,
        aggregate_id: AggregateId,
        command: InquiryCommand,
    ) -> DomainResult<()> {
        self.dispatcher
            .dispatch::<Inquiry>(aggregate_id, AGGREGATE_INQUIRY, command, |id| {
                Inquiry::empty(InquiryId::new(id))
            })
            .map(|_| ())
            .map_err(|e| e.into_domain())
    }

    fn load_inquiry(&self, inquiry_id: InquiryId) -> DomainResult<Inquiry> {
        let inquiry = self
            .dispatcher
            .load::<Inquiry>(inquiry_id.0, |id| Inquiry::empty(InquiryId::new(id)))
            .map_err(|e| e.into_domain())?;
        if !inquiry.is_created() {
            return Err(DomainError::not_found());
        }
        Ok(inquiry)
    }

    // ─── publications ───────────────────────────────────────────────────

    pub fn create_publication(
        &self,
        actor: Actor,
        req: CreatePublicationRequest,
    ) -> DomainResult<PublicationView> {
        authz::authorize_publication_manage(actor)?;

        let slug = self.reserve_slug(&req.title)?;
        let aggregate_id = AggregateId::new();
        let publication_id = PublicationId::new(aggregate_id);

        let command = PublicationCommand::Create(CreatePublication {
            publication_id,
            kind: req.kind,
            title: req.title,
            slug: slug.clone(),
            body: req.body,
            excerpt: req.excerpt,
            category: req.category,
            tags: req.tags.unwrap_or_default(),
            author: Some(actor.user_id),
            occurred_at: Utc::now(),
        });

        if let Err(err) = self.dispatch_publication(aggregate_id, command) {
            self.slugs.release(&slug);
            return Err(err);
        }

        self.publications_dir
            .write()
            .expect("publications directory lock poisoned")
            .insert(slug, publication_id);

        publication_view(&self.load_publication(publication_id)?)
    }

    /// Resolve a slug to its publication. Missing slugs are `NotFound`.
    pub fn publication_id_by_slug(&self, slug: &str) -> DomainResult<PublicationId> {
        self.publications_dir
            .read()
            .expect("publications directory lock poisoned")
            .get(slug)
            .copied()
            .ok_or(DomainError::NotFound)
    }

    pub fn get_publication_by_slug(
        &self,
        actor: Option<Actor>,
        slug: &str,
    ) -> DomainResult<PublicationView> {
        let publication_id = self.publication_id_by_slug(slug)?;
        let publication = self.load_publication(publication_id)?;
        if !publication.is_published() && !actor.is_some_and(|a| a.is_admin()) {
            return Err(DomainError::not_found());
        }
        publication_view(&publication)
    }

    pub fn list_publications(
        &self,
        actor: Option<Actor>,
        query: PublicationListQuery,
    ) -> DomainResult<Vec<PublicationView>> {
        let ids: Vec<PublicationId> = self
            .publications_dir
            .read()
            .expect("publications directory lock poisoned")
            .values()
            .copied()
            .collect();

        let see_drafts = actor.is_some_and(|a| a.is_admin());
        let mut views = Vec::new();
        for publication_id in ids {
            let publication = self.load_publication(publication_id)?;
            if !publication.is_published() && !see_drafts {
                continue;
            }
            if let Some(kind) = query.kind {
                if publication.kind() != kind {
                    continue;
                }
            }
            views.push(publication_view(&publication)?);
        }

        Ok(views)
    }

    pub fn edit_publication(
        &self,
        actor: Actor,
        publication_id: PublicationId,
        req: EditPublicationRequest,
    ) -> DomainResult<PublicationView> {
        authz::authorize_publication_manage(actor)?;
        let _ = self.load_publication(publication_id)?;

        self.dispatch_publication(
            publication_id.0,
            PublicationCommand::Edit(EditPublication {
                publication_id,
                patch: req.into(),
                occurred_at: Utc::now(),
            }),
        )?;

        publication_view(&self.load_publication(publication_id)?)
    }

    pub fn publish_publication(
        &self,
        actor: Actor,
        publication_id: PublicationId,
    ) -> DomainResult<PublicationView> {
        authz::authorize_publication_manage(actor)?;
        let _ = self.load_publication(publication_id)?;

        self.dispatch_publication(
            publication_id.0,
            PublicationCommand::Publish(Publish {
                publication_id,
                occurred_at: Utc::now(),
            }),
        )?;

        publication_view(&self.load_publication(publication_id)?)
    }

    pub fn unpublish_publication(
        &self,
        actor: Actor,
        publication_id: PublicationId,
    ) -> DomainResult<PublicationView> {
        authz::authorize_publication_manage(actor)?;
        let _ = self.load_publication(publication_id)?;

        self.dispatch_publication(
            publication_id.0,
            PublicationCommand::Unpublish(Unpublish {
                publication_id,
                occurred_at: Utc::now(),
            }),
        )?;

        publication_view(&self.load_publication(publication_id)?)
    }

    fn dispatch_publication(
        &self,
        aggregate_id: AggregateId,
        command: PublicationCommand,
    ) -> DomainResult<()> {
        self.dispatcher
            .dispatch::<Publication>(aggregate_id, AGGREGATE_PUBLICATION, command, |id| {
                Publication::empty(PublicationId::new(id))
            })
            .map(|_| ())
            .map_err(|e| e.into_domain())
    }

    fn load_publication(&self, publication_id: PublicationId) -> DomainResult<Publication> {
        let publication = self
            .dispatcher
            .load::<Publication>(publication_id.0, |id| {
                Publication::empty(PublicationId::new(id))
            })
            .map_err(|e| e.into_domain())?;
        if !publication.is_created() {
            return Err(DomainError::not_found());
        }
        Ok(publication)
    }

    /// Probe the live oracle for a free slug and claim it, re-probing when a
    /// concurrent writer wins the reservation race.
    fn reserve_slug(&self, title: &str) -> DomainResult<String> {
        for _ in 0..MAX_SLUG_RESERVE_ATTEMPTS {
            let candidate = unique_slug(title, |slug| self.slugs.contains(slug))?;
            match self.slugs.reserve(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(IndexError::Duplicate(key)) => {
                    tracing::debug!(slug = %key, "slug reservation lost a race, re-probing");
                }
            }
        }
        Err(DomainError::conflict("slug reservation kept colliding"))
    }

    // ─── dashboard ──────────────────────────────────────────────────────

    pub fn dashboard_stats(&self, actor: Actor) -> DomainResult<DashboardStats> {
        authz::authorize_inquiry_manage(actor)?;

        let order_ids: Vec<OrderId> = self
            .orders_dir
            .read()
            .expect("orders directory lock poisoned")
            .keys()
            .copied()
            .collect();

        let mut orders = Vec::new();
        for order_id in order_ids {
            orders.push(self.load_order(order_id)?);
        }
        orders.sort_by_key(|o| Reverse(o.submitted_at()));

        let active = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InProgress,
        ];
        let total_orders = orders.len();
        let active_orders = orders.iter().filter(|o| active.contains(&o.status())).count();
        let completed_orders = orders
            .iter()
            .filter(|o| o.status() == OrderStatus::Completed)
            .count();
        let total_revenue = orders
            .iter()
            .filter(|o| o.payment_status() == PaymentStatus::Paid)
            .filter_map(|o| o.quote().map(|q| q.total_price))
            .sum();

        let recent_orders = orders
            .iter()
            .take(5)
            .map(order_view)
            .collect::<DomainResult<Vec<_>>>()?;

        let inquiry_ids: Vec<InquiryId> = self
            .inquiries_dir
            .read()
            .expect("inquiries directory lock poisoned")
            .clone();
        let mut new_inquiries = 0;
        for inquiry_id in inquiry_ids {
            if self.load_inquiry(inquiry_id)?.status() == InquiryStatus::New {
                new_inquiries += 1;
            }
        }

        let publication_ids: Vec<PublicationId> = self
            .publications_dir
            .read()
            .expect("publications directory lock poisoned")
            .values()
            .copied()
            .collect();
        let mut published_publications = 0;
        for publication_id in publication_ids {
            if self.load_publication(publication_id)?.is_published() {
                published_publications += 1;
            }
        }

        Ok(DashboardStats {
            total_orders,
            active_orders,
            completed_orders,
            total_revenue,
            new_inquiries,
            published_publications,
            recent_orders,
        })
    }
}

fn order_view(order: &Order) -> DomainResult<OrderView> {
    OrderView::from_order(order).ok_or_else(|| DomainError::conflict("order stream incomplete"))
}

fn inquiry_view(inquiry: &Inquiry) -> DomainResult<InquiryView> {
    InquiryView::from_inquiry(inquiry)
        .ok_or_else(|| DomainError::conflict("inquiry stream incomplete"))
}

fn publication_view(publication: &Publication) -> DomainResult<PublicationView> {
    PublicationView::from_publication(publication)
        .ok_or_else(|| DomainError::conflict("publication stream incomplete"))
}
