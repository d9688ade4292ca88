use stackassign_auth::Actor;

/// Resolved actor for a request.
///
/// Inserted by the auth middleware when a valid bearer token is presented.
/// Routes that allow anonymous access extract it as an `Option`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }
}
