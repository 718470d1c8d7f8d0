//! Binding views to models and collections
//!
//! [`bind`] attaches a [`Controller`] to the model of a [`View`], or to every
//! member of its [`Collection`]. A bound collection keeps tracking its
//! membership: models added later get a controller, removed models lose
//! theirs. [`Binding::unbind`] detaches everything again.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Options;
use crate::controller::Controller;
use crate::events::{Listener, ModelEvent, drain_listener};
use crate::foundation::{ConfigError, Result};
use crate::model::Model;
use crate::queue::TaskQueue;
use crate::render;

// ============================================================================
// COLLECTION
// ============================================================================

struct Member<M> {
    model: M,
    controller: Option<Controller<M>>,
    events: Option<Listener>,
}

struct Attachment {
    options: Options,
    queue: TaskQueue,
}

struct CollectionInner<M> {
    members: Vec<Member<M>>,
    attachment: Option<Attachment>,
}

/// An ordered set of models. Clones are handles to the same collection.
pub struct Collection<M> {
    inner: Arc<RwLock<CollectionInner<M>>>,
}

impl<M> Clone for Collection<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M> Default for Collection<M> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CollectionInner {
                members: Vec::new(),
                attachment: None,
            })),
        }
    }
}

impl<M> fmt::Debug for Collection<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Collection")
            .field("len", &inner.members.len())
            .field("bound", &inner.attachment.is_some())
            .finish()
    }
}

impl<M: Model + Clone + PartialEq> Collection<M> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding `models`.
    pub fn from_models(models: impl IntoIterator<Item = M>) -> Self {
        let collection = Self::new();
        for model in models {
            collection.add(model);
        }
        collection
    }

    /// Adds a model. When the collection is bound, the model is bound too.
    pub fn add(&self, model: M) {
        let mut inner = self.inner.write();
        let mut member = Member {
            model,
            controller: None,
            events: None,
        };
        if let Some(attachment) = &inner.attachment {
            attach(&mut member, attachment);
        }
        inner.members.push(member);
    }

    /// Removes a model, unbinding it. Returns whether it was a member.
    pub fn remove(&self, model: &M) -> bool {
        let mut inner = self.inner.write();
        let Some(index) = inner.members.iter().position(|m| &m.model == model) else {
            return false;
        };
        let Member {
            controller, events, ..
        } = inner.members.remove(index);
        if controller.is_some() {
            drop(events);
            drop(controller);
            tracing::debug!("model removed from bound collection, controller detached");
        }
        true
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().members.len()
    }

    /// Whether the collection has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The members, in insertion order.
    #[must_use]
    pub fn models(&self) -> Vec<M> {
        self.inner.read().members.iter().map(|m| m.model.clone()).collect()
    }

    /// Whether the collection is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.inner.read().attachment.is_some()
    }

    /// The controller of a member, if the collection is bound.
    #[must_use]
    pub fn controller(&self, model: &M) -> Option<Controller<M>> {
        self.inner
            .read()
            .members
            .iter()
            .find(|m| &m.model == model)
            .and_then(|m| m.controller.clone())
    }

    /// Controllers of all members, in insertion order.
    #[must_use]
    pub fn controllers(&self) -> Vec<Controller<M>> {
        self.inner
            .read()
            .members
            .iter()
            .filter_map(|m| m.controller.clone())
            .collect()
    }

    fn bind(&self, options: &Options, queue: &TaskQueue) {
        let mut inner = self.inner.write();
        let attachment = Attachment {
            options: options.clone(),
            queue: queue.clone(),
        };
        for member in &mut inner.members {
            attach(member, &attachment);
        }
        inner.attachment = Some(attachment);
    }

    fn unbind(&self) {
        let mut inner = self.inner.write();
        inner.attachment = None;
        for member in &mut inner.members {
            member.controller = None;
            member.events = None;
        }
    }

    fn dispatch_events(&self) -> usize {
        // Render callbacks may touch this collection, so they run unlocked.
        let pending: Vec<_> = {
            let mut inner = self.inner.write();
            inner
                .members
                .iter_mut()
                .filter_map(|member| match (&member.controller, &mut member.events) {
                    (Some(controller), Some(listener)) => {
                        Some((controller.clone(), drain_listener(listener)))
                    }
                    _ => None,
                })
                .collect()
        };
        pending
            .iter()
            .map(|(controller, events)| dispatch_all(controller, events))
            .sum()
    }
}

fn attach<M: Model + Clone>(member: &mut Member<M>, attachment: &Attachment) {
    let controller = Controller::new(
        member.model.clone(),
        attachment.options.clone(),
        attachment.queue.clone(),
    );
    let use_events = controller.config(&Options::new()).use_events_instead_of_callbacks;
    member.events = use_events.then(|| member.model.events().listen());
    member.controller = Some(controller);
}

fn dispatch_all<M: Model>(controller: &Controller<M>, events: &[ModelEvent]) -> usize {
    let config = controller.config(&Options::new());
    events
        .iter()
        .filter(|event| render::dispatch(config.render.as_ref(), &config.selector, event))
        .count()
}

// ============================================================================
// VIEW
// ============================================================================

/// The presentation side being bound: a model, a collection, or both.
pub struct View<M> {
    /// The view's model.
    pub model: Option<M>,
    /// The view's collection.
    pub collection: Option<Collection<M>>,
}

impl<M> Default for View<M> {
    fn default() -> Self {
        Self {
            model: None,
            collection: None,
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for View<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("model", &self.model)
            .field("collection", &self.collection)
            .finish()
    }
}

impl<M> View<M> {
    /// Creates a view with neither model nor collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_model(mut self, model: M) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the collection.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_collection(mut self, collection: Collection<M>) -> Self {
        self.collection = Some(collection);
        self
    }
}

// ============================================================================
// BINDING
// ============================================================================

/// An active binding. Dropping it without [`unbind`](Self::unbind) leaves a
/// bound collection attached.
pub struct Binding<M> {
    controller: Option<Controller<M>>,
    events: Option<Listener>,
    collection: Option<Collection<M>>,
    queue: TaskQueue,
}

impl<M: fmt::Debug> fmt::Debug for Binding<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("controller", &self.controller)
            .field("collection", &self.collection)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

/// Binds `view` with `options` overlaying the process-wide defaults.
///
/// Fails with [`ConfigError::MissingModel`] when the view has neither a
/// model nor a collection.
pub fn bind<M>(view: &View<M>, options: Options) -> Result<Binding<M>>
where
    M: Model + Clone + PartialEq,
{
    if view.model.is_none() && view.collection.is_none() {
        return Err(ConfigError::MissingModel);
    }

    let queue = TaskQueue::new();
    let controller = view
        .model
        .clone()
        .map(|model| Controller::new(model, options.clone(), queue.clone()));
    let events = controller.as_ref().and_then(|controller| {
        let use_events = controller.config(&Options::new()).use_events_instead_of_callbacks;
        use_events.then(|| controller.model().events().listen())
    });
    if let Some(collection) = &view.collection {
        collection.bind(&options, &queue);
    }

    tracing::debug!(
        model = controller.is_some(),
        collection = view.collection.as_ref().map(Collection::len),
        "validation bound"
    );
    Ok(Binding {
        controller,
        events,
        collection: view.collection.clone(),
        queue,
    })
}

impl<M: Model + Clone + PartialEq> Binding<M> {
    /// The controller of the view's model.
    pub const fn controller(&self) -> Option<&Controller<M>> {
        self.controller.as_ref()
    }

    /// The bound collection.
    pub const fn collection(&self) -> Option<&Collection<M>> {
        self.collection.as_ref()
    }

    /// The queue summary events of this binding are deferred to.
    pub const fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// In event mode, routes the attribute events published since the last
    /// call to the render callbacks. Returns how many callbacks fired.
    pub fn dispatch_events(&mut self) -> usize {
        let from_model = match (&self.controller, &mut self.events) {
            (Some(controller), Some(listener)) => {
                dispatch_all(controller, &drain_listener(listener))
            }
            _ => 0,
        };
        let from_collection = self
            .collection
            .as_ref()
            .map_or(0, Collection::dispatch_events);
        from_model + from_collection
    }

    /// Detaches the model and every collection member.
    pub fn unbind(self) {
        if let Some(collection) = &self.collection {
            collection.unbind();
        }
        tracing::debug!("validation unbound");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::render::{Render, RenderContext};
    use crate::rules::{RuleDecl, Validation};
    use parking_lot::Mutex;

    fn member(name: &str) -> Record {
        let record = Record::new().with_validation(Validation::new().attr("name", RuleDecl::validator("required", true)));
        record.set("name", name);
        record
    }

    #[test]
    fn binding_nothing_is_an_error() {
        let err = bind(&View::<Record>::new(), Options::new()).unwrap_err();
        assert_eq!(err, ConfigError::MissingModel);
    }

    #[test]
    fn model_binding_exposes_a_controller() {
        let view = View::new().with_model(member("Ada"));
        let binding = bind(&view, Options::new()).unwrap();
        let controller = binding.controller().unwrap();
        assert!(controller.is_valid("name").unwrap());
    }

    #[test]
    fn collection_tracks_membership() {
        let (a, b, c) = (member("a"), member(""), member("c"));
        let collection = Collection::from_models([a.clone(), b.clone()]);
        assert!(collection.controller(&a).is_none());

        let binding = bind(&View::new().with_collection(collection.clone()), Options::new()).unwrap();
        assert_eq!(collection.controllers().len(), 2);
        assert!(!collection.controller(&b).unwrap().is_valid("name").unwrap());

        collection.add(c.clone());
        assert!(collection.controller(&c).is_some());

        assert!(collection.remove(&a));
        assert!(!collection.remove(&a));
        assert!(collection.controller(&a).is_none());
        assert_eq!(collection.len(), 2);

        binding.unbind();
        assert!(!collection.is_bound());
        assert!(collection.controllers().is_empty());

        collection.add(member("d"));
        assert!(collection.controllers().is_empty());
    }

    /// Reads the collection it renders for from inside the callbacks.
    struct MembershipRender {
        collection: Collection<Record>,
        seen: Arc<Mutex<Vec<(String, usize)>>>,
    }

    impl Render for MembershipRender {
        fn valid(&self, attr: &str, _ctx: &RenderContext<'_>) {
            self.seen.lock().push((attr.to_owned(), self.collection.len()));
        }

        fn invalid(&self, attr: &str, _error: &str, _ctx: &RenderContext<'_>) {
            self.seen.lock().push((attr.to_owned(), self.collection.len()));
            self.collection.add(member("late"));
        }
    }

    #[test]
    fn collection_callbacks_may_reenter_the_collection() {
        let collection = Collection::from_models([member(""), member("b")]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let render = MembershipRender {
            collection: collection.clone(),
            seen: seen.clone(),
        };
        let mut binding = bind(
            &View::new().with_collection(collection.clone()),
            Options::new().use_events(true).render(render),
        )
        .unwrap();

        for controller in collection.controllers() {
            controller.validate(None, &Options::new()).unwrap();
        }

        assert_eq!(binding.dispatch_events(), 2);
        assert_eq!(
            *seen.lock(),
            vec![("name".to_owned(), 2), ("name".to_owned(), 3)]
        );
        assert_eq!(collection.len(), 3);
        binding.unbind();
    }
}
