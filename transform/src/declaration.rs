use crate::{
    host::{
        HostContext,
        LifecycleCallbacks,
        SharedSurface,
    },
    instance::TransformInstance,
    props::{
        PropSpec,
        PropValueType,
        Props,
        PropsSchema,
    },
    source::{
        find_source,
        Source,
        SourceQuery,
    },
};
use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
};

/// What `create` hands back to the host: the element to place in its layout.
#[derive(Clone)]
pub struct TransformRoot {
    pub root: SharedSurface,
}

impl fmt::Debug for TransformRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRoot")
            .field("root", &self.root.borrow().id())
            .finish()
    }
}

/// A kind of transform the host compositor can place.
pub trait TransformDeclaration {
    fn name(&self) -> &str;

    /// Source type this transform binds to.
    fn source_type(&self) -> &str;

    fn props(&self) -> &PropsSchema;

    fn use_source(&self, candidates: &[Arc<Source>], query: &SourceQuery) -> Option<Arc<Source>> {
        find_source(candidates, query)
    }

    /// Instantiates the transform. Implementations register their `onUpdate`,
    /// `onNewSource` and `onRemove` handlers exactly once before returning.
    fn create(
        &self,
        lifecycle: &mut dyn LifecycleCallbacks,
        context: HostContext,
        initial_props: Props,
    ) -> TransformRoot;
}

/// Renders a room participant's camera or screen share.
#[derive(Debug, Clone)]
pub struct RoomParticipant {
    schema: PropsSchema,
}

impl RoomParticipant {
    pub const NAME: &'static str = "LS-Room-Participant";
    pub const SOURCE_TYPE: &'static str = "RoomParticipant";

    pub fn new() -> Self {
        Self {
            schema: PropsSchema::default()
                .with("isMuted", PropSpec::optional(PropValueType::Boolean, false))
                .with("volume", PropSpec::optional(PropValueType::Number, 1)),
        }
    }
}

impl Default for RoomParticipant {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformDeclaration for RoomParticipant {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn source_type(&self) -> &str {
        Self::SOURCE_TYPE
    }

    fn props(&self) -> &PropsSchema {
        &self.schema
    }

    fn create(
        &self,
        lifecycle: &mut dyn LifecycleCallbacks,
        context: HostContext,
        initial_props: Props,
    ) -> TransformRoot {
        let instance = TransformInstance::create(context, lifecycle, initial_props);
        TransformRoot { root: instance.root() }
    }
}

/// Declarations known to the host, keyed by name.
#[derive(Default)]
pub struct TransformRegistry {
    inner: HashMap<String, Box<dyn TransformDeclaration>>,
}

impl TransformRegistry {
    pub fn with_builtin() -> Self {
        let mut registry = Self::default();
        registry.register(RoomParticipant::new());
        registry
    }

    /// Adds a declaration, returning the one it replaced under the same name.
    pub fn register(&mut self, declaration: impl TransformDeclaration + 'static) -> Option<Box<dyn TransformDeclaration>> {
        let name = declaration.name().to_string();
        debug!(name, source_type = declaration.source_type(), "Registering transform");
        self.inner.insert(name, Box::new(declaration))
    }

    pub fn get(&self, name: &str) -> Option<&dyn TransformDeclaration> {
        self.inner.get(name).map(|declaration| declaration.as_ref())
    }

    pub fn for_source_type<'a>(&'a self, source_type: &'a str) -> impl Iterator<Item = &'a dyn TransformDeclaration> + 'a {
        self.inner
            .values()
            .filter(move |declaration| declaration.source_type() == source_type)
            .map(|declaration| declaration.as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names = self.inner.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::{
            memory::{
                MemoryHost,
                MemoryLifecycle,
            },
            ProjectId,
        },
        source::SourceProps,
    };
    use serde_json::json;

    #[test]
    fn room_participant_declaration() {
        let declaration = RoomParticipant::new();
        assert_eq!(declaration.name(), "LS-Room-Participant");
        assert_eq!(declaration.source_type(), "RoomParticipant");

        let volume = declaration.props().get("volume").unwrap();
        assert_eq!(volume.value_type, PropValueType::Number);
        assert!(!volume.required);
        assert_eq!(volume.default, json!(1));
        assert_eq!(declaration.props().get("isMuted").unwrap().default, json!(false));
    }

    #[test]
    fn use_source_delegates_to_matcher() {
        let candidates = vec![
            Arc::new(Source::new("a", SourceProps::default().with("participantId", "p1"), None)),
            Arc::new(Source::new("b", SourceProps::default().with("participantId", "p2"), None)),
        ];
        let mut query = SourceQuery::new();
        query.insert("participantId".to_string(), json!("p2"));

        let found = RoomParticipant::new().use_source(&candidates, &query).unwrap();
        assert_eq!(found.id.as_str(), "b");
    }

    #[test]
    fn create_registers_handlers_and_returns_root() {
        let host = MemoryHost::new();
        let mut lifecycle = MemoryLifecycle::default();
        let root = RoomParticipant::new().create(&mut lifecycle, host.context(ProjectId::new("p")), Props::default());
        assert_eq!(lifecycle.registrations(), [1, 1, 1]);

        let id = root.root.borrow().id();
        assert!(host.memory_surface(id).is_some());

        // The handlers keep the instance alive after `create` returned.
        lifecycle.update(Some(Props::default()));
        assert!(host.last_view(id).is_some());
        assert!(host.is_observed(id));
    }

    #[test]
    fn registry_lookup() {
        let registry = TransformRegistry::with_builtin();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec![RoomParticipant::NAME.to_string()]);
        assert!(registry.get(RoomParticipant::NAME).is_some());
        assert_eq!(registry.for_source_type(RoomParticipant::SOURCE_TYPE).count(), 1);
        assert_eq!(registry.for_source_type("Image").count(), 0);
    }
}
