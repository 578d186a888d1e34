//! Entity Component System (ECS) core implementation
//!
//! This module provides the foundational ECS architecture including:
//! - Entity management
//! - Type-keyed component storage with insertion-ordered layouts
//! - Component groups that track entities matching a component set
//! - Lifecycle events for components and groups
//! - System execution framework

mod entity;
mod component;
mod registry;
mod group;
pub mod events;
mod manager;
mod system;

pub use entity::Entity;
pub use component::{AnyStorage, Component, ComponentArray, ComponentInfo};
pub use registry::ComponentRegistry;
pub use group::{ComponentGroup, ComponentSet, GroupHandle, GroupMatcher};
pub use events::{
    AnyComponentEvents, AnyComponentListener, ComponentEvents, ComponentListener, GroupListener,
    Listeners, MessageReceiver, Messenger, RemovedListener, ScopedEvent,
};
pub use manager::EntityManager;
pub use system::{System, SystemRoot};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Marker;
    impl Component for Marker {}

    #[test]
    fn test_manager_creation() {
        let manager = EntityManager::new();
        assert_eq!(manager.entity_count(), 0);
        assert_eq!(manager.group_count(), 0);
    }

    #[test]
    fn test_entity_creation() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        assert_eq!(manager.entity_count(), 1);
        assert!(manager.is_entity_alive(entity));
    }

    #[test]
    fn test_group_before_and_after_components() {
        let mut manager = EntityManager::new();
        let early = manager.create_entity();
        manager.add_component(early, Marker).unwrap();

        let handle = manager.group::<(Marker,)>();
        let late = manager.create_entity();
        manager.add_component(late, Marker).unwrap();

        assert_eq!(manager.get_group(handle).unwrap().entities(), &[early, late]);
    }
}
