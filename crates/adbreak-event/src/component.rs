//! Declared event contract of a bus component.

use crate::events::EventKind;

/// A participant on the event bus.
///
/// Components subscribe themselves when constructed; this trait only
/// declares which kinds they emit and listen for, for introspection and
/// diagnostics.
pub trait Component: Send + Sync {
    fn name(&self) -> &str;

    fn emits(&self) -> &[EventKind] {
        &[]
    }

    fn listens_for(&self) -> &[EventKind] {
        &[]
    }
}

/// Log a component's declared contract.
pub fn describe(component: &dyn Component) {
    tracing::debug!(
        component = %component.name(),
        emits = ?component.emits(),
        listens_for = ?component.listens_for(),
        "component attached"
    );
}
