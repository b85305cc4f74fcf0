//! Actor Class Descriptors
//!
//! Every actor carries an explicit, stable type tag. Descriptors form a
//! single-inheritance chain so lookups can match an actor by its own class or
//! by any ancestor.
//!
//! Descriptors must live in `static` items: equality is address identity, so
//! two descriptors that happen to share a name are still different classes.
//!
//! ```
//! use actor_directory::ActorClass;
//!
//! static ACTOR: ActorClass = ActorClass::root("Actor");
//! static WORKER: ActorClass = ActorClass::derived("Worker", &ACTOR);
//!
//! assert!(WORKER.is_subclass_of(&ACTOR));
//! assert!(!ACTOR.is_subclass_of(&WORKER));
//! ```

use std::fmt;

/// Static type descriptor for an actor implementation
pub struct ActorClass {
    name: &'static str,
    parent: Option<&'static ActorClass>,
}

impl ActorClass {
    /// Descriptor with no parent
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Descriptor extending `parent`
    pub const fn derived(name: &'static str, parent: &'static ActorClass) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// Simple class name, matched exactly by name lookups
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static ActorClass> {
        self.parent
    }

    /// This class followed by each ancestor, nearest first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// True if `self` is `other` or inherits from it
    pub fn is_subclass_of(&self, other: &ActorClass) -> bool {
        self.ancestors().any(|class| std::ptr::eq(class, other))
    }
}

impl PartialEq for ActorClass {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ActorClass {}

impl fmt::Debug for ActorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorClass")
            .field("name", &self.name)
            .field("parent", &self.parent.map(ActorClass::name))
            .finish()
    }
}

impl fmt::Display for ActorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a class and its ancestors
pub struct Ancestors<'a> {
    next: Option<&'a ActorClass>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ActorClass;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}
