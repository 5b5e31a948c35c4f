use std::fmt;

/// Unique identifier of a body (dynamic or kinematic) owned by the simulation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub i32);

/// Unique identifier of a static collidable. Static handles live in their own namespace:
/// `StaticHandle(3)` and `BodyHandle(3)` refer to different objects.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct StaticHandle(pub i32);

impl BodyHandle {
    /// Gets the handle as a dense slot index.
    #[inline(always)]
    pub fn slot(self) -> usize {
        debug_assert!(self.0 >= 0, "Body handles are never negative.");
        self.0 as usize
    }
}

impl StaticHandle {
    /// Gets the handle as a dense slot index.
    #[inline(always)]
    pub fn slot(self) -> usize {
        debug_assert!(self.0 >= 0, "Static handles are never negative.");
        self.0 as usize
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BodyHandle<{}>", self.0)
    }
}

impl fmt::Display for StaticHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StaticHandle<{}>", self.0)
    }
}
