//! Attendants and the request categories they specialise in.

use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two request categories. A request is only ever served by an
/// active attendant of the same category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sales,
    Support,
}

impl Category {
    /// Fixed processing order within a server.
    pub const ALL: [Category; 2] = [Category::Sales, Category::Support];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Support => "support",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attendant {
    pub id: EntityId,
    pub category: Category,
    active: bool,
}

impl Attendant {
    pub fn new(id: impl Into<EntityId>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// ACTIVE -> FAILED. There is no way back.
    pub fn fail(&mut self) {
        self.active = false;
    }

    pub fn can_serve(&self, category: Category) -> bool {
        self.active && self.category == category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_is_one_way() {
        let mut a = Attendant::new("Server-1-0", Category::Sales);
        assert!(a.can_serve(Category::Sales));
        assert!(!a.can_serve(Category::Support));

        a.fail();
        a.fail();
        assert!(!a.is_active());
        assert!(!a.can_serve(Category::Sales));
    }
}
