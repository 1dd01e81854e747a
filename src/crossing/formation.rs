use crate::crossing::state::{Class, ClassCounts};
use serde::{Deserialize, Serialize};

/// Members per boarding group, captain included
pub const GROUP_SIZE: usize = 4;

/// Members per boarding group besides the captain
pub const CREW_SIZE: usize = GROUP_SIZE - 1;

/// Make-up of a boarding group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Composition {
    /// Four members of one class
    SameClass(Class),
    /// Two hackers and two serfs
    Mixed,
}

impl Composition {
    /// Boarding permits the captain hands out, per class
    pub fn crew_permits(self, captain: Class) -> ClassCounts {
        let mut permits = ClassCounts::default();
        match self {
            Composition::SameClass(class) => {
                debug_assert_eq!(class, captain);
                permits[class] = CREW_SIZE;
            }
            Composition::Mixed => {
                permits[captain] = 1;
                permits[captain.other()] = 2;
            }
        }
        permits
    }

    /// Head count per class, captain included
    pub fn members(self) -> ClassCounts {
        match self {
            Composition::SameClass(Class::Hacker) => ClassCounts::new(GROUP_SIZE, 0),
            Composition::SameClass(Class::Serf) => ClassCounts::new(0, GROUP_SIZE),
            Composition::Mixed => ClassCounts::new(2, 2),
        }
    }

    /// Whether a set of boarders with these head counts is a legal group
    pub fn from_members(members: ClassCounts) -> Option<Self> {
        match (members[Class::Hacker], members[Class::Serf]) {
            (4, 0) => Some(Composition::SameClass(Class::Hacker)),
            (0, 4) => Some(Composition::SameClass(Class::Serf)),
            (2, 2) => Some(Composition::Mixed),
            _ => None,
        }
    }
}

/// Outcome of the quorum check for one admitted arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The arrival completed a group and will steer it
    Captain(Composition),
    /// The arrival waits for a boarding permit of its class
    Crew,
}

/// Decide whether the arrival of `class` that was just counted in
/// `unassigned` completes a group.
///
/// Must run in the same critical section as the increment so that every
/// count is checked as it is reached. Members of a new group are removed from
/// `unassigned` before returning, so no arrival is counted into two groups.
pub fn assign_role(unassigned: &mut ClassCounts, class: Class) -> Role {
    let other = class.other();

    if unassigned[class] == GROUP_SIZE {
        unassigned[class] = 0;
        Role::Captain(Composition::SameClass(class))
    } else if unassigned[class] == 2 && unassigned[other] >= 2 {
        unassigned[class] = 0;
        unassigned[other] -= 2;
        Role::Captain(Composition::Mixed)
    } else {
        Role::Crew
    }
}
