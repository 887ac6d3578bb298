//! Performative filters for inbox routing.

use std::ops::BitOr;

use crate::Performative;

/// Set of performatives a behaviour accepts.
///
/// Compose with `|`:
///
/// ```
/// use wcs_fabric::{Performative, Template};
/// let t = Performative::Propose | Performative::Refuse;
/// assert!(t.matches(Performative::Refuse));
/// assert!(!t.matches(Performative::Inform));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Template(u8);

impl Template {
    pub const NONE: Template = Template(0);
    pub const ANY: Template = Template(0b0011_1111);

    #[inline]
    pub const fn of(p: Performative) -> Self {
        Template(p.bit())
    }

    #[inline]
    pub fn matches(self, p: Performative) -> bool {
        self.0 & p.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<Performative> for Template {
    fn from(p: Performative) -> Self {
        Template::of(p)
    }
}

impl BitOr for Template {
    type Output = Template;
    fn bitor(self, rhs: Template) -> Template {
        Template(self.0 | rhs.0)
    }
}

impl BitOr<Performative> for Template {
    type Output = Template;
    fn bitor(self, rhs: Performative) -> Template {
        self | Template::of(rhs)
    }
}

impl BitOr for Performative {
    type Output = Template;
    fn bitor(self, rhs: Performative) -> Template {
        Template::of(self) | Template::of(rhs)
    }
}
