//! Which sections the current process may read and write.
//!
//! `system` preferences are owned by root, `user` and `local` preferences by
//! the user. The privilege level is read once at startup with
//! [`Privilege::current`] and handed to every operation as an [`AccessScope`],
//! so tests can exercise both levels without touching the process uid.

use crate::types::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    User,
    Superuser,
}

impl Privilege {
    /// Privilege of the running process, from its effective uid.
    pub fn current() -> Self {
        if effective_uid() == 0 {
            Privilege::Superuser
        } else {
            Privilege::User
        }
    }
}

#[cfg(unix)]
pub(crate) fn effective_uid() -> u32 {
    nix::unistd::geteuid().as_raw()
}

#[cfg(not(unix))]
pub(crate) fn effective_uid() -> u32 {
    u32::MAX
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessScope {
    privilege: Privilege,
}

impl AccessScope {
    pub fn new(privilege: Privilege) -> Self {
        Self { privilege }
    }

    pub fn current() -> Self {
        Self::new(Privilege::current())
    }

    pub fn privilege(&self) -> Privilege {
        self.privilege
    }

    /// Accessible sections, in document order.
    pub fn sections(&self) -> &'static [Section] {
        match self.privilege {
            Privilege::Superuser => &[Section::System],
            Privilege::User => &[Section::User, Section::Local],
        }
    }

    pub fn allows(&self, section: Section) -> bool {
        self.sections().contains(&section)
    }
}
