use std::collections::{BTreeSet, HashSet};

/// Anything that can answer "does the subject hold this role?"
pub trait HeldRoles {
    fn holds(&self, role: &str) -> bool;
}

impl HeldRoles for HashSet<String> {
    fn holds(&self, role: &str) -> bool {
        self.contains(role)
    }
}

impl HeldRoles for BTreeSet<String> {
    fn holds(&self, role: &str) -> bool {
        self.contains(role)
    }
}

impl HeldRoles for [String] {
    fn holds(&self, role: &str) -> bool {
        self.iter().any(|held| held == role)
    }
}

impl HeldRoles for [&str] {
    fn holds(&self, role: &str) -> bool {
        self.iter().any(|held| *held == role)
    }
}

impl<const N: usize> HeldRoles for [&str; N] {
    fn holds(&self, role: &str) -> bool {
        self.as_slice().holds(role)
    }
}

impl HeldRoles for Vec<String> {
    fn holds(&self, role: &str) -> bool {
        self.as_slice().holds(role)
    }
}
