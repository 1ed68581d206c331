//! Role expressions for the tenancy engine
//!
//! A role expression is a boolean formula over role names, e.g.
//! `account_admin | (billing & support)`. Routes declare one to restrict who
//! may reach them; the authorization gate evaluates it against the effective
//! role set of the signed-in person.
//!
//! # Grammar
//!
//! ```text
//! expr   := term   ( '|' term   )*
//! term   := factor ( '&' factor )*
//! factor := ROLE | '(' expr ')'
//! ROLE   := maximal run of characters other than '&', '|', '(', ')' and whitespace
//! ```
//!
//! `&` binds tighter than `|`. An empty or absent expression places no
//! restriction and always evaluates to `true`.
//!
//! Role names are matched as whole tokens, so `admin` never matches inside
//! `super_admin`.
//!
//! # Example
//!
//! ```rust
//! use auth_roles::{evaluate, RoleExpression};
//!
//! assert!(evaluate(Some("(a&b)|c"), &["c"]).unwrap());
//! assert!(!evaluate(Some("admin&super_admin"), &["super_admin"]).unwrap());
//! assert!(evaluate(None, &[] as &[&str]).unwrap());
//!
//! let expr = RoleExpression::parse("account_admin | (billing & support)").unwrap();
//! assert_eq!(expr.role_names(), vec!["account_admin", "billing", "support"]);
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod error;
pub mod expression;
pub mod held;

pub use error::*;
pub use expression::*;
pub use held::HeldRoles;

/// Evaluate an optional expression against a set of held roles
///
/// # Errors
///
/// Returns [`RoleExpressionError`] when the expression is malformed. That is a
/// configuration defect, not a user error.
pub fn evaluate<R>(expression: Option<&str>, roles: &R) -> Result<bool>
where
    R: HeldRoles + ?Sized,
{
    match expression {
        None => Ok(true),
        Some(source) => Ok(RoleExpression::parse(source)?.evaluate(roles)),
    }
}
