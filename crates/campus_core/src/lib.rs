//! # Campus Core
//!
//! Domain types shared by the campus rewards client: users and their role
//! profiles, the session snapshot, role routing and theming.

pub mod router;
pub mod session;
pub mod theme;
pub mod user;

pub use router::{Destination, RoleRouter, Route};
pub use session::{AuthState, Credentials, SessionSnapshot};
pub use theme::{Colors, Gradients, Palette, Theme, ThemeManager};
pub use user::{
    AdminProfile, FacultyProfile, Profile, ProfileError, Role, StudentProfile, User,
};
