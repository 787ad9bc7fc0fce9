//! Decides which top-level section the client enters for a session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::SessionSnapshot;
use crate::user::Profile;

/// Top-level navigation sections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    LoginScreen,
    StudentHome,
    FacultyHome,
    AdminHome,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Destination::LoginScreen => "login",
            Destination::StudentHome => "student home",
            Destination::FacultyHome => "faculty home",
            Destination::AdminHome => "admin home",
        };
        f.write_str(label)
    }
}

/// Navigation decision including the "not yet" state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "destination")]
pub enum Route {
    /// Session is still loading; stay on the splash screen.
    Splash,
    Ready(Destination),
}

pub struct RoleRouter;

impl RoleRouter {
    /// Map a session to its destination, ignoring the loading flag.
    pub fn resolve(session: &SessionSnapshot) -> Destination {
        let Some(user) = session.user() else {
            return Destination::LoginScreen;
        };
        match user.profile {
            Profile::Student(_) => Destination::StudentHome,
            Profile::Faculty(_) => Destination::FacultyHome,
            Profile::Admin(_) => Destination::AdminHome,
            Profile::Unrecognized => {
                log::warn!("User {} has an unrecognized role, routing to login", user.id);
                Destination::LoginScreen
            }
        }
    }

    /// Like [`RoleRouter::resolve`] but holds navigation while loading.
    pub fn route(session: &SessionSnapshot) -> Route {
        if session.is_loading() {
            Route::Splash
        } else {
            Route::Ready(Self::resolve(session))
        }
    }
}
