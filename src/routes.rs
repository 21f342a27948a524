//! Route table and access guard. Stores return `Route` values instead of
//! navigating themselves; the front-end decides how to show them.

use crate::{client::AppError, features::auth::Session};
use std::{fmt, str::FromStr};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Login,
    Signup,
    Otp,
    Courses,
    MyCourses,
    Account,
    Lectures(String),
    Payment(String),
    PaymentSuccess,
    Admin,
    PromoteUser,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Only for visitors who are not logged in.
    GuestOnly,
    Authenticated,
    Admin,
}

/// What to do with a navigation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Guard {
    Allow,
    /// The session is still being resolved.
    Loading,
    Redirect(Route),
}

impl Route {
    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Self::Home | Self::About | Self::Otp | Self::Courses | Self::PaymentSuccess => {
                Access::Public
            }
            Self::Login | Self::Signup => Access::GuestOnly,
            Self::MyCourses | Self::Account | Self::Lectures(_) | Self::Payment(_) => {
                Access::Authenticated
            }
            Self::Admin | Self::PromoteUser => Access::Admin,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::About => "/about".to_string(),
            Self::Login => "/login".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::Otp => "/otp".to_string(),
            Self::Courses => "/course".to_string(),
            Self::MyCourses => "/mycourse".to_string(),
            Self::Account => "/account".to_string(),
            Self::Lectures(course_id) => format!("/lectures/{course_id}"),
            Self::Payment(course_id) => format!("/payment/{course_id}"),
            Self::PaymentSuccess => "/payment-success".to_string(),
            Self::Admin => "/admin".to_string(),
            Self::PromoteUser => "/promote-user".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let path = value
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Self::Home,
            ["about"] => Self::About,
            ["login"] => Self::Login,
            ["signup"] => Self::Signup,
            ["otp"] => Self::Otp,
            ["course"] => Self::Courses,
            ["mycourse"] => Self::MyCourses,
            ["account"] => Self::Account,
            ["lectures", course_id] => Self::Lectures((*course_id).to_string()),
            ["payment", course_id] => Self::Payment((*course_id).to_string()),
            ["payment-success"] => Self::PaymentSuccess,
            ["admin"] => Self::Admin,
            ["promote-user"] => Self::PromoteUser,
            _ => return Err(AppError::Validation(format!("Unknown route: {value}"))),
        };
        Ok(route)
    }
}

/// Decides whether `route` may render for the given session.
#[must_use]
pub fn guard(route: &Route, session: &Session) -> Guard {
    let access = route.access();
    if access == Access::Public {
        return Guard::Allow;
    }
    if session.is_loading {
        return Guard::Loading;
    }

    match access {
        Access::Public => Guard::Allow,
        Access::GuestOnly if session.is_authenticated => Guard::Redirect(Route::Home),
        Access::GuestOnly => Guard::Allow,
        Access::Authenticated if session.is_authenticated => Guard::Allow,
        Access::Admin if session.is_admin() => Guard::Allow,
        Access::Authenticated | Access::Admin => Guard::Redirect(Route::Login),
    }
}
