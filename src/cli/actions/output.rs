//! Plain-text rendering and the route check shared by the executors.

use crate::{
    app::App,
    features::{auth::User, courses::Course, lectures::Lecture},
    routes::{guard, Guard, Route},
};
use anyhow::{bail, Result};

/// Resolves the session, then applies the same guard a view would.
pub(super) async fn require(app: &App, route: &Route) -> Result<()> {
    app.session.fetch_current_user().await;
    let session = app.session.snapshot();

    match guard(route, &session) {
        Guard::Allow => Ok(()),
        Guard::Loading => bail!("Session is still loading, try again."),
        Guard::Redirect(Route::Login) if session.is_authenticated => {
            bail!("Admin access required.")
        }
        Guard::Redirect(Route::Login) => bail!("Please log in first: coursehub login"),
        Guard::Redirect(other) => bail!("Not available while logged in (go to {other})."),
    }
}

pub(super) fn message(message: Option<String>, fallback: &str) {
    println!("{}", message.as_deref().unwrap_or(fallback));
}

pub(super) fn next(route: &Route) {
    println!("next: {route}");
}

pub(super) fn user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("  id:   {}", user.id);
    println!("  role: {}", user.role.as_str());
    if let Some(picture) = &user.profile_picture {
        println!("  picture: {picture}");
    }
}

pub(super) fn courses(courses: &[Course], enrolled: impl Fn(&str) -> bool) {
    if courses.is_empty() {
        println!("No courses.");
        return;
    }
    for course in courses {
        let price = match &course.price {
            Some(price) if !course.is_free() => price.to_string(),
            _ => "free".to_string(),
        };
        let mark = if enrolled(&course.id) { "*" } else { " " };
        println!("{mark} {:<26} {:>8}  {}", course.id, price, course.title);
        if let Some(instructor) = &course.instructor {
            println!("  {:<26} by {instructor}", "");
        }
    }
}

pub(super) fn lectures(lectures: &[Lecture], video_url: impl Fn(&Lecture) -> Option<String>) {
    if lectures.is_empty() {
        println!("No lectures yet.");
        return;
    }
    for (index, lecture) in lectures.iter().enumerate() {
        println!("{:>3}. {} ({})", index + 1, lecture.title, lecture.id);
        if !lecture.description.is_empty() {
            println!("     {}", lecture.description);
        }
        if let Some(url) = video_url(lecture) {
            println!("     {url}");
        }
    }
}
