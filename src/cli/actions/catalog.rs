use crate::{
    app::App,
    cli::{actions::output, globals::GlobalArgs},
    client::Upload,
    features::courses::{Course, NewCourse},
    routes::Route,
};
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

#[derive(Debug)]
pub enum Args {
    Courses,
    MyCourses,
    Enroll {
        course_id: String,
    },
    Lectures {
        course_id: String,
    },
    AddLecture {
        course_id: String,
        title: String,
        description: String,
        video: PathBuf,
        mime: Option<String>,
    },
    DeleteLecture {
        lecture_id: String,
        course_id: String,
        confirmed: bool,
    },
    CreateCourse {
        title: String,
        category: String,
        description: String,
        price: String,
        instructor: String,
        image: Option<PathBuf>,
        mime: Option<String>,
    },
    DeleteCourse {
        course_id: String,
        confirmed: bool,
    },
}

/// # Errors
/// Returns access denials and backend errors.
pub async fn execute(globals: &GlobalArgs, args: Args) -> Result<()> {
    let app = globals.app()?;

    match args {
        Args::Courses => {
            app.session.fetch_current_user().await;
            let (all, ()) = tokio::join!(
                app.catalog.fetch_all_courses(),
                app.catalog.fetch_my_courses()
            );
            all?;
            output::courses(&app.catalog.snapshot().courses, |id| {
                app.catalog.is_enrolled(id)
            });
        }
        Args::MyCourses => {
            output::require(&app, &Route::MyCourses).await?;
            app.catalog.fetch_my_courses().await;
            output::courses(&app.catalog.snapshot().my_courses, |_| true);
        }
        Args::Enroll { course_id } => {
            app.session.fetch_current_user().await;
            let course = find_course(&app, &course_id).await?;
            let route = app.catalog.handle_enroll(&course).await?;
            match &route {
                Route::Login => println!("Please log in to enroll."),
                Route::Payment(id) => println!(
                    "{} costs {} {}. Pay with: coursehub checkout {id} --payment-method <id>",
                    course.title,
                    course.price.as_ref().map(ToString::to_string).unwrap_or_default(),
                    app.config.currency.to_uppercase()
                ),
                _ => println!("You have access to {}.", course.title),
            }
            output::next(&route);
        }
        Args::Lectures { course_id } => {
            output::require(&app, &Route::Lectures(course_id.clone())).await?;
            app.catalog.fetch_my_courses().await;
            if !app.catalog.is_enrolled(&course_id) {
                output::next(&Route::Courses);
                bail!("You are not enrolled in this course.");
            }
            let lectures = app.lectures.fetch_lectures(&course_id).await?;
            output::lectures(&lectures, |lecture| app.lectures.video_url(lecture));
        }
        Args::AddLecture {
            course_id,
            title,
            description,
            video,
            mime,
        } => {
            output::require(&app, &Route::Admin).await?;
            let video = Upload::from_path(&video, mime.as_deref())?;
            let message = app
                .lectures
                .add_lecture(&course_id, &title, &description, video)
                .await?;
            output::message(message, "Lecture added.");
            println!("{} lecture(s) in course.", app.lectures.snapshot().lectures.len());
        }
        Args::DeleteLecture {
            lecture_id,
            course_id,
            confirmed,
        } => {
            if !confirmed {
                bail!("Deleting a lecture cannot be undone. Re-run with --yes to confirm.");
            }
            output::require(&app, &Route::Admin).await?;
            let message = app.lectures.delete_lecture(&lecture_id, &course_id).await?;
            output::message(message, "Lecture deleted.");
        }
        Args::CreateCourse {
            title,
            category,
            description,
            price,
            instructor,
            image,
            mime,
        } => {
            output::require(&app, &Route::Admin).await?;
            let image = image
                .map(|path| Upload::from_path(&path, mime.as_deref()))
                .transpose()?;
            let message = app
                .catalog
                .create_course(NewCourse {
                    title,
                    category,
                    description,
                    price,
                    instructor_name: instructor,
                    image,
                })
                .await?;
            output::message(message, "Course created successfully!");
            println!("{} course(s) in catalog.", app.catalog.snapshot().courses.len());
        }
        Args::DeleteCourse {
            course_id,
            confirmed,
        } => {
            if !confirmed {
                bail!(
                    "Deleting a course removes all of its lectures. Re-run with --yes to confirm."
                );
            }
            output::require(&app, &Route::Admin).await?;
            let message = app.catalog.delete_course(&course_id).await?;
            output::message(message, "Course deleted!");
        }
    }

    Ok(())
}

async fn find_course(app: &App, course_id: &str) -> Result<Course> {
    app.catalog.fetch_all_courses().await?;
    app.catalog
        .course(course_id)
        .ok_or_else(|| anyhow!("Course not found: {course_id}"))
}
