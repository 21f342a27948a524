use super::account::confirm_arg;
use clap::{Arg, Command};
use std::path::PathBuf;

pub fn with_args(command: Command) -> Command {
    command
        .subcommand(Command::new("courses").about("List every course"))
        .subcommand(Command::new("my-courses").about("List the courses you are enrolled in"))
        .subcommand(
            Command::new("enroll")
                .about("Enroll in a course; paid courses start checkout")
                .arg(course_arg()),
        )
        .subcommand(
            Command::new("lectures")
                .about("List a course's lectures")
                .arg(course_arg()),
        )
        .subcommand(
            Command::new("add-lecture")
                .about("Upload a lecture video (admin)")
                .arg(course_arg())
                .arg(Arg::new("title").long("title").help("Lecture title").required(true))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .help("Lecture description")
                        .default_value(""),
                )
                .arg(
                    Arg::new("video")
                        .long("video")
                        .help("Video file to upload")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("mime")
                        .long("mime")
                        .help("MIME type of the video, e.g. video/mp4"),
                ),
        )
        .subcommand(
            Command::new("delete-lecture")
                .about("Delete a lecture (admin)")
                .arg(Arg::new("lecture").help("Lecture id").required(true))
                .arg(
                    Arg::new("course")
                        .long("course")
                        .help("Course the lecture belongs to")
                        .required(true),
                )
                .arg(confirm_arg()),
        )
        .subcommand(
            Command::new("create-course")
                .about("Create a course (admin)")
                .arg(Arg::new("title").long("title").help("Course title").required(true))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Course category")
                        .required(true),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .help("Course description")
                        .required(true),
                )
                .arg(
                    Arg::new("price")
                        .long("price")
                        .help("Price, 0 for a free course")
                        .required(true),
                )
                .arg(
                    Arg::new("instructor")
                        .long("instructor")
                        .help("Instructor display name")
                        .required(true),
                )
                .arg(
                    Arg::new("image")
                        .long("image")
                        .help("Cover image to upload")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("mime")
                        .long("mime")
                        .help("MIME type of the image, e.g. image/png"),
                ),
        )
        .subcommand(
            Command::new("delete-course")
                .about("Delete a course and all of its lectures (admin)")
                .arg(course_arg())
                .arg(confirm_arg()),
        )
}

fn course_arg() -> Arg {
    Arg::new("course").help("Course id").required(true)
}
