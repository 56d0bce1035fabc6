extern crate log;
extern crate pretty_env_logger;

use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{arg, command, Command};
use image::DynamicImage;

use sheet_grader::debug::ImageDebugWriter;
use sheet_grader::interpret::{grade_sheets, Options};

fn main() {
    pretty_env_logger::init_custom_env("LOG");

    let matches = cli().get_matches();
    let debug = matches.get_flag("debug");
    let json = matches.get_flag("json");
    let teacher_path = matches
        .get_one::<String>("teacher_path")
        .expect("teacher image path is required");
    let student_path = matches
        .get_one::<String>("student_path")
        .expect("student image path is required");
    let output_path = matches
        .get_one::<String>("output")
        .expect("output path has a default");

    let mut options = Options::default();
    if let Some(threshold) = matches.get_one::<f32>("threshold") {
        options.score_threshold = *threshold;
    }

    let (teacher_image, student_image) =
        match load_sheet_images(Path::new(teacher_path), Path::new(student_path)) {
            Ok(images) => images,
            Err(e) => {
                eprintln!("Error: {:?}", e);
                exit(1);
            }
        };

    let teacher_debug = if debug {
        ImageDebugWriter::new(PathBuf::from(teacher_path))
    } else {
        ImageDebugWriter::disabled()
    };
    let student_debug = if debug {
        ImageDebugWriter::new(PathBuf::from(student_path))
    } else {
        ImageDebugWriter::disabled()
    };

    let graded = grade_sheets(
        &teacher_image,
        &student_image,
        &options,
        &teacher_debug,
        &student_debug,
    );

    if let Err(e) = graded.annotated.save(output_path) {
        eprintln!("Error saving graded image {}: {}", output_path, e);
        exit(1);
    }

    if json {
        let summary = graded.score.summary();
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).expect("grade summary serializes")
        );
    } else {
        println!("{} correct", graded.score.score_text());
    }
}

#[derive(Debug)]
enum LoadSheetImagesError {
    ImageOpenError(PathBuf),
}

/// Load the answer-key and student sheet photographs.
fn load_sheet_images(
    teacher_path: &Path,
    student_path: &Path,
) -> Result<(DynamicImage, DynamicImage), LoadSheetImagesError> {
    let (teacher_result, student_result) = rayon::join(
        || load_sheet_image(teacher_path),
        || load_sheet_image(student_path),
    );
    Ok((teacher_result?, student_result?))
}

fn load_sheet_image(image_path: &Path) -> Result<DynamicImage, LoadSheetImagesError> {
    image::open(image_path)
        .map_err(|_| LoadSheetImagesError::ImageOpenError(image_path.to_path_buf()))
}

fn cli() -> Command {
    command!()
        .arg(
            arg!(-o --output <PATH> "Path for the annotated graded image")
                .default_value("graded.png"),
        )
        .arg(
            arg!(--threshold <PIXELS> "Match distance threshold for the numeric score")
                .value_parser(clap::value_parser!(f32)),
        )
        .arg(arg!(--json "Print the grading summary as JSON"))
        .arg(arg!(-d --debug "Write intermediate debug images next to the inputs"))
        .arg(arg!(teacher_path: <TEACHER_IMAGE> "Path to the answer-key sheet photo").required(true))
        .arg(arg!(student_path: <STUDENT_IMAGE> "Path to the student sheet photo").required(true))
}
