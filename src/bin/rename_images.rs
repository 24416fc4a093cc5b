/*
Rename UAS imagery with a flight prefix and the UTC capture date/time
from EXIF, e.g. DSC01234.JPG becomes F02_20181107T180122Z_DSC01234.JPG.

Shows a sample rename and asks for confirmation before touching
anything. With --sepdir the renamed files are then separated into one
subdirectory per extension.
*/

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use uastag::images::read_capture_time;

const FTYPES: [&str; 2] = ["JPG", "DNG"];

fn new_image_name(name: &str, capture: NaiveDateTime, utc_offset_h: i64, flight: u32) -> String {
    let utc = capture + Duration::hours(utc_offset_h);
    format!("F{:02}_{}_{}", flight, utc.format("%Y%m%dT%H%M%SZ"), name)
}

/// Files in `dir` (not recursive) with exactly this extension, sorted.
fn files_with_ext(dir: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(std::ffi::OsStr::to_str) == Some(ext))
        .collect();
    files.sort();
    Ok(files)
}

fn user_prompt(question: &str) -> bool {
    let stdin = io::stdin();
    loop {
        print!("{} [y/n]: ", question);
        io::stdout().flush().expect("flush stdout");
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() {
            return false;
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" => return false,
            _ => println!("Please use y/n or yes/no."),
        }
    }
}

use argparse::{ArgumentParser, Store, StoreTrue};
fn main() {
    env_logger::init();

    let mut indir = String::new();
    let mut flight: u32 = 0;
    let mut utc_offset: i64 = 0;
    let mut sepdir = false;

    { // this block limits scope of borrows by ap.refer() method
        let mut ap = ArgumentParser::new();
        ap.set_description("Rename images collected with a UAS camera");
        ap.refer(&mut indir)
            .add_option(&["-d", "--directory"], Store, "Input directory with images")
            .required();
        ap.refer(&mut flight)
            .add_option(&["-f", "--flight-number"], Store, "Flight number")
            .required();
        ap.refer(&mut utc_offset)
            .add_option(&["-u", "--utc-offset"], Store, "Image time zone to UTC offset in hours (example: PST to UTC = 8)")
            .required();
        ap.refer(&mut sepdir)
            .add_option(&["--sepdir"], StoreTrue, "Separate raw and jpg into per-extension subdirectories");
        ap.parse_args_or_exit();
    }

    if let Err(e) = run(Path::new(&indir), flight, utc_offset, sepdir) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    indir: &Path,
    flight: u32,
    utc_offset: i64,
    sepdir: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // show one sample rename before asking to proceed
    let sample = files_with_ext(indir, FTYPES[0])?
        .into_iter()
        .next()
        .ok_or_else(|| format!("no .{} files in {}", FTYPES[0], indir.display()))?;
    let name = sample.file_name().and_then(std::ffi::OsStr::to_str).unwrap_or_default();
    let capture = read_capture_time(&sample)?;
    println!("Image {} has time stamp: {}", name, capture);
    println!(
        "Image {} will be renamed to: {}\n",
        name,
        new_image_name(name, capture, utc_offset, flight)
    );

    if !user_prompt("Do you want to rename this and all images in this directory following this pattern?") {
        println!("Terminating script.");
        return Ok(());
    }

    let mut renamed = 0usize;
    for ftype in FTYPES {
        for path in files_with_ext(indir, ftype)? {
            let name = path.file_name().and_then(std::ffi::OsStr::to_str).unwrap_or_default();
            let capture = read_capture_time(&path)?;
            let new_name = new_image_name(name, capture, utc_offset, flight);
            fs::rename(&path, path.with_file_name(&new_name))?;
            renamed += 1;
        }
    }
    println!("Renamed {} files.", renamed);

    if sepdir {
        for ftype in FTYPES {
            let subdir = indir.join(ftype.to_ascii_lowercase());
            fs::create_dir_all(&subdir)?;
            for path in files_with_ext(indir, ftype)? {
                let name = path.file_name().expect("file has a name").to_owned();
                fs::rename(&path, subdir.join(name))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_new_image_name_format() {
        let capture = NaiveDate::from_ymd_opt(2018, 11, 7)
            .unwrap()
            .and_hms_opt(10, 1, 22)
            .unwrap();
        // PST camera clock, 8 hours behind UTC
        assert_eq!(
            new_image_name("DSC01234.JPG", capture, 8, 2),
            "F02_20181107T180122Z_DSC01234.JPG"
        );
    }

    #[test]
    fn test_new_image_name_rolls_over_midnight() {
        let capture = NaiveDate::from_ymd_opt(2018, 11, 7)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        assert_eq!(
            new_image_name("a.DNG", capture, 1, 12),
            "F12_20181108T003000Z_a.DNG"
        );
    }
}
