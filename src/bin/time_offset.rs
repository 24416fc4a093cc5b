/*
Build a worksheet for deriving the camera-to-UTC time offset.

Loops through a directory of time-sync images and writes
cameratimeoffset.csv with one row per image holding the EXIF camera
time. The true UTC time (read from the image content, e.g. a
photographed GPS clock) is filled in by hand in a separate viewer.
*/

use std::path::Path;

use log::warn;
use serde::Serialize;
use uastag::images::{read_capture_time, scan_images};

const FTYPES: [&str; 1] = ["JPG"];

#[derive(Debug, Serialize)]
struct WorksheetRow {
    #[serde(rename = "IMAGENAME")]
    image_name: String,
    #[serde(rename = "CAMERATIME")]
    camera_time: String,
    #[serde(rename = "UTCTIME")]
    utc_time: String,
    #[serde(rename = "IMAGE_TO_UTC_OFFSET")]
    offset: String,
}

use argparse::{ArgumentParser, Store};
fn main() {
    env_logger::init();

    let mut indir = String::new();
    { // this block limits scope of borrows by ap.refer() method
        let mut ap = ArgumentParser::new();
        ap.set_description("Write a camera-to-UTC offset worksheet for a directory of time sync images");
        ap.refer(&mut indir)
            .add_option(&["-d", "--directory"], Store, "Input directory with time sync images")
            .required();
        ap.parse_args_or_exit();
    }

    if let Err(e) = run(Path::new(&indir)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(indir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let exts: Vec<String> = FTYPES.iter().map(|s| s.to_string()).collect();
    let paths = scan_images(indir, &exts, 1)?;

    let out_path = indir.join("cameratimeoffset.csv");
    let mut wtr = csv::Writer::from_path(&out_path)?;
    let mut rows = 0usize;
    for path in paths {
        // worksheet rows are useless without the camera time
        let camera_time = match read_capture_time(&path) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping: {}", e);
                continue;
            }
        };
        wtr.serialize(WorksheetRow {
            image_name: path.display().to_string(),
            camera_time: camera_time.to_string(),
            utc_time: String::new(),
            offset: String::new(),
        })?;
        rows += 1;
    }
    wtr.flush()?;
    println!("Wrote {} row(s) to {}", rows, out_path.display());
    Ok(())
}
