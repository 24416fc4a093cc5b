/*
Geotag UAS imagery against GPX track logs exported from Mission Planner.

The pipeline loads every GPX file in the track directory, averages the
per-second duplicate fixes down to 1 Hz, matches each image's adjusted
EXIF capture time to the nearest fix, writes the tagging table, and hands
it to exiftool:
exiftool -csv=geotag.csv <image dir>
*/

use std::path::PathBuf;

use uastag::config::{
    Config, DEFAULT_MAX_OFFSET_S, DEFAULT_MAX_SPREAD_M, DEFAULT_SCAN_DEPTH,
};
use uastag::{consolidate, exiftool, images, match_images, table, track};

use argparse::{ArgumentParser, Store, StoreTrue};
fn main() {
    env_logger::init();

    let mut gpx_dir = String::new();
    let mut img_dir = String::new();
    let mut utc_offset: i64 = 0;
    let mut max_spread = DEFAULT_MAX_SPREAD_M;
    let mut max_offset = DEFAULT_MAX_OFFSET_S;
    let mut exts = "JPG,DNG".to_string();
    let mut nb_levels = DEFAULT_SCAN_DEPTH;
    let mut output = String::new();
    let mut table_only = false;

    { // this block limits scope of borrows by ap.refer() method
        let mut ap = ArgumentParser::new();
        ap.set_description("Geotag UAS images by matching EXIF capture times to GPX track logs");
        ap.refer(&mut gpx_dir)
            .add_option(&["-g", "--gpx-directory"], Store, "Directory holding the GPX track logs")
            .required();
        ap.refer(&mut img_dir)
            .add_option(&["-d", "--directory"], Store, "Directory holding the images to geotag")
            .required();
        ap.refer(&mut utc_offset)
            .add_option(&["-u", "--utc-offset"], Store, "Camera to UTC adjustment in seconds (default 0)");
        ap.refer(&mut max_spread)
            .add_option(&["-s", "--max-spread"], Store, "Maximum same-second track divergence in meters (default 25)");
        ap.refer(&mut max_offset)
            .add_option(&["-m", "--max-offset"], Store, "Maximum accepted image-to-track time offset in seconds (default 10)");
        ap.refer(&mut exts)
            .add_option(&["-e", "--exts"], Store, "Case sensitive image extension(s) separated by commas (default JPG,DNG)");
        ap.refer(&mut nb_levels)
            .add_option(&["-n", "--nb-levels"], Store, "Number of levels to recurse during the image directory search (default 1)");
        ap.refer(&mut output)
            .add_option(&["-o", "--output"], Store, "Tagging table path (default <image dir>/geotag.csv)");
        ap.refer(&mut table_only)
            .add_option(&["--table-only"], StoreTrue, "Write the tagging table but do not run exiftool");
        ap.parse_args_or_exit();
    }

    let mut cfg = Config::new(&gpx_dir, &img_dir);
    cfg.utc_offset_s = utc_offset;
    cfg.max_spread_m = max_spread;
    cfg.max_offset_s = max_offset;
    cfg.image_exts = exts.split(',').map(str::to_string).collect();
    cfg.scan_depth = nb_levels;
    let output = if output.is_empty() {
        cfg.image_dir.join("geotag.csv")
    } else {
        PathBuf::from(output)
    };

    if let Err(e) = run(&cfg, &output, table_only) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cfg: &Config, output: &std::path::Path, table_only: bool) -> uastag::Result<()> {
    let samples = track::load_track_dir(&cfg.track_dir)?;
    let fixes = consolidate(&samples, cfg.max_spread_m)?;
    let (records, skipped) =
        images::load_images(&cfg.image_dir, &cfg.image_exts, cfg.scan_depth, cfg.utc_offset_s)?;
    let results = match_images(&records, &fixes, cfg.max_offset_s);

    table::write_table(output, &results)?;
    println!("Wrote tagging table {}", output.display());

    if table_only {
        println!("Skipping exiftool (--table-only)");
    } else {
        exiftool::write_tags(output, &cfg.image_dir, exiftool::DEFAULT_TIMEOUT)?;
    }

    // fixes are sorted by time; image records are sorted by path
    if let (Some(first), Some(last)) = (fixes.first(), fixes.last()) {
        println!("Track time range:    {} to {}", first.time, last.time);
    } else {
        println!("Track time range:    (no track data)");
    }
    let capture_range = (
        records.iter().map(|r| r.capture_time).min(),
        records.iter().map(|r| r.capture_time).max(),
    );
    if let (Some(min), Some(max)) = capture_range {
        println!("Image time range:    {} to {}", min, max);
        println!(
            "Adjusted time range: {} to {}",
            min + chrono::Duration::seconds(cfg.utc_offset_s),
            max + chrono::Duration::seconds(cfg.utc_offset_s)
        );
    } else {
        println!("Image time range:    (no images)");
    }
    let matched = results.iter().filter(|r| r.accepted).count();
    println!("Matched {} of {} images", matched, results.len());
    if skipped > 0 {
        println!("Skipped {} image(s) without an EXIF capture time", skipped);
    }
    Ok(())
}
