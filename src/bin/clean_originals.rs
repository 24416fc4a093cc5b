/*
Remove the "*_original" backup files exiftool leaves behind after a
geotag run.
*/

use std::path::Path;

use uastag::exiftool::remove_backups;

use argparse::{ArgumentParser, Store};
fn main() {
    env_logger::init();

    let mut indir = ".".to_string();
    { // this block limits scope of borrows by ap.refer() method
        let mut ap = ArgumentParser::new();
        ap.set_description("Remove *_original backup files left by exiftool after geotagging");
        ap.refer(&mut indir)
            .add_option(&["-d", "--directory"], Store, "Directory with image files or directories of images (default .)");
        ap.parse_args_or_exit();
    }

    match remove_backups(Path::new(&indir)) {
        Ok(n) => println!("Deleted {} files.", n),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
