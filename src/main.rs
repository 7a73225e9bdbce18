use std::process::exit;

fn main() {
    exit(stdb_gdgen::run_cli(std::env::args().collect()));
}
