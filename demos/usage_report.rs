use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tally::example_apps::run_usage_report(std::env::args().skip(1))
}
