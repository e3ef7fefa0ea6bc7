use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    surveyscope::apps::init_logging();
    surveyscope::apps::run_filter_walkthrough(std::env::args().skip(1))
}
