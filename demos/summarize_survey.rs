use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    surveyscope::apps::init_logging();
    surveyscope::apps::run_summarize(std::env::args().skip(1))
}
