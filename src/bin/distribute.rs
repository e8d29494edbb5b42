use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    yard_dispatch::cli::run_distribute(std::env::args().skip(1))
}
