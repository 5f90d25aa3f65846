use std::error::Error;
use std::fs;

use log::info;
use planar_truss::{Problem, Report};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // A JSON problem file may be passed as the only argument; otherwise the
    // built-in two-bar arch is solved.
    let problem = match std::env::args().nth(1) {
        Some(path) => {
            info!("reading problem from {path}");
            Problem::from_json(&fs::read_to_string(&path)?)?
        }
        None => Problem::two_bar_arch(2.0, 1.5, 1.0, 1.0),
    };

    let (mut truss, supports, loads) = problem.build()?;
    truss.solve(&supports, &loads)?;

    println!("{}", Report::new(&truss));
    Ok(())
}
