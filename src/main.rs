use chargefield::{SimConfig, SimulationContext};
use std::f64::consts::PI;

const FRAME: f64 = 1.0 / 60.0;
const MAX_FRAMES: usize = 100_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Optional path to a JSON config; defaults to the classroom scene.
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut sim = SimulationContext::new(&config, 0.0)?;
    let start = *sim.particle().position();
    let speed0 = sim.particle().speed();

    // One cyclotron period, T = 2π m / |q B|
    let qb = (config.charge * config.field_magnitude).abs();
    let period = if qb > 0.0 { 2.0 * PI * config.mass / qb } else { f64::INFINITY };

    let mut frames = 0;
    while sim.clock().sim_time() < period && frames < MAX_FRAMES {
        frames += 1;
        sim.tick(frames as f64 * FRAME);
    }

    let p = sim.particle();
    println!("scheme = {}", sim.integrator().scheme().id());
    println!("frames = {}, sim t = {:.3e} s (T = {:.3e} s)", frames, sim.clock().sim_time(), period);
    println!("state = [x,y,z,vx,vy,vz] = {:?}", p.state_array());
    println!("speed drift = {:.3e}", (p.speed() - speed0) / speed0);
    println!("closure error = {:.3e} m", (p.position() - start).norm());
    println!("trail samples = {}", sim.trail().len());
    Ok(())
}
