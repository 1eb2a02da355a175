use atmos_core::{
    AtmosConfig, AtmosSimulation, CellId, Direction, GasPump, Scrubber, Species, TileLayout,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Headless atmospherics demo: two rooms, a wall pump and an optional hull breach
#[derive(Parser, Debug)]
#[command(name = "atmos-demo")]
#[command(about = "Tile-based gas simulation demo", long_about = None)]
struct Args {
    /// Map width in tiles
    #[arg(long, default_value_t = 12)]
    width: u32,

    /// Map height in tiles
    #[arg(long, default_value_t = 8)]
    height: u32,

    /// Simulated duration in seconds
    #[arg(short, long, default_value_t = 30.0)]
    duration: f32,

    /// Plasma released at a random tile of the west room (mol)
    #[arg(short, long, default_value_t = 50.0)]
    plasma: f32,

    /// Open a vacuum breach in the east room's corner
    #[arg(short, long)]
    breach: bool,

    /// Pump target pressure in kPa (0 = no pump)
    #[arg(long, default_value_t = 150.0)]
    pump_target: f32,

    /// Seed for the leak position
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 2.0)]
    report_interval: f32,

    /// Write the final tile snapshot to this JSON file
    #[arg(long)]
    snapshot: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), atmos_core::AtmosError> {
    println!("=== Atmospherics Demo ===\n");

    let width = args.width.max(3);
    let height = args.height.max(1);
    let layout = TileLayout::rectangular(width, height);
    let wall_x = (width / 2) as i32;

    let mut sim = AtmosSimulation::from_layout(AtmosConfig::default(), &layout)?
        .with_pipe_layout(&TileLayout::rectangular(width, 1))?;
    sim.fill_with_air();

    // Dividing wall down the middle, the pump sits in its lowest tile
    let mut pump_tile = None;
    for y in 0..height as i32 {
        if let Some(id) = layout.cell_at(wall_x, y) {
            sim.set_blocked(id, true)?;
            pump_tile.get_or_insert(id);
        }
    }
    println!(
        "Created {}x{} tiles with a wall at x={} and {} pipe segments",
        width,
        height,
        wall_x,
        sim.pipes().len()
    );

    if let (Some(tile), true) = (pump_tile, args.pump_target > 0.0) {
        let pump = GasPump::facing(Direction::West, Direction::East, args.pump_target)
            .named("wall pump");
        sim.attach_device(Box::new(pump), tile)?;
        println!("Wall pump pushing east up to {:.0} kPa", args.pump_target);
    }

    // Scrubber in the east room's south-east corner, venting into the last pipe
    let corner = layout.cell_at(width as i32 - 1, 0).unwrap_or(CellId::new(0));
    let outlet = CellId::new(sim.pipes().len().saturating_sub(1));
    sim.attach_device(
        Box::new(Scrubber::new(corner, outlet, &[Species::Plasma, Species::CarbonDioxide]).wide()),
        corner,
    )?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let leak_x = rng.random_range(0..wall_x.max(1));
    let leak_y = rng.random_range(0..height as i32);
    if let Some(leak) = layout.cell_at(leak_x, leak_y) {
        sim.add_gas(leak, Species::Plasma, args.plasma)?;
        println!("Plasma leak of {:.1} mol at ({}, {})", args.plasma, leak_x, leak_y);
    }

    if args.breach {
        if let Some(hole) = layout.cell_at(width as i32 - 1, height as i32 - 1) {
            sim.set_vacuum(hole)?;
            println!("Hull breach at ({}, {})", width - 1, height - 1);
        }
    }

    sim.initialize()?;

    println!("\nTime(s) | Active | Pipes | Wind | Moles    | Mean kPa | Max kPa | Pipe mol | Breaches");
    println!("--------|--------|-------|------|----------|----------|---------|----------|---------");

    let frame = 1.0 / 60.0;
    let mut time = 0.0;
    let mut next_report = 0.0;
    let mut last_active = 0;
    let mut last_pipes = 0;
    let mut last_wind = 0;
    let mut breaches = 0;

    while time < args.duration {
        for report in sim.update(frame) {
            last_active = report.active_cells;
            last_pipes = report.active_pipes;
            last_wind = report.wind_pushes.len();
            breaches += report.breaches.len() + report.pipe_breaches.len();
        }
        time += frame;

        if time >= next_report {
            let stats = sim.stats();
            println!(
                "{:7.1} | {:6} | {:5} | {:4} | {:8.2} | {:8.2} | {:7.2} | {:8.2} | {:8}",
                time,
                last_active,
                last_pipes,
                last_wind,
                stats.total_moles,
                stats.mean_pressure,
                stats.max_pressure,
                sim.pipe_stats().total_moles,
                breaches
            );
            next_report += args.report_interval;
        }
    }

    let stats = sim.stats();
    println!("\n=== Final State ===");
    println!("Ticks: {}", sim.tick());
    println!(
        "Tiles: {} active, {} semi-active, {} inactive, {} vacuum, {} walls",
        stats.active, stats.semi_active, stats.inactive, stats.vacuum, stats.blocked
    );
    println!("Gas on tiles: {:.2} mol ({:.1} g)", stats.total_moles, stats.total_mass);
    println!("Gas in pipes: {:.2} mol", sim.pipe_stats().total_moles);

    if let Some(path) = &args.snapshot {
        sim.tiles().snapshot().save(path)?;
        info!("Snapshot written to {path}");
    }
    Ok(())
}
