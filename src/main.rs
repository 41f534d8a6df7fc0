//! # lmpbin CLI Tool
//!
//! Reads every frame of a binary dump and reports decoding throughput.

use clap::Parser;
use lmpbin::{DumpReaderBuilder, ErrorCode, Property};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lmpbin", about = "Decode a LAMMPS binary dump trajectory")]
struct Cli {
    /// Binary dump file
    input: PathBuf,

    /// Per-atom columns, in the order the dump was written
    #[arg(short, long, value_delimiter = ',', default_value = "id,type,x,y,z")]
    fields: Vec<Property>,

    /// Memory-map the file instead of buffered reads
    #[arg(long)]
    mmap: bool,

    /// Print each decoded timestep
    #[arg(short, long)]
    print_timesteps: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start_time = Instant::now();

    let mut reader = DumpReaderBuilder::new(&cli.input)
        .properties(cli.fields)
        .memory_map(cli.mmap)
        .build();

    let fields: Vec<String> = reader.properties().iter().map(|p| p.to_string()).collect();
    println!("Fields: {}", fields.join(" "));

    let mut atoms = 0u64;
    for frame_result in &mut reader {
        match frame_result {
            Ok(frame) => {
                atoms += frame.atom_count;
                if cli.print_timesteps {
                    println!("{}", frame.timestep);
                }
            }
            Err(e) if e.code() == ErrorCode::FileError => {
                eprintln!("File error: {} (will continue with what we had)", e);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let frames = reader.frames_read();
    let elapsed = start_time.elapsed();
    println!("Read {} frames ({} atoms) in {:.2?}", frames, atoms, elapsed);
    println!(
        "Performance: {:.1} frames/sec",
        frames as f64 / elapsed.as_secs_f64()
    );

    ExitCode::SUCCESS
}
