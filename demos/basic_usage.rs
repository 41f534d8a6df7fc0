use lmpbin::{DumpReader, Property};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .expect("Usage: cargo run --example basic_usage <dump.bin>");
    let properties = vec![Property::Id, Property::Type, Property::X, Property::Y, Property::Z];
    let mut reader = DumpReader::open(&path, properties);

    // Count atoms in the upper half of each frame's box along z
    let mut frame_count = 0;
    let mut atoms_in_top_half = 0;

    while let Some(frame) = reader.read_next()? {
        frame_count += 1;

        let mid_z = 0.5 * (frame.box_low[2] + frame.box_high[2]);
        atoms_in_top_half += frame.positions.iter().filter(|pos| pos.z > mid_z).count();
    }

    println!("Read {} frames", frame_count);
    if frame_count > 0 {
        let avg_top_half = atoms_in_top_half as f64 / frame_count as f64;
        println!("Average atoms in top half: {:.1}", avg_top_half);
    }

    Ok(())
}
