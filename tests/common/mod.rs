//! Builds synthetic binary dump streams for the reader tests.

#![allow(dead_code)]

use byteorder::{NativeEndian, WriteBytesExt};
use std::io::Write;

/// Everything written for one frame
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub timestep: i64,
    pub atom_count: i64,
    pub box_style: i32,
    pub boundaries: [[i32; 2]; 3],
    pub extents: [f64; 6],
    pub field_count: i32,
    pub blocks: Vec<Vec<f64>>,
}

impl RawFrame {
    /// An orthogonal, fully periodic frame with the given per-atom rows
    pub fn new(timestep: i64, field_count: usize, blocks: Vec<Vec<f64>>) -> Self {
        let values: usize = blocks.iter().map(Vec::len).sum();
        Self {
            timestep,
            atom_count: (values / field_count.max(1)) as i64,
            box_style: 0,
            boundaries: [[0, 0]; 3],
            extents: [0.0, 10.0, -5.0, 5.0, 1.0, 2.0],
            field_count: field_count as i32,
            blocks,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) {
        self.write_header(out, self.blocks.len() as i32);
        for block in &self.blocks {
            out.write_i32::<NativeEndian>(block.len() as i32).unwrap();
            for &value in block {
                out.write_f64::<NativeEndian>(value).unwrap();
            }
        }
    }

    /// Write everything up to and including the block count
    pub fn write_header<W: Write>(&self, out: &mut W, block_count: i32) {
        out.write_i64::<NativeEndian>(self.timestep).unwrap();
        out.write_i64::<NativeEndian>(self.atom_count).unwrap();
        out.write_i32::<NativeEndian>(self.box_style).unwrap();
        for axis in &self.boundaries {
            for &code in axis {
                out.write_i32::<NativeEndian>(code).unwrap();
            }
        }
        for &extent in &self.extents {
            out.write_f64::<NativeEndian>(extent).unwrap();
        }
        out.write_i32::<NativeEndian>(self.field_count).unwrap();
        out.write_i32::<NativeEndian>(block_count).unwrap();
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes);
        bytes
    }
}

/// Concatenate several frames into one stream
pub fn stream(frames: &[RawFrame]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for frame in frames {
        frame.write_to(&mut bytes);
    }
    bytes
}

/// Byte offset of the box extents inside a frame
pub const EXTENTS_OFFSET: usize = 8 + 8 + 4 + 6 * 4;
