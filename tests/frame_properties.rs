mod common;

use common::RawFrame;
use lmpbin::{DVec3, DumpReader, ErrorCode, IVec3, Property, VectorQuantity, VectorTriggers};
use proptest::prelude::*;
use std::io::Cursor;

const ALL: [Property; 26] = [
    Property::Id,
    Property::Type,
    Property::Mol,
    Property::Mass,
    Property::Q,
    Property::X,
    Property::Y,
    Property::Z,
    Property::Xs,
    Property::Ys,
    Property::Zs,
    Property::Xu,
    Property::Yu,
    Property::Zu,
    Property::Xsu,
    Property::Ysu,
    Property::Zsu,
    Property::Ix,
    Property::Iy,
    Property::Iz,
    Property::Vx,
    Property::Vy,
    Property::Vz,
    Property::Fx,
    Property::Fy,
    Property::Fz,
];

fn property() -> impl Strategy<Value = Property> {
    proptest::sample::select(ALL.to_vec())
}

/// Split the atoms in `values` into consecutive blocks at the given cut points
fn split(values: &[f64], fields: usize, cuts: &[usize]) -> Vec<Vec<f64>> {
    let atoms = values.len() / fields;
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (atoms + 1)).collect();
    points.push(0);
    points.push(atoms);
    points.sort_unstable();

    points
        .windows(2)
        .map(|w| values[w[0] * fields..w[1] * fields].to_vec())
        .collect()
}

/// What the reader should produce for one atom row
fn expected_vector(properties: &[Property], row: &[f64], quantity: VectorQuantity) -> [f64; 3] {
    let mut vector = [0.0; 3];
    for (&p, &value) in properties.iter().zip(row) {
        if p.vector() == Some(quantity) {
            vector[axis_of(p)] = value;
        }
    }
    vector
}

fn axis_of(p: Property) -> usize {
    match p {
        Property::X | Property::Xs | Property::Xu | Property::Xsu => 0,
        Property::Y | Property::Ys | Property::Yu | Property::Ysu => 1,
        Property::Z | Property::Zs | Property::Zu | Property::Zsu => 2,
        Property::Ix | Property::Vx | Property::Fx => 0,
        Property::Iy | Property::Vy | Property::Fy => 1,
        Property::Iz | Property::Vz | Property::Fz => 2,
        _ => unreachable!("scalar property"),
    }
}

proptest! {
    #[test]
    fn trigger_is_last_component(order in proptest::collection::vec(property(), 0..40)) {
        let triggers = VectorTriggers::resolve(&order);
        for quantity in VectorQuantity::ALL {
            let last = order.iter().rev().find(|p| p.vector() == Some(quantity)).copied();
            prop_assert_eq!(triggers.get(quantity), last);
        }
    }

    #[test]
    fn round_trip(
        order in proptest::collection::vec(property(), 1..12),
        atoms in 0usize..20,
        cuts in proptest::collection::vec(any::<usize>(), 0..4),
        timestep in any::<u32>(),
        seed in any::<u32>(),
    ) {
        let fields = order.len();
        // Small integers survive the integer columns and image-flag truncation.
        let values: Vec<f64> = (0..atoms * fields)
            .map(|i| ((i as u64 * 31 + seed as u64) % 97) as f64 - 48.0)
            .collect();
        let raw = RawFrame::new(timestep as i64, fields, split(&values, fields, &cuts));

        let frame = DumpReader::new(Cursor::new(raw.to_bytes()), order.clone()).decode_frame();
        prop_assert_eq!(frame.error, ErrorCode::NoError);
        prop_assert_eq!(frame.timestep, timestep as u64);
        prop_assert_eq!(frame.atom_count, atoms as u64);
        prop_assert_eq!(frame.box_low, [raw.extents[0], raw.extents[2], raw.extents[4]]);
        prop_assert_eq!(frame.box_high, [raw.extents[1], raw.extents[3], raw.extents[5]]);

        for &p in &order {
            prop_assert_eq!(frame.column_len(p), atoms);
        }

        for (atom, row) in values.chunks_exact(fields).enumerate() {
            for quantity in VectorQuantity::ALL {
                if VectorTriggers::resolve(&order).get(quantity).is_none() {
                    continue;
                }
                let v = expected_vector(&order, row, quantity);
                match quantity {
                    VectorQuantity::ImageFlags => prop_assert_eq!(
                        frame.image_flags[atom],
                        IVec3::new(v[0] as i32, v[1] as i32, v[2] as i32)
                    ),
                    _ => prop_assert_eq!(
                        frame.vectors(quantity).unwrap()[atom],
                        DVec3::from_array(v)
                    ),
                }
            }
        }
    }

    #[test]
    fn block_size_off_by_one_is_corrupt(extra in 1usize..4) {
        let order = vec![Property::Id, Property::Type, Property::X, Property::Y, Property::Z];
        let fields = order.len();
        let block = vec![0.0; fields * 2 + (extra % fields)];
        let raw = RawFrame::new(0, fields, vec![block]);

        let frame = DumpReader::new(Cursor::new(raw.to_bytes()), order).decode_frame();
        prop_assert_eq!(frame.error, ErrorCode::BlockSizeCorrupt);
    }
}
