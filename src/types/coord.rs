use serde_derive::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Coord3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Coord3 { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ICoord3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ICoord3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        ICoord3 { x, y, z }
    }
}

// An axis-aligned box, `lo` corner then `hi` corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Region3 {
    pub lo: Coord3,
    pub hi: Coord3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IRegion3 {
    pub lo: ICoord3,
    pub hi: ICoord3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RealRange {
    pub lo: f32,
    pub hi: f32,
}

impl RealRange {
    pub fn contains(&self, value: f32) -> bool {
        self.lo <= value && value <= self.hi
    }
}

/// A 3x4 affine transform, stored and transferred row by row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix3 {
    pub rows: [[f32; 4]; 3],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Matrix3 {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }
}

impl crate::transfer::Transferable for Matrix3 {
    fn transfer<S: crate::transfer::TransferSink>(
        &mut self,
        xfer: &mut crate::transfer::Transfer<S>,
    ) -> crate::error::Result<()> {
        for row in self.rows.iter_mut() {
            for cell in row.iter_mut() {
                xfer.transfer_f32(cell)?;
            }
        }
        Ok(())
    }
}

transfer_fields!(Coord3 { x, y, z });
transfer_fields!(ICoord3 { x, y, z });
transfer_fields!(Region3 { lo, hi });
transfer_fields!(IRegion3 { lo, hi });
transfer_fields!(RealRange { lo, hi });
