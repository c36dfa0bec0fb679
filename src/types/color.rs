use serde_derive::{Deserialize, Serialize};

/// A packed `0xAARRGGBB` color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

impl crate::transfer::Transferable for Color {
    fn transfer<S: crate::transfer::TransferSink>(
        &mut self,
        xfer: &mut crate::transfer::Transfer<S>,
    ) -> crate::error::Result<()> {
        xfer.transfer_u32(&mut self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RgbaColorReal {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbaColorInt {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

transfer_fields!(RgbColor { r, g, b });
transfer_fields!(RgbaColorReal { r, g, b, a });
transfer_fields!(RgbaColorInt { r, g, b, a });
