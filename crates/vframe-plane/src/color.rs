//! Color metadata tags carried by frames and planes.
//!
//! The tags describe how stored samples are to be interpreted; none of
//! them change the samples themselves. The pixel layout is a closed set
//! of variants, each resolving its channel list and chroma subsampling
//! factors through a single lookup.

/// Channel roles a pixel layout can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    /// Red.
    R,
    /// Green.
    G,
    /// Blue.
    B,
    /// Luma.
    Y,
    /// Blue-difference chroma.
    U,
    /// Red-difference chroma.
    V,
    /// Alpha.
    A,
}

impl ChannelKind {
    /// Whether samples of this channel are chroma, stored around a neutral value.
    pub const fn is_chroma(self) -> bool {
        matches!(self, Self::U | Self::V)
    }
}

/// Pixel layout of a frame: which channel planes exist and how chroma is
/// subsampled relative to luma.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// Full RGB, three planes at full resolution.
    Rgb,
    /// Single red plane.
    R,
    /// Single green plane.
    G,
    /// Single blue plane.
    B,
    /// YUV without chroma subsampling.
    Yuv444,
    /// YUV with chroma width halved.
    Yuv422,
    /// YUV with chroma width and height halved.
    Yuv420,
    /// YUV with chroma width quartered.
    Yuv411,
    /// Single luma plane.
    Y,
    /// Single blue-difference chroma plane.
    U,
    /// Single red-difference chroma plane.
    V,
    /// Full RGB plus alpha.
    Rgba,
    /// YUV without chroma subsampling, plus alpha.
    Yuva444,
}

impl PixelLayout {
    /// Channels owned by a frame with this layout, in storage order.
    pub const fn channels(self) -> &'static [ChannelKind] {
        use ChannelKind::*;
        match self {
            Self::Rgb => &[R, G, B],
            Self::R => &[R],
            Self::G => &[G],
            Self::B => &[B],
            Self::Yuv444 | Self::Yuv422 | Self::Yuv420 | Self::Yuv411 => &[Y, U, V],
            Self::Y => &[Y],
            Self::U => &[U],
            Self::V => &[V],
            Self::Rgba => &[R, G, B, A],
            Self::Yuva444 => &[Y, U, V, A],
        }
    }

    /// Horizontal and vertical chroma subsampling factors.
    pub const fn subsampling(self) -> (usize, usize) {
        match self {
            Self::Yuv422 => (2, 1),
            Self::Yuv420 => (2, 2),
            Self::Yuv411 => (4, 1),
            _ => (1, 1),
        }
    }

    /// Whether this layout stores RGB-family channels.
    pub const fn is_rgb(self) -> bool {
        matches!(self, Self::Rgb | Self::R | Self::G | Self::B | Self::Rgba)
    }

    /// Whether this layout stores YUV-family channels.
    pub const fn is_yuv(self) -> bool {
        matches!(
            self,
            Self::Yuv444
                | Self::Yuv422
                | Self::Yuv420
                | Self::Yuv411
                | Self::Y
                | Self::U
                | Self::V
                | Self::Yuva444
        )
    }

    /// Whether this layout carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba | Self::Yuva444)
    }
}

/// Siting of chroma samples relative to luma.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChromaPlacement {
    /// Chroma centered between luma samples (MPEG-1 style).
    Mpeg1,
    /// Chroma co-sited with the left luma column (MPEG-2 style).
    Mpeg2,
    /// DV-style siting.
    Dv,
}

/// Color primaries tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorPrim {
    /// ITU-R BT.709.
    Bt709,
    /// ITU-R BT.470 System B/G (PAL).
    Bt470Bg,
    /// SMPTE 170M (NTSC).
    Smpte170M,
    /// ITU-R BT.2020.
    Bt2020,
}

/// Transfer characteristic tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferChar {
    /// ITU-R BT.709 OETF.
    Bt709,
    /// ITU-R BT.470 System B/G gamma.
    Bt470Bg,
    /// SMPTE 170M.
    Smpte170M,
    /// Linear light; also used for signed chroma samples.
    Linear,
    /// IEC 61966-2-1 (sRGB).
    IecSrgb,
}

/// Color matrix tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMatrix {
    /// Identity, samples are G/B/R.
    Gbr,
    /// ITU-R BT.709.
    Bt709,
    /// ITU-R BT.470 System B/G.
    Bt470Bg,
    /// SMPTE 170M.
    Smpte170M,
    /// ITU-R BT.2020 non-constant luminance.
    Bt2020Ncl,
}

/// Default primaries for a frame geometry.
///
/// HD resolutions map to BT.709, 576-line content to BT.470 B/G and the
/// rest to SMPTE 170M; RGB content is always BT.709.
pub fn color_prim_default(width: usize, height: usize, rgb: bool) -> ColorPrim {
    if rgb || width > 1024 || height > 576 {
        ColorPrim::Bt709
    } else if height == 576 {
        ColorPrim::Bt470Bg
    } else {
        ColorPrim::Smpte170M
    }
}

/// Default transfer characteristic for a frame geometry.
///
/// RGB content maps to sRGB; YUV follows the same resolution split as
/// [`color_prim_default`].
pub fn transfer_char_default(width: usize, height: usize, rgb: bool) -> TransferChar {
    if rgb {
        TransferChar::IecSrgb
    } else if width > 1024 || height > 576 {
        TransferChar::Bt709
    } else if height == 576 {
        TransferChar::Bt470Bg
    } else {
        TransferChar::Smpte170M
    }
}

/// Default color matrix for a frame geometry.
pub fn color_matrix_default(width: usize, height: usize) -> ColorMatrix {
    if width > 1024 || height > 576 {
        ColorMatrix::Bt709
    } else if height == 576 {
        ColorMatrix::Bt470Bg
    } else {
        ColorMatrix::Smpte170M
    }
}
