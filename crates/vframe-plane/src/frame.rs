use crate::color::{
    color_matrix_default, color_prim_default, transfer_char_default, ChannelKind, ChromaPlacement,
    ColorMatrix, ColorPrim, PixelLayout, TransferChar,
};
use crate::error::PlaneError;
use crate::plane::{Plane, PlaneSize};
use crate::quantize::{quantize_value, QuantRange};

/// A complete image: one channel plane per entry in the pixel layout,
/// plus color-science metadata shared by all of them.
///
/// Chroma planes are stored at reduced resolution according to the
/// layout's subsampling factors; odd luma dimensions are rounded up to
/// the next multiple of the subsampling factor before dividing, so the
/// chroma grid always covers the full picture.
///
/// Each plane carries its own bit depth and quantization triple, while
/// the frame number and color-range semantics are shared. Cloning
/// deep-copies every plane; moving transfers ownership of all of them.
///
/// # Examples
///
/// ```
/// use vframe_plane::{Frame, PixelLayout, PlaneSize};
///
/// let frame = Frame::new(
///     0,
///     PixelLayout::Yuv420,
///     PlaneSize {
///         width: 15,
///         height: 15,
///     },
///     8,
/// )
/// .unwrap();
///
/// // odd dimensions round up before subsampling
/// assert_eq!(frame.y().unwrap().width(), 16);
/// assert_eq!(frame.u().unwrap().width(), 8);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    frame_num: usize,
    layout: PixelLayout,
    quant_range: QuantRange,
    chroma_placement: ChromaPlacement,
    color_prim: ColorPrim,
    transfer: TransferChar,
    matrix: ColorMatrix,
    channels: Vec<Plane>,
}

impl Frame {
    /// Create a frame with default color metadata for its geometry.
    ///
    /// YUV layouts default to TV range, RGB layouts to full range; the
    /// remaining tags follow the geometry defaults of [`crate::color`].
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the bit depth is unsupported.
    pub fn new(
        frame_num: usize,
        layout: PixelLayout,
        size: PlaneSize,
        bit_depth: u32,
    ) -> Result<Self, PlaneError> {
        let quant_range = if layout.is_yuv() {
            QuantRange::Tv
        } else {
            QuantRange::Pc
        };
        Self::with_quant_range(
            frame_num,
            layout,
            size,
            bit_depth,
            quant_range,
            ChromaPlacement::Mpeg2,
        )
    }

    /// Create a frame with an explicit quantization range and chroma
    /// placement, deriving the color-science tags from the geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the bit depth is unsupported.
    pub fn with_quant_range(
        frame_num: usize,
        layout: PixelLayout,
        size: PlaneSize,
        bit_depth: u32,
        quant_range: QuantRange,
        chroma_placement: ChromaPlacement,
    ) -> Result<Self, PlaneError> {
        let rgb = layout.is_rgb();
        Self::with_color(
            frame_num,
            layout,
            size,
            bit_depth,
            quant_range,
            chroma_placement,
            color_prim_default(size.width, size.height, rgb),
            transfer_char_default(size.width, size.height, rgb),
            color_matrix_default(size.width, size.height),
        )
    }

    /// Create a frame with fully explicit color metadata.
    ///
    /// Allocates one plane per channel of the layout: non-chroma planes
    /// at the (rounded) luma geometry initialized to their floor, chroma
    /// planes at the subsampled geometry initialized to their neutral
    /// value and tagged with a linear transfer.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the bit depth is unsupported.
    #[allow(clippy::too_many_arguments)]
    pub fn with_color(
        frame_num: usize,
        layout: PixelLayout,
        size: PlaneSize,
        bit_depth: u32,
        quant_range: QuantRange,
        chroma_placement: ChromaPlacement,
        color_prim: ColorPrim,
        transfer: TransferChar,
        matrix: ColorMatrix,
    ) -> Result<Self, PlaneError> {
        let (sub_x, sub_y) = layout.subsampling();

        let mut luma = size;
        if luma.width % sub_x != 0 {
            luma.width = (luma.width / sub_x + 1) * sub_x;
        }
        if luma.height % sub_y != 0 {
            luma.height = (luma.height / sub_y + 1) * sub_y;
        }
        let chroma = PlaneSize {
            width: luma.width / sub_x,
            height: luma.height / sub_y,
        };

        let kinds = layout.channels();
        let mut channels = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let (floor, neutral, ceil) = quantize_value(bit_depth, quant_range, kind.is_chroma())?;
            let (plane_size, plane_transfer, init) = if kind.is_chroma() {
                (chroma, TransferChar::Linear, neutral)
            } else {
                (luma, transfer, floor)
            };
            channels.push(Plane::from_size_val(
                plane_size,
                bit_depth,
                floor,
                neutral,
                ceil,
                plane_transfer,
                init,
            )?);
        }

        Ok(Self {
            frame_num,
            layout,
            quant_range,
            chroma_placement,
            color_prim,
            transfer,
            matrix,
            channels,
        })
    }

    /// Create a frame shaped like `src` with freshly allocated planes.
    ///
    /// Every plane keeps its geometry but gets a recomputed quantization
    /// triple at the given target bit depth; samples are initialized to
    /// the floor (neutral for chroma), not copied. This is the
    /// reallocation copy mode; use [`Clone`] for a deep copy.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaneError`] if the bit depth is unsupported.
    pub fn like(src: &Frame, bit_depth: u32) -> Result<Self, PlaneError> {
        let kinds = src.layout.channels();
        let mut channels = Vec::with_capacity(kinds.len());
        for (plane, &kind) in src.channels.iter().zip(kinds) {
            let (floor, neutral, ceil) = quantize_value(bit_depth, src.quant_range, kind.is_chroma())?;
            let (plane_transfer, init) = if kind.is_chroma() {
                (TransferChar::Linear, neutral)
            } else {
                (src.transfer, floor)
            };
            channels.push(Plane::from_size_val(
                plane.size(),
                bit_depth,
                floor,
                neutral,
                ceil,
                plane_transfer,
                init,
            )?);
        }

        Ok(Self {
            frame_num: src.frame_num,
            layout: src.layout,
            quant_range: src.quant_range,
            chroma_placement: src.chroma_placement,
            color_prim: src.color_prim,
            transfer: src.transfer,
            matrix: src.matrix,
            channels,
        })
    }

    /// Frame number within its sequence.
    pub fn frame_num(&self) -> usize {
        self.frame_num
    }

    /// Pixel layout of the frame.
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Quantization range shared by the channel planes.
    pub fn quant_range(&self) -> QuantRange {
        self.quant_range
    }

    /// Chroma siting relative to luma.
    pub fn chroma_placement(&self) -> ChromaPlacement {
        self.chroma_placement
    }

    /// Color primaries tag.
    pub fn color_prim(&self) -> ColorPrim {
        self.color_prim
    }

    /// Transfer characteristic tag.
    pub fn transfer(&self) -> TransferChar {
        self.transfer
    }

    /// Color matrix tag.
    pub fn matrix(&self) -> ColorMatrix {
        self.matrix
    }

    /// Number of channel planes.
    pub fn plane_count(&self) -> usize {
        self.channels.len()
    }

    /// All channel planes in layout order.
    pub fn planes(&self) -> &[Plane] {
        &self.channels
    }

    /// All channel planes in layout order, mutable.
    pub fn planes_mut(&mut self) -> &mut [Plane] {
        &mut self.channels
    }

    /// The plane for a channel kind, if the layout carries it.
    pub fn channel(&self, kind: ChannelKind) -> Option<&Plane> {
        self.layout
            .channels()
            .iter()
            .position(|&c| c == kind)
            .map(|i| &self.channels[i])
    }

    /// The red plane, if present.
    pub fn r(&self) -> Option<&Plane> {
        self.channel(ChannelKind::R)
    }

    /// The green plane, if present.
    pub fn g(&self) -> Option<&Plane> {
        self.channel(ChannelKind::G)
    }

    /// The blue plane, if present.
    pub fn b(&self) -> Option<&Plane> {
        self.channel(ChannelKind::B)
    }

    /// The luma plane, if present.
    pub fn y(&self) -> Option<&Plane> {
        self.channel(ChannelKind::Y)
    }

    /// The blue-difference chroma plane, if present.
    pub fn u(&self) -> Option<&Plane> {
        self.channel(ChannelKind::U)
    }

    /// The red-difference chroma plane, if present.
    pub fn v(&self) -> Option<&Plane> {
        self.channel(ChannelKind::V)
    }

    /// The alpha plane, if present.
    pub fn alpha(&self) -> Option<&Plane> {
        self.channel(ChannelKind::A)
    }
}
