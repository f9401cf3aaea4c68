// src/render.rs
//! Rendering boundary and fixed styling.

use embedded_graphics::pixelcolor::Rgb565;

// Device palette (RGB888 -> Rgb565)
const BRIGHT_GREEN: Rgb565 = Rgb565::new(0x00 >> 3, 0xFF >> 2, 0x00 >> 3);
const PURPLE: Rgb565 = Rgb565::new(0xAA >> 3, 0x00 >> 2, 0x88 >> 3);
const YELLOW: Rgb565 = Rgb565::new(0xFF >> 3, 0xFF >> 2, 0x00 >> 3);

/// Fixed drawing constants handed to the renderer alongside every screen.
/// Configuration, not computation: built once at startup, never derived
/// from content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub border_px: u32,
    pub font_scale: u32,
    pub background: Rgb565,
    pub foreground: Rgb565,
    pub text: Rgb565,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            border_px: 20,
            font_scale: 2,
            background: BRIGHT_GREEN,
            foreground: PURPLE,
            text: YELLOW,
        }
    }
}

/// Full-screen redraw boundary.
///
/// One call per screen change; the core never asks for partial updates.
/// Implementations live outside the core: a display-panel driver in
/// firmware, a terminal printer in the simulator, a recording fake in
/// tests.
pub trait Renderer {
    type Error;

    fn draw(
        &mut self,
        content: &crate::screens::ScreenContent,
        style: &RenderStyle,
    ) -> Result<(), Self::Error>;
}
