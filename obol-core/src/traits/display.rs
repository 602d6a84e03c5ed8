//! Status display trait
//!
//! The display is a dumb collaborator: the core calls these primitives in
//! sequence and never reads display state back. Draws land in a frame
//! buffer; nothing is visible until `flush`.

/// Errors that can occur with display communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus-level write failure
    Bus,
    /// Draw outside the panel area
    OutOfBounds,
}

/// Monochrome pixel color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Off,
    On,
}

/// Text size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextSize {
    /// Detail lines
    Small,
    /// Titles
    Large,
}

/// Trait for the status display
///
/// Cursor, color, and size are sticky: they apply to every subsequent
/// `print` until changed.
pub trait DisplaySink {
    /// Clear the frame buffer
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Set the draw color for text
    fn set_color(&mut self, color: Color);

    /// Set the text size for subsequent prints
    fn set_text_size(&mut self, size: TextSize);

    /// Move the text cursor to pixel position (`x`, `y`)
    fn set_cursor(&mut self, x: i32, y: i32);

    /// Draw text at the current cursor position
    fn print(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Draw a 1-bit row-major bitmap with its top-left corner at (`x`, `y`)
    fn draw_bitmap(
        &mut self,
        data: &[u8],
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), DisplayError>;

    /// Push the frame buffer to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;
}
