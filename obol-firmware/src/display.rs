//! SSD1306 OLED status sink
//!
//! Implements the display capability over the 128x64 SSD1306 panel on
//! I2C. All draws land in the driver's frame buffer; `flush` pushes the
//! whole frame, so the panel never shows a half-drawn screen.

use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use obol_core::traits::{Color, DisplayError, DisplaySink, TextSize};

pub type BoardI2c = I2c<'static, I2C0, Blocking>;
pub type BoardOled = Oled<BoardI2c>;

type Panel<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// SSD1306-backed status display
pub struct Oled<I2C> {
    panel: Panel<I2C>,
    cursor: Point,
    color: BinaryColor,
    size: TextSize,
}

impl<I2C> Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    pub fn new(i2c: I2C) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        Self {
            panel,
            cursor: Point::zero(),
            color: BinaryColor::On,
            size: TextSize::Small,
        }
    }

    /// Run the panel init sequence and show a blank frame
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.panel.init().map_err(|_| DisplayError::Bus)?;
        self.panel.clear_buffer();
        self.panel.flush().map_err(|_| DisplayError::Bus)
    }
}

impl<I2C> DisplaySink for Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.panel.clear_buffer();
        Ok(())
    }

    fn set_color(&mut self, color: Color) {
        self.color = match color {
            Color::On => BinaryColor::On,
            Color::Off => BinaryColor::Off,
        };
    }

    fn set_text_size(&mut self, size: TextSize) {
        self.size = size;
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Point::new(x, y);
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        let style = match self.size {
            TextSize::Small => MonoTextStyle::new(&FONT_6X10, self.color),
            TextSize::Large => MonoTextStyle::new(&FONT_10X20, self.color),
        };
        // The cursor advances past the drawn text, Adafruit-style
        self.cursor = Text::with_baseline(text, self.cursor, style, Baseline::Top)
            .draw(&mut self.panel)
            .map_err(|_| DisplayError::Bus)?;
        Ok(())
    }

    fn draw_bitmap(
        &mut self,
        data: &[u8],
        x: i32,
        y: i32,
        width: u32,
        _height: u32,
    ) -> Result<(), DisplayError> {
        let raw = ImageRaw::<BinaryColor>::new(data, width);
        Image::new(&raw, Point::new(x, y))
            .draw(&mut self.panel)
            .map_err(|_| DisplayError::Bus)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.panel.flush().map_err(|_| DisplayError::Bus)
    }
}
