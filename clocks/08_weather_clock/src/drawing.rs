//! Drawing module - background images and the label boxes
//!
//! Labels are white boxes centred on the window at fixed fractions of its
//! height, over a time-of-day photo stretched to fill the window.

use std::collections::HashMap;
use std::path::PathBuf;

use nannou::prelude::*;
use shared::{TimeOfDay, WidgetConfig};
use thiserror::Error;
use tracing::debug;

use crate::ui::Screen;

/// Color palette
pub mod colors {
    use nannou::prelude::*;

    pub const BACKGROUND: Srgb<u8> = Srgb {
        red: 20,
        green: 24,
        blue: 32,
        standard: std::marker::PhantomData,
    };
    pub const LABEL_BG: Srgb<u8> = Srgb {
        red: 255,
        green: 255,
        blue: 255,
        standard: std::marker::PhantomData,
    };
    pub const LABEL_TEXT: Srgb<u8> = Srgb {
        red: 0,
        green: 0,
        blue: 0,
        standard: std::marker::PhantomData,
    };
}

#[derive(Debug, Error)]
#[error("failed to load {}: {source}", .path.display())]
pub struct BackgroundError {
    path: PathBuf,
    source: nannou::image::ImageError,
}

/// Textures for every bucket, loaded once at startup
pub struct Backgrounds {
    textures: HashMap<TimeOfDay, wgpu::Texture>,
}

impl Backgrounds {
    pub fn load(app: &App, config: &WidgetConfig) -> Result<Self, BackgroundError> {
        let mut textures = HashMap::new();
        for bucket in TimeOfDay::ALL {
            let path = config.background_path(bucket);
            let texture = wgpu::Texture::from_path(app, &path)
                .map_err(|source| BackgroundError { path: path.clone(), source })?;
            debug!(%bucket, path = %path.display(), "loaded background");
            textures.insert(bucket, texture);
        }
        Ok(Self { textures })
    }

    /// Draw the bucket's image scaled to fill `rect`
    pub fn draw(&self, draw: &Draw, bucket: TimeOfDay, rect: Rect) {
        if let Some(texture) = self.textures.get(&bucket) {
            draw.texture(texture).xy(rect.xy()).wh(rect.wh());
        }
    }
}

/// A label box: text, font size and vertical position as a fraction from the top
struct Label<'a> {
    text: &'a str,
    font_size: u32,
    rel_y: f32,
}

/// Draw the date, time and weather labels
pub fn draw_labels(draw: &Draw, screen: &Screen, rect: Rect) {
    let labels = [
        Label {
            text: &screen.date,
            font_size: 20,
            rel_y: 0.3,
        },
        Label {
            text: &screen.time,
            font_size: 40,
            rel_y: 0.4,
        },
        Label {
            text: &screen.weather,
            font_size: 20,
            rel_y: 0.5,
        },
    ];

    for label in labels.iter().filter(|l| !l.text.is_empty()) {
        draw_label(draw, label, rect);
    }
}

fn draw_label(draw: &Draw, label: &Label, rect: Rect) {
    let center = pt2(rect.x(), rect.top() - rect.h() * label.rel_y);

    // Box size estimated from character count
    let size = label.font_size as f32;
    let longest = label.text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let line_count = label.text.lines().count().max(1);
    let box_w = (longest as f32 * size * 0.6 + size).min(rect.w());
    let box_h = line_count as f32 * size * 1.3 + size * 0.4;

    draw.rect()
        .xy(center)
        .w_h(box_w, box_h)
        .color(colors::LABEL_BG);

    draw.text(label.text)
        .xy(center)
        .color(colors::LABEL_TEXT)
        .font_size(label.font_size)
        .w(box_w)
        .center_justify();
}
