// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text recognition on cropped regions and whole pages
//!
//! Recognition is delegated to an external engine behind [`OcrEngine`];
//! `tesseract` drives the Tesseract command line tool.

pub mod tesseract;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::Result;

pub use tesseract::TesseractEngine;

/// Tesseract page segmentation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PageSegMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    /// Fully automatic page segmentation, used for whole images
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertText = 5,
    SingleBlock = 6,
    /// One text line, used for detected regions
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl PageSegMode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<PageSegMode> for u8 {
    fn from(mode: PageSegMode) -> Self {
        mode.as_u8()
    }
}

impl TryFrom<u8> for PageSegMode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        use PageSegMode::*;
        Ok(match value {
            0 => OsdOnly,
            1 => AutoOsd,
            2 => AutoOnly,
            3 => Auto,
            4 => SingleColumn,
            5 => SingleBlockVertText,
            6 => SingleBlock,
            7 => SingleLine,
            8 => SingleWord,
            9 => CircleWord,
            10 => SingleChar,
            11 => SparseText,
            12 => SparseTextOsd,
            13 => RawLine,
            other => return Err(format!("unknown page segmentation mode {other} (expected 0-13)")),
        })
    }
}

impl fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// An OCR backend that turns an image into text
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in `image`, trimmed of surrounding whitespace
    fn recognize(&self, image: &DynamicImage, psm: PageSegMode) -> Result<String>;

    /// Whether the engine can currently be invoked
    fn is_available(&self) -> bool;

    fn name(&self) -> &str {
        "ocr"
    }
}
