//! Background asset catalog and selection.
//!
//! The catalog is a fixed, finite, ordered set. Exactly one asset is
//! active at a time; switching it also recomputes the layout alignment,
//! which is derived purely from the chosen asset and never set directly.

use std::collections::HashMap;

use crate::Bitmap;
#[cfg(feature = "fetch")]
use crate::{Error, Result};

/// Which side of the canvas the card chrome aligns to for the active
/// background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Center,
    End,
}

/// One selectable background image.
#[derive(Debug, PartialEq, Eq)]
pub struct BackgroundAsset {
    /// Stable short name used by the CLI and the asset store.
    pub id: &'static str,
    /// Source image reference. Selection compares these exactly.
    pub url: &'static str,
    /// Layout regime this asset imposes when active.
    pub alignment: Alignment,
}

/// The fixed catalog, in presentation order. The first entry is the
/// default selection.
pub static CATALOG: &[BackgroundAsset] = &[
    BackgroundAsset {
        id: "meadow",
        url: "https://static.vecteezy.com/system/resources/thumbnails/026/365/937/small_2x/beautiful-blurred-green-nature-background-ai-generated-photo.jpg",
        alignment: Alignment::Center,
    },
    BackgroundAsset {
        id: "blossom",
        url: "https://plus.unsplash.com/premium_photo-1706520000654-93561dcd1bd6?q=80&w=1887&auto=format&fit=crop",
        alignment: Alignment::Center,
    },
    BackgroundAsset {
        id: "lagoon",
        url: "https://images.unsplash.com/photo-1717831499998-6f5bafe9e287?q=80&w=1887&auto=format&fit=crop",
        alignment: Alignment::End,
    },
    BackgroundAsset {
        id: "dunes",
        url: "https://images.unsplash.com/photo-1718010345201-e1d79e38985f?q=80&w=1935&auto=format&fit=crop",
        alignment: Alignment::Center,
    },
];

/// Tracks the active background and its derived alignment.
#[derive(Debug)]
pub struct BackgroundPicker {
    selected: &'static BackgroundAsset,
    alignment: Alignment,
}

impl BackgroundPicker {
    pub fn new() -> Self {
        let selected = &CATALOG[0];
        Self {
            selected,
            alignment: selected.alignment,
        }
    }

    pub fn selected(&self) -> &'static BackgroundAsset {
        self.selected
    }

    /// Alignment derived from the active asset.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Select a catalog entry by id or by exact url equality. Returns
    /// false (and changes nothing) when the reference matches no entry.
    pub fn select(&mut self, reference: &str) -> bool {
        match CATALOG
            .iter()
            .find(|a| a.id == reference || a.url == reference)
        {
            Some(asset) => {
                self.selected = asset;
                self.alignment = asset.alignment;
                true
            }
            None => false,
        }
    }
}

impl Default for BackgroundPicker {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded background images, keyed by asset id. Rasterizer backends
/// composite the decoded bitmap when present and fall back to a derived
/// tint otherwise.
#[derive(Debug, Default)]
pub struct AssetStore {
    decoded: HashMap<String, Bitmap>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, bitmap: Bitmap) {
        self.decoded.insert(id.into(), bitmap);
    }

    pub fn get(&self, id: &str) -> Option<&Bitmap> {
        self.decoded.get(id)
    }

    pub fn len(&self) -> usize {
        self.decoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }
}

/// Download a single asset and cache its decoded bitmap in the store.
#[cfg(feature = "fetch")]
pub fn fetch_asset(
    client: &reqwest::blocking::Client,
    id: &str,
    reference: &str,
    store: &mut AssetStore,
) -> Result<()> {
    let parsed = url::Url::parse(reference)
        .map_err(|e| Error::FetchError(format!("Bad asset url {}: {}", reference, e)))?;
    let resp = client
        .get(parsed)
        .send()
        .map_err(|e| Error::FetchError(format!("GET {} failed: {}", reference, e)))?;
    let bytes = resp
        .bytes()
        .map_err(|e| Error::FetchError(format!("Failed to read {}: {}", reference, e)))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| Error::FetchError(format!("Failed to decode {}: {}", reference, e)))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    store.insert(id, Bitmap::from_rgba(w, h, rgba.into_raw()));
    Ok(())
}

/// Preload the whole catalog, mirroring the editor preloading its
/// backgrounds before the first capture. Returns the number of assets
/// cached; individual failures are logged and skipped.
#[cfg(feature = "fetch")]
pub fn preload_catalog(store: &mut AssetStore, timeout_ms: u64) -> Result<usize> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| Error::FetchError(format!("Failed to build HTTP client: {}", e)))?;

    let mut loaded = 0;
    for asset in CATALOG {
        match fetch_asset(&client, asset.id, asset.url, store) {
            Ok(()) => loaded += 1,
            Err(e) => log::warn!("Skipping preload of {}: {}", asset.id, e),
        }
    }
    Ok(loaded)
}
