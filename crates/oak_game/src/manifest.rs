//! Asset manifest loading and the boot check that runs before the scene.
//!
//! The manifest lists every image the scene needs relative to `meta.basePath`.
//! Boot decodes all of them up front; if the manifest or any image is missing
//! the game does not start and a diagnostic text is shown instead.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use oak_render::ImageData;
use serde::Deserialize;

use crate::scene;

pub const MANIFEST_PATH: &str = "assets/oakwoods/assets.json";

/// Missing files listed by name before the rest are summarised as a count.
pub const MISSING_PREVIEW_LIMIT: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct AssetManifest {
    pub meta: ManifestMeta,
    pub images: ManifestImages,
    pub spritesheets: ManifestSpritesheets,
    pub tilesets: ManifestTilesets,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMeta {
    #[serde(default)]
    pub base_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestImages {
    #[serde(default)]
    pub backgrounds: Vec<ImageEntry>,
    #[serde(default)]
    pub decorations: Vec<ImageEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageEntry {
    pub key: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestSpritesheets {
    pub character: SpritesheetEntry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpritesheetEntry {
    pub key: String,
    pub path: String,
    pub frame_width: u32,
    pub frame_height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestTilesets {
    pub main: ImageEntry,
}

/// One image to load, addressed as `basePath/path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedImage {
    pub key: String,
    pub url: String,
}

impl AssetManifest {
    /// Backgrounds, decorations, the character sheet, then the tileset.
    pub fn queued_images(&self) -> Vec<QueuedImage> {
        let base = self.meta.base_path.trim_end_matches('/');
        let queue = |key: &str, path: &str| QueuedImage {
            key: key.to_string(),
            url: format!("{base}/{path}"),
        };

        let mut out: Vec<QueuedImage> = self
            .images
            .backgrounds
            .iter()
            .chain(&self.images.decorations)
            .map(|e| queue(&e.key, &e.path))
            .collect();
        let character = &self.spritesheets.character;
        out.push(queue(&character.key, &character.path));
        out.push(queue(&self.tilesets.main.key, &self.tilesets.main.path));
        out
    }
}

pub fn load_manifest(path: &Path) -> Result<AssetManifest, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let manifest: AssetManifest = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse manifest JSON {}: {e}", path.display()))?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

fn validate_manifest(manifest: &AssetManifest) -> Result<(), String> {
    if manifest.meta.base_path.trim().is_empty() {
        return Err("Manifest validation failed: meta.basePath is empty".to_string());
    }
    let character = &manifest.spritesheets.character;
    if character.frame_width == 0 || character.frame_height == 0 {
        return Err(format!(
            "Manifest validation failed: spritesheet '{}' frame size must be > 0",
            character.key
        ));
    }
    for entry in manifest.queued_images() {
        if entry.key.is_empty() {
            return Err(format!(
                "Manifest validation failed: entry for {} has an empty key",
                entry.url
            ));
        }
    }
    Ok(())
}

/// Decoded images keyed by texture key.
#[derive(Debug)]
pub struct LoadedAssets {
    pub images: HashMap<String, ImageData>,
    pub character_frame: (u32, u32),
}

impl LoadedAssets {
    pub fn texture_sizes(&self) -> HashMap<String, (u32, u32)> {
        self.images
            .iter()
            .map(|(key, img)| (key.clone(), (img.width, img.height)))
            .collect()
    }
}

#[derive(Debug)]
pub enum BootOutcome {
    Ready(LoadedAssets),
    MissingManifest { path: String },
    MissingAssets { asset_dir: String, missing: Vec<String> },
}

impl BootOutcome {
    /// Text to show in place of the game, if the game cannot start.
    pub fn status_text(&self) -> Option<String> {
        match self {
            BootOutcome::Ready(_) => None,
            BootOutcome::MissingManifest { path } => Some(missing_manifest_text(path)),
            BootOutcome::MissingAssets { asset_dir, missing } => {
                Some(missing_assets_text(asset_dir, missing))
            }
        }
    }
}

/// Load the manifest under `root` and decode every image it lists.
pub fn boot(root: &Path) -> BootOutcome {
    let manifest_path = root.join(MANIFEST_PATH);
    let manifest = match load_manifest(&manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            log::error!("{e}");
            return BootOutcome::MissingManifest {
                path: manifest_path.display().to_string(),
            };
        }
    };

    let queue = manifest.queued_images();
    log::info!(
        "Manifest loaded from {}: {} images queued",
        manifest_path.display(),
        queue.len()
    );
    warn_unlisted_scene_keys(&queue);

    let mut images = HashMap::new();
    let mut missing = Vec::new();
    for entry in queue {
        if images.contains_key(&entry.key) {
            log::warn!("Duplicate asset key '{}' ({}); keeping the first", entry.key, entry.url);
            continue;
        }
        match ImageData::load(&root.join(&entry.url)) {
            Ok(image) => {
                log::debug!("Loaded {} ({}x{})", entry.key, image.width, image.height);
                images.insert(entry.key, image);
            }
            Err(e) => {
                log::warn!("Asset '{}' failed to load: {e}", entry.key);
                missing.push(format!("{} ({})", entry.key, entry.url));
            }
        }
    }

    if !missing.is_empty() {
        let base = manifest.meta.base_path.trim_end_matches('/');
        return BootOutcome::MissingAssets {
            asset_dir: format!("{}/", root.join(base).display()),
            missing,
        };
    }

    let character = &manifest.spritesheets.character;
    BootOutcome::Ready(LoadedAssets {
        images,
        character_frame: (character.frame_width, character.frame_height),
    })
}

fn warn_unlisted_scene_keys(queue: &[QueuedImage]) {
    let listed: HashSet<&str> = queue.iter().map(|q| q.key.as_str()).collect();
    for key in scene::required_texture_keys() {
        if !listed.contains(key) {
            log::warn!("Manifest does not list '{}'; it will not be drawn", key);
        }
    }
}

pub fn missing_manifest_text(path: &str) -> String {
    ["Missing manifest:", path, "", "See the repo README for setup."].join("\n")
}

pub fn missing_assets_text(asset_dir: &str, missing: &[String]) -> String {
    let preview = missing
        .iter()
        .take(MISSING_PREVIEW_LIMIT)
        .map(|entry| format!("- {entry}"))
        .collect::<Vec<_>>()
        .join("\n");
    let more = if missing.len() > MISSING_PREVIEW_LIMIT {
        format!("\n(and {} more)", missing.len() - MISSING_PREVIEW_LIMIT)
    } else {
        String::new()
    };

    [
        "Missing Oak Woods art assets.",
        "",
        "Download + extract the pack into:",
        asset_dir,
        "",
        "Example missing files:",
        preview.as_str(),
        more.as_str(),
        "",
        "See the repo README for setup + credits.",
    ]
    .join("\n")
}
