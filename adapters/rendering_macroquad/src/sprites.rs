use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use macroquad::{
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, Texture2D},
};
use path_defence_rendering::{Color, SpriteKey};
use serde::Deserialize;

use crate::to_macroquad_color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const ALL_SPRITE_KEYS: [SpriteKey; 2] = [SpriteKey::Unit, SpriteKey::Tower];

/// Parameters describing how a sprite should be drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Position in screen-space pixels where the sprite's top-left corner is placed.
    pub position: Vec2,
    /// Desired size in screen-space pixels.
    pub scale: Vec2,
    /// Tint applied to the sprite.
    pub tint: Color,
}

impl DrawParams {
    /// Creates draw parameters anchored at the provided position and scale.
    #[must_use]
    pub fn new(position: Vec2, scale: Vec2) -> Self {
        Self {
            position,
            scale,
            tint: Color::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    /// Overrides the tint colour used when drawing the sprite.
    #[must_use]
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }
}

/// Cache of textures loaded from the sprite manifest.
///
/// The atlas owns every decoded texture for the lifetime of the window;
/// scene entities only carry [`SpriteKey`] handles.
#[derive(Debug)]
pub struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/sprites.toml")
    }

    /// Draws the requested sprite using the supplied parameters.
    pub fn draw(&self, key: SpriteKey, params: DrawParams) -> Result<()> {
        let texture = *self
            .textures
            .get(&key)
            .with_context(|| format!("sprite {key:?} missing from atlas"))?;

        let dest_size = MacroquadVec2::new(params.scale.x, params.scale.y);
        let draw_params = DrawTextureParams {
            dest_size: Some(dest_size),
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(
            texture,
            params.position.x,
            params.position.y,
            to_macroquad_color(params.tint),
            draw_params,
        );

        Ok(())
    }

    /// Returns whether the atlas contains the provided key.
    #[must_use]
    pub fn contains(&self, key: SpriteKey) -> bool {
        self.textures.contains_key(&key)
    }

    /// Returns the number of textures stored in the atlas.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;

        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            let texture = loader(key, &path).with_context(|| {
                format!("failed to load sprite {key:?} from {}", path.display())
            })?;
            let _ = textures.insert(key, texture);
        }

        for key in ALL_SPRITE_KEYS {
            if !textures.contains_key(&key) {
                bail!("sprite manifest is missing an entry for {key:?}");
            }
        }

        Ok(Self { textures })
    }
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    version: u32,
    sprites: ManifestSprites,
}

#[derive(Debug, Deserialize)]
struct ManifestSprites {
    unit: PathBuf,
    tower: PathBuf,
}

fn parse_manifest(contents: &str, base: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: ManifestFile =
        toml::from_str(contents).context("failed to parse sprite manifest")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {} (expected {})",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    Ok(vec![
        (SpriteKey::Unit, base.join(manifest.sprites.unit)),
        (SpriteKey::Tower, base.join(manifest.sprites.tower)),
    ])
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read texture {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}
