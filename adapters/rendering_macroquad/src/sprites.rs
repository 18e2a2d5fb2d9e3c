use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use macroquad::{
    color::WHITE,
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};
use tile_quest_rendering::{SpriteDraw, SpriteKey};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
pub(crate) const ALL_SPRITE_KEYS: [SpriteKey; 4] = [
    SpriteKey::TileSheet,
    SpriteKey::Player,
    SpriteKey::PathTarget,
    SpriteKey::Cursor,
];

/// Cache of textures loaded from the sprite manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Blits one frame of the requested sprite with point filtering.
    pub(crate) fn draw(&self, draw: &SpriteDraw) -> Result<()> {
        let texture = self
            .texture(draw.sprite)
            .with_context(|| format!("sprite {:?} missing from atlas", draw.sprite))?;

        let size = draw.dest_size();
        let source = draw.source;
        let params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(size.x, size.y)),
            source: Some(Rect::new(
                source.x as f32,
                source.y as f32,
                source.width as f32,
                source.height as f32,
            )),
            flip_x: draw.flip_horizontally,
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(texture, draw.position.x, draw.position.y, WHITE, params);
        Ok(())
    }

    /// Returns the number of textures stored in the atlas.
    #[must_use]
    pub(crate) fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Retrieves the texture associated with the provided key.
    #[must_use]
    pub(crate) fn texture(&self, key: SpriteKey) -> Option<Texture2D> {
        self.textures.get(&key).copied()
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
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(SpriteKey, PathBuf)>,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            let texture = loader(key, &path).with_context(|| {
                format!("failed to load sprite {key:?} from {}", path.display())
            })?;
            if textures.insert(key, texture).is_some() {
                bail!("duplicate sprite entry for {key:?}");
            }
        }
        Ok(Self { textures })
    }
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let key = parse_sprite_key(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        if resolved.insert(key, base_path.join(relative_path)).is_some() {
            bail!("sprite manifest contains duplicate entry for {key:?}");
        }
    }

    let mut ordered = Vec::with_capacity(ALL_SPRITE_KEYS.len());
    for key in ALL_SPRITE_KEYS {
        let Some(path) = resolved.remove(&key) else {
            bail!("sprite manifest missing entry for {key:?}");
        };
        ordered.push((key, path));
    }

    Ok(ordered)
}

fn parse_sprite_key(name: &str) -> Result<SpriteKey> {
    match name {
        "TileSheet" => Ok(SpriteKey::TileSheet),
        "Player" => Ok(SpriteKey::Player),
        "PathTarget" => Ok(SpriteKey::PathTarget),
        "Cursor" => Ok(SpriteKey::Cursor),
        _ => bail!("unknown sprite key `{name}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, path::Path};

    #[test]
    fn parse_manifest_requires_all_known_keys() {
        let manifest = r#"
            version = 1

            [sprites]
            TileSheet = "tiles.png"
            Player = "cloth_armor.png"
            PathTarget = "target.png"
        "#;

        let result = parse_manifest(manifest, Path::new("assets"));
        assert!(result.is_err(), "manifest missing Cursor should fail");
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        let manifest = r#"
            version = 1

            [sprites]
            TileSheet = "tiles.png"
            Player = "cloth_armor.png"
            PathTarget = "target.png"
            Cursor = "hand.png"
            Sword = "sword.png"
        "#;

        assert!(parse_manifest(manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_rejects_other_versions() {
        let manifest = r#"
            version = 2

            [sprites]
        "#;

        let error = parse_manifest(manifest, Path::new("assets")).expect_err("version 2");
        assert!(error.to_string().contains("unsupported sprite manifest version"));
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let manifest = r#"
            version = 1

            [sprites]
            Cursor = "cursors/hand.png"
            Player = "players/cloth_armor.png"
            TileSheet = "tiles.png"
            PathTarget = "target.png"
        "#;

        let parsed = parse_manifest(manifest, Path::new("root")).expect("manifest should parse");
        assert_eq!(
            parsed,
            vec![
                (SpriteKey::TileSheet, PathBuf::from("root/tiles.png")),
                (
                    SpriteKey::Player,
                    PathBuf::from("root/players/cloth_armor.png")
                ),
                (SpriteKey::PathTarget, PathBuf::from("root/target.png")),
                (SpriteKey::Cursor, PathBuf::from("root/cursors/hand.png")),
            ]
        );
    }

    #[test]
    fn atlas_loads_textures_using_deterministic_order() {
        let manifest = r#"
            version = 1

            [sprites]
            PathTarget = "target.png"
            Cursor = "hand.png"
            TileSheet = "tiles.png"
            Player = "cloth_armor.png"
        "#;
        let entries = parse_manifest(manifest, Path::new("assets"))
            .expect("manifest should parse into canonical order");
        let load_order = RefCell::new(Vec::new());
        let atlas = SpriteAtlas::from_entries(entries, &mut |key, _| {
            load_order.borrow_mut().push(key);
            Ok(Texture2D::empty())
        })
        .expect("atlas should load using provided loader");

        assert_eq!(load_order.borrow().as_slice(), &ALL_SPRITE_KEYS);
        assert_eq!(atlas.texture_count(), ALL_SPRITE_KEYS.len());
        for key in ALL_SPRITE_KEYS {
            assert!(atlas.texture(key).is_some());
        }
    }
}
