//! Tile map: the read-only level geometry the character collides against.
//!
//! Maps are authored in Tiled and exported as JSON. Only the subset the game
//! needs is read: one named tile layer, embedded tilesets, and per-tile object
//! groups whose rectangle objects become collision rectangles. Everything is
//! resolved at load time, so the per-tick lookups in the collision resolver
//! are a bounds check plus a vector index.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use hop_core::Rect;
use serde::de::IgnoredAny;
use serde::Deserialize;

/// Tiled stores flip/rotation flags in the top bits of every gid.
const GID_FLAG_MASK: u32 = 0xF000_0000;

#[derive(Debug, Deserialize, Clone)]
pub struct MapFile {
    pub width: u32,
    pub height: u32,
    pub tilewidth: u32,
    pub tileheight: u32,
    pub layers: Vec<LayerFile>,
    #[serde(default)]
    pub tilesets: Vec<TilesetFile>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayerFile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub data: Vec<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TilesetFile {
    pub firstgid: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub imagewidth: u32,
    #[serde(default)]
    pub imageheight: u32,
    #[serde(default)]
    pub columns: u32,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub tilecount: u32,
    #[serde(default)]
    pub tiles: Vec<TileDefFile>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileDefFile {
    pub id: u32,
    #[serde(default)]
    pub objectgroup: Option<ObjectGroupFile>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ObjectGroupFile {
    #[serde(default)]
    pub objects: Vec<ObjectFile>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObjectFile {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub ellipse: bool,
    #[serde(default)]
    pub point: bool,
    #[serde(default)]
    pub polygon: Option<Vec<IgnoredAny>>,
    #[serde(default)]
    pub polyline: Option<Vec<IgnoredAny>>,
}

impl ObjectFile {
    fn is_rectangle(&self) -> bool {
        !self.ellipse && !self.point && self.polygon.is_none() && self.polyline.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Tileset {
    pub name: String,
    pub first_gid: u32,
    /// Texture key handed to the renderer.
    pub image: Arc<str>,
    pub image_size: (u32, u32),
    pub columns: u32,
    pub tile_size: (u32, u32),
    colliders: HashMap<u32, Vec<Rect>>,
}

impl Tileset {
    /// Tile-local collision rectangles of one tile.
    pub fn colliders(&self, local_id: u32) -> &[Rect] {
        self.colliders
            .get(&local_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pixel rectangle of a tile inside the tileset image.
    pub fn source_rect(&self, local_id: u32) -> Rect {
        let (tw, th) = self.tile_size;
        let col = local_id % self.columns;
        let row = local_id / self.columns;
        Rect::new(
            (col * tw) as f32,
            (row * th) as f32,
            tw as f32,
            th as f32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlacedTile {
    tileset: usize,
    local_id: u32,
}

#[derive(Debug, Clone)]
pub struct TileMap {
    pub layer_name: String,
    /// Size in cells.
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    tilesets: Vec<Tileset>,
    cells: Vec<Option<PlacedTile>>,
}

/// A placed tile: which cell it occupies and what it looks like.
#[derive(Debug, Clone, Copy)]
pub struct TileRef<'a> {
    map: &'a TileMap,
    pub column: u32,
    pub row: u32,
    tileset: &'a Tileset,
    local_id: u32,
}

impl<'a> TileRef<'a> {
    pub fn gid(&self) -> u32 {
        self.tileset.first_gid + self.local_id
    }

    /// World position of the tile's top-left corner. Tiles taller than the
    /// grid are anchored to the bottom of their cell, as Tiled draws them.
    pub fn world_offset(&self) -> (f32, f32) {
        let x = self.column * self.map.tile_width;
        let y = (self.row + 1) * self.map.tile_height;
        (x as f32, y as f32 - self.tileset.tile_size.1 as f32)
    }

    pub fn collision_rectangles(&self) -> &'a [Rect] {
        self.tileset.colliders(self.local_id)
    }

    pub fn world_colliders(&self) -> impl Iterator<Item = Rect> + 'a {
        let (ox, oy) = self.world_offset();
        self.collision_rectangles()
            .iter()
            .map(move |rect| rect.offset(ox, oy))
    }

    /// Source rectangle in the tileset image, in pixels.
    pub fn drawing_rect(&self) -> Rect {
        self.tileset.source_rect(self.local_id)
    }

    /// Destination rectangle in world space.
    pub fn world_rect(&self) -> Rect {
        let (x, y) = self.world_offset();
        let (w, h) = self.tileset.tile_size;
        Rect::new(x, y, w as f32, h as f32)
    }

    pub fn texture(&self) -> &'a Arc<str> {
        &self.tileset.image
    }

    /// `[u0, v0, u1, v1]`, falling back to the full image when the tileset
    /// did not record its image size.
    pub fn uv(&self) -> [f32; 4] {
        let (iw, ih) = self.tileset.image_size;
        if iw == 0 || ih == 0 {
            return [0.0, 0.0, 1.0, 1.0];
        }
        let src = self.drawing_rect();
        [
            src.x / iw as f32,
            src.y / ih as f32,
            src.right() / iw as f32,
            src.bottom() / ih as f32,
        ]
    }
}

impl TileMap {
    /// Build from a parsed map file. `texture_root` is prepended to tileset
    /// image paths so texture keys resolve relative to the map file.
    pub fn from_file(file: MapFile, layer_name: &str, texture_root: &Path) -> Result<Self, String> {
        validate_map_file(&file, layer_name)?;

        let mut tileset_files = file.tilesets;
        tileset_files.sort_by_key(|t| t.firstgid);

        let mut tilesets = Vec::with_capacity(tileset_files.len());
        for ts in tileset_files {
            let Some(image) = ts.image else {
                return Err(format!(
                    "Map validation failed: tileset '{}' has no image",
                    ts.name
                ));
            };
            let mut colliders: HashMap<u32, Vec<Rect>> = HashMap::new();
            for tile in &ts.tiles {
                let Some(group) = &tile.objectgroup else {
                    continue;
                };
                for object in &group.objects {
                    if !object.is_rectangle() {
                        log::warn!(
                            "Tileset '{}' tile {}: only rectangle colliders are supported, ignoring shape",
                            ts.name,
                            tile.id
                        );
                        continue;
                    }
                    colliders.entry(tile.id).or_default().push(Rect::new(
                        object.x,
                        object.y,
                        object.width,
                        object.height,
                    ));
                }
            }
            let texture_key = texture_root.join(&image).to_string_lossy().into_owned();
            tilesets.push(Tileset {
                name: ts.name,
                first_gid: ts.firstgid,
                image: Arc::from(texture_key),
                image_size: (ts.imagewidth, ts.imageheight),
                columns: ts.columns,
                tile_size: (ts.tilewidth, ts.tileheight),
                colliders,
            });
        }

        let Some(layer) = file
            .layers
            .iter()
            .find(|l| l.kind == "tilelayer" && l.name == layer_name)
        else {
            return Err(format!(
                "Map validation failed: tile layer '{layer_name}' not found"
            ));
        };

        let mut cells = Vec::with_capacity(layer.data.len());
        for (index, raw_gid) in layer.data.iter().enumerate() {
            let gid = raw_gid & !GID_FLAG_MASK;
            if gid == 0 {
                cells.push(None);
                continue;
            }
            let Some(tileset) = tilesets.iter().rposition(|t| t.first_gid <= gid) else {
                return Err(format!(
                    "Map validation failed: gid {gid} at cell {index} has no tileset"
                ));
            };
            cells.push(Some(PlacedTile {
                tileset,
                local_id: gid - tilesets[tileset].first_gid,
            }));
        }

        if cells.iter().all(Option::is_none) {
            log::warn!("Tile layer '{layer_name}' has no tiles. This is allowed but often accidental.");
        }

        Ok(Self {
            layer_name: layer_name.to_string(),
            width: layer.width,
            height: layer.height,
            tile_width: file.tilewidth,
            tile_height: file.tileheight,
            tilesets,
            cells,
        })
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Cell covering a world-space point, or `None` outside the layer.
    pub fn cell_at(&self, world_x: f32, world_y: f32) -> Option<(u32, u32)> {
        let col = (world_x / self.tile_width as f32).floor();
        let row = (world_y / self.tile_height as f32).floor();
        if col < 0.0 || row < 0.0 || col >= self.width as f32 || row >= self.height as f32 {
            return None;
        }
        Some((col as u32, row as u32))
    }

    pub fn tile_at(&self, column: u32, row: u32) -> Option<TileRef<'_>> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let placed = self.cells[(row * self.width + column) as usize]?;
        Some(TileRef {
            map: self,
            column,
            row,
            tileset: &self.tilesets[placed.tileset],
            local_id: placed.local_id,
        })
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileRef<'_>> {
        (0..self.height).flat_map(move |row| {
            (0..self.width).filter_map(move |column| self.tile_at(column, row))
        })
    }

    /// Build a single-tileset map from text rows.
    ///
    /// `#` solid tile, `_` half-height floor slab, `=` tile with two stacked
    /// slabs, `o` decorative tile without colliders, anything else empty.
    #[cfg(test)]
    pub fn from_rows(tile_size: u32, rows: &[&str]) -> Self {
        let t = tile_size as f32;
        let mut colliders = HashMap::new();
        colliders.insert(0, vec![Rect::new(0.0, 0.0, t, t)]);
        colliders.insert(2, vec![Rect::new(0.0, t * 0.5, t, t * 0.5)]);
        colliders.insert(
            3,
            vec![
                Rect::new(0.0, 0.0, t, t * 0.25),
                Rect::new(0.0, t * 0.5, t, t * 0.25),
            ],
        );

        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let height = rows.len() as u32;
        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in rows {
            let bytes = row.as_bytes();
            for col in 0..width as usize {
                let local_id = match bytes.get(col) {
                    Some(b'#') => Some(0),
                    Some(b'o') => Some(1),
                    Some(b'_') => Some(2),
                    Some(b'=') => Some(3),
                    _ => None,
                };
                cells.push(local_id.map(|local_id| PlacedTile {
                    tileset: 0,
                    local_id,
                }));
            }
        }

        Self {
            layer_name: "test".to_string(),
            width,
            height,
            tile_width: tile_size,
            tile_height: tile_size,
            tilesets: vec![Tileset {
                name: "test".to_string(),
                first_gid: 1,
                image: Arc::from("test.png"),
                image_size: (tile_size * 4, tile_size),
                columns: 4,
                tile_size: (tile_size, tile_size),
                colliders,
            }],
            cells,
        }
    }
}

pub fn load_map_from_path(path: &Path, layer_name: &str) -> Result<TileMap, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let file: MapFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse map JSON {}: {e}", path.display()))?;
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    let map = TileMap::from_file(file, layer_name, root)?;
    log::info!(
        "Loaded map {} ({}x{} cells of {}x{}, layer '{}')",
        path.display(),
        map.width,
        map.height,
        map.tile_width,
        map.tile_height,
        map.layer_name
    );
    Ok(map)
}

fn validate_map_file(file: &MapFile, layer_name: &str) -> Result<(), String> {
    if file.tilewidth == 0 || file.tileheight == 0 {
        return Err("Map validation failed: tile size must be > 0".to_string());
    }
    if file.width == 0 || file.height == 0 {
        return Err("Map validation failed: width and height must be > 0".to_string());
    }

    for ts in &file.tilesets {
        if let Some(source) = &ts.source {
            return Err(format!(
                "Map validation failed: external tileset '{source}' is not supported, embed it in the map"
            ));
        }
        if ts.firstgid == 0 {
            return Err(format!(
                "Map validation failed: tileset '{}' has firstgid 0",
                ts.name
            ));
        }
        if ts.columns == 0 || ts.tilewidth == 0 || ts.tileheight == 0 {
            return Err(format!(
                "Map validation failed: tileset '{}' needs columns, tilewidth and tileheight > 0",
                ts.name
            ));
        }
    }

    for layer in file.layers.iter().filter(|l| l.kind == "tilelayer") {
        let expected = layer.width as usize * layer.height as usize;
        if layer.data.len() != expected {
            return Err(format!(
                "Map validation failed: layer '{}' has {} cells, expected {}x{}",
                layer.name,
                layer.data.len(),
                layer.width,
                layer.height
            ));
        }
        if layer.name != layer_name {
            continue;
        }
        for gid in layer.data.iter().map(|g| g & !GID_FLAG_MASK).filter(|g| *g != 0) {
            let owner = file
                .tilesets
                .iter()
                .filter(|t| t.firstgid <= gid)
                .max_by_key(|t| t.firstgid);
            if let Some(ts) = owner {
                if ts.tilecount > 0 && gid - ts.firstgid >= ts.tilecount {
                    return Err(format!(
                        "Map validation failed: gid {gid} is outside tileset '{}'",
                        ts.name
                    ));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hop_map_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    const SAMPLE_MAP: &str = r#"{
      "width": 3,
      "height": 2,
      "tilewidth": 16,
      "tileheight": 16,
      "layers": [
        { "name": "Background", "type": "imagelayer" },
        { "name": "Tile Layer 1", "type": "tilelayer", "width": 3, "height": 2,
          "data": [0, 0, 2, 1, 2147483649, 3] }
      ],
      "tilesets": [
        { "firstgid": 1, "name": "terrain", "image": "terrain.png",
          "imagewidth": 32, "imageheight": 32, "columns": 2,
          "tilewidth": 16, "tileheight": 16, "tilecount": 4,
          "tiles": [
            { "id": 0, "objectgroup": { "objects": [
              { "x": 0, "y": 0, "width": 16, "height": 16 }
            ] } },
            { "id": 2, "objectgroup": { "objects": [
              { "x": 0, "y": 8, "width": 16, "height": 8 },
              { "x": 4, "y": 0, "width": 8, "height": 4 },
              { "x": 2, "y": 2, "width": 4, "height": 4, "ellipse": true }
            ] } }
          ] }
      ]
    }"#;

    fn sample_map() -> TileMap {
        let file: MapFile = serde_json::from_str(SAMPLE_MAP).expect("sample map parses");
        TileMap::from_file(file, "Tile Layer 1", Path::new("res")).expect("sample map is valid")
    }

    #[test]
    fn cell_lookup_uses_floor_division() {
        let map = sample_map();
        assert_eq!(map.cell_at(0.0, 0.0), Some((0, 0)));
        assert_eq!(map.cell_at(15.99, 16.0), Some((0, 1)));
        assert_eq!(map.cell_at(47.9, 31.9), Some((2, 1)));
        assert_eq!(map.cell_at(48.0, 0.0), None);
        assert_eq!(map.cell_at(-0.5, 4.0), None);
    }

    #[test]
    fn tile_lookup_masks_flip_flags_and_skips_empty_cells() {
        let map = sample_map();
        assert!(map.tile_at(0, 0).is_none());
        assert_eq!(map.tile_at(2, 0).map(|t| t.gid()), Some(2));
        // 2147483649 is gid 1 with the horizontal flip bit set.
        assert_eq!(map.tile_at(1, 1).map(|t| t.gid()), Some(1));
        assert!(map.tile_at(3, 0).is_none());
        assert_eq!(map.tiles().count(), 4);
    }

    #[test]
    fn world_colliders_are_offset_by_tile_placement() {
        let map = sample_map();
        let tile = map.tile_at(2, 1).expect("tile present");
        assert_eq!(tile.world_offset(), (32.0, 16.0));
        let colliders: Vec<Rect> = tile.world_colliders().collect();
        // The ellipse is dropped; both rectangles survive.
        assert_eq!(
            colliders,
            vec![
                Rect::new(32.0, 24.0, 16.0, 8.0),
                Rect::new(36.0, 16.0, 8.0, 4.0)
            ]
        );
        assert!(map.tile_at(2, 0).expect("tile").collision_rectangles().is_empty());
    }

    #[test]
    fn drawing_rect_and_uv_follow_tileset_grid() {
        let map = sample_map();
        let tile = map.tile_at(2, 1).expect("tile present");
        assert_eq!(tile.drawing_rect(), Rect::new(0.0, 16.0, 16.0, 16.0));
        assert_eq!(tile.uv(), [0.0, 0.5, 0.5, 1.0]);
        assert_eq!(tile.world_rect(), Rect::new(32.0, 16.0, 16.0, 16.0));
        assert_eq!(&**tile.texture(), Path::new("res").join("terrain.png").to_string_lossy());
    }

    #[test]
    fn missing_layer_is_a_load_error() {
        let file: MapFile = serde_json::from_str(SAMPLE_MAP).expect("sample map parses");
        let err = TileMap::from_file(file, "Foreground", Path::new("")).expect_err("layer missing");
        assert!(err.contains("tile layer 'Foreground' not found"));
    }

    #[test]
    fn gid_outside_tilecount_is_rejected() {
        let json = SAMPLE_MAP.replace("2147483649, 3]", "2147483649, 9]");
        let file: MapFile = serde_json::from_str(&json).expect("map parses");
        let err = TileMap::from_file(file, "Tile Layer 1", Path::new("")).expect_err("bad gid");
        assert!(err.contains("gid 9 is outside tileset 'terrain'"));
    }

    #[test]
    fn load_map_from_path_parses_valid_file() {
        let path = temp_file_path("valid");
        fs::write(&path, SAMPLE_MAP).expect("write temp file");

        let map = load_map_from_path(&path, "Tile Layer 1").expect("valid map should load");
        assert_eq!(map.tile_size(), (16, 16));
        assert_eq!((map.width, map.height), (3, 2));
        assert_eq!(map.tilesets().len(), 1);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn polygon_and_polyline_objects_are_not_colliders() {
        let json = r#"{
          "width": 1, "height": 1, "tilewidth": 16, "tileheight": 16,
          "layers": [ { "name": "Tile Layer 1", "type": "tilelayer",
                        "width": 1, "height": 1, "data": [1] } ],
          "tilesets": [ { "firstgid": 1, "name": "slopes", "image": "slopes.png",
                          "columns": 1, "tilewidth": 16, "tileheight": 16,
            "tiles": [ { "id": 0, "objectgroup": { "objects": [
              { "x": 0, "y": 0, "polygon": [ { "x": 0, "y": 16 }, { "x": 16, "y": 0 }, { "x": 16, "y": 16 } ] },
              { "x": 0, "y": 0, "polyline": [ { "x": 0, "y": 0 }, { "x": 16, "y": 16 } ] },
              { "x": 0, "y": 12, "width": 16, "height": 4 }
            ] } } ] } ]
        }"#;
        let file: MapFile = serde_json::from_str(json).expect("map parses");
        let map = TileMap::from_file(file, "Tile Layer 1", Path::new("")).expect("map is valid");
        let tile = map.tile_at(0, 0).expect("tile present");
        assert_eq!(
            tile.collision_rectangles(),
            &[Rect::new(0.0, 12.0, 16.0, 4.0)]
        );
    }

    #[test]
    fn load_map_rejects_layer_size_mismatch() {
        let path = temp_file_path("mismatch");
        fs::write(
            &path,
            r#"{
              "width": 2, "height": 2, "tilewidth": 16, "tileheight": 16,
              "layers": [ { "name": "Tile Layer 1", "type": "tilelayer",
                            "width": 2, "height": 2, "data": [0, 0, 0] } ],
              "tilesets": []
            }"#,
        )
        .expect("write temp file");

        let err = load_map_from_path(&path, "Tile Layer 1").expect_err("size mismatch should fail");
        assert!(err.contains("has 3 cells, expected 2x2"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_map_rejects_external_tilesets() {
        let path = temp_file_path("external");
        fs::write(
            &path,
            r#"{
              "width": 1, "height": 1, "tilewidth": 16, "tileheight": 16,
              "layers": [ { "name": "Tile Layer 1", "type": "tilelayer",
                            "width": 1, "height": 1, "data": [1] } ],
              "tilesets": [ { "firstgid": 1, "source": "terrain.tsj" } ]
            }"#,
        )
        .expect("write temp file");

        let err = load_map_from_path(&path, "Tile Layer 1").expect_err("external tileset");
        assert!(err.contains("external tileset 'terrain.tsj'"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_map_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_map_from_path(&path, "Tile Layer 1").expect_err("missing file");
        assert!(err.starts_with("Failed to read"));
    }

    #[test]
    fn from_rows_builds_expected_grid() {
        let map = TileMap::from_rows(16, &["..o", "#_="]);
        assert_eq!((map.width, map.height), (3, 2));
        assert!(map.tile_at(0, 0).is_none());
        assert!(map.tile_at(2, 0).expect("deco").collision_rectangles().is_empty());
        assert_eq!(map.tile_at(1, 1).expect("slab").collision_rectangles().len(), 1);
        assert_eq!(map.tile_at(2, 1).expect("double").collision_rectangles().len(), 2);
    }
}
