//! JSON item catalog.
//!
//! Every item the simulation can produce is described by one JSON file:
//!
//! ```json
//! {
//!   "item_id": "apple",
//!   "display_name": "Apple",
//!   "description": "A crisp red apple.",
//!   "preset_type": "consumable",
//!   "parameters": { "hunger_restore": 3, "is_plantable": true, "plant": "apple_tree" }
//! }
//! ```
//!
//! `preset_type` selects how `parameters` is read. Unknown preset types fall
//! back to `default`. A consumable whose parameters set `is_plantable` is a
//! fruit.
//!
//! The catalog is the simulation's [`Materializer`]: references are either
//! bare ids or resource paths such as `res://items/apple.json`, whose file
//! stem is the id.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use snowglobe_agents::{ConsumableDefinition, FruitDefinition, WeaponDefinition};
use snowglobe_types::{ItemCategory, ItemSpec};
use snowglobe_world::{Materializer, PlantDefinition};
use tracing::{debug, info, warn};

/// Weight of items whose preset carries no weight of its own.
pub const DEFAULT_ITEM_WEIGHT: f32 = 0.1;

/// Errors that can occur when loading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to read a catalog file or directory.
    #[error("failed to read catalog: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A file was not valid item JSON.
    #[error("failed to parse item JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// An item had no usable id.
    #[error("item has no id")]
    MissingId,
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Template category named by `preset_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetType {
    /// Weapons and tools.
    Weapon,
    /// Food, potions, and fruit.
    Consumable,
    /// Plants.
    Plant,
    /// Wearable equipment.
    Equipment,
    /// Building blocks.
    Block,
    /// Anything else.
    #[default]
    #[serde(other)]
    Default,
}

/// The on-disk shape of an item file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemFile {
    /// Item id. May be empty when loading from a directory, in which case
    /// the file stem is used.
    #[serde(default)]
    pub item_id: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Template category.
    #[serde(default)]
    pub preset_type: PresetType,
    /// Preset-specific parameters.
    #[serde(default)]
    pub parameters: Value,
}

/// Typed parameters of a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// A weapon.
    Weapon(WeaponDefinition),
    /// A consumable.
    Consumable(ConsumableDefinition),
    /// A plantable consumable.
    Fruit(FruitDefinition),
    /// A plant species.
    Plant(PlantDefinition),
    /// Equipment, blocks and everything else.
    Other {
        /// Weight of one unit.
        weight: f32,
    },
}

impl ItemKind {
    /// Inventory category for this kind.
    pub const fn category(&self) -> ItemCategory {
        match self {
            Self::Weapon(_) => ItemCategory::Weapon,
            Self::Consumable(_) => ItemCategory::Consumable,
            Self::Fruit(_) => ItemCategory::Fruit,
            Self::Plant(_) => ItemCategory::Plant,
            Self::Other { .. } => ItemCategory::Unknown,
        }
    }

    /// Weight of one unit.
    pub const fn weight(&self) -> f32 {
        match self {
            Self::Weapon(w) => w.weight,
            Self::Consumable(c) => c.weight,
            Self::Fruit(f) => f.consumable.weight,
            Self::Plant(p) => p.weight,
            Self::Other { weight } => *weight,
        }
    }
}

/// A loaded catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Item id.
    pub item_id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Template category the entry was loaded with.
    pub preset: PresetType,
    /// Typed parameters.
    pub kind: ItemKind,
}

impl CatalogEntry {
    /// Build an entry from a parsed item file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingId`] if the file has no id and
    /// [`CatalogError::Json`] if the parameters do not fit the preset.
    pub fn from_file(file: ItemFile) -> Result<Self, CatalogError> {
        if file.item_id.is_empty() {
            return Err(CatalogError::MissingId);
        }
        let params = if file.parameters.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            file.parameters
        };

        let kind = match file.preset_type {
            PresetType::Weapon => ItemKind::Weapon(serde_json::from_value(params)?),
            PresetType::Consumable => {
                let plantable = params
                    .get("is_plantable")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if plantable {
                    ItemKind::Fruit(serde_json::from_value(params)?)
                } else {
                    ItemKind::Consumable(serde_json::from_value(params)?)
                }
            }
            PresetType::Plant => {
                let mut plant: PlantDefinition = serde_json::from_value(params)?;
                plant.id.clone_from(&file.item_id);
                if plant.display_name.is_empty() {
                    plant.display_name.clone_from(&file.display_name);
                }
                ItemKind::Plant(plant)
            }
            PresetType::Equipment | PresetType::Block | PresetType::Default => {
                #[allow(clippy::cast_possible_truncation)]
                let weight = params
                    .get("weight")
                    .and_then(Value::as_f64)
                    .map_or(DEFAULT_ITEM_WEIGHT, |w| w as f32);
                ItemKind::Other { weight }
            }
        };

        let display_name = if file.display_name.is_empty() {
            file.item_id.clone()
        } else {
            file.display_name
        };

        Ok(Self {
            item_id: file.item_id,
            display_name,
            description: file.description,
            preset: file.preset_type,
            kind,
        })
    }

    /// The concrete item handed to inventories and the ground.
    pub fn to_item(&self) -> ItemSpec {
        let tool = match &self.kind {
            ItemKind::Weapon(w) => w.tool,
            _ => None,
        };
        ItemSpec {
            id: self.item_id.clone(),
            display_name: self.display_name.clone(),
            unit_weight: self.kind.weight(),
            category: self.kind.category(),
            tool,
        }
    }
}

/// The id named by a reference: the file stem of a path, or the reference
/// itself.
pub fn reference_id(reference: &str) -> &str {
    Path::new(reference)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(reference)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Every known item, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ItemCatalog {
    /// An empty catalog.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Load every `*.json` file in `dir`.
    ///
    /// Files that fail to parse are logged and skipped. Files without an
    /// `item_id` use their file stem.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the directory cannot be read.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            match load_file(&path) {
                Ok(entry) => {
                    debug!(item = %entry.item_id, path = %path.display(), "Loaded catalog item");
                    catalog.insert(entry);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping catalog file"),
            }
        }
        info!(dir = %dir.display(), items = catalog.len(), "Item catalog loaded");
        Ok(catalog)
    }

    /// Parse and add one item from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] for malformed JSON or parameters and
    /// [`CatalogError::MissingId`] if the item has no id.
    pub fn insert_json(&mut self, json: &str) -> Result<&CatalogEntry, CatalogError> {
        let file: ItemFile = serde_json::from_str(json)?;
        let entry = CatalogEntry::from_file(file)?;
        let id = entry.item_id.clone();
        self.insert(entry);
        self.entries.get(&id).ok_or(CatalogError::MissingId)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.item_id.clone(), entry);
    }

    /// Look up an entry by id or reference.
    pub fn get(&self, reference: &str) -> Option<&CatalogEntry> {
        self.entries.get(reference_id(reference))
    }

    /// Weapon parameters of an item.
    pub fn weapon(&self, reference: &str) -> Option<&WeaponDefinition> {
        match &self.get(reference)?.kind {
            ItemKind::Weapon(w) => Some(w),
            _ => None,
        }
    }

    /// Consumable parameters of an item, including fruit.
    pub fn consumable(&self, reference: &str) -> Option<&ConsumableDefinition> {
        match &self.get(reference)?.kind {
            ItemKind::Consumable(c) => Some(c),
            ItemKind::Fruit(f) => Some(&f.consumable),
            _ => None,
        }
    }

    /// Fruit parameters of an item.
    pub fn fruit(&self, reference: &str) -> Option<&FruitDefinition> {
        match &self.get(reference)?.kind {
            ItemKind::Fruit(f) => Some(f),
            _ => None,
        }
    }

    /// Plant species of an item.
    pub fn plant(&self, reference: &str) -> Option<&PlantDefinition> {
        match &self.get(reference)?.kind {
            ItemKind::Plant(p) => Some(p),
            _ => None,
        }
    }

    /// Every entry, ordered by id.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Materializer for ItemCatalog {
    fn materialize(&self, reference: &str) -> Option<ItemSpec> {
        let item = self.get(reference).map(CatalogEntry::to_item);
        if item.is_none() {
            warn!(reference, "Unknown catalog reference");
        }
        item
    }
}

fn load_file(path: &Path) -> Result<CatalogEntry, CatalogError> {
    let contents = std::fs::read_to_string(path)?;
    let mut file: ItemFile = serde_json::from_str(&contents)?;
    if file.item_id.is_empty() {
        file.item_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_owned)
            .ok_or(CatalogError::MissingId)?;
    }
    CatalogEntry::from_file(file)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use snowglobe_types::{PlantKind, ToolKind};

    use super::*;

    const APPLE: &str = r#"{
        "item_id": "apple",
        "display_name": "Apple",
        "preset_type": "consumable",
        "parameters": {"hunger_restore": 3, "weight": 0.2, "is_plantable": true, "plant": "res://items/apple_tree.json"}
    }"#;

    const AXE: &str = r#"{
        "item_id": "stone_axe",
        "preset_type": "weapon",
        "parameters": {"damage": 6, "weight": 3.0, "tool": "axe"}
    }"#;

    const TREE: &str = r#"{
        "item_id": "apple_tree",
        "display_name": "Apple Tree",
        "preset_type": "plant",
        "parameters": {"kind": "tree", "growth_stages": 4, "has_fruit": true, "fruit_item": "apple"}
    }"#;

    #[test]
    fn plantable_consumable_is_fruit() {
        let mut catalog = ItemCatalog::new();
        catalog.insert_json(APPLE).unwrap();
        let fruit = catalog.fruit("apple").unwrap();
        assert_eq!(fruit.consumable.hunger_restore, 3);
        assert_eq!(catalog.consumable("apple").unwrap().hunger_restore, 3);
        let item = catalog.materialize("apple").unwrap();
        assert_eq!(item.category, ItemCategory::Fruit);
        assert!((item.unit_weight - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn weapons_carry_their_tool() {
        let mut catalog = ItemCatalog::new();
        catalog.insert_json(AXE).unwrap();
        let item = catalog.materialize("stone_axe").unwrap();
        assert_eq!(item.tool, Some(ToolKind::Axe));
        assert_eq!(item.category, ItemCategory::Weapon);
        assert_eq!(item.display_name, "stone_axe");
        assert_eq!(catalog.weapon("stone_axe").unwrap().damage, 6);
    }

    #[test]
    fn plants_take_their_id_from_the_entry() {
        let mut catalog = ItemCatalog::new();
        catalog.insert_json(TREE).unwrap();
        let plant = catalog.plant("res://items/apple_tree.json").unwrap();
        assert_eq!(plant.id, "apple_tree");
        assert_eq!(plant.display_name, "Apple Tree");
        assert_eq!(plant.kind, PlantKind::Tree);
    }

    #[test]
    fn unknown_preset_falls_back_to_default() {
        let mut catalog = ItemCatalog::new();
        let entry = catalog
            .insert_json(r#"{"item_id": "pebble", "preset_type": "gizmo", "parameters": {"weight": 0.5}}"#)
            .unwrap();
        assert_eq!(entry.preset, PresetType::Default);
        assert_eq!(entry.kind, ItemKind::Other { weight: 0.5 });
    }

    #[test]
    fn references_resolve_by_file_stem() {
        assert_eq!(reference_id("res://items/apple.json"), "apple");
        assert_eq!(reference_id("apple"), "apple");
        let catalog = ItemCatalog::new();
        assert!(catalog.materialize("res://items/apple.json").is_none());
    }

    #[test]
    fn missing_id_is_rejected() {
        let mut catalog = ItemCatalog::new();
        assert!(matches!(
            catalog.insert_json(r#"{"preset_type": "block"}"#),
            Err(CatalogError::MissingId)
        ));
        assert!(matches!(catalog.insert_json("not json"), Err(CatalogError::Json { .. })));
    }

    #[test]
    fn load_dir_skips_malformed_files() {
        let dir = std::env::temp_dir().join(format!("snowglobe-catalog-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("apple.json"), APPLE).unwrap();
        std::fs::write(dir.join("broken.json"), "{ nope").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        std::fs::write(
            dir.join("rock.json"),
            r#"{"preset_type": "block", "parameters": {"weight": 4.0}}"#,
        )
        .unwrap();

        let catalog = ItemCatalog::load_dir(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("apple").is_some());
        assert!(catalog.get("rock").is_some());
    }
}
