//! End-to-end tests: paint gestures, atlas compaction, and undo/redo wired
//! together the way an embedding editor uses them.

use glam::{IVec2, Vec2};
use tilepaint::prelude::*;
use tilepaint::{Pixel, Tileset};
use uuid::Uuid;

const RED: Pixel = [255, 0, 0, 255];
const GREEN: Pixel = [0, 255, 0, 255];

/// The undoable actions an embedding editor would configure.
#[derive(Debug, Clone)]
enum EditorAction {
    RemoveTile { gid: u32 },
    RestoreProject { tileset: Tileset, layers: Vec<Layer> },
}

impl HistoryAction for EditorAction {
    fn kind(&self) -> &'static str {
        match self {
            EditorAction::RemoveTile { .. } => "remove_tile",
            EditorAction::RestoreProject { .. } => "restore_project",
        }
    }
}

type Snapshot = (Tileset, Vec<Layer>);

fn apply(project: &mut Project, action: &EditorAction) {
    match action {
        EditorAction::RemoveTile { gid } => {
            project.delete_tile(*gid).unwrap();
        }
        EditorAction::RestoreProject { tileset, layers } => {
            project.tileset = tileset.clone();
            project.layers = layers.clone();
        }
    }
}

fn history() -> HistoryEngine<Project, EditorAction, Snapshot> {
    let recipes = RecipeTable::new().register(
        "remove_tile",
        |project: &Project| (project.tileset.clone(), project.layers.clone()),
        |_action, before: &Snapshot| EditorAction::RestoreProject {
            tileset: before.0.clone(),
            layers: before.1.clone(),
        },
    );
    HistoryEngine::new(recipes)
}

fn project_with_layer() -> (Project, Uuid) {
    let tileset = Tileset::new("terrain".to_string(), 8, 8, 2).unwrap();
    let mut project = Project::new(tileset);
    let layer = Layer::new_tile_layer("Ground".to_string(), 4, 4);
    let id = layer.id;
    project.add_layer(layer);
    (project, id)
}

/// Paint one dot into a cell and commit, minting a gid if the cell is empty.
fn paint_cell(project: &mut Project, layer_id: Uuid, cell: (f32, f32), color: Pixel) -> Option<u32> {
    let mut editor = PixelEditor::new();
    let mut visible = image::RgbaImage::new(32, 32);
    editor
        .begin(project, layer_id, Vec2::new(cell.0 * 8.0 + 1.0, cell.1 * 8.0 + 1.0))
        .unwrap();
    editor
        .update(BrushOp::Point { pos: IVec2::new(2, 2), size: 2, color }, &mut visible)
        .unwrap();
    editor.commit(project).unwrap().minted_gid
}

#[test]
fn test_paint_then_delete_then_undo_round_trip() {
    let (mut project, layer_id) = project_with_layer();

    let first = paint_cell(&mut project, layer_id, (0.0, 0.0), RED);
    let second = paint_cell(&mut project, layer_id, (1.0, 0.0), GREEN);
    assert_eq!(first, Some(2));
    assert_eq!(second, Some(3));

    let painted = project.clone();
    let mut history = history();

    history.dispatch(&mut project, EditorAction::RemoveTile { gid: 2 }, apply);
    assert_eq!(project.tileset.tile_count, 2);
    let layer = project.layer(layer_id).unwrap();
    assert_eq!(layer.gid_at(0, 0), None);
    assert_eq!(layer.gid_at(1, 0), Some(2));

    // Undo restores the painted state exactly.
    assert!(history.undo(&mut project, apply));
    assert_eq!(project, painted);

    // Redo removes the tile again; undo/redo keeps reproducing both states.
    assert!(history.redo(&mut project, apply));
    let removed = project.clone();
    assert!(history.undo(&mut project, apply));
    assert_eq!(project, painted);
    assert!(history.redo(&mut project, apply));
    assert_eq!(project, removed);
}

#[test]
fn test_interrupted_gesture_is_invisible_to_persistence() {
    let (mut project, layer_id) = project_with_layer();
    paint_cell(&mut project, layer_id, (2.0, 2.0), RED);

    let before = serde_json::to_value(&project).unwrap();

    // Press and drag without ever releasing.
    let mut editor = PixelEditor::new();
    let mut visible = image::RgbaImage::new(32, 32);
    editor.begin(&project, layer_id, Vec2::new(17.0, 17.0)).unwrap();
    editor
        .update(
            BrushOp::Line { from: IVec2::new(0, 0), to: IVec2::new(7, 7), size: 1, color: GREEN },
            &mut visible,
        )
        .unwrap();
    editor
        .update(BrushOp::Brightness { delta: 30 }, &mut visible)
        .unwrap();
    editor.cancel();

    assert_eq!(serde_json::to_value(&project).unwrap(), before);
}

#[test]
fn test_commit_blob_matches_atlas_state() {
    let (mut project, layer_id) = project_with_layer();

    let mut editor = PixelEditor::new();
    let mut visible = image::RgbaImage::new(32, 32);
    editor.begin(&project, layer_id, Vec2::new(1.0, 1.0)).unwrap();
    editor
        .update(BrushOp::Fill { pos: IVec2::new(0, 0), color: RED }, &mut visible)
        .unwrap();
    let outcome = editor.commit(&mut project).unwrap();

    // The blob handed to the persistence boundary is the atlas as committed.
    assert_eq!(outcome.atlas_png.unwrap(), project.tileset.encode().unwrap());
}

#[test]
fn test_import_builds_layer_data_and_survives_serde() {
    let (mut project, layer_id) = project_with_layer();

    // A source bitmap two tiles wide: duplicate content left and right.
    let tile = image::RgbaImage::from_pixel(8, 8, image::Rgba([5, 5, 5, 255]));
    let mut source = image::RgbaImage::new(16, 8);
    image::imageops::replace(&mut source, &tile, 0, 0);
    image::imageops::replace(&mut source, &tile, 8, 0);

    let import = project.tileset.import_bitmap(&source).unwrap();
    assert_eq!(import.appended, 1);

    let layer = project.layer_mut(layer_id).unwrap();
    for (i, gid) in import.mapping.iter().enumerate() {
        layer.set_gid(i as u32 % import.columns, i as u32 / import.columns, *gid);
    }
    assert_eq!(layer.gid_at(0, 0), Some(2));
    assert_eq!(layer.gid_at(1, 0), Some(2));
    assert!(project.validate().is_ok());

    let json = serde_json::to_string(&project).unwrap();
    let back: Project = serde_json::from_str(&json).unwrap();
    assert_eq!(back, project);
}

#[test]
fn test_project_clear_with_history_reset() {
    let (mut project, layer_id) = project_with_layer();
    paint_cell(&mut project, layer_id, (0.0, 0.0), RED);

    let mut history = history();
    history.dispatch(&mut project, EditorAction::RemoveTile { gid: 1 }, apply);
    assert!(history.can_undo());

    // The destructive lifecycle bypasses the stacks entirely.
    project.clear();
    history.clear();

    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert!(project.layers.is_empty());
    assert_eq!(project.tileset.tile_count, 1);
}
