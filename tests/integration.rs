//! Integration tests for inkboard-layout.
//!
//! These tests load YAML dashboards through the public API and check the
//! resolved geometry, styles and event behavior from outside the crate.

use inkboard_layout::dashboard::Dashboard;
use inkboard_layout::dom::NodeId;
use inkboard_layout::geometry::{Region, Size};
use inkboard_layout::style::Color;
use inkboard_layout::surface::AssetInfo;
use inkboard_layout::testing::{
    geometry_to_string, visible_to_string, FixedAssets, RecordingSurface,
};
use inkboard_layout::Error;
use pretty_assertions::assert_eq;

fn assets() -> FixedAssets {
    FixedAssets::accept_all(AssetInfo::new(24, 24))
}

fn load(yaml: &str, width: i32, height: i32) -> Dashboard<RecordingSurface> {
    Dashboard::load(yaml, RecordingSurface::new(width, height), &assets()).unwrap()
}

fn node(dashboard: &Dashboard<RecordingSurface>, id: &str) -> NodeId {
    dashboard.lookup(id).unwrap_or_else(|| panic!("no element '{id}'"))
}

fn tile(dashboard: &Dashboard<RecordingSurface>, index: usize) -> NodeId {
    dashboard.tabs().get(index).unwrap().tile.unwrap()
}

/// The `name` part of a navigation tile.
fn tile_name(dashboard: &Dashboard<RecordingSurface>, index: usize) -> NodeId {
    let tile = tile(dashboard, index);
    dashboard.tree().children(tile)[1]
}

const BREAKFAST: &str = "\
styles:
  tokens:
    colors:
      accent: '#2c6bb0'
layouts:
  - id: breakfast
    type: GridLayout
    columns: 2
    outer_margins: 4
    inner_margins: 2
    elements:
      - {type: Button, id: eggs, text: Eggs, font_color: accent}
      - {type: Icon, id: coffee, icon: mdi:coffee}
      - type: Tile
        id: toast
        icon: mdi:bread-slice
        text: Toast
        orientation: horizontal
      - {type: Picture, id: plate, picture: plate.png, fit: cover}
  - id: elements
    type: Button
    text: Elements
popups:
  - id: settings
    title: Settings
    layout:
      type: GridLayout
      columns: 2
      elements:
        - {type: Button, id: dark-mode, text: Dark}
        - {type: Button, id: light-mode, text: Light}
  - id: about
    layout: {type: Button, text: About}
main_tabs:
  tabs:
    - {element: breakfast, name: Breakfast, icon: mdi:food}
    - {element: elements, name: Elements, icon: mdi:atom}
  active_properties:
    background_color: black
    element_properties:
      name: {font_color: white}
  inactive_properties:
    background_color: white
    element_properties:
      name: {font_color: black}
";

// ---------------------------------------------------------------------------
// Grid solving
// ---------------------------------------------------------------------------

#[test]
fn test_track_widths_sum_to_usable_size() {
    let dashboard = load(
        "layouts:\n  - id: grid\n    type: GridLayout\n    rows: 2\n    columns: 3\n    outer_margins: 5\n    inner_margins: 3\n    elements: [{type: Icon, id: a}, {type: Icon, id: b}, {type: Icon, id: c}, {type: Icon, id: d}]\n",
        203,
        101,
    );
    let snapshot = dashboard.snapshot();
    let children = dashboard.tree().children(node(&dashboard, "grid")).to_vec();
    let widths: i32 = children[..3]
        .iter()
        .map(|&c| snapshot.region(c).unwrap().width)
        .sum();
    assert_eq!(widths + 2 * 3 + 2 * 5, 203);

    let first_column_heights = snapshot.region(children[0]).unwrap().height
        + snapshot.region(children[3]).unwrap().height;
    assert_eq!(first_column_heights + 3 + 2 * 5, 101);
}

#[test]
fn test_forty_sixty_columns() {
    let dashboard = load(
        "layouts:\n  - id: grid\n    type: GridLayout\n    rows: 1\n    columns: 2\n    column_sizes: [\"w*0.4\", \"w*0.6\"]\n    elements: [{type: Button, id: left}, {type: Button, id: right}]\n",
        100,
        50,
    );
    let snapshot = dashboard.snapshot();
    assert_eq!(snapshot.region(node(&dashboard, "left")), Some(Region::new(0, 0, 40, 50)));
    assert_eq!(snapshot.region(node(&dashboard, "right")), Some(Region::new(40, 0, 60, 50)));
}

#[test]
fn test_margins_wider_than_container_overflow() {
    let err = Dashboard::load(
        "layouts:\n  - id: grid\n    type: GridLayout\n    outer_margins: 25\n    elements: [{type: Button}]\n",
        RecordingSurface::new(40, 100),
        &assets(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::LayoutOverflow { .. }), "{err}");
    assert_eq!(err.element(), Some("GridLayout#grid"));
}

#[test]
fn test_every_box_is_inside_its_parent() {
    let dashboard = load(BREAKFAST, 320, 240);
    let snapshot = dashboard.snapshot();
    for (node, region) in snapshot.geometry().iter() {
        if let Some(parent) = dashboard.tree().parent(node) {
            let outer = snapshot.region(parent).unwrap();
            assert!(
                outer.contains_region(region),
                "{} escapes its parent",
                dashboard.tree().describe(node)
            );
        }
    }
}

#[test]
fn test_visible_tree_snapshot() {
    let mut dashboard = load(
        "layouts:\n  - {id: breakfast, type: Button, text: Eggs}\n  - {id: elements, type: Button, text: Atoms}\nmain_tabs:\n  navigation_size: 20\n  tabs:\n    - {element: breakfast, name: Breakfast, icon: mdi:food}\n    - {element: elements, name: Elements}\n",
        200,
        100,
    );
    insta::assert_snapshot!(visible_to_string(dashboard.tree(), &dashboard.snapshot()), @r"
    TabPages 0,0 200x100
      GridLayout.navigation 0,80 200x20
        Tile.tab 0,80 100x20
          Icon.icon 0,80 100x12
          Button.name 0,92 100x8
        Tile.tab 100,80 100x20
          Icon.icon 100,80 100x12
          Button.name 100,92 100x8
      Button#breakfast 0,0 200x80
    ");

    dashboard.select_tab(1).unwrap();
    let dump = visible_to_string(dashboard.tree(), &dashboard.snapshot());
    assert_eq!(dump.lines().last(), Some("  Button#elements 0,0 200x80"));
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

#[test]
fn test_style_resolution_is_idempotent() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    let before = dashboard.snapshot();

    dashboard.surface_mut().set_size(Size::new(640, 480));
    dashboard.resize().unwrap();
    dashboard.surface_mut().set_size(Size::new(320, 240));
    dashboard.resize().unwrap();
    let after = dashboard.snapshot();

    assert_eq!(after.generation(), before.generation() + 2);
    for (node, _) in dashboard.tree().iter() {
        assert_eq!(after.style(node), before.style(node));
        assert_eq!(after.region(node), before.region(node));
        assert_eq!(after.content(node), before.content(node));
    }
}

#[test]
fn test_tokens_resolve_to_colors() {
    let dashboard = load(BREAKFAST, 320, 240);
    let eggs = dashboard.snapshot().style(node(&dashboard, "eggs")).cloned().unwrap();
    assert_eq!(eggs.font_color, Color::rgb(0x2c, 0x6b, 0xb0));
    assert_eq!(eggs.text.as_deref(), Some("Eggs"));
    assert_eq!(eggs.background_color, Color::TRANSPARENT);
}

#[test]
fn test_variant_overrides_follow_selection() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    let font = |d: &Dashboard<RecordingSurface>, index| {
        d.snapshot().style(tile_name(d, index)).unwrap().font_color
    };
    assert_eq!(font(&dashboard, 0), Color::WHITE);
    assert_eq!(font(&dashboard, 1), Color::BLACK);

    dashboard.select_tab(1).unwrap();
    assert_eq!(font(&dashboard, 0), Color::BLACK);
    assert_eq!(font(&dashboard, 1), Color::WHITE);

    // Overrides never leak onto same-named elements outside the tiles.
    let eggs = dashboard.snapshot().style(node(&dashboard, "eggs")).cloned().unwrap();
    assert_eq!(eggs.background_color, Color::TRANSPARENT);
}

#[test]
fn test_tile_restyle_round_trip_is_stable() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    let before = dashboard.snapshot();
    dashboard.select_tab(1).unwrap();
    dashboard.select_tab(0).unwrap();
    let after = dashboard.snapshot();
    for index in 0..2 {
        for node in dashboard.tree().walk_depth_first(tile(&dashboard, index)) {
            assert_eq!(after.style(node), before.style(node));
        }
    }
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[test]
fn test_selecting_elements_tab() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    assert!(dashboard.select_tab(1).unwrap());
    let snapshot = dashboard.snapshot();
    assert_eq!(snapshot.page(), Some(node(&dashboard, "elements")));
    assert_eq!(dashboard.tabs().current_tab().unwrap().name, "Elements");

    let dirty = dashboard.surface().dirty_regions().len();
    assert!(!dashboard.select_tab(1).unwrap());
    assert_eq!(dashboard.snapshot().generation(), snapshot.generation());
    assert_eq!(dashboard.surface().dirty_regions().len(), dirty);
}

#[test]
fn test_tab_change_dirty_region_covers_page_and_tiles() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    dashboard.surface_mut().take_dirty();
    dashboard.select_tab(1).unwrap();

    let snapshot = dashboard.snapshot();
    let dirty = dashboard.surface().dirty_regions().to_vec();
    assert_eq!(dirty.len(), 1);
    let page = snapshot.region(node(&dashboard, "elements")).unwrap();
    assert!(dirty[0].contains_region(page));
    for index in 0..2 {
        assert!(dirty[0].contains_region(snapshot.region(tile(&dashboard, index)).unwrap()));
    }
}

#[test]
fn test_unknown_tab_name() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    let err = dashboard.select_tab_by_name("Lunch").unwrap_err();
    assert!(matches!(err, Error::ConfigurationSchema { .. }));
    assert_eq!(dashboard.tabs().current(), 0);
}

// ---------------------------------------------------------------------------
// Popups
// ---------------------------------------------------------------------------

#[test]
fn test_popup_conflict_keeps_base_geometry() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    let base = node(&dashboard, "breakfast");
    let before = geometry_to_string(dashboard.tree(), dashboard.snapshot().geometry(), base);

    dashboard.open_popup("settings").unwrap();
    let err = dashboard.open_popup("about").unwrap_err();
    assert!(matches!(err, Error::PopupConflict { .. }));
    assert_eq!(dashboard.snapshot().active_popup(), Some("settings"));

    let after = geometry_to_string(dashboard.tree(), dashboard.snapshot().geometry(), base);
    assert_eq!(after, before);
}

#[test]
fn test_popup_geometry_is_independent_of_tabs() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    let popup = dashboard.popups().node("settings").unwrap();
    let dump = |d: &Dashboard<RecordingSurface>| {
        geometry_to_string(d.tree(), d.snapshot().geometry(), popup)
    };
    let first = dump(&dashboard);
    dashboard.select_tab(1).unwrap();
    dashboard.open_popup("settings").unwrap();
    assert_eq!(dump(&dashboard), first);

    insta::assert_snapshot!(first, @r"
    PopupMenu#settings 32,48 256x144
      Button.title 32,48 256x22
      GridLayout 32,70 256x122
        Button#dark-mode 32,70 128x122
        Button#light-mode 160,70 128x122
    ");
}

#[test]
fn test_popup_open_and_close_report_popup_box() {
    let mut dashboard = load(BREAKFAST, 320, 240);
    dashboard.surface_mut().take_dirty();
    let popup = dashboard.popups().node("about").unwrap();
    let region = dashboard.snapshot().region(popup).unwrap();

    assert!(dashboard.open_popup("about").unwrap());
    assert!(dashboard.close_popup());
    assert_eq!(dashboard.surface().dirty_regions(), &[region, region]);
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[test]
fn test_picture_cover_fills_its_box() {
    let assets = FixedAssets::accept_all(AssetInfo::new(24, 24))
        .with("plate.png", AssetInfo::new(400, 100));
    let dashboard = Dashboard::load(BREAKFAST, RecordingSurface::new(320, 240), &assets).unwrap();
    let plate = node(&dashboard, "plate");
    let snapshot = dashboard.snapshot();
    let area = snapshot.region(plate).unwrap();
    let content = snapshot.content(plate).unwrap();
    assert_eq!(content.visible, area);
    assert!(content.image.width >= area.width);
    assert!(content.image.height >= area.height);
}

#[test]
fn test_unresolvable_icon_fails_load() {
    let assets = FixedAssets::new().with("mdi:food", AssetInfo::new(24, 24));
    let err = Dashboard::load(BREAKFAST, RecordingSurface::new(320, 240), &assets)
        .err()
        .unwrap();
    assert!(matches!(err, Error::ConfigurationSchema { .. }));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_templates_expand_into_elements() {
    let dashboard = load(
        "templates:\n  labelled:\n    defaults:\n      color: black\n    element:\n      type: Button\n      id: !tmp_var id\n      text: !tmp_var label\n      font_color: !tmp_var color\nlayouts:\n  - id: home\n    type: GridLayout\n    columns: 2\n    elements:\n      - {type: 'template:labelled', id: one, label: One}\n      - {type: 'template:labelled', id: two, label: Two, color: red}\n",
        200,
        100,
    );
    let snapshot = dashboard.snapshot();
    let one = snapshot.style(node(&dashboard, "one")).unwrap();
    let two = snapshot.style(node(&dashboard, "two")).unwrap();
    assert_eq!(one.text.as_deref(), Some("One"));
    assert_eq!(one.font_color, Color::BLACK);
    assert_eq!(two.font_color, Color::rgb(255, 0, 0));
}

#[test]
fn test_reference_cycle_is_rejected() {
    let err = Dashboard::load(
        "layouts:\n  - {id: a, type: GridLayout, elements: [b]}\nelements:\n  - {id: b, type: GridLayout, elements: [a]}\n",
        RecordingSurface::new(100, 100),
        &assets(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::ConfigurationSchema { .. }));
    assert!(err.to_string().contains("cycle"), "{err}");
}

#[test]
fn test_duplicate_identifier_is_rejected() {
    let err = Dashboard::load(
        "elements:\n  - {id: clock, type: Button}\n  - {id: clock, type: Icon}\nlayouts:\n  - {id: home, type: Button}\n",
        RecordingSurface::new(100, 100),
        &assets(),
    )
    .err()
    .unwrap();
    assert_eq!(err.element(), Some("clock"));
    assert_eq!(err.property(), Some("id"));
}

#[test]
fn test_bad_expression_names_element() {
    let err = Dashboard::load(
        "layouts:\n  - id: home\n    type: GridLayout\n    outer_margins: \"w*0.1 +\"\n",
        RecordingSurface::new(100, 100),
        &assets(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::Expression { .. }));
    assert_eq!(err.element(), Some("GridLayout#home"));
    assert_eq!(err.property(), Some("outer_margins"));
}
