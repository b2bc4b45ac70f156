//! Integration tests for compressing and expanding whole designs.
//!
//! These exercise the public API end to end: compression, JSON encoding,
//! expansion and validation.

use indexmap::IndexMap;
use stencil::{
    CompressedDesign, CompressionStats, DesignCompressor, DesignNode, GlobalVars, ValidationMode,
    color::Color,
    compressed::CompressedInstance,
    config::{CompressionConfig, GridConfig, OverridePolicy},
    expand,
    geometry::LayoutBox,
    paint::{Effect, EffectKind, Offset, Paint},
    validate_expansion, validate_expansion_with,
};

fn solid(color: &str) -> Vec<Paint> {
    vec![Paint::solid(Color::new(color).expect("valid color"))]
}

fn shadow() -> Effect {
    Effect {
        kind: EffectKind::DropShadow,
        visible: true,
        radius: 4.0,
        color: Some(Color::new("rgba(0, 0, 0, 0.2)").expect("valid color")),
        offset: Some(Offset { x: 0.0, y: 2.0 }),
        spread: Some(0.0),
    }
}

/// A button instance the way design exports deliver it: child ids are scoped
/// to the instance id.
fn button(id: &str, color: &str, label: &str, x: f64) -> DesignNode {
    DesignNode::new(id, "Button", "INSTANCE")
        .with_component_id("10:1")
        .with_fills(solid(color))
        .with_effects(vec![shadow()])
        .with_corner_radius(8.0)
        .with_layout(LayoutBox::new(x, 40.0, 100.0, 50.0))
        .with_children(vec![
            DesignNode::new(format!("I{id};10:2"), "Background", "RECTANGLE")
                .with_strokes(solid("#1F2937"))
                .with_stroke_weight(1.0)
                .with_opacity(0.95),
            DesignNode::new(format!("I{id};10:3"), "Icon", "VECTOR")
                .with_fills(solid("#FFFFFF"))
                .with_stroke_weight(1.5),
            DesignNode::new(format!("I{id};10:4"), "Label", "TEXT")
                .with_text(label)
                .with_fills(solid("#FFFFFF"))
                .with_text_style("style_button"),
        ])
}

fn five_buttons() -> Vec<DesignNode> {
    vec![
        button("1:1", "#2563EB", "Save", 0.0),
        button("1:2", "#2563EB", "Cancel", 110.0),
        button("1:3", "#DC2626", "Delete", 220.0),
        button("1:4", "#16A34A", "Confirm", 330.0),
        button("1:5", "#2563EB", "Save", 440.0),
    ]
}

fn card(id: &str, title: &str) -> DesignNode {
    DesignNode::new(id, "Card", "INSTANCE")
        .with_component_id("20:1")
        .with_fills(solid("#FFFFFF"))
        .with_effects(vec![shadow()])
        .with_corner_radius(12.0)
        .with_children(vec![
            DesignNode::new(format!("I{id};20:2"), "Title", "TEXT")
                .with_text(title)
                .with_text_style("style_heading"),
            DesignNode::new(format!("I{id};20:3"), "Body", "TEXT")
                .with_text("Everything you need to ship a design system, in one place.")
                .with_text_style("style_body"),
        ])
}

/// A page mixing top-level instances, nested instances and plain nodes.
fn landing_page() -> Vec<DesignNode> {
    let toolbar = DesignNode::new("2:1", "Toolbar", "FRAME")
        .with_fills(solid("#F9FAFB"))
        .with_children(vec![
            DesignNode::new("2:2", "Title", "TEXT").with_text("Settings"),
            button("2:3", "#2563EB", "Save", 0.0),
            button("2:4", "#2563EB", "Cancel", 110.0),
            button("2:5", "#DC2626", "Delete", 220.0),
            button("2:6", "#16A34A", "Confirm", 330.0),
            DesignNode::new("2:7", "Spacer", "FRAME").with_children(vec![]),
            button("2:8", "#2563EB", "Save", 440.0),
        ]);

    vec![
        DesignNode::new("0:1", "Header", "FRAME").with_children(vec![toolbar]),
        card("3:1", "Components"),
        DesignNode::new("0:2", "Divider", "LINE").with_strokes(solid("#E5E7EB")),
        card("3:2", "Tokens"),
        card("3:3", "Docs"),
        card("3:4", "Support"),
        DesignNode::new("0:3", "Badge", "INSTANCE").with_component_id("30:1"),
    ]
}

fn compress(nodes: &[DesignNode]) -> CompressedDesign {
    DesignCompressor::default()
        .compress("Test", nodes, &GlobalVars::default())
        .expect("Failed to compress")
}

#[test]
fn test_five_buttons_share_one_component_with_two_slots() {
    let nodes = five_buttons();
    let design = compress(&nodes);

    assert_eq!(design.components.len(), 1);
    let component = &design.components["10:1"];
    assert_eq!(component.slot_ids.len(), 2);
    assert_eq!(component.slots.len(), 2);

    assert_eq!(design.instances.len(), 5);
    for instance in &design.instances {
        assert!(instance.overrides.len() <= 2, "{instance:?}");
    }
    assert!(design.nodes.is_empty());
}

#[test]
fn test_five_buttons_are_placed_on_a_row_grid() {
    let design = compress(&five_buttons());

    assert_eq!(design.grids.len(), 1);
    let grid = &design.grids["grid-0"];
    assert_eq!((grid.columns, grid.rows), (5, 1));
    assert_eq!(grid.gap_x, 10.0);
    assert!(
        design
            .instances
            .iter()
            .all(|instance| instance.layout_data.is_none() && instance.grid_id.is_some())
    );
}

#[test]
fn test_round_trip_restores_every_property() {
    let nodes = landing_page();
    let expanded = expand(&compress(&nodes));

    let report = validate_expansion_with(&nodes, &expanded, ValidationMode::Full);
    assert!(report.is_valid(), "{:?}", report.mismatches());
    assert!(validate_expansion(&nodes, &expanded));
}

#[test]
fn test_color_spelling_survives_round_trip() {
    let nodes = vec![
        button("1:1", "#ff0000", "Save", 0.0),
        button("1:2", "#FF0000", "Save", 110.0),
        button("1:3", "#ff0000", "Save", 220.0),
        button("1:4", "red", "Save", 330.0),
        button("1:5", "#ff0000", "Save", 440.0),
    ];

    let design = compress(&nodes);
    assert_eq!(design.components.len(), 1);

    let expanded = expand(&design);
    assert_eq!(
        serde_json::to_string(&expanded).unwrap(),
        serde_json::to_string(&nodes).unwrap()
    );
}

#[test]
fn test_nested_instances_are_anchored_to_their_container() {
    let design = compress(&landing_page());

    let nested: Vec<&CompressedInstance> = design
        .instances
        .iter()
        .filter(|instance| instance.parent_id.is_some())
        .collect();
    assert_eq!(nested.len(), 5);
    assert!(nested.iter().all(|instance| instance.parent_id.as_deref() == Some("2:1")));
    assert_eq!(nested[4].index, Some(6));

    // The toolbar keeps only its plain children.
    let header = &design.nodes[0];
    assert_eq!(header.children()[0].children().len(), 2);
}

#[test]
fn test_singleton_instances_pass_through() {
    let design = compress(&landing_page());

    assert!(!design.components.contains_key("30:1"));
    assert!(design.nodes.iter().any(|node| node.id == "0:3"));
}

#[test]
fn test_compression_is_idempotent() {
    let nodes = landing_page();
    let first = compress(&nodes);
    let second = compress(&expand(&first));

    assert_eq!(first, second);
}

#[test]
fn test_compression_is_deterministic() {
    let nodes = landing_page();

    let first = serde_json::to_string(&compress(&nodes)).unwrap();
    let second = serde_json::to_string(&compress(&nodes)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_json_encoding_is_self_describing() {
    let nodes = landing_page();
    let design = compress(&nodes);

    let json = serde_json::to_string_pretty(&design).unwrap();
    let decoded: CompressedDesign = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, design);
    assert!(validate_expansion_with(&nodes, &expand(&decoded), ValidationMode::Full).is_valid());
}

#[test]
fn test_orphan_instance_expands_to_nothing() {
    let design = CompressedDesign {
        name: "Orphan".into(),
        instances: vec![CompressedInstance {
            id: "1:1".into(),
            component_id: "missing".into(),
            name: "Ghost".into(),
            visible: true,
            overrides: IndexMap::new(),
            layout_data: None,
            grid_id: None,
            position: None,
            parent_id: None,
            index: None,
        }],
        ..CompressedDesign::default()
    };

    assert!(expand(&design).is_empty());
}

#[test]
fn test_trivial_instances_are_not_worth_a_component() {
    let nodes = vec![
        DesignNode::new("1", "Dot", "INSTANCE").with_component_id("c"),
        DesignNode::new("2", "Dot", "INSTANCE").with_component_id("c"),
    ];
    let design = compress(&nodes);

    assert!(design.components.is_empty());
    assert!(design.instances.is_empty());
    assert_eq!(design.nodes, nodes);
}

#[test]
fn test_all_override_policy_round_trips() {
    let nodes = five_buttons();
    let config = CompressionConfig::default().with_override_policy(OverridePolicy::All);
    let design = DesignCompressor::new(config)
        .compress("Test", &nodes, &GlobalVars::default())
        .unwrap();

    assert!(design.instances.iter().all(|instance| instance.overrides.len() == 2));
    assert!(validate_expansion_with(&nodes, &expand(&design), ValidationMode::Full).is_valid());
}

#[test]
fn test_grid_detection_can_be_disabled() {
    let nodes = five_buttons();
    let config = CompressionConfig::default().with_grid(GridConfig::disabled());
    let design = DesignCompressor::new(config)
        .compress("Test", &nodes, &GlobalVars::default())
        .unwrap();

    assert!(design.grids.is_empty());
    assert!(design.instances.iter().all(|instance| instance.layout_data.is_some()));
    assert!(validate_expansion_with(&nodes, &expand(&design), ValidationMode::Full).is_valid());
}

#[test]
fn test_stats_report_savings() {
    let nodes = landing_page();
    let design = compress(&nodes);
    let stats = CompressionStats::measure(&nodes, &GlobalVars::default(), &design).unwrap();

    assert_eq!(stats.components, 2);
    assert_eq!(stats.instances, 9);
    assert!(stats.compressed_bytes < stats.original_bytes);
    assert!(stats.savings() > 0.0);
}

#[test]
fn test_deeply_nested_design_round_trips() {
    let mut leaf = DesignNode::new("deep:0", "Level", "FRAME").with_children(vec![
        card("9:1", "One"),
        card("9:2", "Two"),
        card("9:3", "Three"),
        card("9:4", "Four"),
    ]);
    for depth in 1..20_000 {
        leaf = DesignNode::new(format!("deep:{depth}"), "Level", "FRAME").with_children(vec![leaf]);
    }
    let nodes = vec![leaf];

    let design = compress(&nodes);
    assert_eq!(design.instances.len(), 4);

    let expanded = expand(&design);
    assert!(validate_expansion_with(&nodes, &expanded, ValidationMode::Full).is_valid());
}

/// An instance wrapping a chain of `depth` frames that ends in a label.
fn tower(id: &str, label: &str, depth: usize) -> DesignNode {
    let mut node = DesignNode::new(format!("I{id};leaf"), "Label", "TEXT").with_text(label);
    for level in (0..depth).rev() {
        node = DesignNode::new(format!("I{id};{level}"), "Level", "FRAME").with_children(vec![node]);
    }
    DesignNode::new(id, "Tower", "INSTANCE")
        .with_component_id("40:1")
        .with_children(vec![node])
}

#[test]
fn test_deep_instances_compress_and_expand() {
    let depth = 20_000;
    let nodes = vec![
        tower("7:1", "One", depth),
        tower("7:2", "Two", depth),
        tower("7:3", "Three", depth),
    ];

    let design = compress(&nodes);
    assert_eq!(design.components.len(), 1);
    assert_eq!(design.instances.len(), 3);

    let component = &design.components["40:1"];
    assert_eq!(component.template.node_count(), depth + 2);
    assert_eq!(component.slot_ids, ["s0"]);

    let stats = CompressionStats::measure(&nodes, &GlobalVars::default(), &design).unwrap();
    assert!(stats.compressed_bytes < stats.original_bytes);

    let expanded = expand(&design);
    assert!(validate_expansion_with(&nodes, &expanded, ValidationMode::Full).is_valid());
    assert!(design.clone() == design);
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    const COLORS: [&str; 3] = ["#2563EB", "#DC2626", "#16A34A"];
    const LABELS: [&str; 4] = ["Save", "Cancel", "Delete", "Confirm"];

    fn arb_button() -> impl Strategy<Value = (usize, usize, Option<u8>, bool)> {
        (
            0..COLORS.len(),
            0..LABELS.len(),
            proptest::option::of(0u8..=100),
            any::<bool>(),
        )
    }

    fn build(specs: &[(usize, usize, Option<u8>, bool)]) -> Vec<DesignNode> {
        specs
            .iter()
            .enumerate()
            .map(|(i, (color, label, opacity, visible))| {
                let mut node = button(&format!("5:{i}"), COLORS[*color], LABELS[*label], i as f64 * 130.0)
                    .with_visible(*visible);
                if let Some(opacity) = opacity {
                    node = node.with_opacity(f64::from(*opacity) / 100.0);
                }
                node
            })
            .collect()
    }

    proptest! {
        #[test]
        fn compress_then_expand_is_lossless(specs in prop::collection::vec(arb_button(), 1..8)) {
            let nodes = build(&specs);
            let expanded = expand(&compress(&nodes));

            let report = validate_expansion_with(&nodes, &expanded, ValidationMode::Full);
            prop_assert!(report.is_valid(), "{:?}", report.mismatches());
        }

        #[test]
        fn recompressing_an_expansion_is_stable(specs in prop::collection::vec(arb_button(), 1..8)) {
            let nodes = build(&specs);
            let first = compress(&nodes);
            let second = compress(&expand(&first));

            prop_assert_eq!(first, second);
        }
    }
}
