//! Example: Compressing a row of buttons
//!
//! This example builds a small design programmatically, compresses it,
//! prints the compact JSON and checks that expansion restores the original.

use stencil::{
    CompressionStats, DesignCompressor, DesignNode, GlobalVars, ValidationMode,
    color::Color,
    config::CompressionConfig,
    expand,
    geometry::LayoutBox,
    paint::Paint,
    validate_expansion_with,
};

fn button(id: &str, color: &str, label: &str, x: f64) -> Result<DesignNode, Box<dyn std::error::Error>> {
    let fill = vec![Paint::solid(Color::new(color)?)];
    let white = vec![Paint::solid(Color::new("#FFFFFF")?)];

    Ok(DesignNode::new(id, "Button", "INSTANCE")
        .with_component_id("10:1")
        .with_fills(fill)
        .with_corner_radius(8.0)
        .with_layout(LayoutBox::new(x, 0.0, 120.0, 40.0))
        .with_children(vec![
            DesignNode::new(format!("I{id};10:2"), "Icon", "VECTOR")
                .with_fills(white.clone())
                .with_stroke_weight(1.5),
            DesignNode::new(format!("I{id};10:3"), "Label", "TEXT")
                .with_text(label)
                .with_fills(white)
                .with_text_style("style_button"),
        ]))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Building design...\n");

    let labels = [
        ("#2563EB", "Save"),
        ("#2563EB", "Save as"),
        ("#DC2626", "Delete"),
        ("#16A34A", "Publish"),
        ("#2563EB", "Share"),
        ("#6B7280", "Cancel"),
    ];
    let mut nodes = Vec::new();
    for (index, (color, label)) in labels.iter().enumerate() {
        let x = index as f64 * 130.0;
        nodes.push(button(&format!("1:{index}"), color, label, x)?);
    }

    let compressor = DesignCompressor::new(CompressionConfig::default());
    let design = compressor.compress("Toolbar", &nodes, &GlobalVars::default())?;

    println!("{}\n", serde_json::to_string_pretty(&design)?);

    let stats = CompressionStats::measure(&nodes, &design.global_vars, &design)?;
    println!(
        "{} -> {} bytes ({:.1}% saved), {} components, {} slots, {} grids",
        stats.original_bytes,
        stats.compressed_bytes,
        stats.savings() * 100.0,
        stats.components,
        stats.slots,
        stats.grids,
    );

    let expanded = expand(&design);
    let report = validate_expansion_with(&nodes, &expanded, ValidationMode::Full);
    if report.is_valid() {
        println!("Round trip verified");
    } else {
        for mismatch in report.mismatches() {
            println!("Mismatch: {mismatch}");
        }
    }

    Ok(())
}
