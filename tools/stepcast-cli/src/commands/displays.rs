//! List the display layout the recorder will see.

use stepcast_input_tracker::detect_input_source;

pub fn run() -> anyhow::Result<()> {
    let source = detect_input_source()?;
    let layout = source.display_layout()?;

    println!("Displays ({} via {})", layout.len(), source.name());
    println!("{}", "=".repeat(50));
    for display in layout.displays() {
        let rect = display.rect;
        println!(
            "  [{}] {} {}x{} at ({}, {}) {}",
            display.index,
            display.name,
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            if display.primary { "(primary)" } else { "" }
        );
    }

    if let Some(bounds) = layout.virtual_bounds() {
        println!();
        println!(
            "Virtual desktop: {}x{} at ({}, {})",
            bounds.width, bounds.height, bounds.x, bounds.y
        );
    }

    Ok(())
}
