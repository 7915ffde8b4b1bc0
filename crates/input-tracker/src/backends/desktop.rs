//! Desktop input source backed by `device_query` and `xcap`.

use device_query::{DeviceQuery, DeviceState};
use image::RgbaImage;
use stepcast_common::error::{StepcastError, StepcastResult};
use stepcast_platform_core::{DisplayInfo, MouseButton, Point, Rect};
use xcap::Monitor;

use crate::InputSource;

/// Reads live pointer state and captures real monitors.
pub struct DesktopInputSource;

impl DesktopInputSource {
    /// Fails when no monitor can be enumerated (no display server, missing permission).
    pub fn new() -> StepcastResult<Self> {
        let monitors = Monitor::all()
            .map_err(|e| StepcastError::platform(format!("Failed to enumerate monitors: {e}")))?;
        if monitors.is_empty() {
            return Err(StepcastError::platform("No monitors detected"));
        }
        Ok(Self)
    }
}

/// Index into `device_query`'s `button_pressed` table (slot 0 is unused).
fn button_slot(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 1,
        MouseButton::Right => 2,
        MouseButton::Middle => 3,
    }
}

fn monitor_rect(monitor: &Monitor) -> StepcastResult<Rect> {
    let describe = |e: xcap::XCapError| StepcastError::platform(format!("Monitor query failed: {e}"));
    Ok(Rect::new(
        monitor.x().map_err(describe)?,
        monitor.y().map_err(describe)?,
        monitor.width().map_err(describe)?,
        monitor.height().map_err(describe)?,
    ))
}

impl InputSource for DesktopInputSource {
    fn name(&self) -> &str {
        "desktop"
    }

    fn button_pressed(&self, button: MouseButton) -> StepcastResult<bool> {
        let mouse = DeviceState::new().get_mouse();
        Ok(mouse
            .button_pressed
            .get(button_slot(button))
            .copied()
            .unwrap_or(false))
    }

    fn pointer_position(&self) -> StepcastResult<Point> {
        let (x, y) = DeviceState::new().get_mouse().coords;
        Ok(Point::new(x, y))
    }

    fn list_displays(&self) -> StepcastResult<Vec<DisplayInfo>> {
        let monitors = Monitor::all()
            .map_err(|e| StepcastError::platform(format!("Failed to enumerate monitors: {e}")))?;

        monitors
            .iter()
            .enumerate()
            .map(|(index, monitor)| {
                Ok(DisplayInfo {
                    index,
                    rect: monitor_rect(monitor)?,
                    name: monitor.name().unwrap_or_else(|_| format!("display-{index}")),
                    primary: monitor.is_primary().unwrap_or(false),
                })
            })
            .collect()
    }

    fn capture_region(&self, rect: Rect) -> StepcastResult<RgbaImage> {
        let monitors = Monitor::all()
            .map_err(|e| StepcastError::capture(format!("Failed to get monitors: {e}")))?;

        let (monitor, bounds) = monitors
            .iter()
            .filter_map(|m| monitor_rect(m).ok().map(|bounds| (m, bounds)))
            .find(|(_, bounds)| bounds.contains(Point::new(rect.x, rect.y)))
            .ok_or_else(|| {
                StepcastError::capture(format!("No monitor contains region origin {rect:?}"))
            })?;

        let full = monitor
            .capture_image()
            .map_err(|e| StepcastError::capture(format!("Failed to capture screen: {e}")))?;

        if bounds == rect && full.dimensions() == (rect.width, rect.height) {
            return Ok(full);
        }

        // Captured frames may be in physical pixels while bounds are logical.
        let scale_x = full.width() as f64 / bounds.width.max(1) as f64;
        let scale_y = full.height() as f64 / bounds.height.max(1) as f64;
        let local = bounds.to_local(Point::new(rect.x, rect.y));
        let rel_x = ((local.x.max(0) as f64) * scale_x) as u32;
        let rel_y = ((local.y.max(0) as f64) * scale_y) as u32;
        let crop_width = ((rect.width as f64 * scale_x) as u32).min(full.width().saturating_sub(rel_x));
        let crop_height =
            ((rect.height as f64 * scale_y) as u32).min(full.height().saturating_sub(rel_y));

        if crop_width == 0 || crop_height == 0 {
            return Err(StepcastError::capture(format!(
                "Region {rect:?} lies outside its monitor"
            )));
        }

        Ok(image::imageops::crop_imm(&full, rel_x, rel_y, crop_width, crop_height).to_image())
    }
}
