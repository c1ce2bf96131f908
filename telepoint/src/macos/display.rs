use std::collections::HashMap;

use core_graphics::display::{CGDisplayBounds, CGMainDisplayID};
use objc2::MainThreadMarker;
use objc2_app_kit::NSScreen;

pub type DisplayId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Frame and scale of one display. Queried live on every call; monitor
/// arrangement can change between a save and a teleport, so geometry is
/// never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenGeometry {
    pub id: DisplayId,
    pub frame: Bounds,
    pub scale_factor: f64,
    pub is_main: bool,
}

pub fn get_all_displays() -> Vec<ScreenGeometry> {
    let display_ids = get_active_display_ids();
    if display_ids.is_empty() {
        return Vec::new();
    }

    let main_display_id = unsafe { CGMainDisplayID() };
    let scale_factors = get_scale_factors();

    display_ids
        .iter()
        .map(|&display_id| ScreenGeometry {
            id: display_id,
            frame: get_display_bounds(display_id),
            scale_factor: scale_factors.get(&display_id).copied().unwrap_or(1.0),
            is_main: display_id == main_display_id,
        })
        .collect()
}

/// The primary display (the one hosting the menu bar), whose height is the
/// reference for coordinate flipping. `None` when no display is active.
pub fn get_primary_display() -> Option<ScreenGeometry> {
    let display_ids = get_active_display_ids();
    if display_ids.is_empty() {
        return None;
    }

    let main_display_id = unsafe { CGMainDisplayID() };
    let scale_factors = get_scale_factors();

    Some(ScreenGeometry {
        id: main_display_id,
        frame: get_display_bounds(main_display_id),
        scale_factor: scale_factors.get(&main_display_id).copied().unwrap_or(1.0),
        is_main: true,
    })
}

/// Get active display IDs using Core Graphics directly.
/// Unlike NSScreen::screens(), this doesn't depend on NSApplication's event loop.
pub fn get_active_display_ids() -> Vec<DisplayId> {
    use core_graphics::display::CGGetActiveDisplayList;

    const MAX_DISPLAYS: u32 = 16;
    let mut display_ids: [u32; 16] = [0; 16];
    let mut display_count: u32 = 0;

    let result = unsafe {
        CGGetActiveDisplayList(MAX_DISPLAYS, display_ids.as_mut_ptr(), &mut display_count)
    };

    if result != 0 {
        return Vec::new();
    }

    display_ids[..display_count as usize].to_vec()
}

fn get_display_bounds(display_id: DisplayId) -> Bounds {
    let rect = unsafe { CGDisplayBounds(display_id) };
    Bounds {
        x: rect.origin.x,
        y: rect.origin.y,
        width: rect.size.width,
        height: rect.size.height,
    }
}

/// Backing scale factors from NSScreen, keyed by display ID.
fn get_scale_factors() -> HashMap<DisplayId, f64> {
    let mtm = unsafe { MainThreadMarker::new_unchecked() };
    let screens = NSScreen::screens(mtm);

    screens
        .iter()
        .filter_map(|screen| {
            let display_id = get_display_id_for_screen(&screen)?;
            let scale = screen.backingScaleFactor();
            Some((display_id, scale))
        })
        .collect()
}

fn get_display_id_for_screen(screen: &NSScreen) -> Option<DisplayId> {
    use objc2_foundation::NSNumber;

    let desc = screen.deviceDescription();
    let key = objc2_foundation::ns_string!("NSScreenNumber");
    let value = desc.objectForKey(key)?;

    // The value is an NSNumber containing the CGDirectDisplayID
    let number: &NSNumber = unsafe { &*(&*value as *const _ as *const NSNumber) };
    Some(number.unsignedIntValue())
}
