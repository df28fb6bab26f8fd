//! FleetLog - vehicle telemetry day viewer
//!
//! Loads one vehicle's telemetry for a day from the fleet API or from local
//! JSON files and shows every channel on synchronized charts driven by a
//! range scrubber.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use fleetlog::app::FleetLogApp;

/// Set the macOS application name for the dock
#[cfg(target_os = "macos")]
fn set_macos_app_name() {
    use objc2::{class, msg_send};
    use objc2_foundation::NSString;

    unsafe {
        let app_name = NSString::from_str("FleetLog");
        let process_info_class = class!(NSProcessInfo);
        let process_info: *mut objc2::runtime::AnyObject =
            msg_send![process_info_class, processInfo];
        let _: () = msg_send![process_info, setProcessName: &*app_name];
    }
}

#[cfg(not(target_os = "macos"))]
fn set_macos_app_name() {}

fn main() -> eframe::Result<()> {
    set_macos_app_name();

    tracing_subscriber::fmt::init();

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("FleetLog - Vehicle Telemetry")
            .with_drag_and_drop(true)
            .with_app_id("FleetLog"),
        ..Default::default()
    };

    eframe::run_native(
        "FleetLog",
        native_options,
        Box::new(|cc| Ok(Box::new(FleetLogApp::new(cc)))),
    )
}
